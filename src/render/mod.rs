//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations shared between preview and commit
//! - Stroke rendering using tiny-skia
//! - Pixelation and blur filters
//! - Bitmap-font text rasterization

pub mod filters;
pub mod geometry;
pub mod image;
pub mod text;
