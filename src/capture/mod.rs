//! Page capture
//!
//! This module contains:
//! - Bitmap type and PNG encoding (image.rs)
//! - Capture capabilities and the decoding adapter (viewport.rs)
//! - Full-page scroll-and-stitch engine (stitch.rs)
//! - Region and element cropping (region.rs)
//! - Request dispatch by capture mode (pipeline.rs)
//! - Image-backed page for headless use (static_page.rs)

pub mod error;
pub mod image;
pub mod pipeline;
pub mod region;
pub mod static_page;
pub mod stitch;
pub mod viewport;

pub use error::CaptureError;
pub use image::Bitmap;
