//! Pure domain types with minimal dependencies
//!
//! Types here should not depend on capture backends or the editor so that
//! every other module can share them.

pub mod annotation;
pub mod capture;
pub mod geometry;

pub use annotation::*;
pub use capture::*;
pub use geometry::*;
