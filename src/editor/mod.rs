//! Capture editor
//!
//! This module contains:
//! - The raster editing surface (persistent buffer, overlay, floating text)
//! - Snapshot history for undo/redo
//! - The pointer/keyboard state machine and its message types
//! - The session tying them together

pub mod history;
pub mod input;
pub mod messages;
pub mod session;
pub mod shortcuts;
pub mod surface;

pub use session::{EditorSession, Request};
