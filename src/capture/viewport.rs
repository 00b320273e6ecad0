//! Capabilities the capture pipeline needs from the page it captures
//!
//! The engine never knows how pixels are actually obtained; a browser bridge,
//! a compositor, or [`super::static_page::StaticPage`] all plug in here.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;

use super::error::CaptureError;
use super::image::Bitmap;
use crate::domain::{CssRect, PageGeometry};

/// Opaque "capture the visible viewport" capability
pub trait ViewportSource {
    /// Encoded image of the current viewport at `dpr` device pixels per CSS px
    fn capture_visible(&mut self, dpr: f32) -> BoxFuture<'_, Result<Vec<u8>, CaptureError>>;
}

/// Scroll control and geometry queries
///
/// Scrolling takes effect eventually, not synchronously; callers must give
/// the page time to settle before capturing.
pub trait PageControl {
    fn scroll_to(&mut self, x: f32, y: f32);
    fn scroll_position(&self) -> (f32, f32);
    fn geometry(&self) -> PageGeometry;
    /// Current bounding box of an element in viewport CSS pixels
    fn element_rect(&self, selector: &str) -> Option<CssRect>;
}

/// Loading indicator shown while a long capture runs
pub trait ProgressSink {
    fn show(&mut self, message: &str);
    /// `progress` in `(0, 1]`
    fn update(&mut self, progress: f32);
    fn hide(&mut self);
}

impl ProgressSink for () {
    fn show(&mut self, _message: &str) {}
    fn update(&mut self, _progress: f32) {}
    fn hide(&mut self) {}
}

/// Progress indicator that writes to the log
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn show(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn update(&mut self, progress: f32) {
        log::info!("capture {:.0}%", progress * 100.0);
    }

    fn hide(&mut self) {}
}

/// Shared flag to abort a running full-page capture
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Capture the viewport and decode the payload off the event loop
pub async fn capture_viewport<S>(source: &mut S, dpr: f32) -> Result<Bitmap, CaptureError>
where
    S: ViewportSource + ?Sized,
{
    let payload = source.capture_visible(dpr).await?;
    tokio::task::spawn_blocking(move || Bitmap::decode(&payload, dpr)).await?
}
