//! Full-page capture by scrolling the viewport and stitching the slices
//!
//! Each step scrolls, waits for the page to settle, captures the viewport and
//! composites it at its scroll offset. The wait is a fixed delay because
//! layout and paint completion cannot be observed from outside the page, so a
//! slow page can still be captured mid-paint.

use std::time::Duration;

use image::RgbaImage;

use super::error::CaptureError;
use super::image::Bitmap;
use super::viewport::{CancelFlag, PageControl, ProgressSink, ViewportSource, capture_viewport};
use crate::domain::{PageGeometry, StitchPlan};

/// Loading indicator text while stitching
pub const LOADING_MESSAGE: &str = "Capturing full page...";

#[derive(Clone, Debug)]
pub struct StitchOptions {
    /// Wait after each scroll before capturing
    pub settle_delay: Duration,
    pub cancel: CancelFlag,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(300),
            cancel: CancelFlag::new(),
        }
    }
}

/// Capture a page taller than the viewport as one bitmap
///
/// The original scroll position is restored and the progress indicator hidden
/// whether the capture succeeds, fails or is cancelled. No partial image is
/// returned on failure.
pub async fn stitch_full_page<P, G>(
    page: &mut P,
    geometry: PageGeometry,
    dpr: f32,
    options: &StitchOptions,
    progress: &mut G,
) -> Result<Bitmap, CaptureError>
where
    P: ViewportSource + PageControl + ?Sized,
    G: ProgressSink + ?Sized,
{
    let plan = StitchPlan::new(geometry, dpr)
        .ok_or_else(|| CaptureError::EmptyPage(format!("{geometry:?} at dpr {dpr}")))?;

    let (original_x, original_y) = page.scroll_position();
    progress.show(LOADING_MESSAGE);

    let result = capture_steps(&mut *page, &plan, options, &mut *progress).await;

    page.scroll_to(original_x, original_y);
    progress.hide();

    match &result {
        Ok(bitmap) => log::info!(
            "Stitched {} steps into {}x{} pixels",
            plan.step_count,
            bitmap.width(),
            bitmap.height()
        ),
        Err(err) => log::warn!("Full-page capture aborted: {err}"),
    }
    result
}

async fn capture_steps<P, G>(
    page: &mut P,
    plan: &StitchPlan,
    options: &StitchOptions,
    progress: &mut G,
) -> Result<Bitmap, CaptureError>
where
    P: ViewportSource + PageControl + ?Sized,
    G: ProgressSink + ?Sized,
{
    let mut canvas = RgbaImage::new(plan.output_width, plan.output_height);

    for step in 0..plan.step_count {
        if options.cancel.is_cancelled() {
            return Err(CaptureError::Cancelled);
        }

        page.scroll_to(0.0, plan.scroll_offset(step));
        tokio::time::sleep(options.settle_delay).await;

        let slice = capture_viewport(&mut *page, plan.dpr).await?;

        // Pages clamp the last scroll to the bottom edge; placing the slice at
        // the reported offset overlaps earlier rows instead of misplacing it.
        let (_, scroll_y) = page.scroll_position();
        let row = (scroll_y.max(0.0) * plan.dpr).round() as u32;
        log::debug!(
            "Step {}/{}: scrolled to {}, compositing at row {}",
            step + 1,
            plan.step_count,
            scroll_y,
            row
        );

        let slice = fit_slice(slice.rgba, plan.slice_width, plan.slice_height);
        composite_rows(&mut canvas, &slice, row);

        progress.update((step + 1) as f32 / plan.step_count as f32);
    }

    Ok(Bitmap::new(canvas, plan.dpr))
}

/// Resize a slice that came back at an unexpected size
fn fit_slice(slice: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if slice.dimensions() == (width, height) {
        return slice;
    }
    log::debug!(
        "Resizing slice from {:?} to {}x{}",
        slice.dimensions(),
        width,
        height
    );
    image::imageops::resize(&slice, width, height, image::imageops::FilterType::Lanczos3)
}

/// Copy `slice` into `canvas` at column 0, row `row`, clipped to the canvas
fn composite_rows(canvas: &mut RgbaImage, slice: &RgbaImage, row: u32) {
    let (canvas_width, canvas_height) = canvas.dimensions();
    if row >= canvas_height {
        return;
    }
    let rows = slice.height().min(canvas_height - row) as usize;
    let row_bytes = slice.width().min(canvas_width) as usize * 4;
    let canvas_stride = canvas_width as usize * 4;
    let slice_stride = slice.width() as usize * 4;

    let src = slice.as_raw();
    let dst: &mut [u8] = &mut **canvas;
    for y in 0..rows {
        let from = y * slice_stride;
        let to = (row as usize + y) * canvas_stride;
        dst[to..to + row_bytes].copy_from_slice(&src[from..from + row_bytes]);
    }
}
