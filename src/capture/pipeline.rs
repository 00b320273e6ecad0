//! Dispatching a capture request to the right capture strategy

use super::error::CaptureError;
use super::image::Bitmap;
use super::region::{MIN_SELECTION_SIZE, extract_region, is_degenerate_selection};
use super::stitch::{StitchOptions, stitch_full_page};
use super::viewport::{PageControl, ProgressSink, ViewportSource, capture_viewport};
use crate::domain::{CaptureMode, CaptureRequest};

/// Run one capture
///
/// `Ok(None)` means the request selected nothing (a tiny or missing
/// selection) and should be dropped without telling the user.
pub async fn run_capture<P, G>(
    request: &CaptureRequest,
    page: &mut P,
    options: &StitchOptions,
    progress: &mut G,
) -> Result<Option<Bitmap>, CaptureError>
where
    P: ViewportSource + PageControl + ?Sized,
    G: ProgressSink + ?Sized,
{
    log::info!("Capture requested: {:?}", request.mode);
    match request.mode {
        CaptureMode::Visible => capture_viewport(page, request.dpr).await.map(Some),
        CaptureMode::FullPage => {
            let geometry = page.geometry();
            stitch_full_page(page, geometry, request.dpr, options, progress)
                .await
                .map(Some)
        }
        CaptureMode::Area => {
            let Some(target) = request.target else {
                return Ok(None);
            };
            if is_degenerate_selection(target) {
                log::debug!("Area selection {:?} too small, capture skipped", target);
                return Ok(None);
            }
            let visible = capture_viewport(page, request.dpr).await?;
            Ok(extract_region(&visible, target, Some(MIN_SELECTION_SIZE)))
        }
        CaptureMode::Element => {
            let Some(target) = request.target else {
                return Ok(None);
            };
            // The element is captured as currently rendered; no scroll into
            // view and no stitching for elements taller than the viewport.
            let visible = capture_viewport(page, request.dpr).await?;
            Ok(extract_region(&visible, target, None))
        }
    }
}
