//! Cropping a visible-viewport bitmap to a selection or element

use super::image::Bitmap;
use crate::domain::{CssRect, Rect};

/// Area selections smaller than this (CSS px, either side) are accidental clicks
pub const MIN_SELECTION_SIZE: f32 = 10.0;

/// Whether a drag selection is too small to capture
pub fn is_degenerate_selection(rect: CssRect) -> bool {
    let rect = rect.normalized();
    rect.width < MIN_SELECTION_SIZE || rect.height < MIN_SELECTION_SIZE
}

/// Crop `bitmap` to `rect` (CSS px, relative to the viewport)
///
/// With `min_size`, rectangles smaller than it on either side yield `None`.
/// Rectangles are clamped to the viewport; one entirely outside it yields
/// `None`. Nothing is scrolled: parts of an element outside the viewport are
/// simply not captured.
pub fn extract_region(bitmap: &Bitmap, rect: CssRect, min_size: Option<f32>) -> Option<Bitmap> {
    let requested = rect.normalized();
    if let Some(min) = min_size
        && (requested.width < min || requested.height < min)
    {
        log::debug!("Selection {:?} below {}px, ignoring", requested, min);
        return None;
    }

    let (viewport_width, viewport_height) = bitmap.css_size();
    let clamped = requested.clamp_to(viewport_width, viewport_height);
    let device = clamped
        .to_device(bitmap.dpr)
        .intersect(Rect::of_size(bitmap.width(), bitmap.height()))?;
    let dims = device.dimensions()?;

    let cropped = image::imageops::crop_imm(
        &bitmap.rgba,
        device.left as u32,
        device.top as u32,
        dims.width(),
        dims.height(),
    )
    .to_image();
    log::debug!(
        "Extracted {}x{} device pixels at ({}, {})",
        cropped.width(),
        cropped.height(),
        device.left,
        device.top
    );
    Some(Bitmap::new(cropped, bitmap.dpr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Viewport where each pixel encodes its own coordinates
    fn viewport(width: u32, height: u32, dpr: f32) -> Bitmap {
        Bitmap::new(
            RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255])),
            dpr,
        )
    }

    #[test]
    fn test_extract_scales_by_dpr() {
        let bitmap = viewport(200, 100, 2.0);
        let region = extract_region(&bitmap, CssRect::new(10.0, 5.0, 20.0, 15.0), None).unwrap();
        assert_eq!(region.rgba.dimensions(), (40, 30));
        assert_eq!(*region.rgba.get_pixel(0, 0), Rgba([20, 10, 0, 255]));
        assert_eq!(*region.rgba.get_pixel(39, 29), Rgba([59, 39, 0, 255]));
        assert_eq!(region.dpr, 2.0);
    }

    #[test]
    fn test_small_selection_is_silent_noop() {
        let bitmap = viewport(100, 100, 1.0);
        let min = Some(MIN_SELECTION_SIZE);
        assert!(extract_region(&bitmap, CssRect::new(0.0, 0.0, 9.0, 50.0), min).is_none());
        assert!(extract_region(&bitmap, CssRect::new(0.0, 0.0, 50.0, 9.9), min).is_none());
        assert!(extract_region(&bitmap, CssRect::new(0.0, 0.0, 10.0, 10.0), min).is_some());
        assert!(is_degenerate_selection(CssRect::new(5.0, 5.0, -4.0, 30.0)));
    }

    #[test]
    fn test_selection_clamped_to_viewport() {
        let bitmap = viewport(100, 80, 1.0);
        let region =
            extract_region(&bitmap, CssRect::new(-20.0, 60.0, 50.0, 50.0), Some(10.0)).unwrap();
        assert_eq!(region.rgba.dimensions(), (30, 20));
        assert_eq!(*region.rgba.get_pixel(0, 0), Rgba([0, 60, 0, 255]));
    }

    #[test]
    fn test_selection_outside_viewport() {
        let bitmap = viewport(100, 80, 1.0);
        assert!(extract_region(&bitmap, CssRect::new(120.0, 0.0, 30.0, 30.0), None).is_none());
    }

    #[test]
    fn test_reversed_drag_selects_same_region() {
        let bitmap = viewport(100, 100, 1.0);
        let forward = extract_region(&bitmap, CssRect::new(10.0, 10.0, 30.0, 20.0), None);
        let reversed = extract_region(&bitmap, CssRect::new(40.0, 30.0, -30.0, -20.0), None);
        assert_eq!(forward, reversed);
    }
}
