//! A page backed by a pre-rendered image
//!
//! Stands in for a live browser tab: the image is the whole page at one pixel
//! per CSS pixel, and "capturing the viewport" crops the window currently
//! scrolled into view and scales it to the requested device pixel ratio.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use futures::FutureExt;
use futures::future::BoxFuture;
use image::{Rgba, RgbaImage};

use super::error::CaptureError;
use super::image::write_png;
use super::viewport::{PageControl, ViewportSource};
use crate::domain::{CssRect, PageGeometry};

#[derive(Clone, Debug)]
pub struct StaticPage {
    content: RgbaImage,
    viewport_width: u32,
    viewport_height: u32,
    scroll_x: f32,
    scroll_y: f32,
    /// Clamp scrolling to the page like a browser does
    clamp_scroll: bool,
    /// Named element bounding boxes in page coordinates
    elements: HashMap<String, CssRect>,
    captures: u32,
}

impl StaticPage {
    pub fn new(content: RgbaImage, viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            content,
            viewport_width: viewport_width.max(1),
            viewport_height: viewport_height.max(1),
            scroll_x: 0.0,
            scroll_y: 0.0,
            clamp_scroll: true,
            elements: HashMap::new(),
            captures: 0,
        }
    }

    pub fn open(path: &Path, viewport_width: u32, viewport_height: u32) -> anyhow::Result<Self> {
        let content = image::open(path)
            .with_context(|| format!("failed to open page image {}", path.display()))?
            .into_rgba8();
        log::debug!(
            "Static page {}: {}x{}",
            path.display(),
            content.width(),
            content.height()
        );
        Ok(Self::new(content, viewport_width, viewport_height))
    }

    /// Page whose every row has a distinct color
    pub fn gradient(width: u32, height: u32, viewport_width: u32, viewport_height: u32) -> Self {
        let content = RgbaImage::from_fn(width, height, |_, y| {
            Rgba([(y % 256) as u8, ((y / 256) % 256) as u8, 0x80, 255])
        });
        Self::new(content, viewport_width, viewport_height)
    }

    pub fn with_scroll_clamp(mut self, clamp: bool) -> Self {
        self.clamp_scroll = clamp;
        self
    }

    pub fn with_element(mut self, name: impl Into<String>, rect: CssRect) -> Self {
        self.elements.insert(name.into(), rect);
        self
    }

    pub fn content(&self) -> &RgbaImage {
        &self.content
    }

    /// Number of viewport captures taken so far
    pub fn capture_count(&self) -> u32 {
        self.captures
    }

    /// Render the visible window at `dpr`; rows past the page are transparent
    fn render_viewport(&self, dpr: f32) -> RgbaImage {
        let width = (self.viewport_width as f32 * dpr).round().max(1.0) as u32;
        let height = (self.viewport_height as f32 * dpr).round().max(1.0) as u32;
        let (page_width, page_height) = self.content.dimensions();
        RgbaImage::from_fn(width, height, |dx, dy| {
            let x = self.scroll_x + dx as f32 / dpr;
            let y = self.scroll_y + dy as f32 / dpr;
            if x < 0.0 || y < 0.0 {
                return Rgba([0, 0, 0, 0]);
            }
            let (x, y) = (x.floor() as u32, y.floor() as u32);
            if x < page_width && y < page_height {
                *self.content.get_pixel(x, y)
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }
}

impl ViewportSource for StaticPage {
    fn capture_visible(&mut self, dpr: f32) -> BoxFuture<'_, Result<Vec<u8>, CaptureError>> {
        self.captures += 1;
        let frame = self.render_viewport(dpr);
        async move {
            let mut payload = Vec::new();
            write_png(&mut payload, &frame)
                .map_err(|err| CaptureError::Capture(err.to_string()))?;
            Ok(payload)
        }
        .boxed()
    }
}

impl PageControl for StaticPage {
    fn scroll_to(&mut self, x: f32, y: f32) {
        if self.clamp_scroll {
            let max_x = self.content.width().saturating_sub(self.viewport_width) as f32;
            let max_y = self.content.height().saturating_sub(self.viewport_height) as f32;
            self.scroll_x = x.clamp(0.0, max_x);
            self.scroll_y = y.clamp(0.0, max_y);
        } else {
            self.scroll_x = x;
            self.scroll_y = y;
        }
    }

    fn scroll_position(&self) -> (f32, f32) {
        (self.scroll_x, self.scroll_y)
    }

    fn geometry(&self) -> PageGeometry {
        let (page_width, page_height) = self.content.dimensions();
        PageGeometry::from_candidates(
            &[page_width as f32, self.viewport_width as f32],
            &[page_height as f32, self.viewport_height as f32],
            self.viewport_width as f32,
            self.viewport_height as f32,
        )
    }

    fn element_rect(&self, selector: &str) -> Option<CssRect> {
        let rect = self.elements.get(selector)?;
        Some(CssRect::new(
            rect.x - self.scroll_x,
            rect.y - self.scroll_y,
            rect.width,
            rect.height,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::viewport::capture_viewport;

    #[test]
    fn test_scroll_clamps_to_page() {
        let mut page = StaticPage::gradient(100, 500, 100, 200);
        page.scroll_to(0.0, 1000.0);
        assert_eq!(page.scroll_position(), (0.0, 300.0));
        page.scroll_to(-5.0, -5.0);
        assert_eq!(page.scroll_position(), (0.0, 0.0));
    }

    #[test]
    fn test_geometry_never_smaller_than_viewport() {
        let page = StaticPage::gradient(100, 50, 200, 300);
        let geometry = page.geometry();
        assert_eq!(geometry.page_width, 200.0);
        assert_eq!(geometry.page_height, 300.0);
    }

    #[test]
    fn test_element_rect_follows_scroll() {
        let mut page = StaticPage::gradient(100, 1000, 100, 200)
            .with_element("#card", CssRect::new(10.0, 400.0, 50.0, 60.0));
        assert_eq!(
            page.element_rect("#card"),
            Some(CssRect::new(10.0, 400.0, 50.0, 60.0))
        );
        page.scroll_to(0.0, 350.0);
        assert_eq!(
            page.element_rect("#card"),
            Some(CssRect::new(10.0, 50.0, 50.0, 60.0))
        );
        assert_eq!(page.element_rect("#missing"), None);
    }

    #[tokio::test]
    async fn test_capture_scales_viewport_by_dpr() {
        let mut page = StaticPage::gradient(50, 400, 50, 100);
        page.scroll_to(0.0, 120.0);
        let bitmap = capture_viewport(&mut page, 2.0).await.unwrap();

        assert_eq!(bitmap.rgba.dimensions(), (100, 200));
        assert_eq!(*bitmap.rgba.get_pixel(0, 0), *page.content().get_pixel(0, 120));
        assert_eq!(*bitmap.rgba.get_pixel(99, 199), *page.content().get_pixel(49, 219));
        assert_eq!(page.capture_count(), 1);
    }
}
