//! Raster editing surface
//!
//! The persistent buffer holds committed pixels, the overlay holds the
//! in-progress stroke preview, and floating text objects sit above both until
//! they are flattened.

use image::RgbaImage;

use crate::domain::{Rect, Stroke, TextObject, Tool, clamp_font_size};
use crate::render::{filters, image as draw, text};

/// Parameters of the redaction filters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterSettings {
    pub block_size: u32,
    pub blur_radius: u32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            block_size: 10,
            blur_radius: 5,
        }
    }
}

/// Which part of a text object a point falls on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextHit {
    Body(usize),
    ResizeHandle(usize),
}

/// Find the topmost text object under a point
///
/// Resize handles are checked before bodies so the handle wins where the two
/// overlap.
pub fn hit_test_texts(texts: &[TextObject], x: f32, y: f32) -> Option<TextHit> {
    if let Some(i) = texts.iter().rposition(|t| t.hits_resize_handle(x, y)) {
        return Some(TextHit::ResizeHandle(i));
    }
    texts
        .iter()
        .rposition(|t| t.hits_body(x, y))
        .map(TextHit::Body)
}

#[derive(Clone, Debug)]
pub struct EditingSurface {
    persistent: RgbaImage,
    overlay: RgbaImage,
    texts: Vec<TextObject>,
    selected_text: Option<usize>,
}

impl EditingSurface {
    pub fn new(image: RgbaImage) -> Self {
        let overlay = RgbaImage::new(image.width(), image.height());
        Self {
            persistent: image,
            overlay,
            texts: Vec::new(),
            selected_text: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.persistent.width()
    }

    pub fn height(&self) -> u32 {
        self.persistent.height()
    }

    pub fn persistent(&self) -> &RgbaImage {
        &self.persistent
    }

    /// Mutable access for history restore
    pub fn persistent_mut(&mut self) -> &mut RgbaImage {
        &mut self.persistent
    }

    #[cfg(test)]
    pub fn overlay(&self) -> &RgbaImage {
        &self.overlay
    }

    pub fn texts(&self) -> &[TextObject] {
        &self.texts
    }

    pub fn selected_text(&self) -> Option<usize> {
        self.selected_text
    }

    /// Replace the overlay with a preview of `stroke`
    pub fn preview_stroke(&mut self, stroke: &Stroke) {
        self.clear_overlay();
        draw::draw_stroke(&mut self.overlay, stroke);
    }

    pub fn clear_overlay(&mut self) {
        self.overlay.fill(0);
    }

    /// Apply a stroke to the persistent buffer
    ///
    /// Redaction tools run their filter over the stroke's bounding box; the
    /// other tools draw their shape.
    pub fn commit_stroke(&mut self, stroke: &Stroke, filters: FilterSettings) {
        let rect = Rect::from_points(
            stroke.start_x.round() as i32,
            stroke.start_y.round() as i32,
            stroke.end_x.round() as i32,
            stroke.end_y.round() as i32,
        );
        match stroke.tool {
            Tool::Pixelate => filters::pixelate(&mut self.persistent, rect, filters.block_size),
            Tool::Blur => filters::box_blur(&mut self.persistent, rect, filters.blur_radius),
            _ => draw::draw_stroke(&mut self.persistent, stroke),
        }
    }

    /// Add a floating text object and select it, returning its index
    pub fn add_text(&mut self, text: TextObject) -> usize {
        self.texts.push(text);
        let index = self.texts.len() - 1;
        self.selected_text = Some(index);
        index
    }

    pub fn select_text(&mut self, index: Option<usize>) {
        self.selected_text = index.filter(|&i| i < self.texts.len());
    }

    pub fn move_text(&mut self, index: usize, x: f32, y: f32) {
        if let Some(t) = self.texts.get_mut(index) {
            t.x = x;
            t.y = y;
        }
    }

    pub fn resize_text(&mut self, index: usize, font_size: f32) {
        if let Some(t) = self.texts.get_mut(index) {
            t.font_size = clamp_font_size(font_size);
        }
    }

    pub fn remove_text(&mut self, index: usize) -> Option<TextObject> {
        if index >= self.texts.len() {
            return None;
        }
        let removed = self.texts.remove(index);
        self.selected_text = match self.selected_text {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Some(removed)
    }

    /// Rasterize all floating text into the persistent buffer
    ///
    /// Returns false when there was nothing to flatten.
    pub fn flatten_text(&mut self) -> bool {
        if self.texts.is_empty() {
            return false;
        }
        for t in self.texts.drain(..) {
            text::draw_text(&mut self.persistent, &t);
        }
        self.selected_text = None;
        true
    }

    /// Persistent buffer with overlay and floating text on top, for display
    pub fn compose_view(&self) -> RgbaImage {
        let mut view = self.persistent.clone();
        draw::overlay(&mut view, &self.overlay);
        for t in &self.texts {
            text::draw_text(&mut view, t);
        }
        view
    }
}
