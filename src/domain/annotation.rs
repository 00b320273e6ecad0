//! Annotation types for drawing on captures
//!
//! All annotation types store coordinates in persistent-buffer (device pixel)
//! coordinates.

use serde::{Deserialize, Serialize};

use crate::config::ShapeColor;

/// Smallest and largest font size a text object can be resized to
pub const MIN_FONT_SIZE: f32 = 12.0;
pub const MAX_FONT_SIZE: f32 = 72.0;

/// Line height as a multiple of the font size
pub const LINE_HEIGHT: f32 = 1.2;

/// Side of the square resize handle at a text object's bottom-right corner
pub const RESIZE_HANDLE_SIZE: f32 = 10.0;

/// Editor tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Arrow,
    Line,
    Rect,
    Circle,
    Pixelate,
    Blur,
    Text,
}

impl Tool {
    /// Tool bound to a single-letter shortcut
    pub fn from_shortcut(c: char) -> Option<Self> {
        match c {
            'v' => Some(Tool::Select),
            'a' => Some(Tool::Arrow),
            'l' => Some(Tool::Line),
            'r' => Some(Tool::Rect),
            'c' => Some(Tool::Circle),
            'p' => Some(Tool::Pixelate),
            'b' => Some(Tool::Blur),
            't' => Some(Tool::Text),
            _ => None,
        }
    }
}

/// A drag gesture of a stroke tool, from press to current/release point
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub tool: Tool,
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub color: ShapeColor,
    pub width: f32,
    pub fill: bool,
}

/// Floating text annotation, not yet part of the persistent buffer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    /// May contain newlines
    pub text: String,
    /// Top-left corner
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub color: ShapeColor,
}

impl TextObject {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Width and height of the rendered text block
    ///
    /// Glyphs are square cells of `font_size` pixels.
    pub fn size(&self) -> (f32, f32) {
        let columns = self.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let rows = self.lines().count().max(1);
        let height = self.font_size + (rows - 1) as f32 * self.font_size * LINE_HEIGHT;
        (columns as f32 * self.font_size, height)
    }

    /// Whether the point lies on the text body
    pub fn hits_body(&self, x: f32, y: f32) -> bool {
        let (w, h) = self.size();
        x >= self.x && x < self.x + w && y >= self.y && y < self.y + h
    }

    /// Whether the point lies on the bottom-right resize handle
    pub fn hits_resize_handle(&self, x: f32, y: f32) -> bool {
        let (w, h) = self.size();
        let half = RESIZE_HANDLE_SIZE / 2.0;
        let (cx, cy) = (self.x + w, self.y + h);
        (x - cx).abs() <= half && (y - cy).abs() <= half
    }
}

/// Clamp a font size into the resizable range
pub fn clamp_font_size(size: f32) -> f32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}
