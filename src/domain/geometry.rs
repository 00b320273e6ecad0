//! Geometric types for capture regions and coordinates

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Device-pixel rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from coordinates
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle spanning two arbitrary corner points
    pub fn from_points(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            left: x1.min(x2),
            top: y1.min(y2),
            right: x1.max(x2),
            bottom: y1.max(y2),
        }
    }

    /// Rectangle covering a whole `width` x `height` buffer
    pub fn of_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left < right && top < bottom {
            Some(Rect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Get the width of the rectangle
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Get the height of the rectangle
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Convert to dimensions (NonZeroU32 width and height)
    pub fn dimensions(self) -> Option<RectDimension> {
        let width = NonZeroU32::new((self.width()).unsigned_abs())?;
        let height = NonZeroU32::new((self.height()).unsigned_abs())?;
        Some(RectDimension { width, height })
    }
}

/// Non-zero dimensions of a rectangle
#[derive(Clone, Copy, Debug)]
pub struct RectDimension {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl RectDimension {
    /// Get the width as u32
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    /// Get the height as u32
    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

/// Rectangle in CSS (layout) pixels, as reported by the page
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CssRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CssRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning a drag from `(x1, y1)` to `(x2, y2)`
    pub fn from_drag(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs())
    }

    /// Same rectangle with non-negative width and height
    pub fn normalized(self) -> Self {
        Self::from_drag(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Clamp to `[0, max_width] x [0, max_height]`
    pub fn clamp_to(self, max_width: f32, max_height: f32) -> Self {
        let r = self.normalized();
        let left = r.x.clamp(0.0, max_width);
        let top = r.y.clamp(0.0, max_height);
        let right = (r.x + r.width).clamp(0.0, max_width);
        let bottom = (r.y + r.height).clamp(0.0, max_height);
        Self::new(left, top, right - left, bottom - top)
    }

    /// Scale into device pixels, rounding edges to the nearest pixel
    pub fn to_device(self, dpr: f32) -> Rect {
        let r = self.normalized();
        Rect::new(
            (r.x * dpr).round() as i32,
            (r.y * dpr).round() as i32,
            ((r.x + r.width) * dpr).round() as i32,
            ((r.y + r.height) * dpr).round() as i32,
        )
    }
}

/// Parse `x,y,w,h`
impl std::str::FromStr for CssRect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [x, y, w, h] => Ok(Self::new(*x, *y, *w, *h)),
            _ => anyhow::bail!("expected x,y,width,height, got {s:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 20, 20);
        assert_eq!(a.intersect(b), Some(Rect::new(5, 5, 10, 10)));
        assert_eq!(a.intersect(Rect::new(10, 0, 20, 10)), None);
    }

    #[test]
    fn test_css_rect_from_drag_normalizes() {
        let r = CssRect::from_drag(50.0, 40.0, 10.0, 20.0);
        assert_eq!(r, CssRect::new(10.0, 20.0, 40.0, 20.0));
        assert_eq!(CssRect::new(50.0, 40.0, -40.0, -20.0).normalized(), r);
    }

    #[test]
    fn test_css_rect_clamp_and_scale() {
        let r = CssRect::new(-10.0, 90.0, 50.0, 50.0).clamp_to(100.0, 100.0);
        assert_eq!(r, CssRect::new(0.0, 90.0, 40.0, 10.0));
        assert_eq!(r.to_device(2.0), Rect::new(0, 180, 80, 200));
    }

    #[test]
    fn test_css_rect_parse() {
        let r: CssRect = "1, 2,3.5,4".parse().unwrap();
        assert_eq!(r, CssRect::new(1.0, 2.0, 3.5, 4.0));
        assert!("1,2,3".parse::<CssRect>().is_err());
    }
}
