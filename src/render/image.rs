//! Stroke rendering onto RGBA buffers using tiny-skia

use image::RgbaImage;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry::{self, arrow, shape};
use crate::domain::{self, Tool};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
///
/// tiny-skia works on premultiplied pixels, so the buffer is premultiplied on
/// the way in and demultiplied on the way out; transparent overlay pixels
/// would otherwise come back darkened.
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let mut data = img.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        premultiply(px);
    }
    let Some(mut pixmap) = Pixmap::from_vec(data, size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    for (dst, src) in img.chunks_exact_mut(4).zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
}

fn premultiply(px: &mut [u8]) {
    let a = px[3] as u16;
    if a == 255 {
        return;
    }
    for c in &mut px[..3] {
        *c = ((*c as u16 * a + 127) / 255) as u8;
    }
}

/// Build an arrow path as stroked lines (shaft + two angled head lines)
fn build_arrow_path(start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> Option<tiny_skia::Path> {
    let (head1_x, head1_y, head2_x, head2_y) =
        arrow::head_points(start_x, start_y, end_x, end_y, arrow::HEAD_LENGTH);

    let mut pb = PathBuilder::new();

    // Shaft line from start to end
    pb.move_to(start_x, start_y);
    pb.line_to(end_x, end_y);

    // First head line
    pb.move_to(end_x, end_y);
    pb.line_to(head1_x, head1_y);

    // Second head line
    pb.move_to(end_x, end_y);
    pb.line_to(head2_x, head2_y);

    pb.finish()
}

fn build_line_path(start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(start_x, start_y);
    pb.line_to(end_x, end_y);
    pb.finish()
}

fn build_rect_path(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(min_x, min_y);
    pb.line_to(max_x, min_y);
    pb.line_to(max_x, max_y);
    pb.line_to(min_x, max_y);
    pb.close();
    pb.finish()
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<tiny_skia::Path> {
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    // Start at top
    pb.move_to(cx, cy - ry);

    // Top to right
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);

    // Right to bottom
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);

    // Bottom to left
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);

    // Left to top
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

/// Draw a stroke's shape onto an image
///
/// Pixelate and blur strokes are drawn as their selection outline; the
/// filters themselves run only on commit.
pub fn draw_stroke(img: &mut RgbaImage, stroke: &domain::Stroke) {
    let domain::Stroke {
        tool,
        start_x,
        start_y,
        end_x,
        end_y,
        color,
        width,
        fill,
    } = *stroke;
    let (min_x, min_y, max_x, max_y) = geometry::normalize_rect(start_x, start_y, end_x, end_y);

    let (path, fill) = match tool {
        Tool::Arrow => (build_arrow_path(start_x, start_y, end_x, end_y), false),
        Tool::Line => (build_line_path(start_x, start_y, end_x, end_y), false),
        Tool::Rect => (build_rect_path(min_x, min_y, max_x, max_y), fill),
        Tool::Circle => {
            let (cx, cy, rx, ry) = geometry::ellipse_from_bounds(min_x, min_y, max_x, max_y);
            (build_ellipse_path(cx, cy, rx, ry), fill)
        }
        Tool::Pixelate | Tool::Blur => (build_rect_path(min_x, min_y, max_x, max_y), false),
        Tool::Select | Tool::Text => return,
    };
    let Some(path) = path else {
        return;
    };

    let [r, g, b, a] = color.to_rgba_u8();
    with_pixmap(img, |pixmap| {
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        if fill {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        } else {
            let stroke = Stroke {
                width: width.max(1.0),
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    });
}

/// Alpha-composite `top` over `bottom` (same size)
pub fn overlay(bottom: &mut RgbaImage, top: &RgbaImage) {
    image::imageops::overlay(bottom, top, 0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeColor;
    use image::Rgba;

    fn stroke(tool: Tool, fill: bool) -> domain::Stroke {
        domain::Stroke {
            tool,
            start_x: 10.0,
            start_y: 10.0,
            end_x: 50.0,
            end_y: 40.0,
            color: ShapeColor::from_rgb_u8(255, 0, 0),
            width: 4.0,
            fill,
        }
    }

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn test_filled_rect_covers_interior() {
        let mut img = white(60, 60);
        draw_stroke(&mut img, &stroke(Tool::Rect, true));
        assert_eq!(*img.get_pixel(30, 25), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(5, 5), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_outline_rect_leaves_interior() {
        let mut img = white(60, 60);
        draw_stroke(&mut img, &stroke(Tool::Rect, false));
        assert_eq!(*img.get_pixel(30, 25), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(10, 25), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_redaction_preview_is_outline_only() {
        let mut img = white(60, 60);
        draw_stroke(&mut img, &stroke(Tool::Pixelate, true));
        assert_eq!(*img.get_pixel(30, 25), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(30, 10), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_line_on_transparent_overlay_keeps_color() {
        let mut overlay = RgbaImage::new(60, 60);
        draw_stroke(&mut overlay, &stroke(Tool::Line, false));
        // Interior of a 4px line is fully opaque and not darkened
        let px = overlay.get_pixel(30, 25);
        assert_eq!(px[3], 255);
        assert_eq!(px[0], 255);
        assert_eq!(*overlay.get_pixel(55, 5), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_select_tool_draws_nothing() {
        let mut img = white(20, 20);
        let before = img.clone();
        draw_stroke(&mut img, &stroke(Tool::Select, false));
        assert_eq!(img, before);
    }
}
