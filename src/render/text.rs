//! Text rasterization with an 8x8 bitmap font
//!
//! Each glyph fills a square cell of `font_size` pixels; lines are spaced by
//! `font_size * LINE_HEIGHT`.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};

use crate::domain::{LINE_HEIGHT, TextObject};

const GLYPH_SIZE: f32 = 8.0;

/// Draw a text object onto an image, clipped to its bounds
pub fn draw_text(img: &mut RgbaImage, text: &TextObject) {
    let cell = text.font_size.max(1.0);
    let [r, g, b, a] = text.color.to_rgba_u8();
    let color = Rgba([r, g, b, a]);

    for (row, line) in text.lines().enumerate() {
        let top = text.y + row as f32 * cell * LINE_HEIGHT;
        for (column, ch) in line.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
                continue;
            };
            let left = text.x + column as f32 * cell;
            draw_glyph(img, &glyph, left, top, cell, color);
        }
    }
}

fn draw_glyph(img: &mut RgbaImage, glyph: &[u8; 8], left: f32, top: f32, cell: f32, color: Rgba<u8>) {
    let (width, height) = (img.width() as i64, img.height() as i64);
    let x0 = left.round() as i64;
    let y0 = top.round() as i64;
    let size = cell.round() as i64;

    for dy in 0..size {
        let y = y0 + dy;
        if y < 0 || y >= height {
            continue;
        }
        let glyph_row = glyph[((dy as f32 * GLYPH_SIZE / cell) as usize).min(7)];
        for dx in 0..size {
            let x = x0 + dx;
            if x < 0 || x >= width {
                continue;
            }
            let bit = ((dx as f32 * GLYPH_SIZE / cell) as usize).min(7);
            if (glyph_row >> bit) & 1 == 1 {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
