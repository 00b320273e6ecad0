//! Redaction filters operating in place on a sub-rectangle of an image

use image::RgbaImage;

use crate::domain::Rect;

/// Replace each `block_size` square with the mean of its RGB channels
///
/// Blocks at the far edges of `rect` are truncated and averaged over the pixels
/// they actually contain. Alpha is left unmodified.
pub fn pixelate(img: &mut RgbaImage, rect: Rect, block_size: u32) {
    let Some(area) = rect.intersect(Rect::of_size(img.width(), img.height())) else {
        return;
    };
    let block_size = block_size.max(1);
    let (min_x, min_y) = (area.left as u32, area.top as u32);
    let (max_x, max_y) = (area.right as u32, area.bottom as u32);

    let mut block_y = min_y;
    while block_y < max_y {
        let block_end_y = (block_y + block_size).min(max_y);

        let mut block_x = min_x;
        while block_x < max_x {
            let block_end_x = (block_x + block_size).min(max_x);

            // Calculate average color for this block
            let mut total = [0u64; 3];
            let mut pixel_count: u64 = 0;
            for py in block_y..block_end_y {
                for px in block_x..block_end_x {
                    let pixel = img.get_pixel(px, py);
                    for (sum, channel) in total.iter_mut().zip(pixel.0) {
                        *sum += channel as u64;
                    }
                    pixel_count += 1;
                }
            }

            let avg = total.map(|sum| (sum / pixel_count) as u8);
            for py in block_y..block_end_y {
                for px in block_x..block_end_x {
                    let pixel = img.get_pixel_mut(px, py);
                    pixel.0[..3].copy_from_slice(&avg);
                }
            }

            block_x += block_size;
        }
        block_y += block_size;
    }
}

/// Square box blur of `radius` restricted to `rect`
///
/// Each pixel becomes the mean RGB of its `[-radius, radius]²` neighbourhood,
/// counting only neighbours inside `rect`; there is no wraparound or mirroring
/// at the edges. Alpha is copied from the centre pixel. This is a direct
/// O(w·h·r²) convolution meant for redaction-sized rectangles.
pub fn box_blur(img: &mut RgbaImage, rect: Rect, radius: u32) {
    let Some(area) = rect.intersect(Rect::of_size(img.width(), img.height())) else {
        return;
    };
    let (left, top) = (area.left as u32, area.top as u32);
    let source = image::imageops::crop_imm(
        &*img,
        left,
        top,
        area.width() as u32,
        area.height() as u32,
    )
    .to_image();
    let (width, height) = source.dimensions();
    let r = radius as i64;

    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let mut total = [0u64; 3];
            let mut count: u64 = 0;
            for ky in (y - r).max(0)..=(y + r).min(height as i64 - 1) {
                for kx in (x - r).max(0)..=(x + r).min(width as i64 - 1) {
                    let pixel = source.get_pixel(kx as u32, ky as u32);
                    for (sum, channel) in total.iter_mut().zip(pixel.0) {
                        *sum += channel as u64;
                    }
                    count += 1;
                }
            }

            let alpha = source.get_pixel(x as u32, y as u32)[3];
            let [red, green, blue] = total.map(|sum| (sum / count) as u8);
            img.put_pixel(
                left + x as u32,
                top + y as u32,
                image::Rgba([red, green, blue, alpha]),
            );
        }
    }
}
