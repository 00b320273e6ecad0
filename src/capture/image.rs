//! Bitmap type for captured viewports and stitched pages

use std::io;

use image::RgbaImage;

use super::error::CaptureError;

/// A captured image at device-pixel resolution
///
/// `dpr` is the device pixel ratio already baked into the pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    pub rgba: RgbaImage,
    pub dpr: f32,
}

impl Bitmap {
    pub fn new(rgba: RgbaImage, dpr: f32) -> Self {
        Self { rgba, dpr }
    }

    /// Decode an encoded (PNG, or any format `image` recognises) payload
    pub fn decode(payload: &[u8], dpr: f32) -> Result<Self, CaptureError> {
        if payload.is_empty() {
            return Err(CaptureError::Capture("empty image payload".to_string()));
        }
        let rgba = image::load_from_memory(payload)?.into_rgba8();
        log::debug!(
            "Bitmap decoded: {}x{} pixels at dpr {}",
            rgba.width(),
            rgba.height(),
            dpr
        );
        Ok(Self { rgba, dpr })
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Viewport size in CSS pixels
    pub fn css_size(&self) -> (f32, f32) {
        (
            self.width() as f32 / self.dpr,
            self.height() as f32 / self.dpr,
        )
    }

    pub fn to_png(&self) -> Result<Vec<u8>, png::EncodingError> {
        let mut buffer = Vec::new();
        write_png(&mut buffer, &self.rgba)?;
        Ok(buffer)
    }
}

/// Losslessly encode an RGBA image as PNG
pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_encode_decode_is_lossless() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(0, 0, image::Rgba([1, 2, 3, 4]));
        img.put_pixel(2, 1, image::Rgba([250, 128, 0, 255]));
        let bitmap = Bitmap::new(img, 2.0);

        let png = bitmap.to_png().unwrap();
        let decoded = Bitmap::decode(&png, 2.0).unwrap();
        assert_eq!(decoded, bitmap);
        assert_eq!(decoded.css_size(), (1.5, 1.0));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            Bitmap::decode(b"not an image", 1.0),
            Err(CaptureError::Decode(_))
        ));
        assert!(matches!(
            Bitmap::decode(&[], 1.0),
            Err(CaptureError::Capture(_))
        ));
    }
}
