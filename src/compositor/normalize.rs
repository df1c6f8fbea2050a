//! Decoding source images into an opaque RGB canvas.

use std::io::Cursor;

use image::{DynamicImage, ImageReader, Rgb, RgbImage, Rgba};
use tracing::debug;

use crate::error::MemeError;

/// Decodes image bytes and flattens any transparency onto white.
pub fn normalize(image_bytes: &[u8]) -> Result<RgbImage, MemeError> {
    let reader = ImageReader::new(Cursor::new(image_bytes))
        .with_guessed_format()
        .map_err(|err| {
            debug!("Failed to guess image format: {}", err);
            MemeError::DecodeError(err.to_string())
        })?;
    let format = reader.format();
    let image = reader.decode().map_err(|err| {
        debug!("Failed to decode image: {}", err);
        MemeError::DecodeError(err.to_string())
    })?;
    debug!(
        "Decoded {:?} image, {}x{} {:?}",
        format,
        image.width(),
        image.height(),
        image.color()
    );
    Ok(flatten(image))
}

/// Converts to RGB, compositing onto white when there is an alpha channel.
pub fn flatten(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }
    let rgba = image.into_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        Rgb([onto_white(r, a), onto_white(g, a), onto_white(b, a)])
    })
}

fn onto_white(channel: u8, alpha: u8) -> u8 {
    let alpha = u32::from(alpha);
    ((u32::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, ImageFormat, LumaA, RgbaImage};

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), format)
            .expect("encode test image");
        bytes
    }

    #[test]
    fn transparent_pixels_become_white() {
        let mut source = RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 255]));
        source.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        source.put_pixel(1, 0, Rgba([0, 0, 0, 128]));
        let bytes = encode(DynamicImage::ImageRgba8(source), ImageFormat::Png);

        let canvas = normalize(&bytes).expect("normalize");
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*canvas.get_pixel(1, 0), Rgb([127, 127, 127]));
        assert_eq!(*canvas.get_pixel(3, 3), Rgb([200, 10, 10]));
    }

    #[test]
    fn luma_alpha_is_flattened_too() {
        let mut source = GrayAlphaImage::from_pixel(2, 2, LumaA([40, 255]));
        source.put_pixel(1, 1, LumaA([40, 0]));
        let canvas = flatten(DynamicImage::ImageLumaA8(source));
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([40, 40, 40]));
        assert_eq!(*canvas.get_pixel(1, 1), Rgb([255, 255, 255]));
    }

    #[test]
    fn grayscale_converts_losslessly() {
        let source = GrayImage::from_fn(3, 1, |x, _| image::Luma([x as u8 * 100]));
        let bytes = encode(DynamicImage::ImageLuma8(source), ImageFormat::Png);
        let canvas = normalize(&bytes).expect("normalize");
        assert_eq!(canvas.dimensions(), (3, 1));
        assert_eq!(*canvas.get_pixel(2, 0), Rgb([200, 200, 200]));
    }

    #[test]
    fn jpeg_sources_keep_their_dimensions() {
        let source = RgbImage::from_pixel(64, 48, Rgb([120, 130, 140]));
        let bytes = encode(DynamicImage::ImageRgb8(source), ImageFormat::Jpeg);
        let canvas = normalize(&bytes).expect("normalize");
        assert_eq!(canvas.dimensions(), (64, 48));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            normalize(b"<html>not an image</html>"),
            Err(MemeError::DecodeError(_))
        ));
        assert!(matches!(normalize(&[]), Err(MemeError::DecodeError(_))));
    }
}
