//! Utility functions for image decoding.

use crate::core::ClassifyError;
use image::RgbImage;

/// Decodes an in-memory byte buffer into an RGB image.
///
/// Any container format the general-purpose decoder understands is accepted.
/// The result is forced to 3-channel RGB: alpha is discarded, grayscale is
/// expanded.
///
/// # Errors
///
/// Returns `ClassifyError::ImageDecode` if the bytes are not a decodable
/// image (empty buffer, truncated file, unsupported format).
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, ClassifyError> {
    let img = image::load_from_memory(bytes).map_err(ClassifyError::ImageDecode)?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(img: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_valid_png() {
        let bytes = png_bytes(DynamicImage::new_rgb8(8, 6));
        let img = decode_image(&bytes).unwrap();
        assert_eq!(img.dimensions(), (8, 6));
    }

    #[test]
    fn test_decode_forces_rgb_from_rgba() {
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]));
        let bytes = png_bytes(DynamicImage::ImageRgba8(rgba));

        let img = decode_image(&bytes).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_decode_expands_grayscale() {
        let bytes = png_bytes(DynamicImage::new_luma8(4, 4));
        let img = decode_image(&bytes).unwrap();
        assert_eq!(img.dimensions(), (4, 4));
    }

    #[test]
    fn test_decode_empty_buffer_fails() {
        assert!(matches!(
            decode_image(&[]),
            Err(ClassifyError::ImageDecode(_))
        ));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(ClassifyError::ImageDecode(_))
        ));
    }

    #[test]
    fn test_decode_truncated_png_fails() {
        let mut bytes = png_bytes(DynamicImage::new_rgb8(32, 32));
        bytes.truncate(bytes.len() / 2);
        assert!(decode_image(&bytes).is_err());
    }
}
