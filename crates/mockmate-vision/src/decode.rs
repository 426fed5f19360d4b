//! Inbound frame decoding.
//!
//! Browsers send each captured frame as a data URL
//! (`data:image/jpeg;base64,<payload>`). The prefix is advisory; the image
//! container is sniffed from the decoded bytes.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::RgbImage;

use crate::error::{VisionError, VisionResult};

/// Decode a data-URL (or bare base64) frame payload into RGB pixels.
pub fn decode_frame(payload: &str) -> VisionResult<RgbImage> {
    let encoded = match payload.split_once(',') {
        Some((_, rest)) => rest,
        None => payload,
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| VisionError::image_decode(format!("invalid base64: {}", e)))?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| VisionError::image_decode(format!("unreadable image: {}", e)))?;

    Ok(img.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smallest valid JPEG-like payload: encode a tiny PNG instead, the
    /// container is sniffed so any supported format works.
    fn tiny_png_base64() -> String {
        let img = RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
        STANDARD.encode(&bytes)
    }

    #[test]
    fn test_decode_with_data_url_prefix() {
        let payload = format!("data:image/png;base64,{}", tiny_png_base64());
        let img = decode_frame(&payload).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_decode_bare_base64() {
        let img = decode_frame(&tiny_png_base64()).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
    }

    #[test]
    fn test_invalid_base64_is_a_decode_error() {
        let err = decode_frame("data:image/png;base64,!!!not-base64!!!").unwrap_err();
        assert!(matches!(err, VisionError::ImageDecode(_)));
    }

    #[test]
    fn test_garbage_bytes_are_a_decode_error() {
        let payload = STANDARD.encode(b"not an image at all");
        let err = decode_frame(&payload).unwrap_err();
        assert!(matches!(err, VisionError::ImageDecode(_)));
    }
}
