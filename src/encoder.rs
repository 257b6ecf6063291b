//! The encoder: payload text in, PNG bytes out.
//!
//! Wraps the symbol encoder with the fixed rendering configuration of the
//! page (module size, quiet zone, black on white) and serializes the raster
//! to an in-memory PNG buffer. The whole path is a pure function of the
//! payload and configuration: no timestamps, no randomness, no I/O.

use std::io::Cursor;

use image::{GrayImage, ImageBuffer, ImageFormat, Luma};

use crate::error::EncodeError;
use crate::symbol::{Ecc, Symbol, Version};

/// Rendering and fitting parameters for [`encode_with`].
///
/// The defaults are the page's fixed configuration; they are not exposed to
/// end users.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Smallest symbol version to try. Fit mode upgrades from here until the
    /// payload fits, up to [`Version::MAX`].
    pub min_version: Version,
    /// Error correction level. Never boosted: the configured level is part
    /// of the deterministic output contract.
    pub error_correction: Ecc,
    /// Square pixels per module.
    pub box_size: u32,
    /// Quiet-zone width in modules on each side.
    pub border: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            min_version: Version::new(1),
            error_correction: Ecc::Low,
            box_size: 10,
            border: 4,
        }
    }
}

/// Encodes a payload into PNG bytes using the fixed page configuration.
///
/// An empty payload is accepted at this level and yields a minimal valid
/// version-1 symbol; the page layer guards against submitting one.
///
/// # Errors
///
/// Fails with a capacity-class error when the payload exceeds the maximum
/// encodable length for every supported symbol version at the configured
/// error correction level.
///
/// # Example
///
/// ```rust
/// let png = qrpage::encoder::encode("https://example.com").unwrap();
/// assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
/// ```
pub fn encode(payload: &str) -> Result<Vec<u8>, EncodeError> {
    encode_with(payload, &EncoderConfig::default())
}

/// Encodes a payload into PNG bytes with an explicit configuration.
pub fn encode_with(payload: &str, config: &EncoderConfig) -> Result<Vec<u8>, EncodeError> {
    let symbol = Symbol::encode_text(
        payload,
        config.error_correction,
        config.min_version,
        Version::MAX,
        None,
        false,
    )?;
    let img = rasterize(&symbol, config.box_size, config.border);
    png_bytes(&img)
}

/// Renders a symbol into a black-on-white grayscale image.
///
/// Each module becomes a `box_size`-pixel square; the image is surrounded by
/// a quiet zone of `border` background modules on every side.
pub fn rasterize(symbol: &Symbol, box_size: u32, border: u32) -> GrayImage {
    assert!(box_size > 0, "Box size must be positive");
    let dimension = (symbol.size() as u32 + 2 * border) * box_size;
    let mut img = ImageBuffer::new(dimension, dimension);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let qr_x = (x / box_size) as i32 - border as i32;
        let qr_y = (y / box_size) as i32 - border as i32;
        *pixel = if symbol.module(qr_x, qr_y) {
            Luma([0u8]) // Black
        } else {
            Luma([255u8]) // White
        };
    }

    img
}

fn png_bytes(img: &GrayImage) -> Result<Vec<u8>, EncodeError> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn encode_produces_valid_png() {
        let png = encode("https://example.com").unwrap();
        assert!(png.starts_with(&PNG_SIGNATURE));
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), img.height());
    }

    fn decode_png(png: &[u8]) -> String {
        let img = image::load_from_memory(png).unwrap().to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare(img);
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1);
        let (_meta, content) = grids[0].decode().unwrap();
        content
    }

    #[test]
    fn decoding_recovers_the_payload() {
        let payload = "https://example.com";
        let png = encode(payload).unwrap();
        assert_eq!(decode_png(&png), payload);
    }

    #[test]
    fn decoding_recovers_unicode_payloads() {
        let payload = "https://example.com/søk?q=héllo";
        let png = encode(payload).unwrap();
        assert_eq!(decode_png(&png), payload);
    }

    #[test]
    fn decoding_recovers_numeric_and_alphanumeric_modes() {
        for payload in ["31415926535897932384", "HTTPS://EXAMPLE.COM/ABC:123"] {
            let png = encode(payload).unwrap();
            assert_eq!(decode_png(&png), payload);
        }
    }

    #[test]
    fn encode_is_byte_identical_across_calls() {
        let a = encode("https://example.com").unwrap();
        let b = encode("https://example.com").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn dimensions_follow_box_size_and_border() {
        // "Hello, world!" is 13 bytes, which fits a version 1 (21x21) symbol
        // at Low; with the default border of 4 and box size 10 that is
        // (21 + 8) * 10 = 290 pixels per side.
        let png = encode("Hello, world!").unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), 290);

        let config = EncoderConfig {
            box_size: 1,
            ..EncoderConfig::default()
        };
        let png = encode_with("Hello, world!", &config).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), 29);
    }

    #[test]
    fn quiet_zone_is_white() {
        let config = EncoderConfig {
            box_size: 1,
            ..EncoderConfig::default()
        };
        let png = encode_with("QUIET", &config).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();
        // The whole 4-module border must be background colored
        for i in 0..img.width() {
            assert_eq!(img.get_pixel(i, 0), &Luma([255u8]));
            assert_eq!(img.get_pixel(0, i), &Luma([255u8]));
            assert_eq!(img.get_pixel(i, 3), &Luma([255u8]));
        }
        // Top-left finder pattern corner sits right after the border
        assert_eq!(img.get_pixel(4, 4), &Luma([0u8]));
    }

    #[test]
    fn empty_payload_yields_minimal_symbol() {
        let png = encode("").unwrap();
        let img = image::load_from_memory(&png).unwrap();
        // Version 1: (21 + 8) * 10
        assert_eq!(img.width(), 290);
    }

    #[test]
    fn oversized_payload_fails_with_capacity_error() {
        let payload = "a".repeat(3000);
        let err = encode(&payload).unwrap_err();
        assert!(err.is_capacity());
    }

    #[test]
    fn raster_mirrors_module_grid() {
        let symbol = Symbol::encode_text(
            "MIRROR",
            Ecc::Low,
            Version::new(1),
            Version::MAX,
            None,
            false,
        )
        .unwrap();
        let img = rasterize(&symbol, 2, 1);
        assert_eq!(img.width(), (symbol.size() as u32 + 2) * 2);
        for y in 0..symbol.size() {
            for x in 0..symbol.size() {
                let expected = if symbol.module(x, y) { 0u8 } else { 255u8 };
                let px = (x as u32 + 1) * 2;
                let py = (y as u32 + 1) * 2;
                assert_eq!(img.get_pixel(px, py), &Luma([expected]));
            }
        }
    }
}
