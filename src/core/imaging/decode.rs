//! Image decoding with format-specific fast paths.
//!
//! Uses zune-jpeg for JPEG data (1.5-2x faster than the image crate),
//! falls back to the image crate for everything else.

use crate::error::ImageError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use tracing::debug;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Encoded container formats recognized from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Other,
}

impl ImageFormat {
    /// Detect the container from its leading bytes
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            ImageFormat::Jpeg
        } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            ImageFormat::Png
        } else if bytes.starts_with(b"GIF8") {
            ImageFormat::Gif
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            ImageFormat::WebP
        } else {
            ImageFormat::Other
        }
    }
}

/// Decoder that picks the fastest available path per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode encoded image bytes into pixels.
    ///
    /// - JPEG: zune-jpeg, with image crate fallback
    /// - Other formats: image crate
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
        let image = match ImageFormat::sniff(bytes) {
            ImageFormat::Jpeg => Self::decode_jpeg(bytes).or_else(|error| {
                debug!(%error, "zune-jpeg failed, falling back to image crate");
                Self::decode_fallback(bytes)
            })?,
            _ => Self::decode_fallback(bytes)?,
        };

        if image.width() == 0 || image.height() == 0 {
            return Err(ImageError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }

        Ok(image)
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder.decode().map_err(|e| ImageError::Decode {
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| ImageError::Decode {
            reason: "Failed to get JPEG info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;
        let buffer_error = |kind: &str| ImageError::Decode {
            reason: format!("Failed to create {} buffer", kind),
        };

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGB"))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, pixels)
                    .ok_or_else(|| buffer_error("RGBA"))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, pixels)
                    .ok_or_else(|| buffer_error("Luma"))?;
                DynamicImage::ImageLuma8(buffer)
            }
            other => {
                return Err(ImageError::Decode {
                    reason: format!("unsupported JPEG colorspace {:?}", other),
                })
            }
        };

        Ok(image)
    }

    /// Fallback to the image crate
    fn decode_fallback(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
        image::load_from_memory(bytes).map_err(|e| ImageError::Decode {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat as Encoding};
    use std::io::Cursor;

    fn encode(image: &DynamicImage, format: Encoding) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn sniff_recognizes_magic_bytes() {
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), ImageFormat::Jpeg);
        assert_eq!(
            ImageFormat::sniff(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            ImageFormat::Png
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a"), ImageFormat::Gif);
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), ImageFormat::WebP);
        assert_eq!(ImageFormat::sniff(b"hello"), ImageFormat::Other);
    }

    #[test]
    fn decodes_png() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(12, 7));
        let decoded = FastDecoder::decode(&encode(&image, Encoding::Png)).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 7));
    }

    #[test]
    fn decodes_jpeg() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(16, 9));
        let decoded = FastDecoder::decode(&encode(&image, Encoding::Jpeg)).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 9));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let result = FastDecoder::decode(b"this is not a valid image file");
        assert!(matches!(result, Err(ImageError::Decode { .. })));
    }
}
