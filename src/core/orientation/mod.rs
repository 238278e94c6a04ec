//! # Orientation Module
//!
//! Reads the EXIF orientation tag of a static image and turns the pixel
//! buffer upright before recognition.
//!
//! ## Tag Values
//! | Tag | Meaning           | Transform                         |
//! |-----|-------------------|-----------------------------------|
//! | 1   | Normal            | none                              |
//! | 2   | Flip horizontal   | mirror horizontally               |
//! | 3   | Rotate 180        | rotate 180                        |
//! | 4   | Flip vertical     | mirror vertically                 |
//! | 5   | Transpose         | rotate 90 cw, mirror horizontally |
//! | 6   | Rotate 90         | rotate 90 cw                      |
//! | 7   | Transverse        | rotate 90 ccw, mirror horizontally|
//! | 8   | Rotate 270        | rotate 90 ccw                     |
//!
//! Anything else is treated as normal.

use crate::error::TransformError;
use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::{debug, warn};

/// EXIF-style image orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Orientation {
    /// Map a raw EXIF tag value. Undefined or out-of-range values are `Normal`.
    pub fn from_exif(value: u16) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270,
            _ => Orientation::Normal,
        }
    }

    /// Raw EXIF tag value
    pub fn exif_value(self) -> u16 {
        match self {
            Orientation::Normal => 1,
            Orientation::FlipHorizontal => 2,
            Orientation::Rotate180 => 3,
            Orientation::FlipVertical => 4,
            Orientation::Transpose => 5,
            Orientation::Rotate90 => 6,
            Orientation::Transverse => 7,
            Orientation::Rotate270 => 8,
        }
    }

    pub fn is_identity(self) -> bool {
        self == Orientation::Normal
    }

    /// Clockwise rotation in degrees applied before any mirror
    pub fn rotation_degrees(self) -> u32 {
        match self {
            Orientation::Rotate90 | Orientation::Transpose => 90,
            Orientation::Rotate180 => 180,
            Orientation::Rotate270 | Orientation::Transverse => 270,
            Orientation::Normal | Orientation::FlipHorizontal | Orientation::FlipVertical => 0,
        }
    }
}

/// Read the orientation tag from encoded image bytes.
///
/// Missing or unreadable EXIF data yields `Normal`.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let exif = match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(_) => return Orientation::Normal,
    };

    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| match field.value {
            Value::Short(ref values) => values.first().copied(),
            _ => None,
        })
        .map(Orientation::from_exif)
        .unwrap_or_default()
}

/// Turn `image` upright according to `orientation`.
///
/// Identity orientations return the input untouched. If the transform
/// cannot be applied the original buffer is returned, since recognizing a
/// mis-rotated image beats aborting the scan.
pub fn normalize(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    match transform(&image, orientation) {
        Ok(Some(upright)) => {
            debug!(
                ?orientation,
                width = upright.width(),
                height = upright.height(),
                "applied orientation"
            );
            // The pre-transform buffer is released when `image` drops here
            upright
        }
        Ok(None) => image,
        Err(error) => {
            warn!(?orientation, %error, "orientation transform failed, using original");
            image
        }
    }
}

/// Rotate, then mirror. Returns None when no transform is needed.
fn transform(
    image: &DynamicImage,
    orientation: Orientation,
) -> Result<Option<DynamicImage>, TransformError> {
    if orientation.is_identity() {
        return Ok(None);
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(TransformError::EmptyBuffer);
    }

    let upright = match orientation {
        Orientation::Normal => return Ok(None),
        Orientation::FlipHorizontal => image.fliph(),
        Orientation::Rotate180 => image.rotate180(),
        Orientation::FlipVertical => image.flipv(),
        Orientation::Transpose => image.rotate90().fliph(),
        Orientation::Rotate90 => image.rotate90(),
        Orientation::Transverse => image.rotate270().fliph(),
        Orientation::Rotate270 => image.rotate270(),
    };

    Ok(Some(upright))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// 3x2 image with a distinct value in every pixel:
    /// ```text
    /// 0 1 2
    /// 3 4 5
    /// ```
    fn labelled() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(3, 2, |x, y| Luma([(y * 3 + x) as u8])))
    }

    fn pixels(image: &DynamicImage) -> (u32, u32, Vec<u8>) {
        let gray = image.to_luma8();
        (gray.width(), gray.height(), gray.into_raw())
    }

    #[test]
    fn normal_is_pixel_identical() {
        let original = labelled();
        let normalized = normalize(original.clone(), Orientation::Normal);
        assert_eq!(pixels(&normalized), pixels(&original));
    }

    #[test]
    fn undefined_values_are_normal() {
        assert_eq!(Orientation::from_exif(0), Orientation::Normal);
        assert_eq!(Orientation::from_exif(9), Orientation::Normal);
    }

    #[test]
    fn exif_values_round_trip() {
        for value in 1..=8 {
            assert_eq!(Orientation::from_exif(value).exif_value(), value);
        }
    }

    #[test]
    fn rotate90_turns_clockwise() {
        let (w, h, data) = pixels(&normalize(labelled(), Orientation::Rotate90));
        assert_eq!((w, h), (2, 3));
        assert_eq!(data, vec![3, 0, 4, 1, 5, 2]);
    }

    #[test]
    fn flip_horizontal_mirrors_rows() {
        let (_, _, data) = pixels(&normalize(labelled(), Orientation::FlipHorizontal));
        assert_eq!(data, vec![2, 1, 0, 5, 4, 3]);
    }

    #[test]
    fn flip_vertical_mirrors_columns() {
        let (_, _, data) = pixels(&normalize(labelled(), Orientation::FlipVertical));
        assert_eq!(data, vec![3, 4, 5, 0, 1, 2]);
    }

    #[test]
    fn transpose_swaps_axes() {
        let (w, h, data) = pixels(&normalize(labelled(), Orientation::Transpose));
        assert_eq!((w, h), (2, 3));
        assert_eq!(data, vec![0, 3, 1, 4, 2, 5]);
    }

    #[test]
    fn transverse_swaps_axes_through_opposite_corner() {
        let (w, h, data) = pixels(&normalize(labelled(), Orientation::Transverse));
        assert_eq!((w, h), (2, 3));
        assert_eq!(data, vec![5, 2, 4, 1, 3, 0]);
    }

    #[test]
    fn empty_buffer_fails_soft() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let result = normalize(empty, Orientation::Rotate90);
        assert_eq!((result.width(), result.height()), (0, 0));
    }

    /// Encode a JPEG and splice in an APP1 segment holding only the
    /// orientation tag
    fn jpeg_with_orientation(width: u32, height: u32, value: u16) -> Vec<u8> {
        use image::ImageFormat;

        let mut jpeg = Vec::new();
        DynamicImage::ImageLuma8(GrayImage::new(width, height))
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        // Big-endian TIFF header, one IFD entry: 0x0112 SHORT x1
        let mut tiff = vec![b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, 0x00, 0x01];
        tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
        tiff.extend_from_slice(&value.to_be_bytes());
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

        let mut segment = b"Exif\0\0".to_vec();
        segment.extend_from_slice(&tiff);
        let length = (segment.len() + 2) as u16;

        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&length.to_be_bytes());
        out.extend_from_slice(&segment);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn reads_orientation_from_jpeg_exif() {
        assert_eq!(
            read_orientation(&jpeg_with_orientation(8, 4, 6)),
            Orientation::Rotate90
        );
        assert_eq!(
            read_orientation(&jpeg_with_orientation(8, 4, 3)),
            Orientation::Rotate180
        );
        assert_eq!(
            read_orientation(&jpeg_with_orientation(8, 4, 1)),
            Orientation::Normal
        );
    }

    #[test]
    fn bytes_without_exif_are_normal() {
        assert_eq!(read_orientation(b"not an image"), Orientation::Normal);
        assert_eq!(read_orientation(&[]), Orientation::Normal);
    }
}
