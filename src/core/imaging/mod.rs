//! # Imaging Module
//!
//! Loading, decoding and resizing of pixel buffers.
//!
//! ## Loading Flow
//! 1. **Read** - bytes come from memory or disk (mmap for large files)
//! 2. **Orientation** - the EXIF orientation tag is read from the same bytes
//! 3. **Decode** - zune-jpeg for JPEG, image crate for the rest
//!
//! The result is a [`StaticImage`]: pixels plus the orientation they were
//! captured with.

mod decode;
mod resize;
mod source;

pub use decode::{FastDecoder, ImageFormat};
pub use resize::{fit_dimensions, FastResizer};
pub use source::{read_file_bytes, read_source, ImageSource, SourceBytes};

use crate::core::orientation::{read_orientation, Orientation};
use crate::error::ImageError;
use image::DynamicImage;
use tracing::debug;

/// A decoded still image and its intrinsic orientation tag
#[derive(Debug, Clone)]
pub struct StaticImage {
    pub image: DynamicImage,
    pub orientation: Orientation,
}

impl StaticImage {
    /// Wrap already-decoded pixels that need no orientation correction
    pub fn upright(image: DynamicImage) -> Self {
        Self {
            image,
            orientation: Orientation::Normal,
        }
    }
}

/// Read and decode a static image, capturing its orientation tag once.
///
/// Input errors (missing, unreadable, undecodable) are reported here and
/// never converted into "no detection".
pub fn load_static_image(source: &ImageSource) -> Result<StaticImage, ImageError> {
    let bytes = read_source(source)?;
    let orientation = read_orientation(&bytes);
    let image = FastDecoder::decode(&bytes)?;

    debug!(
        source = %source.describe(),
        width = image.width(),
        height = image.height(),
        ?orientation,
        "loaded static image"
    );

    Ok(StaticImage { image, orientation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat as Encoding};
    use std::io::Cursor;

    #[test]
    fn loads_png_bytes_with_normal_orientation() {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(GrayImage::new(5, 3))
            .write_to(&mut Cursor::new(&mut bytes), Encoding::Png)
            .unwrap();

        let loaded = load_static_image(&ImageSource::Bytes(bytes)).unwrap();
        assert_eq!(loaded.orientation, Orientation::Normal);
        assert_eq!((loaded.image.width(), loaded.image.height()), (5, 3));
    }

    #[test]
    fn undecodable_bytes_are_an_error() {
        let result = load_static_image(&ImageSource::Bytes(b"garbage".to_vec()));
        assert!(matches!(result, Err(ImageError::Decode { .. })));
    }
}
