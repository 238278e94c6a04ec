//! Camera frames handed to the live analyzer.

use crate::core::recognizer::Rotation;
use crate::error::ImageError;
use image::{DynamicImage, GrayImage};

/// One captured frame: pixels plus the rotation that brings them upright.
///
/// The analyzer takes ownership and drops the frame on every exit path.
#[derive(Debug, Clone)]
pub struct Frame {
    image: DynamicImage,
    rotation: Rotation,
}

impl Frame {
    pub fn new(image: DynamicImage, rotation: Rotation) -> Self {
        Self { image, rotation }
    }

    /// Wrap a tightly packed 8-bit luminance plane (the Y plane of a YUV
    /// camera frame)
    pub fn from_luma8(
        width: u32,
        height: u32,
        plane: Vec<u8>,
        rotation: Rotation,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyImage { width, height });
        }
        let expected = width as usize * height as usize;
        let actual = plane.len();
        let gray = GrayImage::from_raw(width, height, plane).ok_or_else(|| ImageError::Decode {
            reason: format!(
                "luminance plane holds {} bytes, {}x{} needs {}",
                actual, width, height, expected
            ),
        })?;
        Ok(Self::new(DynamicImage::ImageLuma8(gray), rotation))
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Width and height after rotation is applied
    pub fn upright_dimensions(&self) -> (u32, u32) {
        let (width, height) = (self.image.width(), self.image.height());
        match self.rotation {
            Rotation::Deg90 | Rotation::Deg270 => (height, width),
            Rotation::Deg0 | Rotation::Deg180 => (width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turns_swap_upright_dimensions() {
        let frame = Frame::from_luma8(4, 2, vec![0; 8], Rotation::Deg90).unwrap();
        assert_eq!(frame.upright_dimensions(), (2, 4));

        let frame = Frame::from_luma8(4, 2, vec![0; 8], Rotation::Deg180).unwrap();
        assert_eq!(frame.upright_dimensions(), (4, 2));
    }

    #[test]
    fn short_plane_is_rejected() {
        let result = Frame::from_luma8(4, 4, vec![0; 3], Rotation::Deg0);
        assert!(matches!(result, Err(ImageError::Decode { .. })));
    }

    #[test]
    fn empty_frame_is_rejected() {
        let result = Frame::from_luma8(0, 4, Vec::new(), Rotation::Deg0);
        assert!(matches!(
            result,
            Err(ImageError::EmptyImage {
                width: 0,
                height: 4
            })
        ));
    }
}
