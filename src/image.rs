//! Read-only RGBA pixel buffers and output grid sizes.
//!
//! ## Image Format
//! A [`PixelBuffer`] views an RGBA u8 image with shape `(height, width, 4)`,
//! row-major with the origin at the top-left. It is a borrow of caller-owned
//! data and is never mutated by the segmentation core.

use ndarray::{ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{SegmentError, SegmentResult};

/// Number of channels in every buffer the core accepts.
pub const CHANNELS: usize = 4;

/// Immutable view over a native-resolution RGBA image.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    data: ArrayView3<'a, u8>,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap an existing `(height, width, 4)` array view.
    pub fn new(data: ArrayView3<'a, u8>) -> SegmentResult<Self> {
        let channels = data.len_of(Axis(2));
        if channels != CHANNELS {
            return Err(SegmentError::UnsupportedChannels(channels));
        }
        Ok(Self { data })
    }

    /// Wrap a flat RGBA byte slice (length = width * height * 4).
    pub fn from_rgba(data: &'a [u8], width: usize, height: usize) -> SegmentResult<Self> {
        let expected = width.checked_mul(height).and_then(|n| n.checked_mul(CHANNELS));
        let invalid = || SegmentError::InvalidDimensions {
            width,
            height,
            expected: expected.unwrap_or(usize::MAX),
            len: data.len(),
        };
        if expected != Some(data.len()) {
            return Err(invalid());
        }
        let view = ArrayView3::from_shape((height, width, CHANNELS), data).map_err(|_| invalid())?;
        Ok(Self { data: view })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// True when the image has no pixels (zero width or height).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether a signed coordinate lies inside the image.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }

    /// RGB of an in-bounds pixel. Callers check bounds first.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        [
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
        ]
    }

    /// RGBA of an in-bounds pixel. Callers check bounds first.
    #[inline]
    pub fn rgba(&self, x: usize, y: usize) -> [u8; 4] {
        [
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
            self.data[[y, x, 3]],
        ]
    }

    /// Underlying `(height, width, 4)` view.
    pub fn view(&self) -> ArrayView3<'a, u8> {
        self.data
    }
}

/// Sample the RGB color at a native pixel coordinate.
///
/// Used by callers to capture avoidance colors at click time and for color
/// readouts.
pub fn sample_color(image: &PixelBuffer, x: i32, y: i32) -> SegmentResult<[u8; 3]> {
    if !image.contains(x, y) {
        return Err(SegmentError::OutOfBounds {
            x,
            y,
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(image.rgb(x as usize, y as usize))
}

/// Dimensions of the grid a mask is painted onto.
///
/// May differ from the native image size when the mask backs a display-scaled
/// canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MaskSize {
    pub width: usize,
    pub height: usize,
}

impl MaskSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Same grid as the native image.
    pub fn of(image: &PixelBuffer) -> Self {
        Self::new(image.width(), image.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Map a native coordinate to this grid by nearest-neighbor flooring:
    /// `(floor(x * out_w / native_w), floor(y * out_h / native_h))`.
    ///
    /// `native` must be non-empty.
    #[inline]
    pub fn map_from(&self, native: MaskSize, x: usize, y: usize) -> (usize, usize) {
        (x * self.width / native.width, y * self.height / native.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_rejects_bad_length() {
        let data = vec![0u8; 10];
        let err = PixelBuffer::from_rgba(&data, 2, 2).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidDimensions { expected: 16, len: 10, .. }));
    }

    #[test]
    fn test_from_rgba_rejects_overflowing_dimensions() {
        let data = vec![0u8; 16];
        let err = PixelBuffer::from_rgba(&data, usize::MAX, 2).unwrap_err();
        assert!(matches!(
            err,
            SegmentError::InvalidDimensions { expected: usize::MAX, len: 16, .. }
        ));
        assert!(PixelBuffer::from_rgba(&data, usize::MAX / 4 + 1, 1).is_err());
    }

    #[test]
    fn test_sample_color() {
        let data = [
            1, 2, 3, 255, 4, 5, 6, 255, //
            7, 8, 9, 255, 10, 11, 12, 255,
        ];
        let image = PixelBuffer::from_rgba(&data, 2, 2).unwrap();

        assert_eq!(sample_color(&image, 1, 1).unwrap(), [10, 11, 12]);
        assert_eq!(sample_color(&image, 0, 1).unwrap(), [7, 8, 9]);
        assert!(matches!(
            sample_color(&image, -1, 0),
            Err(SegmentError::OutOfBounds { x: -1, y: 0, .. })
        ));
        assert!(sample_color(&image, 2, 0).is_err());
    }

    #[test]
    fn test_empty_image() {
        let image = PixelBuffer::from_rgba(&[], 0, 5).unwrap();
        assert!(image.is_empty());
        assert!(!image.contains(0, 0));
    }

    #[test]
    fn test_map_from_downsample() {
        let native = MaskSize::new(10, 10);
        let out = MaskSize::new(5, 2);

        assert_eq!(out.map_from(native, 0, 0), (0, 0));
        assert_eq!(out.map_from(native, 9, 9), (4, 1));
        assert_eq!(out.map_from(native, 3, 4), (1, 0));
    }
}
