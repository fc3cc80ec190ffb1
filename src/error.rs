//! Error types for wandseg_rust.

use thiserror::Error;

use crate::selection::group::GroupId;

/// Errors raised at the boundary of the segmentation core.
///
/// The engine itself never fails for data-dependent reasons; these errors come
/// from constructing inputs, parsing settings and mutating a session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SegmentError {
    /// Pixel data length does not match the stated RGBA dimensions.
    /// `expected` saturates at `usize::MAX` when the size overflows.
    #[error("invalid dimensions: {width}x{height} RGBA needs {expected} bytes, got {len}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        expected: usize,
        len: usize,
    },

    /// Array is not 4-channel RGBA
    #[error("unsupported channel count: expected 4 (RGBA), got {0}")]
    UnsupportedChannels(usize),

    /// Coordinate outside `[0, width) x [0, height)`
    #[error("coordinate ({x}, {y}) outside {width}x{height} image")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    #[error("unknown color space: {0:?}")]
    UnknownColorSpace(String),

    #[error("unsupported connectivity: {0} (expected 4 or 8)")]
    UnsupportedConnectivity(u8),

    /// A point was added while no group is active
    #[error("no active group")]
    NoActiveGroup,

    #[error("unknown group: {0}")]
    UnknownGroup(GroupId),
}

/// Result type for segmentation operations
pub type SegmentResult<T> = Result<T, SegmentError>;
