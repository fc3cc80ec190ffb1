//! Avoidance mask: pixels close to any avoidance color, image-wide.
//!
//! A pixel is avoided when, for some avoidance point and some color space
//! enabled on that point, its distance to the captured color is strictly below
//! the point's tolerance in that space. The mask is rebuilt from scratch
//! whenever the points or the image change.

use ndarray::Array2;
use rayon::prelude::*;

use crate::color::{ColorProbe, ReferenceColor};
use crate::image::PixelBuffer;

use super::group::AvoidancePoint;

/// Per-pixel "must not grow into" flags at native resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct AvoidanceMask {
    bits: Array2<bool>,
}

impl AvoidanceMask {
    /// A mask avoiding nothing.
    pub fn clear(width: usize, height: usize) -> Self {
        Self {
            bits: Array2::from_elem((height, width), false),
        }
    }

    pub fn width(&self) -> usize {
        self.bits.ncols()
    }

    pub fn height(&self) -> usize {
        self.bits.nrows()
    }

    /// Whether a native pixel is avoided. Out-of-range pixels are not.
    #[inline]
    pub fn is_avoided(&self, x: usize, y: usize) -> bool {
        self.bits.get((y, x)).copied().unwrap_or(false)
    }

    pub fn avoided_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Test one pixel against the flattened reference list.
#[inline]
fn avoided_by(rgb: [u8; 3], references: &[ReferenceColor]) -> bool {
    let mut probe = ColorProbe::new(rgb);
    references
        .iter()
        .any(|reference| reference.strictly_contains(probe.get(reference.space)))
}

/// Build the avoidance mask for `image`.
///
/// Cost is O(width * height * points * spaces). Rows are evaluated in parallel;
/// each worker writes only its own cells.
pub fn build_avoidance_mask(image: &PixelBuffer, points: &[AvoidancePoint]) -> AvoidanceMask {
    let (width, height) = (image.width(), image.height());
    let references: Vec<ReferenceColor> = points.iter().flat_map(|p| p.references()).collect();

    let mut mask = AvoidanceMask::clear(width, height);
    if references.is_empty() || image.is_empty() {
        return mask;
    }

    if let Some(cells) = mask.bits.as_slice_mut() {
        cells.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, bit) in row.iter_mut().enumerate() {
                *bit = avoided_by(image.rgb(x, y), &references);
            }
        });
    }

    log::debug!(
        "avoidance mask: {} of {} pixels avoided by {} points",
        mask.avoided_count(),
        width * height,
        points.len()
    );
    mask
}
