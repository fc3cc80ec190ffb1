//! Per-space color distance.
//!
//! RGB and LAB use plain Euclidean distance. HSV treats hue as circular and
//! rescales the hue difference from 0-180 degrees onto 0-100 so it sits on the
//! same scale as the saturation and value differences. The 180 -> 100 rescale
//! is not a standard formula; existing tolerance values depend on it.

use super::convert::{convert_color, ColorSpace};

/// Hue difference (degrees) mapped onto the 0-100 saturation/value scale.
const HUE_SCALE: f32 = 100.0 / 180.0;

#[inline]
fn euclidean(c1: [f32; 3], c2: [f32; 3]) -> f32 {
    let d0 = c1[0] - c2[0];
    let d1 = c1[1] - c2[1];
    let d2 = c1[2] - c2[2];
    (d0 * d0 + d1 * d1 + d2 * d2).sqrt()
}

/// Circular hue distance in degrees, always within 0-180.
#[inline]
pub fn hue_distance(h1: f32, h2: f32) -> f32 {
    let d = (h1 - h2).abs();
    d.min(360.0 - d)
}

/// Distance between two colors already expressed in `space`.
#[inline]
pub fn distance(c1: [f32; 3], c2: [f32; 3], space: ColorSpace) -> f32 {
    match space {
        ColorSpace::Rgb | ColorSpace::Lab => euclidean(c1, c2),
        ColorSpace::Hsv => {
            let dh = hue_distance(c1[0], c2[0]) * HUE_SCALE;
            let ds = c1[1] - c2[1];
            let dv = c1[2] - c2[2];
            (dh * dh + ds * ds + dv * dv).sqrt()
        }
    }
}

/// Convert two RGB colors into `space` and measure their distance.
pub fn rgb_distance(c1: [u8; 3], c2: [u8; 3], space: ColorSpace) -> f32 {
    distance(
        convert_color(c1[0], c1[1], c1[2], space),
        convert_color(c2[0], c2[1], c2[2], space),
        space,
    )
}

/// A color a pixel is compared against, in one space, with its own tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceColor {
    pub space: ColorSpace,
    pub color: [f32; 3],
    pub tolerance: f32,
}

impl ReferenceColor {
    pub fn from_rgb(rgb: [u8; 3], space: ColorSpace, tolerance: f32) -> Self {
        Self {
            space,
            color: convert_color(rgb[0], rgb[1], rgb[2], space),
            tolerance,
        }
    }

    /// Inclusive test used for growth: `distance <= tolerance`.
    #[inline]
    pub fn accepts(&self, color: [f32; 3]) -> bool {
        distance(color, self.color, self.space) <= self.tolerance
    }

    /// Strict test used for avoidance: `distance < tolerance`.
    ///
    /// A tolerance of 0 contains nothing, not even the reference color itself.
    #[inline]
    pub fn strictly_contains(&self, color: [f32; 3]) -> bool {
        distance(color, self.color, self.space) < self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_euclidean() {
        assert_eq!(rgb_distance([0, 0, 0], [3, 4, 0], ColorSpace::Rgb), 5.0);
        assert_eq!(rgb_distance([255, 0, 0], [250, 0, 0], ColorSpace::Rgb), 5.0);
        assert_eq!(rgb_distance([7, 7, 7], [7, 7, 7], ColorSpace::Rgb), 0.0);
    }

    #[test]
    fn test_hue_wraps_around() {
        assert_eq!(hue_distance(350.0, 10.0), 20.0);
        assert_eq!(hue_distance(10.0, 350.0), 20.0);
        assert_eq!(hue_distance(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_hsv_hue_scaling() {
        // Opposite hues, equal s and v: 180 degrees -> 100
        let d = distance([0.0, 50.0, 50.0], [180.0, 50.0, 50.0], ColorSpace::Hsv);
        assert!((d - 100.0).abs() < 1e-4);

        // 90 degrees of hue plus raw s/v differences
        let d = distance([90.0, 60.0, 40.0], [0.0, 50.0, 50.0], ColorSpace::Hsv);
        let expected = (50.0f32 * 50.0 + 10.0 * 10.0 + 10.0 * 10.0).sqrt();
        assert!((d - expected).abs() < 1e-4);
    }

    #[test]
    fn test_lab_distance_symmetric() {
        let a = rgb_distance([200, 30, 40], [20, 180, 90], ColorSpace::Lab);
        let b = rgb_distance([20, 180, 90], [200, 30, 40], ColorSpace::Lab);
        assert!((a - b).abs() < 1e-4);
        assert!(a > 0.0);
    }

    #[test]
    fn test_reference_boundaries() {
        let reference = ReferenceColor::from_rgb([255, 0, 0], ColorSpace::Rgb, 5.0);
        assert!(reference.accepts([250.0, 0.0, 0.0]));
        assert!(!reference.strictly_contains([250.0, 0.0, 0.0]));
        assert!(reference.strictly_contains([251.0, 0.0, 0.0]));
    }

    #[test]
    fn test_zero_tolerance_contains_nothing() {
        let reference = ReferenceColor::from_rgb([10, 20, 30], ColorSpace::Rgb, 0.0);
        assert!(reference.accepts([10.0, 20.0, 30.0]));
        assert!(!reference.strictly_contains([10.0, 20.0, 30.0]));
    }
}
