//! RGB to HSV and CIE-LAB conversion.
//!
//! All functions are total: any `u8` triple maps to a finite result.
//!
//! | Space | Components | Range |
//! |-------|------------|-------|
//! | RGB | r, g, b | 0-255 |
//! | HSV | h, s, v | h in [0, 360), s and v in [0, 100] |
//! | LAB | L, a, b | L in [0, 100], a and b roughly -128..128 |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SegmentError;

/// A color space the wand can measure similarity in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Rgb,
    Hsv,
    Lab,
}

impl ColorSpace {
    pub const ALL: [ColorSpace; 3] = [ColorSpace::Rgb, ColorSpace::Hsv, ColorSpace::Lab];

    pub fn name(self) -> &'static str {
        match self {
            ColorSpace::Rgb => "rgb",
            ColorSpace::Hsv => "hsv",
            ColorSpace::Lab => "lab",
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorSpace {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(ColorSpace::Rgb),
            "hsv" => Ok(ColorSpace::Hsv),
            "lab" => Ok(ColorSpace::Lab),
            _ => Err(SegmentError::UnknownColorSpace(s.to_string())),
        }
    }
}

/// Convert RGB to HSV.
/// Input: r, g, b in 0-255
/// Output: [h, s, v] where h is 0.0-360.0 (exclusive), s and v are 0.0-100.0
#[inline]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [f32; 3] {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;

    let v = max * 100.0;
    if max <= 0.0 {
        return [0.0, 0.0, 0.0];
    }
    let s = d / max * 100.0;

    if d.abs() < 1e-6 {
        return [0.0, s, v];
    }

    let mut h = if max == r {
        let mut h = (g - b) / d;
        if g < b {
            h += 6.0;
        }
        h * 60.0
    } else if max == g {
        ((b - r) / d + 2.0) * 60.0
    } else {
        ((r - g) / d + 4.0) * 60.0
    };

    // (g - b) / d + 6 can round up to exactly 6
    if h >= 360.0 {
        h -= 360.0;
    }

    [h, s, v]
}

/// sRGB gamma expansion of a 0.0-1.0 channel.
#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > 0.008856 {
        t.powf(1.0 / 3.0)
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// Convert RGB to CIE-LAB via linear sRGB and XYZ (D65 reference white).
/// Input: r, g, b in 0-255
/// Output: [L, a, b]
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> [f32; 3] {
    let r = srgb_to_linear(r as f32 / 255.0);
    let g = srgb_to_linear(g as f32 / 255.0);
    let b = srgb_to_linear(b as f32 / 255.0);

    // RGB to XYZ (D65)
    let x = r * 0.4124564 + g * 0.3575761 + b * 0.1804375;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = r * 0.0193339 + g * 0.1191920 + b * 0.9503041;

    // Normalize for D65
    let fx = lab_f(x / 0.95047);
    let fy = lab_f(y);
    let fz = lab_f(z / 1.08883);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Convert an RGB triple into `space`. RGB is the identity.
#[inline]
pub fn convert_color(r: u8, g: u8, b: u8, space: ColorSpace) -> [f32; 3] {
    match space {
        ColorSpace::Rgb => [r as f32, g as f32, b as f32],
        ColorSpace::Hsv => rgb_to_hsv(r, g, b),
        ColorSpace::Lab => rgb_to_lab(r, g, b),
    }
}

/// Lazily converted views of one pixel.
///
/// LAB conversion costs several `powf` calls, so each space is computed at most
/// once per pixel no matter how many reference colors test against it.
#[derive(Debug, Clone)]
pub struct ColorProbe {
    rgb: [u8; 3],
    hsv: Option<[f32; 3]>,
    lab: Option<[f32; 3]>,
}

impl ColorProbe {
    pub fn new(rgb: [u8; 3]) -> Self {
        Self {
            rgb,
            hsv: None,
            lab: None,
        }
    }

    /// The pixel expressed in `space`.
    pub fn get(&mut self, space: ColorSpace) -> [f32; 3] {
        let [r, g, b] = self.rgb;
        match space {
            ColorSpace::Rgb => [r as f32, g as f32, b as f32],
            ColorSpace::Hsv => *self.hsv.get_or_insert_with(|| rgb_to_hsv(r, g, b)),
            ColorSpace::Lab => *self.lab.get_or_insert_with(|| rgb_to_lab(r, g, b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3], eps: f32) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < eps)
    }

    #[test]
    fn test_hsv_primaries() {
        assert!(close(rgb_to_hsv(255, 0, 0), [0.0, 100.0, 100.0], 1e-3));
        assert!(close(rgb_to_hsv(0, 255, 0), [120.0, 100.0, 100.0], 1e-3));
        assert!(close(rgb_to_hsv(0, 0, 255), [240.0, 100.0, 100.0], 1e-3));
        assert!(close(rgb_to_hsv(255, 0, 255), [300.0, 100.0, 100.0], 1e-3));
    }

    #[test]
    fn test_hsv_gray_has_zero_hue_and_saturation() {
        assert_eq!(rgb_to_hsv(0, 0, 0), [0.0, 0.0, 0.0]);
        let [h, s, v] = rgb_to_hsv(128, 128, 128);
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert!((v - 50.196).abs() < 0.01);
    }

    #[test]
    fn test_hsv_ranges_exhaustive_sample() {
        for r in (0..=255u16).step_by(15) {
            for g in (0..=255u16).step_by(15) {
                for b in (0..=255u16).step_by(5) {
                    let [h, s, v] = rgb_to_hsv(r as u8, g as u8, b as u8);
                    assert!((0.0..360.0).contains(&h), "h={h} for {r},{g},{b}");
                    assert!((0.0..=100.0).contains(&s));
                    assert!((0.0..=100.0).contains(&v));
                }
            }
        }
        // Hue just below the wrap point
        let [h, _, _] = rgb_to_hsv(255, 0, 1);
        assert!(h < 360.0 && h > 359.0);
    }

    #[test]
    fn test_lab_reference_points() {
        assert!(close(rgb_to_lab(0, 0, 0), [0.0, 0.0, 0.0], 0.01));
        assert!(close(rgb_to_lab(255, 255, 255), [100.0, 0.0, 0.0], 0.01));
        // sRGB red: L=53.24, a=80.09, b=67.20
        assert!(close(rgb_to_lab(255, 0, 0), [53.24, 80.09, 67.20], 0.1));
    }

    #[test]
    fn test_lab_lightness_range() {
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(17) {
                for b in (0..=255u16).step_by(17) {
                    let [l, a, bb] = rgb_to_lab(r as u8, g as u8, b as u8);
                    assert!(l > -0.01 && l < 100.01);
                    assert!(a.abs() < 130.0 && bb.abs() < 130.0);
                }
            }
        }
    }

    #[test]
    fn test_convert_color_dispatch() {
        assert_eq!(convert_color(1, 2, 3, ColorSpace::Rgb), [1.0, 2.0, 3.0]);
        assert_eq!(convert_color(0, 255, 0, ColorSpace::Hsv), rgb_to_hsv(0, 255, 0));
        assert_eq!(convert_color(9, 99, 199, ColorSpace::Lab), rgb_to_lab(9, 99, 199));
    }

    #[test]
    fn test_probe_matches_direct_conversion() {
        let mut probe = ColorProbe::new([10, 200, 30]);
        for space in ColorSpace::ALL {
            assert_eq!(probe.get(space), convert_color(10, 200, 30, space));
        }
    }

    #[test]
    fn test_parse_color_space() {
        assert_eq!("RGB".parse::<ColorSpace>().unwrap(), ColorSpace::Rgb);
        assert_eq!(" lab ".parse::<ColorSpace>().unwrap(), ColorSpace::Lab);
        assert!(matches!(
            "quaternion".parse::<ColorSpace>(),
            Err(SegmentError::UnknownColorSpace(_))
        ));
    }
}
