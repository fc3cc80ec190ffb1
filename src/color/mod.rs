//! Color space conversion and similarity.
//!
//! - **Conversion**: RGB to HSV and CIE-LAB (`convert.rs`)
//! - **Distance**: Euclidean RGB/LAB, circular-hue HSV (`distance.rs`)
//!
//! These are exported on their own so callers can show RGB/HSV/LAB readouts
//! without running a segmentation.

pub mod convert;
pub mod distance;

pub use convert::{convert_color, rgb_to_hsv, rgb_to_lab, ColorProbe, ColorSpace};
pub use distance::{distance, hue_distance, rgb_distance, ReferenceColor};
