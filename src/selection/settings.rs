//! Wand configuration: per-space tolerances, active spaces, connectivity.
//!
//! Tolerances are clamped here, at the mutation boundary. The engine trusts the
//! values it receives.

use serde::{Deserialize, Serialize};

use crate::color::ColorSpace;
use crate::error::{SegmentError, SegmentResult};

/// Default upper bound for tolerances.
pub const DEFAULT_MAX_TOLERANCE: f32 = 255.0;

/// Default overlay alpha for selected pixels (about 50%).
pub const DEFAULT_OVERLAY_ALPHA: u8 = 128;

/// One tolerance per color space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceSet {
    pub rgb: f32,
    pub hsv: f32,
    pub lab: f32,
}

impl Default for ToleranceSet {
    fn default() -> Self {
        Self::uniform(32.0)
    }
}

impl ToleranceSet {
    /// Same tolerance in every space.
    pub fn uniform(value: f32) -> Self {
        Self {
            rgb: value,
            hsv: value,
            lab: value,
        }
    }

    pub fn get(&self, space: ColorSpace) -> f32 {
        match space {
            ColorSpace::Rgb => self.rgb,
            ColorSpace::Hsv => self.hsv,
            ColorSpace::Lab => self.lab,
        }
    }

    /// Raw setter; no clamping. Use [`WandSettings::set_tolerance`] for user input.
    pub fn set(&mut self, space: ColorSpace, value: f32) {
        match space {
            ColorSpace::Rgb => self.rgb = value,
            ColorSpace::Hsv => self.hsv = value,
            ColorSpace::Lab => self.lab = value,
        }
    }

    pub fn with(mut self, space: ColorSpace, value: f32) -> Self {
        self.set(space, value);
        self
    }
}

/// Which color spaces a point is evaluated in.
///
/// A pixel matches a point when it is within tolerance in *any* enabled space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceSet {
    pub rgb: bool,
    pub hsv: bool,
    pub lab: bool,
}

impl Default for SpaceSet {
    fn default() -> Self {
        Self::only(ColorSpace::Rgb)
    }
}

impl SpaceSet {
    pub fn none() -> Self {
        Self {
            rgb: false,
            hsv: false,
            lab: false,
        }
    }

    pub fn only(space: ColorSpace) -> Self {
        Self::none().with(space, true)
    }

    pub fn contains(&self, space: ColorSpace) -> bool {
        match space {
            ColorSpace::Rgb => self.rgb,
            ColorSpace::Hsv => self.hsv,
            ColorSpace::Lab => self.lab,
        }
    }

    pub fn set(&mut self, space: ColorSpace, enabled: bool) {
        match space {
            ColorSpace::Rgb => self.rgb = enabled,
            ColorSpace::Hsv => self.hsv = enabled,
            ColorSpace::Lab => self.lab = enabled,
        }
    }

    pub fn with(mut self, space: ColorSpace, enabled: bool) -> Self {
        self.set(space, enabled);
        self
    }

    /// Enabled spaces in RGB, HSV, LAB order.
    pub fn iter(&self) -> impl Iterator<Item = ColorSpace> + '_ {
        ColorSpace::ALL.into_iter().filter(move |&s| self.contains(s))
    }

    pub fn is_empty(&self) -> bool {
        !(self.rgb || self.hsv || self.lab)
    }
}

impl FromIterator<ColorSpace> for SpaceSet {
    fn from_iter<I: IntoIterator<Item = ColorSpace>>(iter: I) -> Self {
        let mut set = SpaceSet::none();
        for space in iter {
            set.set(space, true);
        }
        set
    }
}

/// Pixel adjacency used by contiguous growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// N, S, E, W
    #[default]
    Four,
    /// Four-way plus the diagonals
    Eight,
}

const FOUR_WAY: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const EIGHT_WAY: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

impl Connectivity {
    /// Neighbor offset table `(dx, dy)`.
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &FOUR_WAY,
            Connectivity::Eight => &EIGHT_WAY,
        }
    }
}

impl TryFrom<u8> for Connectivity {
    type Error = SegmentError;

    fn try_from(value: u8) -> SegmentResult<Self> {
        match value {
            4 => Ok(Connectivity::Four),
            8 => Ok(Connectivity::Eight),
            other => Err(SegmentError::UnsupportedConnectivity(other)),
        }
    }
}

/// Magic wand tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WandSettings {
    pub tolerances: ToleranceSet,
    pub color_spaces: SpaceSet,
    /// Flood fill from seeds when true, global threshold when false
    pub contiguous: bool,
    pub connectivity: Connectivity,
    /// Upper bound tolerances are clamped to
    pub max_tolerance: f32,
    /// Alpha written for selected pixels in the overlay
    pub overlay_alpha: u8,
}

impl Default for WandSettings {
    fn default() -> Self {
        Self {
            tolerances: ToleranceSet::default(),
            color_spaces: SpaceSet::default(),
            contiguous: true,
            connectivity: Connectivity::Four,
            max_tolerance: DEFAULT_MAX_TOLERANCE,
            overlay_alpha: DEFAULT_OVERLAY_ALPHA,
        }
    }
}

impl WandSettings {
    fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, self.max_tolerance.max(0.0))
    }

    /// Set a tolerance, clamped to `[0, max_tolerance]`. Returns the stored value.
    pub fn set_tolerance(&mut self, space: ColorSpace, value: f32) -> f32 {
        let value = self.clamp(value);
        self.tolerances.set(space, value);
        value
    }

    /// Change the tolerance bound and re-clamp existing tolerances.
    pub fn set_max_tolerance(&mut self, max: f32) {
        self.max_tolerance = if max.is_nan() { 0.0 } else { max.max(0.0) };
        for space in ColorSpace::ALL {
            let value = self.clamp(self.tolerances.get(space));
            self.tolerances.set(space, value);
        }
    }

    pub fn set_color_space(&mut self, space: ColorSpace, enabled: bool) {
        self.color_spaces.set(space, enabled);
    }

    /// Clamp every tolerance in place, for settings built from untrusted input.
    pub fn sanitized(mut self) -> Self {
        let max = self.max_tolerance;
        self.set_max_tolerance(max);
        self
    }
}
