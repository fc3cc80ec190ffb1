//! Segment groups and the points they hold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::ReferenceColor;
use crate::image::PixelBuffer;

use super::settings::{SpaceSet, ToleranceSet};

/// Stable identifier of a group within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Grows a selection
    Add,
    /// Marks colors that `Add` groups must not grow into
    Avoid,
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GroupKind::Add => "add",
            GroupKind::Avoid => "avoid",
        })
    }
}

/// A growth origin. Its reference color is read from the image each time a
/// mask is computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedPoint {
    pub x: i32,
    pub y: i32,
    pub tolerances: ToleranceSet,
    pub spaces: SpaceSet,
}

impl SeedPoint {
    pub fn new(x: i32, y: i32, tolerances: ToleranceSet, spaces: SpaceSet) -> Self {
        Self {
            x,
            y,
            tolerances,
            spaces,
        }
    }

    /// Reference colors sampled from `image`, or `None` if the seed lies outside it.
    pub fn references(&self, image: &PixelBuffer) -> Option<Vec<ReferenceColor>> {
        if !image.contains(self.x, self.y) {
            return None;
        }
        let rgb = image.rgb(self.x as usize, self.y as usize);
        Some(references_for(rgb, &self.tolerances, &self.spaces))
    }
}

/// A color to stay away from, captured once when the point is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvoidancePoint {
    pub x: i32,
    pub y: i32,
    pub color: [u8; 3],
    pub tolerances: ToleranceSet,
    pub spaces: SpaceSet,
}

impl AvoidancePoint {
    pub fn new(x: i32, y: i32, color: [u8; 3], tolerances: ToleranceSet, spaces: SpaceSet) -> Self {
        Self {
            x,
            y,
            color,
            tolerances,
            spaces,
        }
    }

    /// Reference colors built from the captured color.
    pub fn references(&self) -> Vec<ReferenceColor> {
        references_for(self.color, &self.tolerances, &self.spaces)
    }
}

fn references_for(rgb: [u8; 3], tolerances: &ToleranceSet, spaces: &SpaceSet) -> Vec<ReferenceColor> {
    spaces
        .iter()
        .map(|space| ReferenceColor::from_rgb(rgb, space, tolerances.get(space)))
        .collect()
}

/// Points of a group. The variant fixes the group's kind, so a group can never
/// mix seeds and avoidance points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "points", rename_all = "lowercase")]
pub enum GroupPoints {
    Add(Vec<SeedPoint>),
    Avoid(Vec<AvoidancePoint>),
}

impl GroupPoints {
    pub fn empty(kind: GroupKind) -> Self {
        match kind {
            GroupKind::Add => GroupPoints::Add(Vec::new()),
            GroupKind::Avoid => GroupPoints::Avoid(Vec::new()),
        }
    }

    pub fn kind(&self) -> GroupKind {
        match self {
            GroupPoints::Add(_) => GroupKind::Add,
            GroupPoints::Avoid(_) => GroupKind::Avoid,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            GroupPoints::Add(points) => points.len(),
            GroupPoints::Avoid(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point coordinates in insertion order.
    pub fn coords(&self) -> Vec<(i32, i32)> {
        match self {
            GroupPoints::Add(points) => points.iter().map(|p| (p.x, p.y)).collect(),
            GroupPoints::Avoid(points) => points.iter().map(|p| (p.x, p.y)).collect(),
        }
    }
}

/// A named set of same-kind points drawn in one overlay color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentGroup {
    pub id: GroupId,
    pub name: String,
    pub display_color: [u8; 3],
    pub visible: bool,
    pub points: GroupPoints,
}

impl SegmentGroup {
    pub fn new(id: GroupId, name: impl Into<String>, kind: GroupKind, display_color: [u8; 3]) -> Self {
        Self {
            id,
            name: name.into(),
            display_color,
            visible: true,
            points: GroupPoints::empty(kind),
        }
    }

    pub fn kind(&self) -> GroupKind {
        self.points.kind()
    }

    /// Append a seed. Returns false (and stores nothing) on an avoid group.
    pub fn push_seed(&mut self, seed: SeedPoint) -> bool {
        match &mut self.points {
            GroupPoints::Add(points) => {
                points.push(seed);
                true
            }
            GroupPoints::Avoid(_) => false,
        }
    }

    /// Append an avoidance point. Returns false (and stores nothing) on an add group.
    pub fn push_avoidance(&mut self, point: AvoidancePoint) -> bool {
        match &mut self.points {
            GroupPoints::Avoid(points) => {
                points.push(point);
                true
            }
            GroupPoints::Add(_) => false,
        }
    }

    /// Builder form of [`push_seed`](Self::push_seed), for assembling groups by hand.
    pub fn with_seed(mut self, seed: SeedPoint) -> Self {
        self.push_seed(seed);
        self
    }

    /// Builder form of [`push_avoidance`](Self::push_avoidance).
    pub fn with_avoidance(mut self, point: AvoidancePoint) -> Self {
        self.push_avoidance(point);
        self
    }
}
