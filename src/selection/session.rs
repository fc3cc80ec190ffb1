//! Interactive selection state.
//!
//! A [`SelectionSession`] owns the segment groups, the active group, the tool
//! settings and the last pointer position. All group mutation goes through it.
//! Masks are recomputed in full on every request; a preview works on a copy of
//! the groups and never touches the stored ones.

use crate::color::ColorSpace;
use crate::error::{SegmentError, SegmentResult};
use crate::image::{sample_color, MaskSize, PixelBuffer};

use super::group::{AvoidancePoint, GroupId, GroupKind, SeedPoint, SegmentGroup};
use super::magic_wand::build_mask;
use super::mask::SelectionMask;
use super::settings::{Connectivity, WandSettings};

/// Overlay colors cycled through by new `Add` groups.
pub const ADD_PALETTE: [[u8; 3]; 4] = [[50, 150, 255], [80, 200, 120], [255, 200, 40], [180, 90, 255]];

/// Overlay color of `Avoid` groups.
pub const AVOID_COLOR: [u8; 3] = [255, 60, 60];

#[derive(Debug, Clone, Default)]
pub struct SelectionSession {
    groups: Vec<SegmentGroup>,
    active: Option<GroupId>,
    next_id: u32,
    add_groups_created: u32,
    avoid_groups_created: u32,
    settings: WandSettings,
    pointer: Option<(i32, i32)>,
}

impl SelectionSession {
    pub fn new(settings: WandSettings) -> Self {
        Self {
            settings: settings.sanitized(),
            ..Self::default()
        }
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub fn settings(&self) -> &WandSettings {
        &self.settings
    }

    /// Replace all settings; tolerances are clamped to the new bound.
    pub fn set_settings(&mut self, settings: WandSettings) {
        self.settings = settings.sanitized();
    }

    /// Set a default tolerance, clamped. Returns the stored value.
    pub fn set_tolerance(&mut self, space: ColorSpace, value: f32) -> f32 {
        self.settings.set_tolerance(space, value)
    }

    pub fn set_max_tolerance(&mut self, max: f32) {
        self.settings.set_max_tolerance(max);
    }

    pub fn set_color_space(&mut self, space: ColorSpace, enabled: bool) {
        self.settings.set_color_space(space, enabled);
    }

    pub fn set_contiguous(&mut self, contiguous: bool) {
        self.settings.contiguous = contiguous;
    }

    pub fn set_connectivity(&mut self, connectivity: Connectivity) {
        self.settings.connectivity = connectivity;
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    /// Record the pointer position in native pixel coordinates (`None` = left the image).
    pub fn set_pointer(&mut self, pointer: Option<(i32, i32)>) {
        self.pointer = pointer;
    }

    pub fn pointer(&self) -> Option<(i32, i32)> {
        self.pointer
    }

    // ========================================================================
    // Groups
    // ========================================================================

    pub fn groups(&self) -> &[SegmentGroup] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&SegmentGroup> {
        self.groups.iter().find(|group| group.id == id)
    }

    fn group_mut(&mut self, id: GroupId) -> SegmentResult<&mut SegmentGroup> {
        self.groups
            .iter_mut()
            .find(|group| group.id == id)
            .ok_or(SegmentError::UnknownGroup(id))
    }

    pub fn active_group_id(&self) -> Option<GroupId> {
        self.active
    }

    pub fn active_group(&self) -> Option<&SegmentGroup> {
        self.active.and_then(|id| self.group(id))
    }

    /// Create an empty group, make it active and return its id.
    pub fn add_group(&mut self, kind: GroupKind) -> GroupId {
        self.next_id += 1;
        let id = GroupId(self.next_id);

        let (name, color) = match kind {
            GroupKind::Add => {
                let color = ADD_PALETTE[self.add_groups_created as usize % ADD_PALETTE.len()];
                self.add_groups_created += 1;
                (format!("Segment {}", self.add_groups_created), color)
            }
            GroupKind::Avoid => {
                self.avoid_groups_created += 1;
                (format!("Avoid {}", self.avoid_groups_created), AVOID_COLOR)
            }
        };

        self.groups.push(SegmentGroup::new(id, name, kind, color));
        self.active = Some(id);
        log::debug!("started {kind} group {id}");
        id
    }

    /// Make an existing group active, or deactivate with `None`.
    pub fn set_active_group(&mut self, id: Option<GroupId>) -> SegmentResult<()> {
        if let Some(id) = id {
            self.group_mut(id)?;
        }
        self.active = id;
        Ok(())
    }

    pub fn set_group_visible(&mut self, id: GroupId, visible: bool) -> SegmentResult<()> {
        self.group_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn rename_group(&mut self, id: GroupId, name: impl Into<String>) -> SegmentResult<()> {
        self.group_mut(id)?.name = name.into();
        Ok(())
    }

    /// Delete a group. Deleting the active group leaves no group active.
    pub fn remove_group(&mut self, id: GroupId) -> SegmentResult<SegmentGroup> {
        let index = self
            .groups
            .iter()
            .position(|group| group.id == id)
            .ok_or(SegmentError::UnknownGroup(id))?;
        if self.active == Some(id) {
            self.active = None;
        }
        log::debug!("removed group {id}");
        Ok(self.groups.remove(index))
    }

    /// Drop every group and deactivate. Settings are kept.
    pub fn clear(&mut self) {
        if !self.groups.is_empty() {
            log::debug!("cleared {} groups", self.groups.len());
        }
        self.groups.clear();
        self.active = None;
        self.add_groups_created = 0;
        self.avoid_groups_created = 0;
    }

    /// The source image was replaced: all point state is invalid.
    pub fn image_changed(&mut self) {
        self.clear();
        self.pointer = None;
    }

    // ========================================================================
    // Points
    // ========================================================================

    /// Append a point to the active group using the current settings.
    pub fn add_point(&mut self, image: &PixelBuffer, x: i32, y: i32) -> SegmentResult<()> {
        let snapshot = self.settings.clone();
        self.add_point_to_active_group(image, x, y, &snapshot)
    }

    /// Append a point to the active group, taking tolerances and spaces from
    /// `snapshot`. Avoidance points capture the pixel color now.
    pub fn add_point_to_active_group(
        &mut self,
        image: &PixelBuffer,
        x: i32,
        y: i32,
        snapshot: &WandSettings,
    ) -> SegmentResult<()> {
        let id = self.active.ok_or(SegmentError::NoActiveGroup)?;
        let point = make_point(image, x, y, snapshot, self.group_mut(id)?.kind())?;
        let group = self.group_mut(id)?;
        match point {
            Point::Seed(seed) => group.push_seed(seed),
            Point::Avoid(avoid) => group.push_avoidance(avoid),
        };
        Ok(())
    }

    /// Click handling: a plain click starts a new group of `kind`, an extending
    /// (shift) click adds to the active group if it has the same kind.
    pub fn click(
        &mut self,
        image: &PixelBuffer,
        x: i32,
        y: i32,
        kind: GroupKind,
        extend: bool,
    ) -> SegmentResult<GroupId> {
        if !image.contains(x, y) {
            return Err(out_of_bounds(image, x, y));
        }
        let reuse = extend && self.active_group().is_some_and(|group| group.kind() == kind);
        let id = match (reuse, self.active) {
            (true, Some(id)) => id,
            _ => self.add_group(kind),
        };
        self.add_point(image, x, y)?;
        Ok(id)
    }

    // ========================================================================
    // Masks
    // ========================================================================

    /// Mask of all visible groups' stored points.
    pub fn compute_committed_mask(&self, image: &PixelBuffer, out: MaskSize) -> SelectionMask {
        build_mask(image, &self.groups, &self.settings, out)
    }

    /// Mask as if a point were added at `hover`.
    ///
    /// The point goes into a copy of the active group. With no active group, or
    /// a hidden one, it previews a new `Add` group holding just that point. A
    /// hover outside the image previews the committed state.
    pub fn compute_preview_mask(&self, image: &PixelBuffer, hover: (i32, i32), out: MaskSize) -> SelectionMask {
        let (x, y) = hover;
        let mut snapshot = self.groups.clone();

        let active = self.active_group().filter(|group| group.visible);
        let kind = active.map_or(GroupKind::Add, |group| group.kind());
        match make_point(image, x, y, &self.settings, kind) {
            Ok(point) => {
                let target = active.and_then(|active| snapshot.iter_mut().find(|group| group.id == active.id));
                match target {
                    Some(group) => point.push_into(group),
                    None => {
                        let mut group =
                            SegmentGroup::new(GroupId(self.next_id + 1), "Preview", GroupKind::Add, ADD_PALETTE[0]);
                        point.push_into(&mut group);
                        snapshot.push(group);
                    }
                }
            }
            Err(_) => log::trace!("preview at ({x}, {y}) outside image"),
        }

        build_mask(image, &snapshot, &self.settings, out)
    }

    /// Preview at the last recorded pointer position, if any.
    pub fn compute_pointer_preview(&self, image: &PixelBuffer, out: MaskSize) -> Option<SelectionMask> {
        self.pointer
            .map(|hover| self.compute_preview_mask(image, hover, out))
    }
}

enum Point {
    Seed(SeedPoint),
    Avoid(AvoidancePoint),
}

impl Point {
    fn push_into(self, group: &mut SegmentGroup) {
        match self {
            Point::Seed(seed) => group.push_seed(seed),
            Point::Avoid(avoid) => group.push_avoidance(avoid),
        };
    }
}

fn out_of_bounds(image: &PixelBuffer, x: i32, y: i32) -> SegmentError {
    SegmentError::OutOfBounds {
        x,
        y,
        width: image.width(),
        height: image.height(),
    }
}

/// Build a point of `kind` at `(x, y)` from a settings snapshot.
fn make_point(image: &PixelBuffer, x: i32, y: i32, snapshot: &WandSettings, kind: GroupKind) -> SegmentResult<Point> {
    let tolerances = snapshot.tolerances;
    let spaces = snapshot.color_spaces;
    match kind {
        GroupKind::Add => {
            if !image.contains(x, y) {
                return Err(out_of_bounds(image, x, y));
            }
            Ok(Point::Seed(SeedPoint::new(x, y, tolerances, spaces)))
        }
        GroupKind::Avoid => {
            let color = sample_color(image, x, y)?;
            Ok(Point::Avoid(AvoidancePoint::new(x, y, color, tolerances, spaces)))
        }
    }
}
