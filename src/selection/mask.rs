//! Selection mask: a paintable RGBA overlay plus per-pixel group ownership.
//!
//! Every visible group is drawn into the overlay, but only cells last written
//! by an `Add` group count as selected. Cells drawn by `Avoid` groups are
//! colored and owned, never members.

use ndarray::{Array2, Array3, ArrayView3};

use crate::image::MaskSize;

use super::group::{GroupId, GroupKind};

/// Derived selection buffer on the output grid.
///
/// Always allocated fresh for a given [`MaskSize`]; never resized or patched
/// across image changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionMask {
    size: MaskSize,
    /// (height, width, 4) overlay; alpha 0 = unpainted
    overlay: Array3<u8>,
    /// Group that last wrote each cell, with its kind
    owners: Array2<Option<(GroupId, GroupKind)>>,
}

impl SelectionMask {
    /// An all-clear mask.
    pub fn empty(size: MaskSize) -> Self {
        Self {
            size,
            overlay: Array3::zeros((size.height, size.width, 4)),
            owners: Array2::from_elem((size.height, size.width), None),
        }
    }

    pub fn size(&self) -> MaskSize {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.width
    }

    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Paint a cell. Later writes replace earlier ones.
    #[inline]
    pub(crate) fn paint(&mut self, x: usize, y: usize, color: [u8; 4], owner: GroupId, kind: GroupKind) {
        for (c, &value) in color.iter().enumerate() {
            self.overlay[[y, x, c]] = value;
        }
        self.owners[[y, x]] = Some((owner, kind));
    }

    #[inline]
    fn cell(&self, x: usize, y: usize) -> Option<(GroupId, GroupKind)> {
        if x < self.size.width && y < self.size.height {
            self.owners[[y, x]]
        } else {
            None
        }
    }

    /// Boolean membership: the cell was last painted by an `Add` group.
    /// Out-of-range coordinates are unselected.
    pub fn is_selected(&self, x: usize, y: usize) -> bool {
        matches!(self.cell(x, y), Some((_, GroupKind::Add)))
    }

    /// Group that painted a cell (last writer wins), of either kind.
    pub fn owner(&self, x: usize, y: usize) -> Option<GroupId> {
        self.cell(x, y).map(|(id, _)| id)
    }

    /// Kind of the group that painted a cell.
    pub fn kind_at(&self, x: usize, y: usize) -> Option<GroupKind> {
        self.cell(x, y).map(|(_, kind)| kind)
    }

    /// Overlay color of a cell, transparent black when unpainted.
    pub fn color(&self, x: usize, y: usize) -> [u8; 4] {
        if self.cell(x, y).is_none() {
            return [0; 4];
        }
        [
            self.overlay[[y, x, 0]],
            self.overlay[[y, x, 1]],
            self.overlay[[y, x, 2]],
            self.overlay[[y, x, 3]],
        ]
    }

    pub fn selected_count(&self) -> usize {
        self.owners
            .iter()
            .filter(|o| matches!(o, Some((_, GroupKind::Add))))
            .count()
    }

    /// Cells painted by `id`.
    pub fn count_for(&self, id: GroupId) -> usize {
        self.owners
            .iter()
            .filter(|o| o.is_some_and(|(owner, _)| owner == id))
            .count()
    }

    /// Bounds of the selected cells as (x, y, width, height).
    pub fn bounds(&self) -> Option<(usize, usize, usize, usize)> {
        let mut min_x = self.size.width;
        let mut min_y = self.size.height;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut any = false;

        for ((y, x), owner) in self.owners.indexed_iter() {
            if matches!(owner, Some((_, GroupKind::Add))) {
                any = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }

        any.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    /// Membership as 255 = selected, 0 = not selected, row-major.
    pub fn to_alpha_mask(&self) -> Vec<u8> {
        self.owners
            .iter()
            .map(|o| if matches!(o, Some((_, GroupKind::Add))) { 255 } else { 0 })
            .collect()
    }

    /// Overlay as a `(height, width, 4)` view.
    pub fn overlay(&self) -> ArrayView3<'_, u8> {
        self.overlay.view()
    }

    /// Flat RGBA overlay bytes, row-major.
    pub fn into_rgba(self) -> Vec<u8> {
        self.overlay.into_raw_vec_and_offset().0
    }
}
