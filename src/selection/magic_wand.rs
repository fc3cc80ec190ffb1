//! Magic wand region growing.
//!
//! Selects pixels similar to a group's reference colors, either by flood fill
//! from the group's points (contiguous) or by testing every pixel in the image
//! (non-contiguous). `Add` groups are blocked by the avoidance mask built from
//! all visible `Avoid` groups; `Avoid` groups are never blocked. An `Avoid`
//! group grows with the same strict test the avoidance mask uses, so the region
//! it draws is exactly the region it blocks.

use std::collections::VecDeque;

use ndarray::Array2;
use rayon::prelude::*;

use crate::color::{ColorProbe, ReferenceColor};
use crate::image::{MaskSize, PixelBuffer};

use super::avoidance::{build_avoidance_mask, AvoidanceMask};
use super::group::{AvoidancePoint, GroupId, GroupKind, GroupPoints, SegmentGroup};
use super::mask::SelectionMask;
use super::settings::{Connectivity, WandSettings};

/// Region growing result at native resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthResult {
    /// Selected native pixels, indexed [y, x]
    pub mask: Array2<bool>,
    /// Bounds of selected region as (x, y, width, height)
    pub bounds: Option<(usize, usize, usize, usize)>,
    /// Number of selected pixels
    pub pixel_count: usize,
}

/// Where and what one group grows from.
#[derive(Debug, Clone, Default)]
pub struct GrowthSeeds {
    /// In-bounds start pixels
    pub starts: Vec<(usize, usize)>,
    /// Reference colors from every in-bounds point
    pub references: Vec<ReferenceColor>,
    /// Match with `distance < tolerance` instead of `<=`; set for avoidance
    /// points so a drawn avoid region is exactly the region it blocks
    pub strict: bool,
}

impl GrowthSeeds {
    /// Collect starts and references for a group.
    ///
    /// Seeds are sampled from `image` now; avoidance points use their captured
    /// colors and match strictly. Points outside the image contribute nothing.
    pub fn for_group(image: &PixelBuffer, points: &GroupPoints) -> Self {
        let mut seeds = GrowthSeeds::default();
        match points {
            GroupPoints::Add(points) => {
                for point in points {
                    match point.references(image) {
                        Some(references) => {
                            seeds.starts.push((point.x as usize, point.y as usize));
                            seeds.references.extend(references);
                        }
                        None => log::trace!("skipping seed ({}, {}) outside image", point.x, point.y),
                    }
                }
            }
            GroupPoints::Avoid(points) => {
                seeds.strict = true;
                for point in points {
                    if image.contains(point.x, point.y) {
                        seeds.starts.push((point.x as usize, point.y as usize));
                        seeds.references.extend(point.references());
                    } else {
                        log::trace!("skipping avoid point ({}, {}) outside image", point.x, point.y);
                    }
                }
            }
        }
        seeds
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Whether a pixel may join the selection.
#[inline]
fn accepts(
    image: &PixelBuffer,
    x: usize,
    y: usize,
    references: &[ReferenceColor],
    strict: bool,
    avoid: Option<&AvoidanceMask>,
) -> bool {
    if avoid.is_some_and(|mask| mask.is_avoided(x, y)) {
        return false;
    }
    let mut probe = ColorProbe::new(image.rgb(x, y));
    references.iter().any(|reference| {
        let color = probe.get(reference.space);
        if strict {
            reference.strictly_contains(color)
        } else {
            reference.accepts(color)
        }
    })
}

/// Grow a region from `seeds`.
///
/// # Arguments
/// * `image` - Native-resolution pixels
/// * `seeds` - Start pixels and reference colors
/// * `avoid` - Pixels the region must not include, if any
/// * `contiguous` - If true, only selects pixels connected to a start; if false, selects all matching pixels
/// * `connectivity` - Neighbor table for contiguous growth
pub fn grow_region(
    image: &PixelBuffer,
    seeds: &GrowthSeeds,
    avoid: Option<&AvoidanceMask>,
    contiguous: bool,
    connectivity: Connectivity,
) -> GrowthResult {
    let (width, height) = (image.width(), image.height());
    let mut mask = Array2::from_elem((height, width), false);

    if image.is_empty() || seeds.is_empty() || seeds.references.is_empty() {
        return GrowthResult {
            mask,
            bounds: None,
            pixel_count: 0,
        };
    }

    let references = seeds.references.as_slice();
    let strict = seeds.strict;

    if contiguous {
        // Multi-source flood fill; a pixel is visited at most once
        let mut queue = VecDeque::new();
        let mut visited = Array2::from_elem((height, width), false);

        for &(x, y) in &seeds.starts {
            if !visited[[y, x]] {
                visited[[y, x]] = true;
                queue.push_back((x, y));
            }
        }

        while let Some((x, y)) = queue.pop_front() {
            if !accepts(image, x, y, references, strict, avoid) {
                continue;
            }
            mask[[y, x]] = true;

            for &(dx, dy) in connectivity.offsets() {
                let nx = x as i64 + dx as i64;
                let ny = y as i64 + dy as i64;

                if nx >= 0 && nx < width as i64 && ny >= 0 && ny < height as i64 {
                    let (nx, ny) = (nx as usize, ny as usize);
                    if !visited[[ny, nx]] {
                        visited[[ny, nx]] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
    } else if let Some(cells) = mask.as_slice_mut() {
        // Non-contiguous: every pixel is tested once, rows in parallel
        cells.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = accepts(image, x, y, references, strict, avoid);
            }
        });
    }

    let mut pixel_count = 0;
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0;
    let mut max_y = 0;
    for ((y, x), &selected) in mask.indexed_iter() {
        if selected {
            pixel_count += 1;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    let bounds = if pixel_count > 0 {
        Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    } else {
        None
    };

    GrowthResult {
        mask,
        bounds,
        pixel_count,
    }
}

/// Paint a native-resolution region onto `selection`'s grid.
///
/// Native `(x, y)` lands on `(floor(x * out.width / width), floor(y * out.height / height))`.
pub fn paint_region(
    selection: &mut SelectionMask,
    region: &Array2<bool>,
    color: [u8; 4],
    owner: GroupId,
    kind: GroupKind,
) {
    let out = selection.size();
    let native = MaskSize::new(region.ncols(), region.nrows());
    if native.is_empty() || out.is_empty() {
        return;
    }
    for ((y, x), &selected) in region.indexed_iter() {
        if selected {
            let (ox, oy) = out.map_from(native, x, y);
            selection.paint(ox, oy, color, owner, kind);
        }
    }
}

/// Avoidance points of every visible `Avoid` group, in group order.
pub fn visible_avoidance_points(groups: &[SegmentGroup]) -> Vec<AvoidancePoint> {
    groups
        .iter()
        .filter(|group| group.visible)
        .filter_map(|group| match &group.points {
            GroupPoints::Avoid(points) => Some(points.iter().copied()),
            GroupPoints::Add(_) => None,
        })
        .flatten()
        .collect()
}

/// Compute the selection mask for all visible groups.
///
/// Groups are painted in order onto a fresh mask of size `out`; where groups
/// overlap, the later group wins. Native pixels are mapped onto `out` as in
/// [`paint_region`].
///
/// Never fails: an empty image or empty output yields an empty mask, and
/// points outside the image are ignored.
pub fn build_mask(
    image: &PixelBuffer,
    groups: &[SegmentGroup],
    settings: &WandSettings,
    out: MaskSize,
) -> SelectionMask {
    let mut selection = SelectionMask::empty(out);
    if image.is_empty() || out.is_empty() {
        return selection;
    }

    let avoid_points = visible_avoidance_points(groups);
    let avoidance = if avoid_points.is_empty() {
        None
    } else {
        Some(build_avoidance_mask(image, &avoid_points))
    };

    for group in groups.iter().filter(|group| group.visible) {
        let seeds = GrowthSeeds::for_group(image, &group.points);
        if seeds.is_empty() {
            continue;
        }

        let blocked_by = match group.kind() {
            GroupKind::Add => avoidance.as_ref(),
            GroupKind::Avoid => None,
        };
        let result = grow_region(
            image,
            &seeds,
            blocked_by,
            settings.contiguous,
            settings.connectivity,
        );

        let [r, g, b] = group.display_color;
        paint_region(
            &mut selection,
            &result.mask,
            [r, g, b, settings.overlay_alpha],
            group.id,
            group.kind(),
        );

        log::debug!(
            "{} group {} grew to {} pixels from {} points",
            group.kind(),
            group.id,
            result.pixel_count,
            seeds.starts.len()
        );
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorSpace;
    use crate::selection::group::SeedPoint;
    use crate::selection::settings::{SpaceSet, ToleranceSet};

    fn image_from(width: usize, colors: &[[u8; 3]]) -> Vec<u8> {
        assert_eq!(colors.len() % width, 0);
        colors.iter().flat_map(|c| [c[0], c[1], c[2], 255]).collect()
    }

    fn rgb_seed(x: i32, y: i32, tolerance: f32) -> SeedPoint {
        SeedPoint::new(x, y, ToleranceSet::uniform(tolerance), SpaceSet::only(ColorSpace::Rgb))
    }

    fn add_group(id: u32, seeds: &[SeedPoint]) -> SegmentGroup {
        let mut group = SegmentGroup::new(GroupId(id), format!("Segment {id}"), GroupKind::Add, [50, 150, 255]);
        for &seed in seeds {
            group.push_seed(seed);
        }
        group
    }

    const R: [u8; 3] = [255, 0, 0];
    const B: [u8; 3] = [0, 0, 255];

    #[test]
    fn test_single_color_fill() {
        let data = image_from(5, &[R; 25]);
        let image = PixelBuffer::from_rgba(&data, 5, 5).unwrap();
        let seeds = GrowthSeeds::for_group(&image, &GroupPoints::Add(vec![rgb_seed(2, 2, 0.0)]));

        let result = grow_region(&image, &seeds, None, true, Connectivity::Four);

        assert!(result.mask.iter().all(|&v| v));
        assert_eq!(result.pixel_count, 25);
        assert_eq!(result.bounds, Some((0, 0, 5, 5)));
    }

    #[test]
    fn test_two_regions() {
        // 4x4 image: left half red, right half blue
        let mut colors = Vec::new();
        for _ in 0..4 {
            colors.extend_from_slice(&[R, R, B, B]);
        }
        let data = image_from(4, &colors);
        let image = PixelBuffer::from_rgba(&data, 4, 4).unwrap();
        let seeds = GrowthSeeds::for_group(&image, &GroupPoints::Add(vec![rgb_seed(0, 0, 0.0)]));

        let result = grow_region(&image, &seeds, None, true, Connectivity::Four);

        assert_eq!(result.pixel_count, 8);
        assert_eq!(result.bounds, Some((0, 0, 2, 4)));
    }

    #[test]
    fn test_tolerance_gradient() {
        // 3x3 gradient of red values, center 230
        let values = [250u8, 245, 240, 235, 230, 225, 220, 215, 210];
        let colors: Vec<[u8; 3]> = values.iter().map(|&v| [v, 0, 0]).collect();
        let data = image_from(3, &colors);
        let image = PixelBuffer::from_rgba(&data, 3, 3).unwrap();
        let seeds = GrowthSeeds::for_group(&image, &GroupPoints::Add(vec![rgb_seed(1, 1, 10.0)]));

        let result = grow_region(&image, &seeds, None, true, Connectivity::Four);

        // 220..=240 reachable through 4-neighbors of the center
        for (i, &v) in values.iter().enumerate() {
            let selected = result.mask[[i / 3, i % 3]];
            if selected {
                assert!((220..=240).contains(&v));
            }
        }
        assert!(result.mask[[1, 1]]);
        assert!(result.mask[[0, 2]]);
    }

    #[test]
    fn test_non_contiguous_checkerboard() {
        let mut colors = Vec::new();
        for y in 0..5 {
            for x in 0..5 {
                colors.push(if (x + y) % 2 == 0 { R } else { [0, 0, 0] });
            }
        }
        let data = image_from(5, &colors);
        let image = PixelBuffer::from_rgba(&data, 5, 5).unwrap();
        let seeds = GrowthSeeds::for_group(&image, &GroupPoints::Add(vec![rgb_seed(0, 0, 0.0)]));

        let global = grow_region(&image, &seeds, None, false, Connectivity::Four);
        assert_eq!(global.pixel_count, 13);

        let four = grow_region(&image, &seeds, None, true, Connectivity::Four);
        assert_eq!(four.pixel_count, 1);

        let eight = grow_region(&image, &seeds, None, true, Connectivity::Eight);
        assert_eq!(eight.pixel_count, 13);
    }

    #[test]
    fn test_multi_source_fill() {
        // Two red islands separated by blue; one seed in each
        let data = image_from(5, &[R, B, B, B, R]);
        let image = PixelBuffer::from_rgba(&data, 5, 1).unwrap();
        let seeds = GrowthSeeds::for_group(
            &image,
            &GroupPoints::Add(vec![rgb_seed(0, 0, 0.0), rgb_seed(4, 0, 0.0)]),
        );

        let result = grow_region(&image, &seeds, None, true, Connectivity::Four);
        assert_eq!(result.pixel_count, 2);
        assert!(result.mask[[0, 0]] && result.mask[[0, 4]]);
    }

    #[test]
    fn test_out_of_bounds_seed_is_skipped() {
        let data = image_from(2, &[R, R]);
        let image = PixelBuffer::from_rgba(&data, 2, 1).unwrap();
        let group = add_group(1, &[rgb_seed(5, 0, 10.0), rgb_seed(-1, -1, 10.0)]);

        let mask = build_mask(&image, &[group], &WandSettings::default(), MaskSize::of(&image));
        assert_eq!(mask.selected_count(), 0);
    }

    #[test]
    fn test_scaled_output_grid() {
        let data = image_from(4, &[R; 16]);
        let image = PixelBuffer::from_rgba(&data, 4, 4).unwrap();
        let group = add_group(1, &[rgb_seed(0, 0, 0.0)]);

        let mask = build_mask(&image, &[group], &WandSettings::default(), MaskSize::new(2, 2));
        assert_eq!(mask.size(), MaskSize::new(2, 2));
        assert_eq!(mask.selected_count(), 4);
        assert_eq!(mask.color(1, 1), [50, 150, 255, 128]);
    }

    #[test]
    fn test_later_group_wins_overlap() {
        let data = image_from(3, &[R, R, R]);
        let image = PixelBuffer::from_rgba(&data, 3, 1).unwrap();
        let first = add_group(1, &[rgb_seed(0, 0, 0.0)]);
        let mut second = add_group(2, &[rgb_seed(2, 0, 0.0)]);
        second.display_color = [80, 200, 120];

        let mask = build_mask(&image, &[first, second], &WandSettings::default(), MaskSize::of(&image));
        assert_eq!(mask.count_for(GroupId(2)), 3);
        assert_eq!(mask.count_for(GroupId(1)), 0);
        assert_eq!(mask.color(0, 0), [80, 200, 120, 128]);
    }

    #[test]
    fn test_hidden_groups_are_ignored() {
        let data = image_from(2, &[R, R]);
        let image = PixelBuffer::from_rgba(&data, 2, 1).unwrap();
        let mut group = add_group(1, &[rgb_seed(0, 0, 0.0)]);
        group.visible = false;

        let mask = build_mask(&image, &[group], &WandSettings::default(), MaskSize::of(&image));
        assert_eq!(mask.selected_count(), 0);
    }

    #[test]
    fn test_avoid_group_is_not_blocked_by_itself() {
        let data = image_from(3, &[R, R, B]);
        let image = PixelBuffer::from_rgba(&data, 3, 1).unwrap();
        let mut avoid = SegmentGroup::new(GroupId(1), "Avoid 1", GroupKind::Avoid, [255, 60, 60]);
        avoid.push_avoidance(AvoidancePoint::new(
            0,
            0,
            R,
            ToleranceSet::uniform(10.0),
            SpaceSet::only(ColorSpace::Rgb),
        ));

        let mask = build_mask(&image, &[avoid], &WandSettings::default(), MaskSize::of(&image));
        assert_eq!(mask.count_for(GroupId(1)), 2);
        assert!(!mask.is_selected(2, 0));
    }

    #[test]
    fn test_empty_image_and_output() {
        let image = PixelBuffer::from_rgba(&[], 0, 0).unwrap();
        let group = add_group(1, &[rgb_seed(0, 0, 10.0)]);
        let mask = build_mask(&image, &[group.clone()], &WandSettings::default(), MaskSize::new(4, 4));
        assert_eq!(mask.selected_count(), 0);
        assert_eq!(mask.size(), MaskSize::new(4, 4));

        let data = image_from(1, &[R]);
        let image = PixelBuffer::from_rgba(&data, 1, 1).unwrap();
        let mask = build_mask(&image, &[group], &WandSettings::default(), MaskSize::new(0, 0));
        assert_eq!(mask.selected_count(), 0);
    }

    #[test]
    fn test_avoid_group_does_not_cover_selectable_pixels() {
        // Red, near-red, green; avoid near-red at tolerance 5, seed red at 10
        let data = image_from(3, &[R, [250, 0, 0], [0, 255, 0]]);
        let image = PixelBuffer::from_rgba(&data, 3, 1).unwrap();
        let add = add_group(1, &[rgb_seed(0, 0, 10.0)]);
        let mut avoid = SegmentGroup::new(GroupId(2), "Avoid 1", GroupKind::Avoid, [255, 60, 60]);
        avoid.push_avoidance(AvoidancePoint::new(
            1,
            0,
            [250, 0, 0],
            ToleranceSet::uniform(5.0),
            SpaceSet::only(ColorSpace::Rgb),
        ));

        for groups in [vec![add.clone(), avoid.clone()], vec![avoid, add]] {
            let mask = build_mask(&image, &groups, &WandSettings::default(), MaskSize::of(&image));
            assert_eq!(mask.owner(0, 0), Some(GroupId(1)));
            assert!(mask.is_selected(0, 0));
            assert_eq!(mask.owner(1, 0), Some(GroupId(2)));
            assert!(!mask.is_selected(1, 0));
            assert_eq!(mask.owner(2, 0), None);
            assert_eq!(mask.selected_count(), 1);
        }
    }

    #[test]
    fn test_seed_matches_in_any_enabled_space() {
        // Same hue and saturation: 100 apart in RGB, about 39 apart in HSV
        let data = image_from(2, &[[200, 0, 0], [100, 0, 0]]);
        let image = PixelBuffer::from_rgba(&data, 2, 1).unwrap();
        let tolerances = ToleranceSet::uniform(10.0).with(ColorSpace::Hsv, 50.0);

        let rgb_only = SeedPoint::new(0, 0, tolerances, SpaceSet::only(ColorSpace::Rgb));
        let seeds = GrowthSeeds::for_group(&image, &GroupPoints::Add(vec![rgb_only]));
        let result = grow_region(&image, &seeds, None, true, Connectivity::Four);
        assert!(!result.mask[[0, 1]]);

        let rgb_and_hsv = SeedPoint {
            spaces: SpaceSet::only(ColorSpace::Rgb).with(ColorSpace::Hsv, true),
            ..rgb_only
        };
        let seeds = GrowthSeeds::for_group(&image, &GroupPoints::Add(vec![rgb_and_hsv]));
        let result = grow_region(&image, &seeds, None, true, Connectivity::Four);
        assert!(result.mask[[0, 1]]);
        assert_eq!(result.pixel_count, 2);
    }
}
