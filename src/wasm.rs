//! WebAssembly exports for WandSeg.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Data Layout
//!
//! - Images are flat RGBA bytes (length = width * height * 4)
//! - Point lists are flat coordinate pairs `[x0, y0, x1, y1, ...]`
//! - Masks come back as flat RGBA bytes on the requested output grid
//!
//! Errors are raised in JavaScript as string exceptions.

use wasm_bindgen::prelude::*;

use crate::color::{self, ColorSpace};
use crate::error::SegmentError;
use crate::image::{self as img, MaskSize, PixelBuffer};
use crate::selection::{
    build_avoidance_mask, grow_region, paint_region, AvoidancePoint, Connectivity, GroupId, GroupKind, GroupPoints,
    GrowthSeeds, SeedPoint, SelectionMask, SpaceSet, ToleranceSet, WandSettings,
};

fn to_js_err(err: SegmentError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn pairs(coords: &[i32]) -> impl Iterator<Item = (i32, i32)> + '_ {
    coords.chunks_exact(2).map(|p| (p[0], p[1]))
}

// ============================================================================
// Color Readouts
// ============================================================================

/// Convert an RGB color to HSV.
///
/// # Returns
/// `[h, s, v]` with h in 0-360 and s, v in 0-100
#[wasm_bindgen]
pub fn rgb_to_hsv_wasm(r: u8, g: u8, b: u8) -> Vec<f32> {
    color::rgb_to_hsv(r, g, b).to_vec()
}

/// Convert an RGB color to CIE-LAB (D65).
///
/// # Returns
/// `[L, a, b]`
#[wasm_bindgen]
pub fn rgb_to_lab_wasm(r: u8, g: u8, b: u8) -> Vec<f32> {
    color::rgb_to_lab(r, g, b).to_vec()
}

// ============================================================================
// Segmentation
// ============================================================================

/// Grow a selection from seed points, avoiding colors at avoid points.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `seeds` - Flat seed coordinates `[x0, y0, x1, y1, ...]`
/// * `avoid` - Flat avoidance coordinates; points outside the image are dropped
/// * `tolerance` - Tolerance in `color_space`, clamped to 0-255
/// * `color_space` - "rgb", "hsv" or "lab"
/// * `contiguous` - Flood fill (true) or global threshold (false)
/// * `connectivity` - 4 or 8
/// * `out_width`, `out_height` - Output grid
///
/// # Returns
/// Flat array of RGBA bytes (length = out_width * out_height * 4)
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn segment_mask_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    seeds: &[i32],
    avoid: &[i32],
    tolerance: f32,
    color_space: &str,
    contiguous: bool,
    connectivity: u8,
    out_width: usize,
    out_height: usize,
) -> Result<Vec<u8>, JsValue> {
    let buffer = PixelBuffer::from_rgba(data, width, height).map_err(to_js_err)?;
    let space: ColorSpace = color_space.parse().map_err(to_js_err)?;

    let mut settings = WandSettings {
        color_spaces: SpaceSet::only(space),
        contiguous,
        connectivity: Connectivity::try_from(connectivity).map_err(to_js_err)?,
        ..WandSettings::default()
    };
    settings.set_tolerance(space, tolerance);
    let tolerances = ToleranceSet::uniform(settings.tolerances.get(space));

    let avoid_points: Vec<AvoidancePoint> = pairs(avoid)
        .filter_map(|(x, y)| {
            img::sample_color(&buffer, x, y)
                .ok()
                .map(|color| AvoidancePoint::new(x, y, color, tolerances, settings.color_spaces))
        })
        .collect();
    let seed_points = pairs(seeds)
        .map(|(x, y)| SeedPoint::new(x, y, tolerances, settings.color_spaces))
        .collect();

    let avoidance = build_avoidance_mask(&buffer, &avoid_points);
    let growth_seeds = GrowthSeeds::for_group(&buffer, &GroupPoints::Add(seed_points));
    let region = grow_region(
        &buffer,
        &growth_seeds,
        Some(&avoidance),
        settings.contiguous,
        settings.connectivity,
    );

    let mut mask = SelectionMask::empty(MaskSize::new(out_width, out_height));
    paint_region(&mut mask, &region.mask, [50, 150, 255, settings.overlay_alpha], GroupId(1), GroupKind::Add);

    Ok(mask.into_rgba())
}
