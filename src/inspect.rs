//! Pixel inspector: color readouts and a zoomed neighborhood around a pixel.

use crate::color::{rgb_to_hsv, rgb_to_lab};
use crate::image::PixelBuffer;

/// Everything an inspector panel shows for one pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelInspection {
    pub x: usize,
    pub y: usize,
    pub rgb: [u8; 3],
    pub hsv: [f32; 3],
    pub lab: [f32; 3],
    /// Side length of the neighborhood grid
    pub grid_size: usize,
    /// `grid_size * grid_size` RGBA cells, row-major, centered on the pixel.
    /// Cells outside the image are transparent black.
    pub grid: Vec<[u8; 4]>,
    /// Per cell: within `sample_size / 2` of the center
    pub in_sample: Vec<bool>,
    /// Mean RGB over in-image cells within the sample radius
    pub sample_mean: [u8; 3],
}

/// Inspect the pixel at `(x, y)`.
///
/// # Arguments
/// * `grid_size` - Neighborhood side length; even sizes are rounded up to odd
/// * `sample_size` - Diameter of the sampling disc around the center
///
/// Returns `None` when the coordinate is outside the image.
pub fn inspect_pixel(
    image: &PixelBuffer,
    x: i32,
    y: i32,
    grid_size: usize,
    sample_size: f32,
) -> Option<PixelInspection> {
    if !image.contains(x, y) {
        return None;
    }

    let grid_size = grid_size.max(1) | 1;
    let half = (grid_size / 2) as i32;
    let radius = sample_size.max(0.0) / 2.0;

    let mut grid = Vec::with_capacity(grid_size * grid_size);
    let mut in_sample = Vec::with_capacity(grid_size * grid_size);
    let mut sum = [0u64; 3];
    let mut count = 0u64;

    for dy in -half..=half {
        for dx in -half..=half {
            let (sx, sy) = (x + dx, y + dy);
            let inside = image.contains(sx, sy);
            let within = ((dx * dx + dy * dy) as f32).sqrt() <= radius;

            grid.push(if inside {
                image.rgba(sx as usize, sy as usize)
            } else {
                [0; 4]
            });
            in_sample.push(within);

            if inside && within {
                let rgb = image.rgb(sx as usize, sy as usize);
                for (acc, &c) in sum.iter_mut().zip(rgb.iter()) {
                    *acc += c as u64;
                }
                count += 1;
            }
        }
    }

    let (ux, uy) = (x as usize, y as usize);
    let rgb = image.rgb(ux, uy);
    // The center cell is always inside and within any non-negative radius
    let sample_mean = sum.map(|s| ((s as f64 / count.max(1) as f64).round()) as u8);

    Some(PixelInspection {
        x: ux,
        y: uy,
        rgb,
        hsv: rgb_to_hsv(rgb[0], rgb[1], rgb[2]),
        lab: rgb_to_lab(rgb[0], rgb[1], rgb[2]),
        grid_size,
        grid,
        in_sample,
        sample_mean,
    })
}
