//! WandSeg Rust Extensions
//!
//! Interactive region-growing segmentation implemented in Rust, with Python
//! bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! The core reads RGBA u8 images of shape (height, width, 4) at native
//! resolution. Pointer coordinates handed to the core are already mapped from
//! display space to native pixels.
//!
//! ## Pipeline
//! pixels + groups + settings -> avoidance mask -> region growing -> mask.
//! The mask may be painted onto an output grid of a different size than the
//! image (e.g. a display-scaled canvas); native pixels are mapped onto it by
//! nearest-neighbor flooring.
//!
//! ```
//! use wandseg_rust::image::{MaskSize, PixelBuffer};
//! use wandseg_rust::selection::{GroupKind, SelectionSession};
//!
//! let pixels = [255, 0, 0, 255, 250, 0, 0, 255, 0, 255, 0, 255];
//! let image = PixelBuffer::from_rgba(&pixels, 3, 1).unwrap();
//!
//! let mut session = SelectionSession::default();
//! session.click(&image, 0, 0, GroupKind::Add, false).unwrap();
//!
//! let mask = session.compute_committed_mask(&image, MaskSize::of(&image));
//! assert!(mask.is_selected(0, 0) && mask.is_selected(1, 0));
//! assert!(!mask.is_selected(2, 0));
//! ```

pub mod color;
pub mod error;
pub mod image;
pub mod inspect;
pub mod selection;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{SegmentError, SegmentResult};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::color::{self, ColorSpace};
    use crate::error::SegmentError;
    use crate::image::{self as img, MaskSize, PixelBuffer};
    use crate::selection::{
        build_avoidance_mask, grow_region, paint_region, AvoidancePoint, Connectivity, GroupId, GroupKind, GroupPoints,
        GrowthSeeds, SeedPoint, SelectionMask, SpaceSet, ToleranceSet, WandSettings,
    };

    fn to_py_err(err: SegmentError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    // ========================================================================
    // Color Readouts
    // ========================================================================

    /// Convert an RGB color (0-255) to HSV: h 0-360, s and v 0-100.
    #[pyfunction]
    pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
        let [h, s, v] = color::rgb_to_hsv(r, g, b);
        (h, s, v)
    }

    /// Convert an RGB color (0-255) to CIE-LAB (D65).
    #[pyfunction]
    pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
        let [l, a, bb] = color::rgb_to_lab(r, g, b);
        (l, a, bb)
    }

    /// Distance between two RGB colors measured in `space` ("rgb", "hsv", "lab").
    #[pyfunction]
    pub fn color_distance(c1: (u8, u8, u8), c2: (u8, u8, u8), space: &str) -> PyResult<f32> {
        let space: ColorSpace = space.parse().map_err(to_py_err)?;
        Ok(color::rgb_distance([c1.0, c1.1, c1.2], [c2.0, c2.1, c2.2], space))
    }

    /// RGB of the pixel at (x, y) in an RGBA image.
    #[pyfunction]
    pub fn sample_color(image: PyReadonlyArray3<'_, u8>, x: i32, y: i32) -> PyResult<(u8, u8, u8)> {
        let buffer = PixelBuffer::new(image.as_array()).map_err(to_py_err)?;
        let [r, g, b] = img::sample_color(&buffer, x, y).map_err(to_py_err)?;
        Ok((r, g, b))
    }

    // ========================================================================
    // Segmentation
    // ========================================================================

    /// Grow a selection from seed points, avoiding colors at avoid points.
    ///
    /// # Arguments
    /// * `image` - RGBA image (height, width, 4)
    /// * `seeds` - Seed coordinates [(x, y), ...]
    /// * `avoid` - Avoidance coordinates [(x, y), ...]; colors are sampled now, points outside the image are dropped
    /// * `tolerance` - Tolerance in `color_space`, clamped to 0-255
    /// * `color_space` - "rgb", "hsv" or "lab"
    /// * `contiguous` - Flood fill (True) or global threshold (False)
    /// * `connectivity` - 4 or 8
    /// * `out_width`, `out_height` - Output grid, defaults to the image size
    ///
    /// # Returns
    /// RGBA overlay (out_height, out_width, 4)
    #[pyfunction]
    #[pyo3(signature = (image, seeds, avoid=Vec::new(), tolerance=32.0, color_space="rgb", contiguous=true, connectivity=4, out_width=None, out_height=None))]
    #[allow(clippy::too_many_arguments)]
    pub fn segment_mask<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        seeds: Vec<(i32, i32)>,
        avoid: Vec<(i32, i32)>,
        tolerance: f32,
        color_space: &str,
        contiguous: bool,
        connectivity: u8,
        out_width: Option<usize>,
        out_height: Option<usize>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let buffer = PixelBuffer::new(image.as_array()).map_err(to_py_err)?;
        let space: ColorSpace = color_space.parse().map_err(to_py_err)?;

        let mut settings = WandSettings {
            color_spaces: SpaceSet::only(space),
            contiguous,
            connectivity: Connectivity::try_from(connectivity).map_err(to_py_err)?,
            ..WandSettings::default()
        };
        settings.set_tolerance(space, tolerance);
        let tolerances = ToleranceSet::uniform(settings.tolerances.get(space));

        let avoid_points: Vec<AvoidancePoint> = avoid
            .iter()
            .filter_map(|&(x, y)| {
                img::sample_color(&buffer, x, y)
                    .ok()
                    .map(|color| AvoidancePoint::new(x, y, color, tolerances, settings.color_spaces))
            })
            .collect();
        let seed_points = seeds
            .iter()
            .map(|&(x, y)| SeedPoint::new(x, y, tolerances, settings.color_spaces))
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

        let out = MaskSize::new(
            out_width.unwrap_or(buffer.width()),
            out_height.unwrap_or(buffer.height()),
        );
        let mut mask = SelectionMask::empty(out);
        paint_region(&mut mask, &region.mask, [50, 150, 255, settings.overlay_alpha], GroupId(1), GroupKind::Add);

        Ok(mask.overlay().to_owned().into_pyarray(py))
    }

    /// WandSeg Rust extension module
    #[pymodule]
    pub fn wandseg_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Color readouts
        m.add_function(wrap_pyfunction!(rgb_to_hsv, m)?)?;
        m.add_function(wrap_pyfunction!(rgb_to_lab, m)?)?;
        m.add_function(wrap_pyfunction!(color_distance, m)?)?;
        m.add_function(wrap_pyfunction!(sample_color, m)?)?;

        // Segmentation
        m.add_function(wrap_pyfunction!(segment_mask, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::wandseg_rust;
