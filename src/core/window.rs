//! Windowed matrix estimation
//!
//! Averages per-pixel matrix samples over a (2*hx+1) x (2*hy+1) window
//! centred on each target pixel. The window is clipped to the image, so it
//! shrinks at the borders instead of wrapping or reflecting. Neighbours
//! flagged as no-data are left out of the average.
//!
//! Samples are averaged in the native basis of the source and converted once
//! afterwards. Scattering-matrix and compact-pol sources are the exception:
//! the outer product is nonlinear, so they are converted per sample before
//! averaging.

use crate::core::compact::{covariance_c2, CompactMode};
use crate::core::matrix::{
    c3_to_t3, c4_to_c3, t3_to_c3, t4_to_t3, ComplexMatrix, Matrix2, Matrix3, ScatterMatrix,
};
use crate::io::tile::SourceTile;
use crate::types::{MatrixType, PolSarError, PolSarResult, Rectangle};
use num_complex::Complex64;

/// Inclusive pixel bounds of a clipped averaging window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub x_start: usize,
    pub x_end: usize,
    pub y_start: usize,
    pub y_end: usize,
}

impl WindowBounds {
    pub fn sample_count(&self) -> usize {
        (self.x_end - self.x_start + 1) * (self.y_end - self.y_start + 1)
    }
}

/// Spatial averaging over a sliding window for one source matrix type
#[derive(Debug, Clone, Copy)]
pub struct WindowEstimator {
    matrix_type: MatrixType,
    half_x: usize,
    half_y: usize,
    width: usize,
    height: usize,
    /// Simulated compact-pol mode applied to quad-pol scattering matrices
    compact_mode: Option<CompactMode>,
}

impl WindowEstimator {
    /// Window of `window_size` x `window_size` pixels over a `width` x `height` image
    pub fn new(matrix_type: MatrixType, window_size: usize, width: usize, height: usize) -> Self {
        Self::with_half_window(matrix_type, window_size / 2, window_size / 2, width, height)
    }

    pub fn with_half_window(
        matrix_type: MatrixType,
        half_x: usize,
        half_y: usize,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            matrix_type,
            half_x,
            half_y,
            width,
            height,
            compact_mode: None,
        }
    }

    /// Simulate compact-pol C2 matrices from a FULL source
    pub fn with_compact_mode(mut self, mode: Option<CompactMode>) -> Self {
        self.compact_mode = mode;
        self
    }

    pub fn matrix_type(&self) -> MatrixType {
        self.matrix_type
    }

    /// Halo-expanded source region needed to compute `target`
    pub fn source_rectangle(&self, target: &Rectangle) -> Rectangle {
        let x0 = target.x.saturating_sub(self.half_x);
        let y0 = target.y.saturating_sub(self.half_y);
        let x1 = (target.max_x() - 1 + self.half_x).min(self.width - 1);
        let y1 = (target.max_y() - 1 + self.half_y).min(self.height - 1);
        Rectangle::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
    }

    pub fn window_bounds(&self, x: usize, y: usize) -> WindowBounds {
        WindowBounds {
            x_start: x.saturating_sub(self.half_x),
            x_end: (x + self.half_x).min(self.width - 1),
            y_start: y.saturating_sub(self.half_y),
            y_end: (y + self.half_y).min(self.height - 1),
        }
    }

    /// Mean coherency matrix T3 at (x, y)
    pub fn mean_t3(&self, tile: &SourceTile, x: usize, y: usize) -> PolSarResult<Matrix3> {
        match self.matrix_type {
            MatrixType::T3 => Ok(self.mean(tile, x, y, |sx, sy| read_hermitian::<3>(tile, sx, sy))),
            MatrixType::T4 => Ok(t4_to_t3(
                &self.mean(tile, x, y, |sx, sy| read_hermitian::<4>(tile, sx, sy)),
            )),
            MatrixType::Full => {
                Ok(self.mean(tile, x, y, |sx, sy| read_scatter(tile, sx, sy).to_t3()))
            }
            MatrixType::C3 | MatrixType::C4 => Ok(c3_to_t3(&self.mean_c3(tile, x, y)?)),
            MatrixType::C2 | MatrixType::Compact => Err(self.not_quad_pol()),
        }
    }

    /// Mean covariance matrix C3 at (x, y)
    pub fn mean_c3(&self, tile: &SourceTile, x: usize, y: usize) -> PolSarResult<Matrix3> {
        match self.matrix_type {
            MatrixType::C3 => Ok(self.mean(tile, x, y, |sx, sy| read_hermitian::<3>(tile, sx, sy))),
            MatrixType::C4 => Ok(c4_to_c3(
                &self.mean(tile, x, y, |sx, sy| read_hermitian::<4>(tile, sx, sy)),
            )),
            MatrixType::Full => {
                Ok(self.mean(tile, x, y, |sx, sy| read_scatter(tile, sx, sy).to_c3()))
            }
            MatrixType::T3 | MatrixType::T4 => Ok(t3_to_c3(&self.mean_t3(tile, x, y)?)),
            MatrixType::C2 | MatrixType::Compact => Err(self.not_quad_pol()),
        }
    }

    /// Mean dual-pol covariance matrix C2 at (x, y)
    ///
    /// FULL sources only provide C2 when a compact-pol mode is configured.
    pub fn mean_c2(&self, tile: &SourceTile, x: usize, y: usize) -> PolSarResult<Matrix2> {
        match (self.matrix_type, self.compact_mode) {
            (MatrixType::C2, _) => {
                Ok(self.mean(tile, x, y, |sx, sy| read_hermitian::<2>(tile, sx, sy)))
            }
            (MatrixType::Compact, _) => Ok(self.mean(tile, x, y, |sx, sy| {
                covariance_c2(&read_compact(tile, sx, sy))
            })),
            (MatrixType::Full, Some(mode)) => Ok(self.mean(tile, x, y, |sx, sy| {
                covariance_c2(&mode.scatter_vector(&read_scatter(tile, sx, sy)))
            })),
            (other, _) => Err(PolSarError::InvalidFormat(format!(
                "{} source does not hold a dual-pol C2 matrix",
                other
            ))),
        }
    }

    /// Windowed mean span (matrix trace) at (x, y)
    pub fn mean_span(&self, tile: &SourceTile, x: usize, y: usize) -> PolSarResult<f64> {
        if self.matrix_type.is_dual_pol() {
            Ok(self.mean_c2(tile, x, y)?.trace())
        } else {
            Ok(self.mean_c3(tile, x, y)?.trace())
        }
    }

    /// Scattering matrix of the centre pixel, no averaging
    pub fn center_scatter(
        &self,
        tile: &SourceTile,
        x: usize,
        y: usize,
    ) -> PolSarResult<ScatterMatrix> {
        match self.matrix_type {
            MatrixType::Full => Ok(read_scatter(tile, x, y)),
            other => Err(PolSarError::InvalidFormat(format!(
                "{} source does not hold a scattering matrix",
                other
            ))),
        }
    }

    /// Average of `sample` over the valid pixels of the window
    ///
    /// Returns the zero matrix when every pixel of the window is no-data.
    fn mean<const N: usize, F>(
        &self,
        tile: &SourceTile,
        x: usize,
        y: usize,
        sample: F,
    ) -> ComplexMatrix<N>
    where
        F: Fn(usize, usize) -> ComplexMatrix<N>,
    {
        let bounds = self.window_bounds(x, y);
        let mut sum = ComplexMatrix::<N>::zeros();
        let mut count = 0usize;
        for sy in bounds.y_start..=bounds.y_end {
            for sx in bounds.x_start..=bounds.x_end {
                if tile.is_no_data(sx, sy) {
                    continue;
                }
                sum += sample(sx, sy);
                count += 1;
            }
        }
        if count == 0 {
            return sum;
        }
        sum.scale(1.0 / count as f64)
    }

    fn not_quad_pol(&self) -> PolSarError {
        PolSarError::InvalidFormat(format!(
            "{} source cannot provide a quad-pol 3x3 matrix",
            self.matrix_type
        ))
    }
}

/// Read a Hermitian matrix stored as its upper triangle, row by row:
/// diagonal element first, then real/imaginary pairs
fn read_hermitian<const N: usize>(tile: &SourceTile, x: usize, y: usize) -> ComplexMatrix<N> {
    let mut m = ComplexMatrix::<N>::zeros();
    let mut band = 0;
    for i in 0..N {
        m.re[i][i] = tile.value(band, x, y);
        band += 1;
        for j in i + 1..N {
            let value = Complex64::new(tile.value(band, x, y), tile.value(band + 1, x, y));
            m.set_hermitian(i, j, value);
            band += 2;
        }
    }
    m
}

fn read_scatter(tile: &SourceTile, x: usize, y: usize) -> ScatterMatrix {
    let element = |b: usize| Complex64::new(tile.value(b, x, y), tile.value(b + 1, x, y));
    ScatterMatrix::new(element(0), element(2), element(4), element(6))
}

/// RH / RV scattering vector of a compact-pol product
fn read_compact(tile: &SourceTile, x: usize, y: usize) -> [Complex64; 2] {
    [
        Complex64::new(tile.value(0, x, y), tile.value(1, x, y)),
        Complex64::new(tile.value(2, x, y), tile.value(3, x, y)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RealImage;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    fn constant_tile(rect: Rectangle, values: &[f32]) -> SourceTile {
        let bands: Vec<RealImage> = values
            .iter()
            .map(|v| Array2::from_elem((rect.height, rect.width), *v))
            .collect();
        SourceTile::new(rect, bands, vec![f64::NAN; values.len()]).unwrap()
    }

    #[test]
    fn test_source_rectangle_halo() {
        let est = WindowEstimator::new(MatrixType::T3, 5, 100, 80);
        assert_eq!(
            est.source_rectangle(&Rectangle::new(10, 20, 16, 8)),
            Rectangle::new(8, 18, 20, 12)
        );
        // Clipped at the origin and at the far corner
        assert_eq!(
            est.source_rectangle(&Rectangle::new(0, 0, 1, 1)),
            Rectangle::new(0, 0, 3, 3)
        );
        assert_eq!(
            est.source_rectangle(&Rectangle::new(96, 76, 4, 4)),
            Rectangle::new(94, 74, 6, 6)
        );
    }

    #[test]
    fn test_window_shrinks_at_border() {
        let est = WindowEstimator::new(MatrixType::C3, 7, 10, 10);
        let b = est.window_bounds(0, 9);
        assert_eq!((b.x_start, b.x_end, b.y_start, b.y_end), (0, 3, 6, 9));
        assert_eq!(b.sample_count(), 16);
    }

    #[test]
    fn test_mean_averages_over_clipped_window() {
        let rect = Rectangle::new(0, 0, 3, 1);
        let mut bands: Vec<RealImage> = (0..9).map(|_| Array2::zeros((1, 3))).collect();
        bands[0] = Array2::from_shape_vec((1, 3), vec![1.0, 2.0, 6.0]).unwrap();
        bands[8] = Array2::from_elem((1, 3), 1.0);
        let tile = SourceTile::new(rect, bands, vec![f64::NAN; 9]).unwrap();

        let est = WindowEstimator::new(MatrixType::C3, 3, 3, 1);
        let c = est.mean_c3(&tile, 0, 0).unwrap();
        assert_abs_diff_eq!(c.re[0][0], 1.5, epsilon = 1e-12);
        let c = est.mean_c3(&tile, 1, 0).unwrap();
        assert_abs_diff_eq!(c.re[0][0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(est.mean_span(&tile, 1, 0).unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hermitian_layout() {
        let rect = Rectangle::new(0, 0, 1, 1);
        let values = [4.0, 0.5, -0.25, 0.1, 0.2, 2.0, 0.3, -0.4, 1.0];
        let tile = constant_tile(rect, &values);
        let est = WindowEstimator::new(MatrixType::T3, 1, 1, 1);
        let t = est.mean_t3(&tile, 0, 0).unwrap();
        assert_eq!(t.get(0, 1), Complex64::new(0.5, -0.25));
        assert_eq!(t.get(1, 0), Complex64::new(0.5, 0.25));
        assert_eq!(t.get(2, 1), Complex64::new(0.3, 0.4));
        assert_eq!(t.re[2][2], 1.0);
    }

    #[test]
    fn test_full_source_matches_direct_conversion() {
        let rect = Rectangle::new(0, 0, 1, 1);
        let values = [0.8, -0.3, 0.12, 0.05, 0.12, 0.05, -0.4, 0.6];
        let tile = constant_tile(rect, &values);
        let est = WindowEstimator::new(MatrixType::Full, 1, 1, 1);

        let s = est.center_scatter(&tile, 0, 0).unwrap();
        let t = est.mean_t3(&tile, 0, 0).unwrap();
        let c = est.mean_c3(&tile, 0, 0).unwrap();
        assert!(t.max_abs_diff(&s.to_t3()) < 1e-6);
        assert!(c.max_abs_diff(&s.to_c3()) < 1e-6);
    }

    #[test]
    fn test_c2_source_rejects_quad_pol_requests() {
        let tile = constant_tile(Rectangle::new(0, 0, 1, 1), &[1.0, 0.0, 0.0, 1.0]);
        let est = WindowEstimator::new(MatrixType::C2, 1, 1, 1);
        assert!(est.mean_t3(&tile, 0, 0).is_err());
        assert!(est.center_scatter(&tile, 0, 0).is_err());
        assert_abs_diff_eq!(est.mean_span(&tile, 0, 0).unwrap(), 2.0, epsilon = 1e-12);
    }

    /// Element values in the storage order of a Hermitian source product
    fn hermitian_values<const N: usize>(m: &ComplexMatrix<N>) -> Vec<f32> {
        let mut values = Vec::new();
        for i in 0..N {
            values.push(m.re[i][i] as f32);
            for j in i + 1..N {
                values.push(m.re[i][j] as f32);
                values.push(m.im[i][j] as f32);
            }
        }
        values
    }

    fn reciprocal_scatter() -> ScatterMatrix {
        ScatterMatrix::new(
            Complex64::new(0.8, -0.3),
            Complex64::new(0.12, 0.05),
            Complex64::new(0.12, 0.05),
            Complex64::new(-0.4, 0.6),
        )
    }

    #[test]
    fn test_no_data_neighbours_are_skipped() {
        let rect = Rectangle::new(0, 0, 3, 1);
        let mut bands: Vec<RealImage> = (0..4).map(|_| Array2::zeros((1, 3))).collect();
        bands[0] = Array2::from_shape_vec((1, 3), vec![2.0, -9999.0, 4.0]).unwrap();
        bands[3] = Array2::from_shape_vec((1, 3), vec![1.0, 1.0, f32::NAN]).unwrap();
        let tile = SourceTile::new(rect, bands, vec![-9999.0; 4]).unwrap();

        let est = WindowEstimator::new(MatrixType::C2, 3, 3, 1);
        // (1,0) is no-data in C11 and (2,0) is NaN in C22; only (0,0) remains
        let c = est.mean_c2(&tile, 0, 0).unwrap();
        assert_eq!(c.re[0][0], 2.0);
        assert_eq!(c.re[1][1], 1.0);
        assert_abs_diff_eq!(est.mean_span(&tile, 1, 0).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_window_without_valid_samples_is_zero() {
        let tile = constant_tile(Rectangle::new(0, 0, 1, 1), &[f32::NAN, 0.0, 0.0, 1.0]);
        let est = WindowEstimator::new(MatrixType::C2, 3, 1, 1);
        assert_eq!(est.mean_c2(&tile, 0, 0).unwrap(), Matrix2::zeros());
    }

    #[test]
    fn test_four_by_four_sources_reduce_to_quad_pol() {
        let s = reciprocal_scatter();
        let rect = Rectangle::new(0, 0, 1, 1);

        let t4 = constant_tile(rect, &hermitian_values(&s.to_t4()));
        let est = WindowEstimator::new(MatrixType::T4, 1, 1, 1);
        assert!(est.mean_t3(&t4, 0, 0).unwrap().max_abs_diff(&s.to_t3()) < 1e-6);
        assert!(est.mean_c3(&t4, 0, 0).unwrap().max_abs_diff(&s.to_c3()) < 1e-6);

        let c4 = constant_tile(rect, &hermitian_values(&s.to_c4()));
        let est = WindowEstimator::new(MatrixType::C4, 1, 1, 1);
        assert!(est.mean_c3(&c4, 0, 0).unwrap().max_abs_diff(&s.to_c3()) < 1e-6);
        assert!(est.mean_t3(&c4, 0, 0).unwrap().max_abs_diff(&s.to_t3()) < 1e-6);
    }

    #[test]
    fn test_compact_source_builds_c2_per_sample() {
        let rect = Rectangle::new(0, 0, 2, 1);
        let bands = vec![
            Array2::from_shape_vec((1, 2), vec![1.0, 0.0]).unwrap(),
            Array2::from_shape_vec((1, 2), vec![0.0, 0.0]).unwrap(),
            Array2::from_shape_vec((1, 2), vec![0.0, 0.0]).unwrap(),
            Array2::from_shape_vec((1, 2), vec![-1.0, 2.0]).unwrap(),
        ];
        let tile = SourceTile::new(rect, bands, vec![f64::NAN; 4]).unwrap();
        let est = WindowEstimator::new(MatrixType::Compact, 3, 2, 1);

        let c = est.mean_c2(&tile, 0, 0).unwrap();
        // Means of |RH|^2, |RV|^2 and RH * conj(RV) over both pixels
        assert_abs_diff_eq!(c.re[0][0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(c.re[1][1], 2.5, epsilon = 1e-12);
        assert_eq!(c.get(0, 1), Complex64::new(0.0, 0.5));
        assert!(est.mean_t3(&tile, 0, 0).is_err());
    }

    #[test]
    fn test_full_source_simulates_compact_c2() {
        let s = reciprocal_scatter();
        let values: Vec<f32> = s
            .lexicographic_vector4()
            .iter()
            .flat_map(|z| [z.re as f32, z.im as f32])
            .collect();
        let tile = constant_tile(Rectangle::new(0, 0, 1, 1), &values);

        let est = WindowEstimator::new(MatrixType::Full, 1, 1, 1);
        assert!(est.mean_c2(&tile, 0, 0).is_err());

        let mode = CompactMode::RightCircularHybrid;
        let est = est.with_compact_mode(Some(mode));
        let expected = covariance_c2(&mode.scatter_vector(&s));
        assert!(est.mean_c2(&tile, 0, 0).unwrap().max_abs_diff(&expected) < 1e-6);
    }
}
