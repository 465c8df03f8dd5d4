//! Complex matrix primitives for polarimetric second-order statistics
//!
//! Matrices are stored as split real / imaginary `N x N` arrays so that
//! per-pixel work stays on the stack. Covariance (C) matrices use the
//! lexicographic scattering vector, coherency (T) matrices the Pauli vector.

use num_complex::Complex64;
use num_traits::{One, Zero};
use std::ops::{Add, AddAssign, Mul, Sub};

const FRAC_1_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Dense `N x N` complex matrix split into real and imaginary parts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexMatrix<const N: usize> {
    pub re: [[f64; N]; N],
    pub im: [[f64; N]; N],
}

pub type Matrix2 = ComplexMatrix<2>;
pub type Matrix3 = ComplexMatrix<3>;
pub type Matrix4 = ComplexMatrix<4>;

impl<const N: usize> ComplexMatrix<N> {
    pub fn zeros() -> Self {
        Self {
            re: [[0.0; N]; N],
            im: [[0.0; N]; N],
        }
    }

    pub fn identity() -> Self {
        let mut m = Self::zeros();
        for i in 0..N {
            m.re[i][i] = 1.0;
        }
        m
    }

    pub fn from_parts(re: [[f64; N]; N], im: [[f64; N]; N]) -> Self {
        Self { re, im }
    }

    /// Real diagonal matrix
    pub fn diagonal(values: [f64; N]) -> Self {
        let mut m = Self::zeros();
        for (i, v) in values.iter().enumerate() {
            m.re[i][i] = *v;
        }
        m
    }

    /// Matrix with the given complex rows
    pub fn from_rows(rows: [[Complex64; N]; N]) -> Self {
        let mut m = Self::zeros();
        for i in 0..N {
            for j in 0..N {
                m.set(i, j, rows[i][j]);
            }
        }
        m
    }

    /// Outer product `k * k^H` of a scattering vector
    pub fn outer(k: &[Complex64; N]) -> Self {
        let mut m = Self::zeros();
        for i in 0..N {
            for j in 0..N {
                m.set(i, j, k[i] * k[j].conj());
            }
        }
        m
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Complex64 {
        Complex64::new(self.re[i][j], self.im[i][j])
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: Complex64) {
        self.re[i][j] = value.re;
        self.im[i][j] = value.im;
    }

    /// Set `(i, j)` and its conjugate mirror `(j, i)`
    #[inline]
    pub fn set_hermitian(&mut self, i: usize, j: usize, value: Complex64) {
        self.set(i, j, value);
        self.set(j, i, value.conj());
    }

    /// Real part of the trace (the span for C and T matrices)
    pub fn trace(&self) -> f64 {
        (0..N).map(|i| self.re[i][i]).sum()
    }

    pub fn conj_transpose(&self) -> Self {
        let mut m = Self::zeros();
        for i in 0..N {
            for j in 0..N {
                m.re[i][j] = self.re[j][i];
                m.im[i][j] = -self.im[j][i];
            }
        }
        m
    }

    pub fn matmul(&self, other: &Self) -> Self {
        let mut m = Self::zeros();
        for i in 0..N {
            for j in 0..N {
                let mut acc = Complex64::zero();
                for k in 0..N {
                    acc += self.get(i, k) * other.get(k, j);
                }
                m.set(i, j, acc);
            }
        }
        m
    }

    /// `U * M * U^H`
    pub fn similarity(u: &Self, m: &Self) -> Self {
        u.matmul(m).matmul(&u.conj_transpose())
    }

    pub fn frobenius_norm(&self) -> f64 {
        let mut sum = 0.0;
        for i in 0..N {
            for j in 0..N {
                sum += self.re[i][j] * self.re[i][j] + self.im[i][j] * self.im[i][j];
            }
        }
        sum.sqrt()
    }

    pub fn scale(&self, factor: f64) -> Self {
        let mut m = *self;
        for i in 0..N {
            for j in 0..N {
                m.re[i][j] *= factor;
                m.im[i][j] *= factor;
            }
        }
        m
    }

    /// Largest absolute element-wise difference, real and imaginary parts
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        let mut max = 0.0f64;
        for i in 0..N {
            for j in 0..N {
                max = max
                    .max((self.re[i][j] - other.re[i][j]).abs())
                    .max((self.im[i][j] - other.im[i][j]).abs());
            }
        }
        max
    }

    pub fn is_hermitian(&self, tolerance: f64) -> bool {
        self.max_abs_diff(&self.conj_transpose()) <= tolerance
    }

    pub fn is_finite(&self) -> bool {
        self.re
            .iter()
            .chain(self.im.iter())
            .all(|row| row.iter().all(|v| v.is_finite()))
    }
}

impl<const N: usize> Default for ComplexMatrix<N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<const N: usize> AddAssign for ComplexMatrix<N> {
    fn add_assign(&mut self, rhs: Self) {
        for i in 0..N {
            for j in 0..N {
                self.re[i][j] += rhs.re[i][j];
                self.im[i][j] += rhs.im[i][j];
            }
        }
    }
}

impl<const N: usize> Add for ComplexMatrix<N> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<const N: usize> Sub for ComplexMatrix<N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + rhs.scale(-1.0)
    }
}

impl<const N: usize> Mul<f64> for ComplexMatrix<N> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl<const N: usize> Mul for ComplexMatrix<N> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.matmul(&rhs)
    }
}

/// Quad-pol scattering (Sinclair) matrix of a single pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterMatrix {
    pub hh: Complex64,
    pub hv: Complex64,
    pub vh: Complex64,
    pub vv: Complex64,
}

impl ScatterMatrix {
    pub fn new(hh: Complex64, hv: Complex64, vh: Complex64, vv: Complex64) -> Self {
        Self { hh, hv, vh, vv }
    }

    /// Total received power
    pub fn span(&self) -> f64 {
        self.hh.norm_sqr() + self.hv.norm_sqr() + self.vh.norm_sqr() + self.vv.norm_sqr()
    }

    /// `[HH, (HV+VH)/sqrt2, VV]`
    pub fn lexicographic_vector3(&self) -> [Complex64; 3] {
        [self.hh, (self.hv + self.vh) * FRAC_1_SQRT2, self.vv]
    }

    /// `[HH+VV, HH-VV, HV+VH] / sqrt2`
    pub fn pauli_vector3(&self) -> [Complex64; 3] {
        [
            (self.hh + self.vv) * FRAC_1_SQRT2,
            (self.hh - self.vv) * FRAC_1_SQRT2,
            (self.hv + self.vh) * FRAC_1_SQRT2,
        ]
    }

    pub fn lexicographic_vector4(&self) -> [Complex64; 4] {
        [self.hh, self.hv, self.vh, self.vv]
    }

    /// Pauli vector including the non-reciprocal term `j(HV-VH)/sqrt2`
    pub fn pauli_vector4(&self) -> [Complex64; 4] {
        let [k1, k2, k3] = self.pauli_vector3();
        [k1, k2, k3, Complex64::i() * (self.hv - self.vh) * FRAC_1_SQRT2]
    }

    pub fn to_c3(&self) -> Matrix3 {
        Matrix3::outer(&self.lexicographic_vector3())
    }

    pub fn to_t3(&self) -> Matrix3 {
        Matrix3::outer(&self.pauli_vector3())
    }

    pub fn to_c4(&self) -> Matrix4 {
        Matrix4::outer(&self.lexicographic_vector4())
    }

    pub fn to_t4(&self) -> Matrix4 {
        Matrix4::outer(&self.pauli_vector4())
    }
}

/// Covariance C3 to coherency T3
pub fn c3_to_t3(c: &Matrix3) -> Matrix3 {
    let mut t = Matrix3::zeros();

    t.re[0][0] = (c.re[0][0] + 2.0 * c.re[0][2] + c.re[2][2]) / 2.0;
    t.re[1][1] = (c.re[0][0] - 2.0 * c.re[0][2] + c.re[2][2]) / 2.0;
    t.re[2][2] = c.re[1][1];

    t.set_hermitian(0, 1, (c.get(0, 0) - c.get(0, 2) + c.get(2, 0) - c.get(2, 2)) * 0.5);
    t.set_hermitian(0, 2, (c.get(0, 1) + c.get(2, 1)) * FRAC_1_SQRT2);
    t.set_hermitian(1, 2, (c.get(0, 1) - c.get(2, 1)) * FRAC_1_SQRT2);
    t
}

/// Coherency T3 to covariance C3
pub fn t3_to_c3(t: &Matrix3) -> Matrix3 {
    let mut c = Matrix3::zeros();

    c.re[0][0] = 0.5 * (t.re[0][0] + 2.0 * t.re[0][1] + t.re[1][1]);
    c.re[1][1] = t.re[2][2];
    c.re[2][2] = 0.5 * (t.re[0][0] - 2.0 * t.re[0][1] + t.re[1][1]);

    c.set_hermitian(0, 1, (t.get(0, 2) + t.get(1, 2)) * FRAC_1_SQRT2);
    c.set_hermitian(0, 2, (t.get(0, 0) - t.get(0, 1) + t.get(1, 0) - t.get(1, 1)) * 0.5);
    c.set_hermitian(1, 2, (t.get(2, 0) - t.get(2, 1)) * FRAC_1_SQRT2);
    c
}

/// Unitary taking the lexicographic 4-vector to the Pauli 4-vector
fn lexicographic_to_pauli4() -> Matrix4 {
    let o = Complex64::one() * FRAC_1_SQRT2;
    let z = Complex64::zero();
    let j = Complex64::i() * FRAC_1_SQRT2;
    Matrix4::from_rows([
        [o, z, z, o],
        [o, z, z, -o],
        [z, o, o, z],
        [z, j, -j, z],
    ])
}

/// Covariance C4 to coherency T4
pub fn c4_to_t4(c: &Matrix4) -> Matrix4 {
    Matrix4::similarity(&lexicographic_to_pauli4(), c)
}

/// Coherency T4 to covariance C4
pub fn t4_to_c4(t: &Matrix4) -> Matrix4 {
    Matrix4::similarity(&lexicographic_to_pauli4().conj_transpose(), t)
}

/// Reciprocal part of T4: the upper-left 3x3 block
pub fn t4_to_t3(t: &Matrix4) -> Matrix3 {
    let mut t3 = Matrix3::zeros();
    for i in 0..3 {
        for j in 0..3 {
            t3.re[i][j] = t.re[i][j];
            t3.im[i][j] = t.im[i][j];
        }
    }
    t3
}

/// Fold the HV and VH channels of C4 into the symmetric C3 component
pub fn c4_to_c3(c: &Matrix4) -> Matrix3 {
    let mut c3 = Matrix3::zeros();

    c3.set(0, 0, c.get(0, 0));
    c3.set(0, 1, (c.get(0, 1) + c.get(0, 2)) * FRAC_1_SQRT2);
    c3.set(0, 2, c.get(0, 3));

    c3.set(1, 0, (c.get(1, 0) + c.get(2, 0)) * FRAC_1_SQRT2);
    c3.set(1, 1, (c.get(1, 1) + c.get(2, 1) + c.get(1, 2) + c.get(2, 2)) * 0.5);
    c3.set(1, 2, (c.get(1, 3) + c.get(2, 3)) * FRAC_1_SQRT2);

    c3.set(2, 0, c.get(3, 0));
    c3.set(2, 1, (c.get(3, 1) + c.get(3, 2)) * FRAC_1_SQRT2);
    c3.set(2, 2, c.get(3, 3));
    c3
}

/// Co-polarised power ratio `10*log10(<|VV|^2> / <|HH|^2>)` of a C3 matrix
pub fn co_pol_ratio_db(c: &Matrix3) -> f64 {
    10.0 * ((c.re[2][2] + crate::types::EPS) / (c.re[0][0] + crate::types::EPS)).log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_scatter() -> ScatterMatrix {
        ScatterMatrix::new(
            Complex64::new(0.8, -0.3),
            Complex64::new(0.12, 0.05),
            Complex64::new(0.1, 0.07),
            Complex64::new(-0.4, 0.6),
        )
    }

    fn sample_c3() -> Matrix3 {
        let mut c = Matrix3::diagonal([2.0, 0.6, 1.4]);
        c.set_hermitian(0, 1, Complex64::new(0.1, -0.05));
        c.set_hermitian(0, 2, Complex64::new(0.7, 0.3));
        c.set_hermitian(1, 2, Complex64::new(-0.08, 0.02));
        c
    }

    #[test]
    fn test_c3_t3_round_trip() {
        let c = sample_c3();
        let t = c3_to_t3(&c);
        assert!(t.is_hermitian(1e-12));
        assert_abs_diff_eq!(t.trace(), c.trace(), epsilon = 1e-12);
        let back = t3_to_c3(&t);
        assert!(back.max_abs_diff(&c) < 1e-12);
    }

    #[test]
    fn test_scatter_to_t3_matches_basis_conversion() {
        let s = sample_scatter();
        let via_c3 = c3_to_t3(&s.to_c3());
        assert!(via_c3.max_abs_diff(&s.to_t3()) < 1e-12);
    }

    #[test]
    fn test_c4_t4_conversions_match_scatter_vectors() {
        let s = sample_scatter();
        let t4 = c4_to_t4(&s.to_c4());
        assert!(t4.max_abs_diff(&s.to_t4()) < 1e-12);
        let c4 = t4_to_c4(&s.to_t4());
        assert!(c4.max_abs_diff(&s.to_c4()) < 1e-12);
        assert_abs_diff_eq!(s.to_c4().trace(), s.span(), epsilon = 1e-12);
    }

    #[test]
    fn test_reciprocal_reductions() {
        let s = sample_scatter();
        assert!(c4_to_c3(&s.to_c4()).max_abs_diff(&s.to_c3()) < 1e-12);
        assert!(t4_to_t3(&s.to_t4()).max_abs_diff(&s.to_t3()) < 1e-12);
    }

    #[test]
    fn test_matmul_identity_and_trace() {
        let c = sample_c3();
        let prod = c * Matrix3::identity();
        assert!(prod.max_abs_diff(&c) < 1e-15);
        assert_abs_diff_eq!((c + c).trace(), 2.0 * c.trace(), epsilon = 1e-12);
        assert_abs_diff_eq!((c - c).frobenius_norm(), 0.0, epsilon = 1e-15);
    }
}
