//! Model-free three- and four-component decompositions (MF3CF / MF4CF)
//!
//! Both rely on the 3-D Barakat degree of polarisation
//! `m = sqrt(1 - 27 det(T) / tr(T)^3)`: the polarised share `m * span` is
//! split between odd and even bounce by the scattering type parameter
//! `theta`, and the unpolarised share `(1 - m) * span` is diffuse power.
//! MF4CF additionally carves out helicity through the angle `tau`.

use crate::core::eigen::hermitian_determinant;
use crate::core::matrix::Matrix3;
use crate::types::EPS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mf3cfOutput {
    pub ps: f64,
    pub pd: f64,
    pub pv: f64,
    /// Scattering type parameter in degrees
    pub theta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mf4cfOutput {
    pub ps: f64,
    pub pd: f64,
    pub pv: f64,
    pub pc: f64,
    pub theta: f64,
    /// Helicity parameter in degrees
    pub tau: f64,
}

/// 3-D Barakat degree of polarisation of a coherency matrix
pub fn degree_of_polarization(t3: &Matrix3) -> f64 {
    let span = t3.trace();
    if span <= EPS {
        return 0.0;
    }
    let det = hermitian_determinant(t3);
    (1.0 - 27.0 * det / span.powi(3)).clamp(0.0, 1.0).sqrt()
}

/// Polarised power weighted against the T11 x (T22 + T33) product
fn weighted_angle(numerator: f64, t3: &Matrix3, m_span: f64) -> f64 {
    let denom = t3.re[0][0] * (t3.re[1][1] + t3.re[2][2]) + m_span * m_span;
    (m_span * numerator / (denom + EPS)).atan()
}

pub fn mf3cf(t3: &Matrix3) -> Mf3cfOutput {
    let span = t3.trace();
    let m = degree_of_polarization(t3);
    let m_span = m * span;

    let theta = weighted_angle(t3.re[0][0] - t3.re[1][1] - t3.re[2][2], t3, m_span);
    let sin2 = (2.0 * theta).sin();

    Mf3cfOutput {
        ps: m_span * (1.0 + sin2) / 2.0,
        pd: m_span * (1.0 - sin2) / 2.0,
        pv: span * (1.0 - m),
        theta: theta.to_degrees(),
    }
}

pub fn mf4cf(t3: &Matrix3) -> Mf4cfOutput {
    let span = t3.trace();
    let m = degree_of_polarization(t3);
    let m_span = m * span;

    let theta = weighted_angle(t3.re[0][0] - t3.re[1][1] - t3.re[2][2], t3, m_span);
    let tau = weighted_angle(2.0 * t3.im[1][2].abs(), t3, m_span);

    let pc = m_span * (2.0 * tau).sin();
    let sin2 = (2.0 * theta).sin();

    Mf4cfOutput {
        ps: (m_span - pc) * (1.0 + sin2) / 2.0,
        pd: (m_span - pc) * (1.0 - sin2) / 2.0,
        pv: span * (1.0 - m),
        pc,
        theta: theta.to_degrees(),
        tau: tau.to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::ScatterMatrix;
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64;

    fn sample_t3() -> Matrix3 {
        let mut t = Matrix3::diagonal([2.2, 1.1, 0.6]);
        t.set_hermitian(0, 1, Complex64::new(0.3, 0.1));
        t.set_hermitian(1, 2, Complex64::new(0.05, -0.2));
        t
    }

    #[test]
    fn test_degree_of_polarization_extremes() {
        assert_abs_diff_eq!(
            degree_of_polarization(&Matrix3::identity()),
            0.0,
            epsilon = 1e-6
        );
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let t = ScatterMatrix::new(one, zero, zero, one).to_t3();
        assert_abs_diff_eq!(degree_of_polarization(&t), 1.0, epsilon = 1e-9);
        assert_eq!(degree_of_polarization(&Matrix3::zeros()), 0.0);
    }

    #[test]
    fn test_mf3cf_conserves_power() {
        let t = sample_t3();
        let out = mf3cf(&t);
        assert_abs_diff_eq!(out.ps + out.pd + out.pv, t.trace(), epsilon = 1e-9);
        assert!(out.theta > -45.0 && out.theta < 90.0);
    }

    #[test]
    fn test_mf4cf_conserves_power() {
        let t = sample_t3();
        let out = mf4cf(&t);
        assert_abs_diff_eq!(out.ps + out.pd + out.pv + out.pc, t.trace(), epsilon = 1e-9);
        assert!(out.pc > 0.0);
        assert!(out.tau > 0.0);
    }

    #[test]
    fn test_trihedral_is_all_surface() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let t = ScatterMatrix::new(one, zero, zero, one).to_t3();
        let out = mf3cf(&t);
        assert_abs_diff_eq!(out.theta, 45.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.ps, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.pd, 0.0, epsilon = 1e-6);
    }
}
