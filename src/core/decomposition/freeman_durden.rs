//! Freeman-Durden three-component decompositions
//!
//! Both variants remove a randomly oriented dipole cloud first and split the
//! remainder between a surface and a double-bounce scatterer.

use super::ScatteringPowers;
use crate::core::matrix::Matrix3;
use crate::types::EPS;
use num_complex::Complex64;

/// Classic model fit on the covariance matrix
///
/// The sign of `Re(C13)` after volume removal decides which mechanism is
/// dominant: surface (alpha fixed to -1) or double bounce (beta fixed to 1).
pub fn freeman_durden(c3: &Matrix3) -> ScatteringPowers {
    let span = c3.trace();
    let fv = 1.5 * c3.re[1][1];

    let c11 = c3.re[0][0] - fv;
    let c33 = c3.re[2][2] - fv;
    let c13 = c3.get(0, 2) - Complex64::new(fv / 3.0, 0.0);

    // Volume explains all co-polarised power
    if c11 <= EPS || c33 <= EPS {
        return ScatteringPowers::all_volume(span);
    }

    let remainder = c11 + c33;
    let det = c11 * c33 - c13.norm_sqr();
    let pv = 8.0 * fv / 3.0;

    let (ps, pd) = if c13.re >= 0.0 {
        let denom = c11 + c33 + 2.0 * c13.re;
        let fd = if denom > EPS { det / denom } else { 0.0 };
        let fs = c33 - fd;
        if fs <= EPS {
            (0.0, remainder)
        } else {
            let beta = (c13 + fd) / fs;
            (fs * (1.0 + beta.norm_sqr()), 2.0 * fd)
        }
    } else {
        let denom = c11 + c33 - 2.0 * c13.re;
        let fs = if denom > EPS { det / denom } else { 0.0 };
        let fd = c33 - fs;
        if fd <= EPS {
            (remainder, 0.0)
        } else {
            let alpha = (c13 - fs) / fd;
            (2.0 * fs, fd * (1.0 + alpha.norm_sqr()))
        }
    };

    ScatteringPowers { ps, pd, pv }
}

/// Generalised model on the coherency matrix
///
/// The volume term `mv = T33` contributes `mv * diag(2, 1, 1)`. The 2x2
/// remainder in the (T11, T22) plane is solved through its characteristic
/// quadratic; the root aligned with the T11 axis is surface scattering.
pub fn generalized_freeman_durden(t3: &Matrix3) -> ScatteringPowers {
    let span = t3.trace();
    let mv = t3.re[2][2];

    let a = t3.re[0][0] - 2.0 * mv;
    let b = t3.re[1][1] - mv;
    if a < 0.0 || b < 0.0 {
        return ScatteringPowers::all_volume(span);
    }

    let coupling = t3.get(0, 1).norm_sqr();
    let mean = (a + b) / 2.0;
    let spread = (((a - b) / 2.0).powi(2) + coupling).sqrt();
    let (upper, lower) = (mean + spread, mean - spread);

    let (ps, pd) = if a >= b { (upper, lower) } else { (lower, upper) };

    ScatteringPowers {
        ps,
        pd,
        pv: 4.0 * mv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pure_volume() {
        // C3 of a random dipole cloud with fv = 3
        let mut c = Matrix3::diagonal([3.0, 2.0, 3.0]);
        c.set_hermitian(0, 2, Complex64::new(1.0, 0.0));
        let p = freeman_durden(&c);
        assert_abs_diff_eq!(p.pv, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.total(), c.trace(), epsilon = 1e-12);
        assert!(p.ps.abs() < 1e-9 || p.pd.abs() < 1e-9);
    }

    #[test]
    fn test_surface_dominant_fit() {
        // fs = 2 with beta = 0.5, fd = 0.5 with alpha = -1, fv = 0.6
        let fs = 2.0;
        let beta = 0.5;
        let fd = 0.5;
        let fv = 0.6;
        let mut c = Matrix3::diagonal([
            fs * beta * beta + fd + fv,
            2.0 * fv / 3.0,
            fs + fd + fv,
        ]);
        c.set_hermitian(0, 2, Complex64::new(fs * beta - fd + fv / 3.0, 0.0));

        let p = freeman_durden(&c);
        assert_abs_diff_eq!(p.ps, fs * (1.0 + beta * beta), epsilon = 1e-9);
        assert_abs_diff_eq!(p.pd, 2.0 * fd, epsilon = 1e-9);
        assert_abs_diff_eq!(p.pv, 8.0 * fv / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.total(), c.trace(), epsilon = 1e-9);
    }

    #[test]
    fn test_double_bounce_dominant_fit() {
        let fs = 0.4;
        let fd = 3.0;
        let alpha = Complex64::new(-0.6, 0.2);
        let fv = 0.3;
        let mut c = Matrix3::diagonal([
            fs + fd * alpha.norm_sqr() + fv,
            2.0 * fv / 3.0,
            fs + fd + fv,
        ]);
        c.set_hermitian(0, 2, alpha * fd + fs + fv / 3.0);

        let p = freeman_durden(&c);
        assert_abs_diff_eq!(p.ps, 2.0 * fs, epsilon = 1e-9);
        assert_abs_diff_eq!(p.pd, fd * (1.0 + alpha.norm_sqr()), epsilon = 1e-9);
        assert_abs_diff_eq!(p.total(), c.trace(), epsilon = 1e-9);
    }

    #[test]
    fn test_generalized_conserves_power() {
        let mut t = Matrix3::diagonal([3.0, 1.5, 0.4]);
        t.set_hermitian(0, 1, Complex64::new(0.3, -0.2));
        t.set_hermitian(1, 2, Complex64::new(0.05, 0.1));
        let p = generalized_freeman_durden(&t);
        assert_abs_diff_eq!(p.pv, 1.6, epsilon = 1e-12);
        assert_abs_diff_eq!(p.total(), t.trace(), epsilon = 1e-12);
        assert!(p.ps > p.pd);
    }

    #[test]
    fn test_generalized_volume_only() {
        let t = Matrix3::diagonal([1.0, 1.0, 1.0]);
        let p = generalized_freeman_durden(&t);
        assert_eq!(p, ScatteringPowers::all_volume(3.0));
    }
}
