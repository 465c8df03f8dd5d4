//! van Zyl non-negative eigenvalue decomposition
//!
//! The volume model is picked from the co-polarised power ratio, scaled as
//! far as the data allows without producing negative powers, and removed.
//! The co-polarised remainder is split by a 2x2 eigen-analysis: eigenvectors
//! whose HH and VV components are in phase are odd-bounce (surface),
//! the others even-bounce.

use super::ScatteringPowers;
use crate::core::eigen::eigen_decomposition;
use crate::core::matrix::{co_pol_ratio_db, Matrix2, Matrix3};
use crate::types::EPS;

/// Ratio thresholds (dB) between the three volume models
const RATIO_THRESHOLD_DB: f64 = 2.0;

/// Normalised volume covariance `[C11, C22, C33, Re C13]`
fn volume_model(ratio_db: f64) -> [f64; 4] {
    if ratio_db < -RATIO_THRESHOLD_DB {
        [8.0 / 15.0, 4.0 / 15.0, 3.0 / 15.0, 2.0 / 15.0]
    } else if ratio_db > RATIO_THRESHOLD_DB {
        [3.0 / 15.0, 4.0 / 15.0, 8.0 / 15.0, 2.0 / 15.0]
    } else {
        [3.0 / 8.0, 2.0 / 8.0, 3.0 / 8.0, 1.0 / 8.0]
    }
}

pub fn van_zyl(c3: &Matrix3) -> ScatteringPowers {
    let span = c3.trace();
    if span <= EPS {
        return ScatteringPowers::default();
    }

    let [v11, v22, v33, v13] = volume_model(co_pol_ratio_db(c3));
    let fv = (c3.re[1][1] / v22)
        .min(c3.re[0][0] / v11)
        .min(c3.re[2][2] / v33)
        .max(0.0);

    // Cross-polarised power the volume model could not absorb stays volume
    let residual_cross = c3.re[1][1] - fv * v22;
    let pv = fv * (v11 + v22 + v33) + residual_cross;

    let mut remainder = Matrix2::diagonal([c3.re[0][0] - fv * v11, c3.re[2][2] - fv * v33]);
    let mut c13 = c3.get(0, 2);
    c13.re -= fv * v13;
    remainder.set_hermitian(0, 1, c13);

    let eig = eigen_decomposition(&remainder);
    let first = eig.vector(0);
    let odd_first = (first[0] * first[1].conj()).re >= 0.0;

    let (ps, pd) = if odd_first {
        (eig.values[0], eig.values[1])
    } else {
        (eig.values[1], eig.values[0])
    };

    ScatteringPowers { ps, pd, pv }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::ScatterMatrix;
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64;

    #[test]
    fn test_volume_model_selection() {
        assert_eq!(volume_model(-5.0)[0], 8.0 / 15.0);
        assert_eq!(volume_model(5.0)[2], 8.0 / 15.0);
        assert_eq!(volume_model(0.0)[1], 0.25);
    }

    #[test]
    fn test_conserves_power() {
        let mut c = Matrix3::diagonal([2.0, 0.6, 1.4]);
        c.set_hermitian(0, 1, Complex64::new(0.02, 0.01));
        c.set_hermitian(0, 2, Complex64::new(0.5, -0.3));
        c.set_hermitian(1, 2, Complex64::new(-0.03, 0.02));
        let p = van_zyl(&c);
        assert_abs_diff_eq!(p.total(), c.trace(), epsilon = 1e-9);
        assert!(p.pv > 0.0);
    }

    #[test]
    fn test_trihedral_is_surface() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let mut c = ScatterMatrix::new(one, zero, zero, one).to_c3();
        // Small diffuse background
        c += Matrix3::diagonal([0.01, 0.02, 0.01]);
        let p = van_zyl(&c);
        assert!(p.ps > 10.0 * p.pd);
        assert_abs_diff_eq!(p.total(), c.trace(), epsilon = 1e-9);
    }

    #[test]
    fn test_dihedral_is_double_bounce() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let mut c = ScatterMatrix::new(one, zero, zero, -one).to_c3();
        c += Matrix3::diagonal([0.01, 0.02, 0.01]);
        let p = van_zyl(&c);
        assert!(p.pd > 10.0 * p.ps);
    }
}
