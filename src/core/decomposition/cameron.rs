//! Cameron coherent target classification
//!
//! Works on the scattering matrix of a single pixel. The Pauli components
//! are rotated to maximise the symmetric part; the angle `tau` between the
//! scattering matrix and its symmetric part separates symmetric from
//! asymmetric targets. Symmetric targets are normalised to `diag(1, z)` and
//! matched against canonical scatterers by the Cameron distance.

use crate::core::matrix::ScatterMatrix;
use crate::types::EPS;
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameronClass {
    Asymmetric,
    Trihedral,
    Dihedral,
    Dipole,
    Cylinder,
    NarrowDiplane,
    QuarterWave,
    /// Symmetric, but no canonical scatterer within pi/4
    Symmetric,
}

impl CameronClass {
    /// Value written to the class band
    pub fn index(&self) -> u8 {
        match self {
            CameronClass::Asymmetric => 1,
            CameronClass::Trihedral => 2,
            CameronClass::Dihedral => 3,
            CameronClass::Dipole => 4,
            CameronClass::Cylinder => 5,
            CameronClass::NarrowDiplane => 6,
            CameronClass::QuarterWave => 7,
            CameronClass::Symmetric => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameronResult {
    pub class: CameronClass,
    /// Symmetry angle in degrees
    pub tau: f64,
}

/// Canonical symmetric scatterers as `z` in `diag(1, z)`
fn canonical_targets() -> [(CameronClass, Complex64); 7] {
    [
        (CameronClass::Trihedral, Complex64::new(1.0, 0.0)),
        (CameronClass::Dihedral, Complex64::new(-1.0, 0.0)),
        (CameronClass::Dipole, Complex64::new(0.0, 0.0)),
        (CameronClass::Cylinder, Complex64::new(0.5, 0.0)),
        (CameronClass::NarrowDiplane, Complex64::new(-0.5, 0.0)),
        (CameronClass::QuarterWave, Complex64::new(0.0, 1.0)),
        (CameronClass::QuarterWave, Complex64::new(0.0, -1.0)),
    ]
}

/// Angle between the normalised targets `diag(1, z1)` and `diag(1, z2)`
pub fn cameron_distance(z1: Complex64, z2: Complex64) -> f64 {
    let num = (Complex64::new(1.0, 0.0) + z1.conj() * z2).norm();
    let den = ((1.0 + z1.norm_sqr()) * (1.0 + z2.norm_sqr())).sqrt();
    (num / den).min(1.0).acos()
}

pub fn cameron(s: &ScatterMatrix) -> CameronResult {
    let span = s.span();
    if span <= EPS {
        return CameronResult {
            class: CameronClass::Symmetric,
            tau: 0.0,
        };
    }

    let alpha = (s.hh + s.vv) * FRAC_1_SQRT_2;
    let beta = (s.hh - s.vv) * FRAC_1_SQRT_2;
    let gamma = (s.hv + s.vh) * FRAC_1_SQRT_2;

    // Orientation maximising |beta cos 2t + gamma sin 2t|
    let two_theta = 0.5
        * (2.0 * (beta * gamma.conj()).re).atan2(beta.norm_sqr() - gamma.norm_sqr());
    let beta_rot = beta * two_theta.cos() + gamma * two_theta.sin();

    let symmetric_norm = (alpha.norm_sqr() + beta_rot.norm_sqr()).sqrt();
    let tau = (symmetric_norm / span.sqrt()).min(1.0).acos();

    if tau > FRAC_PI_4 {
        return CameronResult {
            class: CameronClass::Asymmetric,
            tau: tau.to_degrees(),
        };
    }

    // Symmetric part in its principal frame: diag(a, b)
    let a = (alpha + beta_rot) * FRAC_1_SQRT_2;
    let b = (alpha - beta_rot) * FRAC_1_SQRT_2;
    let z = if a.norm() >= b.norm() {
        if a.norm() <= EPS {
            Complex64::new(0.0, 0.0)
        } else {
            b / a
        }
    } else {
        a / b
    };

    let (class, distance) = canonical_targets()
        .iter()
        .map(|(class, z2)| (*class, cameron_distance(z, *z2)))
        .fold((CameronClass::Symmetric, f64::INFINITY), |best, item| {
            if item.1 < best.1 {
                item
            } else {
                best
            }
        });

    CameronResult {
        class: if distance > FRAC_PI_4 {
            CameronClass::Symmetric
        } else {
            class
        },
        tau: tau.to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn scatter(hh: f64, hv: f64, vh: f64, vv: f64) -> ScatterMatrix {
        ScatterMatrix::new(
            Complex64::new(hh, 0.0),
            Complex64::new(hv, 0.0),
            Complex64::new(vh, 0.0),
            Complex64::new(vv, 0.0),
        )
    }

    #[test]
    fn test_canonical_targets() {
        let r = cameron(&scatter(1.0, 0.0, 0.0, 1.0));
        assert_eq!(r.class, CameronClass::Trihedral);
        assert_abs_diff_eq!(r.tau, 0.0, epsilon = 1e-6);

        assert_eq!(cameron(&scatter(1.0, 0.0, 0.0, -1.0)).class, CameronClass::Dihedral);
        assert_eq!(cameron(&scatter(1.0, 0.0, 0.0, 0.0)).class, CameronClass::Dipole);
        assert_eq!(cameron(&scatter(0.0, 0.0, 0.0, 2.0)).class, CameronClass::Dipole);
        assert_eq!(cameron(&scatter(1.0, 0.0, 0.0, 0.5)).class, CameronClass::Cylinder);
    }

    #[test]
    fn test_rotated_dihedral() {
        // Dihedral rotated by 22.5 degrees keeps its class
        let (c, s) = ((std::f64::consts::PI / 4.0).cos(), (std::f64::consts::PI / 4.0).sin());
        let r = cameron(&scatter(c, s, s, -c));
        assert_eq!(r.class, CameronClass::Dihedral);
    }

    #[test]
    fn test_antisymmetric_target() {
        let r = cameron(&scatter(0.0, 1.0, -1.0, 0.0));
        assert_eq!(r.class, CameronClass::Asymmetric);
        assert_abs_diff_eq!(r.tau, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_distance_properties() {
        let z = Complex64::new(0.3, -0.2);
        assert_abs_diff_eq!(cameron_distance(z, z), 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(
            cameron_distance(Complex64::new(1.0, 0.0), Complex64::new(-1.0, 0.0)),
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_class_indices_are_distinct() {
        let mut indices: Vec<u8> = canonical_targets().iter().map(|(c, _)| c.index()).collect();
        indices.extend([CameronClass::Asymmetric.index(), CameronClass::Symmetric.index()]);
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 8);
    }
}
