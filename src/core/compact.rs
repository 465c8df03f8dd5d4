//! Compact polarimetry
//!
//! A compact-pol system transmits one polarisation and receives two
//! orthogonal ones, so each pixel carries a 2x1 scattering vector instead
//! of a full scattering matrix. Vectors come either from a compact-pol
//! product (RH/RV bands) or are simulated from quad-pol data.

use crate::core::matrix::{Matrix2, ScatterMatrix};
use crate::types::{PolSarError, EPS};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const FRAC_1_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Transmit/receive configuration of a simulated compact-pol acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompactMode {
    /// Linear transmit at 45 degrees, H/V receive
    QuarterPi,
    /// Right circular transmit, H/V receive
    RightCircularHybrid,
    /// Left circular transmit, H/V receive
    LeftCircularHybrid,
    /// Right circular transmit, right/left circular receive
    DualCircular,
    DualHhHv,
    DualVvVh,
}

impl CompactMode {
    /// Simulated 2x1 scattering vector of a quad-pol pixel
    pub fn scatter_vector(&self, s: &ScatterMatrix) -> [Complex64; 2] {
        let j = Complex64::i();
        match self {
            CompactMode::QuarterPi => transmit(s, Complex64::new(1.0, 0.0)),
            CompactMode::RightCircularHybrid => transmit(s, -j),
            CompactMode::LeftCircularHybrid => transmit(s, j),
            CompactMode::DualCircular => {
                let [h, v] = transmit(s, -j);
                [(h - j * v) * FRAC_1_SQRT2, (h + j * v) * FRAC_1_SQRT2]
            }
            CompactMode::DualHhHv => [s.hh, s.hv],
            CompactMode::DualVvVh => [s.vh, s.vv],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompactMode::QuarterPi => "PI/4",
            CompactMode::RightCircularHybrid => "RCH",
            CompactMode::LeftCircularHybrid => "LCH",
            CompactMode::DualCircular => "DCP",
            CompactMode::DualHhHv => "HH/HV",
            CompactMode::DualVvVh => "VV/VH",
        }
    }
}

/// Received H/V vector for transmit Jones vector `(1, v) / sqrt2`
fn transmit(s: &ScatterMatrix, v: Complex64) -> [Complex64; 2] {
    [
        (s.hh + s.hv * v) * FRAC_1_SQRT2,
        (s.vh + s.vv * v) * FRAC_1_SQRT2,
    ]
}

/// Covariance matrix `k k^H` of one compact-pol scattering vector
pub fn covariance_c2(k: &[Complex64; 2]) -> Matrix2 {
    Matrix2::outer(k)
}

impl fmt::Display for CompactMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompactMode {
    type Err = PolSarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "pi4" | "pi4mode" | "quarterpi" => Ok(CompactMode::QuarterPi),
            "rch" | "rightcircularhybrid" | "rightcircularhybridmode" => {
                Ok(CompactMode::RightCircularHybrid)
            }
            "lch" | "leftcircularhybrid" | "leftcircularhybridmode" => {
                Ok(CompactMode::LeftCircularHybrid)
            }
            "dcp" | "dualcircular" | "dualcircularpolarimetricmode" => {
                Ok(CompactMode::DualCircular)
            }
            "hhhv" | "dualhhhv" => Ok(CompactMode::DualHhHv),
            "vvvh" | "dualvvvh" => Ok(CompactMode::DualVvVh),
            _ => Err(PolSarError::InvalidConfig(format!(
                "Unknown compact-pol mode: {}",
                s
            ))),
        }
    }
}

/// Stokes vector `[g0, g1, g2, g3]` of the received wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StokesVector(pub [f64; 4]);

impl StokesVector {
    pub fn from_c2(c: &Matrix2) -> Self {
        Self([
            c.re[0][0] + c.re[1][1],
            c.re[0][0] - c.re[1][1],
            2.0 * c.re[0][1],
            -2.0 * c.im[0][1],
        ])
    }

    pub fn from_vector(k: &[Complex64; 2]) -> Self {
        Self::from_c2(&covariance_c2(k))
    }

    /// `sqrt(g1² + g2² + g3²) / g0`, `None` for a wave without power
    pub fn degree_of_polarization(&self) -> Option<f64> {
        let [g0, g1, g2, g3] = self.0;
        if g0 <= EPS {
            return None;
        }
        Some((g1 * g1 + g2 * g2 + g3 * g3).sqrt() / g0)
    }

    pub fn parameters(&self) -> Option<StokesParameters> {
        let [g0, g1, g2, g3] = self.0;
        let m = self.degree_of_polarization()?;

        let circularity = if m * g0 > EPS {
            (-g3 / (g0 * m)).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let relative_phase = if g2 == 0.0 && g3 == 0.0 {
            0.0
        } else {
            (g3 / g2).atan()
        };

        Some(StokesParameters {
            degree_of_polarization: m,
            degree_of_depolarization: 1.0 - m,
            degree_of_circularity: circularity,
            degree_of_ellipticity: (0.5 * circularity.asin()).tan(),
            circular_polarization_ratio: (g0 - g3) / (g0 + g3 + EPS),
            linear_polarization_ratio: (g0 - g1) / (g0 + g1 + EPS),
            relative_phase: relative_phase.to_degrees(),
        })
    }
}

/// Child parameters of a compact-pol Stokes vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StokesParameters {
    pub degree_of_polarization: f64,
    pub degree_of_depolarization: f64,
    pub degree_of_circularity: f64,
    pub degree_of_ellipticity: f64,
    pub circular_polarization_ratio: f64,
    pub linear_polarization_ratio: f64,
    /// Degrees
    pub relative_phase: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn sphere() -> ScatterMatrix {
        ScatterMatrix::new(c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0))
    }

    #[test]
    fn test_hybrid_modes_match_jones_products() {
        let s = ScatterMatrix::new(c(0.8, 0.1), c(0.2, -0.3), c(0.2, -0.3), c(-0.4, 0.5));
        let k = CompactMode::RightCircularHybrid.scatter_vector(&s);
        // (S_HH - j S_HV) / sqrt2, written out in real and imaginary parts
        assert_abs_diff_eq!(k[0].re, (0.8 + -0.3) * FRAC_1_SQRT2, epsilon = 1e-12);
        assert_abs_diff_eq!(k[0].im, (0.1 - 0.2) * FRAC_1_SQRT2, epsilon = 1e-12);
        assert_abs_diff_eq!(k[1].re, (0.2 + 0.5) * FRAC_1_SQRT2, epsilon = 1e-12);
        assert_abs_diff_eq!(k[1].im, (-0.3 + 0.4) * FRAC_1_SQRT2, epsilon = 1e-12);

        let k = CompactMode::QuarterPi.scatter_vector(&s);
        assert_abs_diff_eq!(k[0].re, 1.0 * FRAC_1_SQRT2, epsilon = 1e-12);
        assert_abs_diff_eq!(k[1].im, 0.2 * FRAC_1_SQRT2, epsilon = 1e-12);
    }

    #[test]
    fn test_circular_receive_basis_keeps_power() {
        let s = ScatterMatrix::new(c(0.8, 0.1), c(0.2, -0.3), c(0.2, -0.3), c(-0.4, 0.5));
        let power = |k: [Complex64; 2]| k[0].norm_sqr() + k[1].norm_sqr();
        assert_abs_diff_eq!(
            power(CompactMode::DualCircular.scatter_vector(&s)),
            power(CompactMode::RightCircularHybrid.scatter_vector(&s)),
            epsilon = 1e-12
        );
        for mode in [
            CompactMode::QuarterPi,
            CompactMode::LeftCircularHybrid,
            CompactMode::DualHhHv,
            CompactMode::DualVvVh,
        ] {
            let k = mode.scatter_vector(&s);
            assert!(covariance_c2(&k).is_hermitian(1e-12), "{}", mode);
        }
    }

    #[test]
    fn test_sphere_returns_opposite_sense_in_dual_circular() {
        let k = CompactMode::DualCircular.scatter_vector(&sphere());
        assert_abs_diff_eq!(k[0].norm_sqr(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(k[1].norm_sqr(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stokes_of_pure_circular_wave() {
        let k = CompactMode::RightCircularHybrid.scatter_vector(&sphere());
        let g = StokesVector::from_vector(&k);
        assert_abs_diff_eq!(g.0[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(g.0[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(g.0[2], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(g.0[3].abs(), 1.0, epsilon = 1e-12);

        let p = g.parameters().unwrap();
        assert_abs_diff_eq!(p.degree_of_polarization, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.degree_of_depolarization, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.degree_of_circularity.abs(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.relative_phase.abs(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_depolarized_wave() {
        let g = StokesVector::from_c2(&Matrix2::diagonal([1.0, 1.0]));
        let p = g.parameters().unwrap();
        assert_eq!(p.degree_of_polarization, 0.0);
        assert_eq!(p.degree_of_circularity, 0.0);
        assert_eq!(p.relative_phase, 0.0);
        assert_abs_diff_eq!(p.linear_polarization_ratio, 1.0, epsilon = 1e-12);

        assert!(StokesVector::from_c2(&Matrix2::zeros()).parameters().is_none());
    }

    #[test]
    fn test_mode_names_parse() {
        assert_eq!("RCH".parse::<CompactMode>().unwrap(), CompactMode::RightCircularHybrid);
        assert_eq!("PI/4 Mode".parse::<CompactMode>().unwrap(), CompactMode::QuarterPi);
        assert_eq!(
            "Dual Circular Polarimetric Mode".parse::<CompactMode>().unwrap(),
            CompactMode::DualCircular
        );
        assert!("hybrid".parse::<CompactMode>().is_err());
    }
}
