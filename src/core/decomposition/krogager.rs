//! Krogager sphere / diplane / helix decomposition

use crate::core::matrix::Matrix3;

/// Amplitudes of the sphere, diplane and helix components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KrogagerComponents {
    pub ks: f64,
    pub kd: f64,
    pub kh: f64,
}

pub fn krogager(t3: &Matrix3) -> KrogagerComponents {
    let a0 = t3.re[0][0] / 2.0;
    let b0 = (t3.re[1][1] + t3.re[2][2]) / 2.0;
    let f = t3.im[1][2].abs();

    let lower = (b0 - f).max(0.0).sqrt();
    let upper = (b0 + f).max(0.0).sqrt();

    KrogagerComponents {
        ks: a0.max(0.0).sqrt(),
        kd: lower,
        kh: upper - lower,
    }
}
