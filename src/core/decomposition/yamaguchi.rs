//! Yamaguchi four-component decomposition
//!
//! Adds a helix term to the Freeman-Durden model and chooses between a
//! symmetric and two asymmetric dipole-cloud volume models from the
//! co-polarised power ratio.

use crate::core::matrix::{co_pol_ratio_db, t3_to_c3, Matrix3};
use crate::types::EPS;

const RATIO_THRESHOLD_DB: f64 = 2.0;

/// Surface, double-bounce, volume and helix powers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FourComponentPowers {
    pub ps: f64,
    pub pd: f64,
    pub pv: f64,
    pub pc: f64,
}

impl FourComponentPowers {
    pub fn total(&self) -> f64 {
        self.ps + self.pd + self.pv + self.pc
    }
}

pub fn yamaguchi(t3: &Matrix3) -> FourComponentPowers {
    let span = t3.trace();
    let pc = (2.0 * t3.im[1][2].abs()).min(span);
    let ratio_db = co_pol_ratio_db(&t3_to_c3(t3));

    // Normalised volume coherency: T11, T22 and Re T12 (T33 = 1 - T11 - T22)
    let (mut fv, v11, v22, v12) = if ratio_db.abs() <= RATIO_THRESHOLD_DB {
        (4.0 * t3.re[2][2] - 2.0 * pc, 0.5, 0.25, 0.0)
    } else {
        let v12 = if ratio_db < 0.0 { 1.0 / 6.0 } else { -1.0 / 6.0 };
        (15.0 / 8.0 * (2.0 * t3.re[2][2] - pc), 0.5, 7.0 / 30.0, v12)
    };
    if fv < 0.0 {
        fv = 0.0;
    }
    if fv + pc > span {
        fv = span - pc;
    }

    let s = t3.re[0][0] - fv * v11;
    let d = t3.re[1][1] - fv * v22 - pc / 2.0;
    let mut c = t3.get(0, 1);
    c.re -= fv * v12;
    let coupling = c.norm_sqr();

    let c0 = t3.re[0][0] - t3.re[1][1] - t3.re[2][2] + pc;
    let (mut ps, mut pd) = if c0 > 0.0 {
        let s = s.max(EPS);
        (s + coupling / s, d - coupling / s)
    } else {
        let d = d.max(EPS);
        (s - coupling / d, d + coupling / d)
    };

    let remainder = span - fv - pc;
    if ps < 0.0 {
        ps = 0.0;
        pd = remainder;
    }
    if pd < 0.0 {
        pd = 0.0;
        ps = remainder;
    }

    FourComponentPowers {
        ps: ps.max(0.0),
        pd: pd.max(0.0),
        pv: fv,
        pc,
    }
}
