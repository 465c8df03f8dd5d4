//! Huynen phenomenological parameters
//!
//! The coherency matrix is written as
//!
//! ```text
//!     | 2A0     C - iD     H + iG |
//! T = | C + iD  B0 + B     E + iF |
//!     | H - iG  E - iF     B0 - B |
//! ```
//!
//! A pure (rank-1) target satisfies Huynen's structural equations, which
//! fix `B0`, `B`, `E` and `F` from `A0`, `C`, `D`, `G` and `H`. Whatever is
//! left over is the distributed N-target.

use crate::core::matrix::Matrix3;
use crate::types::EPS;
use num_complex::Complex64;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HuynenParameters {
    pub a0: f64,
    pub b0: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub g: f64,
    pub h: f64,
}

impl HuynenParameters {
    pub fn from_t3(t: &Matrix3) -> Self {
        Self {
            a0: t.re[0][0] / 2.0,
            b0: (t.re[1][1] + t.re[2][2]) / 2.0,
            b: (t.re[1][1] - t.re[2][2]) / 2.0,
            c: t.re[0][1],
            d: -t.im[0][1],
            e: t.re[1][2],
            f: t.im[1][2],
            g: t.im[0][2],
            h: t.re[0][2],
        }
    }

    pub fn to_t3(&self) -> Matrix3 {
        let mut t = Matrix3::diagonal([2.0 * self.a0, self.b0 + self.b, self.b0 - self.b]);
        t.set_hermitian(0, 1, Complex64::new(self.c, -self.d));
        t.set_hermitian(0, 2, Complex64::new(self.h, self.g));
        t.set_hermitian(1, 2, Complex64::new(self.e, self.f));
        t
    }

    /// Output order `A0, B0, B, C, D, E, F, G, H`
    pub fn to_array(&self) -> [f64; 9] {
        [
            self.a0, self.b0, self.b, self.c, self.d, self.e, self.f, self.g, self.h,
        ]
    }

    /// Real 4x4 Kennaugh matrix
    pub fn kennaugh(&self) -> [[f64; 4]; 4] {
        [
            [self.a0 + self.b0, self.c, self.h, self.f],
            [self.c, self.a0 + self.b, self.e, self.g],
            [self.h, self.e, self.a0 - self.b, self.d],
            [self.f, self.g, self.d, self.b0 - self.a0],
        ]
    }

    /// Rank-1 Huynen target sharing `A0`, `C`, `D`, `G` and `H`
    pub fn target(&self) -> Self {
        let a0 = self.a0;
        let denom = 4.0 * a0 + EPS;
        let (c2, d2, g2, h2) = (
            self.c * self.c,
            self.d * self.d,
            self.g * self.g,
            self.h * self.h,
        );
        Self {
            a0,
            b0: (c2 + d2 + g2 + h2) / denom,
            b: (c2 + d2 - g2 - h2) / denom,
            c: self.c,
            d: self.d,
            e: 2.0 * (self.c * self.h - self.d * self.g) / denom,
            f: 2.0 * (self.c * self.g + self.d * self.h) / denom,
            g: self.g,
            h: self.h,
        }
    }

    /// Distributed remainder `T - T0`
    pub fn n_target(&self) -> Self {
        let t0 = self.target();
        Self {
            a0: 0.0,
            b0: self.b0 - t0.b0,
            b: self.b - t0.b,
            c: 0.0,
            d: 0.0,
            e: self.e - t0.e,
            f: self.f - t0.f,
            g: 0.0,
            h: 0.0,
        }
    }
}
