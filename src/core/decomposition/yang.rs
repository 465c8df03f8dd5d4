//! Yang's adaptive Huynen decomposition
//!
//! Huynen's target extraction divides by `A0` and breaks down when the
//! symmetric part of the target is weak. Yang's approach keeps the direct
//! extraction when `A0` carries a reasonable share of the power and
//! otherwise re-expresses the matrix in a rotated Pauli basis (R1 exchanges
//! the first two Pauli components, R2 the first and third), extracts the
//! target there, and rotates it back. Between R1 and R2 the rotation whose
//! target Kennaugh matrix holds more total power wins.

use super::huynen::HuynenParameters;
use crate::core::matrix::Matrix3;

/// Share of `K[0][0]` that `A0` must exceed for the direct extraction
const DIRECT_A0_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YangBranch {
    Direct,
    R1,
    R2,
}

impl YangBranch {
    /// Pauli components exchanged by the rotation
    fn swapped_axes(&self) -> Option<(usize, usize)> {
        match self {
            YangBranch::Direct => None,
            YangBranch::R1 => Some((0, 1)),
            YangBranch::R2 => Some((0, 2)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YangDecomposition {
    pub branch: YangBranch,
    /// Huynen parameters of the extracted target in the unrotated basis
    pub target: HuynenParameters,
}

pub fn yang(t3: &Matrix3) -> YangDecomposition {
    let params = HuynenParameters::from_t3(t3);
    let k = params.kennaugh();

    if params.a0 > DIRECT_A0_FRACTION * k[0][0] {
        return YangDecomposition {
            branch: YangBranch::Direct,
            target: params.target(),
        };
    }

    let r1 = rotated_target(t3, YangBranch::R1);
    let r2 = rotated_target(t3, YangBranch::R2);
    let (branch, rotated) = if r1.kennaugh()[0][0] >= r2.kennaugh()[0][0] {
        (YangBranch::R1, r1)
    } else {
        (YangBranch::R2, r2)
    };

    // The exchange is its own inverse
    let target_t3 = match branch.swapped_axes() {
        Some((a, b)) => swap_axes(&rotated.to_t3(), a, b),
        None => rotated.to_t3(),
    };

    YangDecomposition {
        branch,
        target: HuynenParameters::from_t3(&target_t3),
    }
}

fn rotated_target(t3: &Matrix3, branch: YangBranch) -> HuynenParameters {
    let rotated = match branch.swapped_axes() {
        Some((a, b)) => swap_axes(t3, a, b),
        None => *t3,
    };
    HuynenParameters::from_t3(&rotated).target()
}

/// `P * T * P` for the permutation exchanging axes `a` and `b`
fn swap_axes(t: &Matrix3, a: usize, b: usize) -> Matrix3 {
    let axis = |i: usize| {
        if i == a {
            b
        } else if i == b {
            a
        } else {
            i
        }
    };
    let mut out = Matrix3::zeros();
    for i in 0..3 {
        for j in 0..3 {
            out.set(i, j, t.get(axis(i), axis(j)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::ScatterMatrix;
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64;

    #[test]
    fn test_direct_branch_for_surface_target() {
        let mut t = Matrix3::diagonal([4.0, 1.0, 0.5]);
        t.set_hermitian(0, 1, Complex64::new(0.5, 0.2));
        let y = yang(&t);
        assert_eq!(y.branch, YangBranch::Direct);
        assert_eq!(y.target, HuynenParameters::from_t3(&t).target());
    }

    #[test]
    fn test_rotated_branch_recovers_dihedral() {
        // Pure dihedral: A0 = 0, the direct extraction is undefined
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let t = ScatterMatrix::new(one, zero, zero, -one).to_t3();

        let y = yang(&t);
        assert_eq!(y.branch, YangBranch::R1);
        assert!(y.target.to_t3().max_abs_diff(&t) < 1e-9);
    }

    #[test]
    fn test_rotated_branch_recovers_cross_pol_target() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let t = ScatterMatrix::new(zero, one, one, zero).to_t3();

        let y = yang(&t);
        assert_eq!(y.branch, YangBranch::R2);
        assert!(y.target.to_t3().max_abs_diff(&t) < 1e-9);
    }

    #[test]
    fn test_swap_is_involution() {
        let mut t = Matrix3::diagonal([1.0, 2.0, 3.0]);
        t.set_hermitian(0, 2, Complex64::new(0.3, -0.7));
        let twice = swap_axes(&swap_axes(&t, 0, 2), 0, 2);
        assert_eq!(twice, t);
        assert_abs_diff_eq!(swap_axes(&t, 0, 2).re[0][0], 3.0);
        assert!(swap_axes(&t, 0, 1).is_hermitian(0.0));
    }
}
