//! Cloude-Pottier entropy / anisotropy / alpha
//!
//! Pseudo-probabilities `p_i = lambda_i / sum(lambda)` of the eigenvalues
//! give the entropy (log base = matrix dimension) and the mean alpha angle
//! (`acos` of the first eigenvector component, weighted by `p_i`).

use crate::core::eigen::{eigen_decomposition, EigenDecomposition};
use crate::core::matrix::{Matrix2, Matrix3};
use crate::types::EPS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HAlphaParameters {
    pub entropy: f64,
    pub anisotropy: f64,
    /// Mean alpha angle in degrees
    pub alpha: f64,
}

/// Quad-pol parameters from a coherency matrix
///
/// Anisotropy compares the second and third eigenvalues.
pub fn h_alpha(t3: &Matrix3) -> HAlphaParameters {
    let eig = eigen_decomposition(t3);
    let (entropy, alpha) = entropy_alpha(&eig);
    let l2 = eig.values[1].max(0.0);
    let l3 = eig.values[2].max(0.0);
    HAlphaParameters {
        entropy,
        anisotropy: (l2 - l3) / (l2 + l3 + EPS),
        alpha,
    }
}

/// Dual-pol parameters from a 2x2 covariance matrix
///
/// With only two eigenvalues the anisotropy compares them directly.
pub fn h_alpha_dual(c2: &Matrix2) -> HAlphaParameters {
    let eig = eigen_decomposition(c2);
    let (entropy, alpha) = entropy_alpha(&eig);
    let l1 = eig.values[0].max(0.0);
    let l2 = eig.values[1].max(0.0);
    HAlphaParameters {
        entropy,
        anisotropy: (l1 - l2) / (l1 + l2 + EPS),
        alpha,
    }
}

fn entropy_alpha<const N: usize>(eig: &EigenDecomposition<N>) -> (f64, f64) {
    let mut lambda = eig.values;
    for l in lambda.iter_mut() {
        *l = l.max(0.0);
    }
    let sum: f64 = lambda.iter().sum();
    if sum <= EPS {
        return (0.0, 0.0);
    }

    let log_base = (N as f64).ln();
    let mut entropy = 0.0;
    let mut alpha = 0.0;
    for (k, l) in lambda.iter().enumerate() {
        let p = l / sum;
        if p >= EPS {
            entropy -= p * p.ln() / log_base;
        }
        alpha += p * eig.vector_component(0, k).norm().min(1.0).acos();
    }

    (entropy.clamp(0.0, 1.0), alpha.to_degrees())
}
