//! Cloude decomposition: the dominant rank-1 target of the coherency matrix

use super::ScatteringPowers;
use crate::core::eigen::eigen_decomposition;
use crate::core::matrix::Matrix3;

/// Split `lambda1 * v1 * v1^H` into its Pauli diagonal terms
///
/// The dominant target gives the surface and double-bounce powers. The
/// third Pauli term of the dominant target and the two minor eigenvalues
/// go to volume, so the three powers add up to the trace.
pub fn cloude(t3: &Matrix3) -> ScatteringPowers {
    let eig = eigen_decomposition(t3);
    let lambda = eig.values[0].max(0.0);
    let v = eig.vector(0);
    let residual = eig.values[1].max(0.0) + eig.values[2].max(0.0);

    ScatteringPowers {
        ps: lambda * v[0].norm_sqr(),
        pd: lambda * v[1].norm_sqr(),
        pv: lambda * v[2].norm_sqr() + residual,
    }
}
