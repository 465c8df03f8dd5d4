//! Eigen-decomposition of Hermitian complex matrices
//!
//! Greedy-pivot complex Jacobi iteration: every step annihilates the largest
//! off-diagonal element. Works for any small `N` (2, 3 and 4 in practice).
//! The iteration is capped at `1000 * N^2` steps; hitting the cap is not an
//! error, the best available decomposition is returned with `converged = false`.

use super::matrix::ComplexMatrix;
use num_complex::Complex64;

/// Mean off-diagonal magnitude below which the matrix is considered diagonal
const CONVERGENCE_THRESHOLD: f64 = 1.0e-16;

/// Pivot magnitude a rotation must exceed once the first sweeps are done
const ROTATION_THRESHOLD: f64 = 1.0e-17;

/// Eigenvalues in descending order and the matching eigenvectors
///
/// Eigenvector `k` is column `k` of `vectors`.
#[derive(Debug, Clone, Copy)]
pub struct EigenDecomposition<const N: usize> {
    pub values: [f64; N],
    pub vectors: ComplexMatrix<N>,
    pub iterations: usize,
    pub converged: bool,
}

impl<const N: usize> EigenDecomposition<N> {
    /// Component `i` of eigenvector `k`
    #[inline]
    pub fn vector_component(&self, i: usize, k: usize) -> Complex64 {
        self.vectors.get(i, k)
    }

    pub fn vector(&self, k: usize) -> [Complex64; N] {
        let mut v = [Complex64::new(0.0, 0.0); N];
        for (i, c) in v.iter_mut().enumerate() {
            *c = self.vectors.get(i, k);
        }
        v
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// `V * diag(values) * V^H`
    pub fn reconstruct(&self) -> ComplexMatrix<N> {
        let mut m = ComplexMatrix::<N>::zeros();
        for k in 0..N {
            let v = self.vector(k);
            m += ComplexMatrix::<N>::outer(&v).scale(self.values[k]);
        }
        m
    }
}

/// Decompose a Hermitian matrix given by its real and imaginary parts
pub fn eigen_decomposition<const N: usize>(h: &ComplexMatrix<N>) -> EigenDecomposition<N> {
    // Working copy; only the strict upper triangle is kept up to date
    let mut a = [[Complex64::new(0.0, 0.0); N]; N];
    let mut v = [[Complex64::new(0.0, 0.0); N]; N];
    let mut d = [0.0f64; N];

    for i in 0..N {
        for j in 0..N {
            a[i][j] = h.get(i, j);
        }
        v[i][i] = Complex64::new(1.0, 0.0);
        d[i] = h.re[i][i];
    }

    let n2 = N * N;
    let max_iterations = 1000 * n2;
    let mut converged = N < 2;
    let mut iterations = 0;

    if N >= 2 {
        for ii in 1..max_iterations {
            iterations = ii;

            let mut sm = 0.0;
            for p in 0..N - 1 {
                for q in p + 1..N {
                    sm += 2.0 * a[p][q].norm();
                }
            }
            sm /= (n2 - N) as f64;

            if sm < CONVERGENCE_THRESHOLD {
                converged = true;
                break;
            }

            // The first three iterations rotate on any non-zero pivot
            let threshold = if ii < 4 { 0.0 } else { ROTATION_THRESHOLD };

            let mut largest = -1.0e-15;
            let (mut p, mut q) = (0, 0);
            for i in 0..N - 1 {
                for j in i + 1..N {
                    let magnitude = a[i][j].norm();
                    if largest < magnitude {
                        largest = magnitude;
                        p = i;
                        q = j;
                    }
                }
            }

            let w = a[p][q];
            if w.norm() <= threshold {
                continue;
            }

            let e = d[p] - d[q];
            let g = w.norm_sqr();
            let f = (e * e + 4.0 * g).sqrt();
            let mut d1 = e + f;
            let d2 = e - f;
            if d2.abs() > d1.abs() {
                d1 = d2;
            }

            // Signed larger root keeps r in [0, 1]
            let r = d1.abs() / (d1 * d1 + 4.0 * g).sqrt();
            let s = r;
            let c = w * (2.0 * r / d1);
            let shift = (d1 / 2.0 + 2.0 * g / d1) * r * r;

            d[p] -= shift;
            d[q] += shift;
            a[p][q] = Complex64::new(0.0, 0.0);

            for j in 0..p {
                let gc = a[j][p];
                let hc = a[j][q];
                a[j][p] = c * gc - hc * s;
                a[j][q] = gc * s + c.conj() * hc;
            }
            for j in p + 1..q {
                let gc = a[p][j];
                let hc = a[j][q];
                a[p][j] = c.conj() * gc - hc.conj() * s;
                a[j][q] = gc.conj() * s + c.conj() * hc;
            }
            for j in q + 1..N {
                let gc = a[p][j];
                let hc = a[q][j];
                a[p][j] = c.conj() * gc - hc * s;
                a[q][j] = gc * s + c * hc;
            }
            for row in v.iter_mut() {
                let gc = row[p];
                let hc = row[q];
                row[p] = c * gc - hc * s;
                row[q] = gc * s + c.conj() * hc;
            }
        }
    }

    if !converged {
        log::debug!(
            "Jacobi iteration hit the cap of {} steps for a {}x{} matrix",
            max_iterations,
            N,
            N
        );
    }

    // Recompute the eigenvalues as diag(V^H H V) rather than trusting d
    let mut values = [0.0f64; N];
    for (k, value) in values.iter_mut().enumerate() {
        let mut acc = 0.0;
        for i in 0..N {
            for j in 0..N {
                acc += (v[i][k].conj() * h.get(i, j) * v[j][k]).re;
            }
        }
        *value = acc;
    }

    // Pairwise exchange into descending order
    for i in 0..N {
        for j in i + 1..N {
            if values[j] > values[i] {
                values.swap(i, j);
                for row in v.iter_mut() {
                    row.swap(i, j);
                }
            }
        }
    }

    let mut vectors = ComplexMatrix::<N>::zeros();
    for i in 0..N {
        for k in 0..N {
            vectors.set(i, k, v[i][k]);
        }
    }

    EigenDecomposition {
        values,
        vectors,
        iterations,
        converged,
    }
}

/// Determinant of a Hermitian matrix as the product of its eigenvalues
pub fn hermitian_determinant<const N: usize>(h: &ComplexMatrix<N>) -> f64 {
    eigen_decomposition(h).values.iter().product()
}
