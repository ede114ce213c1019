use alloc::vec;
use alloc::vec::Vec;

use super::{LinalgError, Matrix};
use crate::blas::Float64;
use crate::native::{EigComp, Lapack};

/// Eigendecomposition of a symmetric tridiagonal matrix `T = Z Λ Zᵀ`.
///
/// `T` is given by its diagonal `d` and off-diagonal `e` (`e.len() + 1 ==
/// d.len()`, or both empty). Eigenvalues come out in ascending order and
/// column `j` of [`vectors`](Self::vectors) pairs with `values()[j]`.
///
/// # Example
///
/// ```
/// use native_lapack::linalg::SymmetricTridiagonal;
///
/// // Second-difference matrix: eigenvalues 2 - √2, 2, 2 + √2.
/// let eig = SymmetricTridiagonal::eigen(&[2.0, 2.0, 2.0], &[-1.0, -1.0]).unwrap();
/// let s2 = 2.0_f64.sqrt();
/// assert!((eig.values()[0] - (2.0 - s2)).abs() < 1e-14);
/// assert!((eig.values()[2] - (2.0 + s2)).abs() < 1e-14);
/// ```
#[derive(Debug, Clone)]
pub struct SymmetricTridiagonal {
    values: Vec<f64>,
    vectors: Matrix,
}

fn check_lengths(d: &[f64], e: &[f64]) {
    assert_eq!(
        e.len(),
        d.len().saturating_sub(1),
        "off-diagonal must have one fewer entry than the diagonal"
    );
}

impl SymmetricTridiagonal {
    /// Eigenvalues and eigenvectors with the reference BLAS.
    pub fn eigen(d: &[f64], e: &[f64]) -> Result<Self, LinalgError> {
        Self::with_lapack(&Lapack::default(), d, e)
    }

    pub fn with_lapack<B: Float64>(lapack: &Lapack<B>, d: &[f64], e: &[f64]) -> Result<Self, LinalgError> {
        check_lengths(d, e);
        let n = d.len();
        let mut values = d.to_vec();
        let mut off = e.to_vec();
        let mut vectors = Matrix::zeros(n, n);
        let ldz = vectors.ld();
        let mut work = vec![0.0; 2 * n.saturating_sub(1)];
        lapack.dsteqr(
            EigComp::Tridiag,
            n,
            &mut values,
            &mut off,
            vectors.as_mut_slice(),
            ldz,
            &mut work,
        )?;
        Ok(Self { values, vectors })
    }

    /// Eigenvalues only, ascending, by the square-root-free iteration.
    ///
    /// ```
    /// use native_lapack::linalg::SymmetricTridiagonal;
    ///
    /// let w = SymmetricTridiagonal::eigenvalues(&[1.0, 3.0], &[0.0]).unwrap();
    /// assert_eq!(w, vec![1.0, 3.0]);
    /// ```
    pub fn eigenvalues(d: &[f64], e: &[f64]) -> Result<Vec<f64>, LinalgError> {
        check_lengths(d, e);
        let mut values = d.to_vec();
        let mut off = e.to_vec();
        Lapack::default().dsterf(values.len(), &mut values, &mut off)?;
        Ok(values)
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Orthonormal eigenvectors, one per column.
    #[inline]
    pub fn vectors(&self) -> &Matrix {
        &self.vectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(d: &[f64], e: &[f64]) -> Matrix {
        Matrix::from_fn(d.len(), d.len(), |i, j| {
            if i == j {
                d[i]
            } else if i + 1 == j {
                e[i]
            } else if j + 1 == i {
                e[j]
            } else {
                0.0
            }
        })
    }

    #[test]
    fn vectors_diagonalize_the_matrix() {
        let d = [4.0, -1.0, 2.5, 0.3, 7.0, 1.0];
        let e = [1.0, 0.5, -2.0, 0.25, 3.0];
        let eig = SymmetricTridiagonal::eigen(&d, &e).unwrap();
        let z = eig.vectors();
        let t = dense(&d, &e);
        let lambda = z.transpose().matmul(&t).matmul(z);
        for i in 0..6 {
            for j in 0..6 {
                let expect = if i == j { eig.values()[i] } else { 0.0 };
                assert!((lambda[(i, j)] - expect).abs() < 1e-12, "({}, {})", i, j);
            }
        }
        assert!(eig.values().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn eigenvalues_agree_with_vectors_path() {
        let d: Vec<f64> = (0..9).map(|i| (i as f64 * 1.3).cos()).collect();
        let e: Vec<f64> = (0..8).map(|i| 0.5 + (i as f64 * 0.7).sin()).collect();
        let w = SymmetricTridiagonal::eigenvalues(&d, &e).unwrap();
        let eig = SymmetricTridiagonal::eigen(&d, &e).unwrap();
        for (a, b) in w.iter().zip(eig.values()) {
            assert!((a - b).abs() < 1e-13);
        }
    }

    #[test]
    fn empty_and_single() {
        let eig = SymmetricTridiagonal::eigen(&[], &[]).unwrap();
        assert!(eig.values().is_empty());
        let eig = SymmetricTridiagonal::eigen(&[-3.0], &[]).unwrap();
        assert_eq!(eig.values(), &[-3.0]);
        assert_eq!(eig.vectors()[(0, 0)], 1.0);
    }

    #[test]
    #[should_panic(expected = "one fewer entry")]
    fn mismatched_lengths_panic() {
        let _ = SymmetricTridiagonal::eigenvalues(&[1.0, 2.0], &[0.5, 0.5]);
    }
}
