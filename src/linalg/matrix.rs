use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use super::{Lq, Qr, Svd};
use crate::blas::{Float64, RefBlas, Transpose};
use crate::native::{Lapack, MatrixNorm};

/// Heap-allocated row-major `f64` matrix.
///
/// The layout is exactly what the native routines take: element `(i, j)`
/// lives at `data[i * ncols + j]`, so [`as_slice`](Self::as_slice) with
/// `lda = ncols()` can be handed straight to any of them.
///
/// ```
/// use native_lapack::linalg::Matrix;
///
/// let a = Matrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// assert_eq!(a[(1, 0)], 4.0);
/// assert_eq!(a.transpose()[(2, 1)], 6.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

// ── Constructors ────────────────────────────────────────────────────

impl Matrix {
    /// An `nrows x ncols` matrix of zeros.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![0.0; nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// The `n x n` identity.
    ///
    /// ```
    /// use native_lapack::linalg::Matrix;
    /// let id = Matrix::identity(3);
    /// assert_eq!(id[(1, 1)], 1.0);
    /// assert_eq!(id[(1, 2)], 0.0);
    /// ```
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Build from a row-major slice.
    ///
    /// Panics if `row_major.len() != nrows * ncols`.
    pub fn from_rows(nrows: usize, ncols: usize, row_major: &[f64]) -> Self {
        assert_eq!(
            row_major.len(),
            nrows * ncols,
            "slice length {} does not match {}x{} matrix",
            row_major.len(),
            nrows,
            ncols,
        );
        Self {
            data: row_major.to_vec(),
            nrows,
            ncols,
        }
    }

    /// Build from a strided row-major buffer with leading dimension `ld`.
    pub fn from_strided(nrows: usize, ncols: usize, data: &[f64], ld: usize) -> Self {
        Self::from_fn(nrows, ncols, |i, j| data[i * ld + j])
    }

    /// Build element by element.
    ///
    /// ```
    /// use native_lapack::linalg::Matrix;
    /// let hilbert = Matrix::from_fn(3, 3, |i, j| 1.0 / (i + j + 1) as f64);
    /// assert_eq!(hilbert[(2, 2)], 0.2);
    /// ```
    pub fn from_fn(nrows: usize, ncols: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }
}

// ── Accessors ───────────────────────────────────────────────────────

impl Matrix {
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Row-major storage; the leading dimension is `ncols()`.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Leading dimension to pass alongside [`as_slice`](Self::as_slice).
    #[inline]
    pub(crate) fn ld(&self) -> usize {
        self.ncols.max(1)
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(i < self.nrows && j < self.ncols, "index ({}, {}) out of bounds", i, j);
        &self.data[i * self.ncols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        assert!(i < self.nrows && j < self.ncols, "index ({}, {}) out of bounds", i, j);
        &mut self.data[i * self.ncols + j]
    }
}

// ── Arithmetic ──────────────────────────────────────────────────────

impl Matrix {
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }

    /// `self * rhs` through the reference BLAS.
    ///
    /// ```
    /// use native_lapack::linalg::Matrix;
    /// let a = Matrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    /// let b = a.matmul(&Matrix::identity(2));
    /// assert_eq!(a, b);
    /// ```
    pub fn matmul(&self, rhs: &Matrix) -> Self {
        assert_eq!(self.ncols, rhs.nrows, "inner dimensions differ");
        let mut c = Self::zeros(self.nrows, rhs.ncols);
        if self.nrows == 0 || rhs.ncols == 0 {
            return c;
        }
        let ldc = c.ld();
        RefBlas.dgemm(
            Transpose::NoTrans,
            Transpose::NoTrans,
            self.nrows,
            rhs.ncols,
            self.ncols,
            1.0,
            &self.data,
            self.ld(),
            &rhs.data,
            rhs.ld(),
            0.0,
            &mut c.data,
            ldc,
        );
        c
    }

    /// Copy of the `nrows x ncols` block starting at `(row, col)`.
    pub fn sub_matrix(&self, row: usize, col: usize, nrows: usize, ncols: usize) -> Self {
        assert!(row + nrows <= self.nrows && col + ncols <= self.ncols, "block out of bounds");
        Self::from_fn(nrows, ncols, |i, j| self[(row + i, col + j)])
    }

    /// Frobenius norm, accumulated without overflow.
    pub fn frobenius_norm(&self) -> f64 {
        Lapack::default().dlange(MatrixNorm::Frobenius, self.nrows, self.ncols, &self.data, self.ld(), &mut [])
    }

    /// Largest absolute entry.
    pub fn max_abs(&self) -> f64 {
        Lapack::default().dlange(MatrixNorm::MaxAbs, self.nrows, self.ncols, &self.data, self.ld(), &mut [])
    }
}

// ── Decompositions ──────────────────────────────────────────────────

impl Matrix {
    /// Householder QR. Requires `nrows() >= ncols()`.
    pub fn qr(&self) -> Qr {
        Qr::new(self)
    }

    /// Householder LQ. Requires `nrows() <= ncols()`.
    pub fn lq(&self) -> Lq {
        Lq::new(self)
    }

    /// Thin SVD: U is m×k and Vᵀ is k×n with `k = min(m, n)`.
    pub fn svd(&self) -> Result<Svd, super::LinalgError> {
        Svd::thin(self)
    }

    /// Singular values in decreasing order.
    pub fn singular_values(&self) -> Result<Vec<f64>, super::LinalgError> {
        Svd::values_only(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_row_major() {
        let a = Matrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(a.as_slice()[a.ld() + 2], 6.0);
        let b = Matrix::from_strided(2, 2, a.as_slice(), 3);
        assert_eq!(b.as_slice(), &[1.0, 2.0, 4.0, 5.0]);
        assert_eq!(a.sub_matrix(0, 1, 2, 2).as_slice(), &[2.0, 3.0, 5.0, 6.0]);
    }

    #[test]
    fn matmul_and_norms() {
        let a = Matrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let ata = a.transpose().matmul(&a);
        assert_eq!(ata[(0, 0)], 17.0);
        assert_eq!(ata[(2, 1)], 36.0);
        assert!((a.frobenius_norm() - 91.0_f64.sqrt()).abs() < 1e-14);
        assert_eq!(a.max_abs(), 6.0);
        assert_eq!(Matrix::zeros(0, 3).matmul(&Matrix::zeros(3, 2)).nrows(), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_checks_bounds() {
        let a = Matrix::zeros(2, 2);
        let _ = a[(0, 2)];
    }
}
