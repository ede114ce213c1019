use alloc::vec;
use alloc::vec::Vec;

use super::{LinalgError, Matrix};
use crate::blas::{Diag, Float64, RefBlas, Side, Transpose, Uplo};
use crate::native::Lapack;

/// Workspace length reported by a query closure.
pub(super) fn query(f: impl FnOnce(&mut [f64])) -> usize {
    let mut q = [0.0];
    f(&mut q);
    (q[0] as usize).max(1)
}

/// Householder QR of an m×n matrix, `m >= n`, kept in compact form.
///
/// # Example
///
/// ```
/// use native_lapack::linalg::Matrix;
///
/// let a = Matrix::from_rows(3, 2, &[
///     1.0, 1.0,
///     1.0, 2.0,
///     1.0, 3.0,
/// ]);
/// // Least-squares line through (1,1), (2,2), (3,2).
/// let x = a.qr().solve(&[1.0, 2.0, 2.0]).unwrap();
/// assert!((x[0] - 2.0 / 3.0).abs() < 1e-12);
/// assert!((x[1] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Qr<B = RefBlas> {
    lapack: Lapack<B>,
    qr: Matrix,
    tau: Vec<f64>,
}

impl Qr {
    /// Factor `a` with the reference BLAS.
    pub fn new(a: &Matrix) -> Self {
        Self::with_lapack(Lapack::default(), a)
    }
}

impl<B: Float64> Qr<B> {
    /// Factor `a` with the given routines. Panics if `a` is wider than tall.
    pub fn with_lapack(lapack: Lapack<B>, a: &Matrix) -> Self {
        let (m, n) = (a.nrows(), a.ncols());
        assert!(m >= n, "QR decomposition requires M >= N");
        let mut qr = a.clone();
        let mut tau = vec![0.0; n];
        let lda = qr.ld();
        let lwork = query(|w| lapack.dgeqrf(m, n, &mut [], lda, &mut [], w, -1));
        let mut work = vec![0.0; lwork];
        lapack.dgeqrf(m, n, qr.as_mut_slice(), lda, &mut tau, &mut work, lwork as isize);
        Self { lapack, qr, tau }
    }

    /// The n×n upper-triangular factor.
    pub fn r(&self) -> Matrix {
        let n = self.qr.ncols();
        Matrix::from_fn(n, n, |i, j| if j >= i { self.qr[(i, j)] } else { 0.0 })
    }

    /// The thin m×n orthogonal factor.
    pub fn q(&self) -> Matrix {
        let (m, n) = (self.qr.nrows(), self.qr.ncols());
        let mut q = self.qr.clone();
        let ldq = q.ld();
        let lwork = query(|w| self.lapack.dorgqr(m, n, n, &mut [], ldq, &[], w, -1));
        let mut work = vec![0.0; lwork];
        self.lapack.dorgqr(m, n, n, q.as_mut_slice(), ldq, &self.tau, &mut work, lwork as isize);
        q
    }

    /// Overwrite the m×k matrix `c` with `Qᵀ * c`.
    pub fn apply_qt(&self, c: &mut Matrix) {
        self.apply(Transpose::Trans, c);
    }

    /// Overwrite the m×k matrix `c` with `Q * c`.
    pub fn apply_q(&self, c: &mut Matrix) {
        self.apply(Transpose::NoTrans, c);
    }

    fn apply(&self, trans: Transpose, c: &mut Matrix) {
        let (m, n) = (self.qr.nrows(), self.qr.ncols());
        assert_eq!(c.nrows(), m, "row count mismatch");
        let k = c.ncols();
        if k == 0 {
            return;
        }
        let ldc = c.ld();
        let lda = self.qr.ld();
        // dormqr restores A after borrowing its diagonal.
        let mut a = self.qr.clone();
        let lwork = query(|w| self.lapack.dormqr(Side::Left, trans, m, k, n, &mut [], lda, &[], &mut [], ldc, w, -1));
        let mut work = vec![0.0; lwork];
        self.lapack.dormqr(
            Side::Left,
            trans,
            m,
            k,
            n,
            a.as_mut_slice(),
            lda,
            &self.tau,
            c.as_mut_slice(),
            ldc,
            &mut work,
            lwork as isize,
        );
    }

    /// Least-squares solution of `min ||A x - b||`.
    ///
    /// Returns [`LinalgError::Singular`] if R has a zero on its diagonal.
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>, LinalgError> {
        let (m, n) = (self.qr.nrows(), self.qr.ncols());
        assert_eq!(b.len(), m, "rhs length mismatch");
        if (0..n).any(|i| self.qr[(i, i)] == 0.0) {
            return Err(LinalgError::Singular);
        }
        let mut qtb = Matrix::from_rows(m, 1, b);
        self.apply_qt(&mut qtb);
        let mut x = qtb.into_vec();
        x.truncate(n);
        self.lapack
            .blas()
            .dtrsv(Uplo::Upper, Transpose::NoTrans, Diag::NonUnit, n, self.qr.as_slice(), self.qr.ld(), &mut x, 1);
        Ok(x)
    }

    /// Determinant of a square input.
    pub fn det(&self) -> f64 {
        let n = self.qr.ncols();
        assert_eq!(self.qr.nrows(), n, "determinant requires a square matrix");
        // Each reflector with tau != 0 flips the sign.
        let flips = self.tau.iter().filter(|&&t| t != 0.0).count();
        let d: f64 = (0..n).map(|i| self.qr[(i, i)]).product();
        if flips % 2 == 0 {
            d
        } else {
            -d
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from_fn(5, 3, |i, j| ((i * 3 + j) as f64).sin() + if i == j { 2.0 } else { 0.0 })
    }

    #[test]
    fn q_times_r_is_a() {
        let a = sample();
        let qr = a.qr();
        let q = qr.q();
        let back = q.matmul(&qr.r());
        for i in 0..5 {
            for j in 0..3 {
                assert!((back[(i, j)] - a[(i, j)]).abs() < 1e-13);
            }
        }
        let qtq = q.transpose().matmul(&q);
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((qtq[(i, j)] - expect).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn apply_round_trips() {
        let a = sample();
        let qr = a.qr();
        let c0 = Matrix::from_fn(5, 2, |i, j| (i + 2 * j) as f64);
        let mut c = c0.clone();
        qr.apply_qt(&mut c);
        qr.apply_q(&mut c);
        for i in 0..5 {
            for j in 0..2 {
                assert!((c[(i, j)] - c0[(i, j)]).abs() < 1e-13);
            }
        }
    }

    #[test]
    fn determinant_matches_cofactor_expansion() {
        let a = Matrix::from_rows(3, 3, &[2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0]);
        assert!((a.qr().det() - 4.0).abs() < 1e-13);
        let p = Matrix::from_rows(2, 2, &[0.0, 1.0, 1.0, 0.0]);
        assert!((p.qr().det() + 1.0).abs() < 1e-15);
    }

    #[test]
    fn consistent_system_is_solved_exactly() {
        let a = sample();
        let x0 = [1.0, -2.0, 0.5];
        let b: Vec<f64> = (0..5).map(|i| (0..3).map(|j| a[(i, j)] * x0[j]).sum()).collect();
        let x = a.qr().solve(&b).unwrap();
        for j in 0..3 {
            assert!((x[j] - x0[j]).abs() < 1e-12);
        }
    }
}
