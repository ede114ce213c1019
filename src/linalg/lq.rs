use alloc::vec;
use alloc::vec::Vec;

use super::qr::query;
use super::Matrix;
use crate::blas::{Float64, RefBlas, Side, Transpose};
use crate::native::Lapack;

/// Householder LQ of an m×n matrix, `m <= n`.
///
/// ```
/// use native_lapack::linalg::Matrix;
///
/// let a = Matrix::from_rows(2, 3, &[3.0, 0.0, 4.0, 1.0, 1.0, 1.0]);
/// let lq = a.lq();
/// let back = lq.l().matmul(&lq.q());
/// assert!((back[(0, 2)] - 4.0).abs() < 1e-14);
/// assert!((lq.l()[(0, 0)].abs() - 5.0).abs() < 1e-14);
/// ```
#[derive(Debug, Clone)]
pub struct Lq<B = RefBlas> {
    lapack: Lapack<B>,
    lq: Matrix,
    tau: Vec<f64>,
}

impl Lq {
    pub fn new(a: &Matrix) -> Self {
        Self::with_lapack(Lapack::default(), a)
    }
}

impl<B: Float64> Lq<B> {
    /// Factor `a` with the given routines. Panics if `a` is taller than wide.
    pub fn with_lapack(lapack: Lapack<B>, a: &Matrix) -> Self {
        let (m, n) = (a.nrows(), a.ncols());
        assert!(m <= n, "LQ decomposition requires M <= N");
        let mut lq = a.clone();
        let mut tau = vec![0.0; m];
        let lda = lq.ld();
        let lwork = query(|w| lapack.dgelqf(m, n, &mut [], lda, &mut [], w, -1));
        let mut work = vec![0.0; lwork];
        lapack.dgelqf(m, n, lq.as_mut_slice(), lda, &mut tau, &mut work, lwork as isize);
        Self { lapack, lq, tau }
    }

    /// The m×m lower-triangular factor.
    pub fn l(&self) -> Matrix {
        let m = self.lq.nrows();
        Matrix::from_fn(m, m, |i, j| if j <= i { self.lq[(i, j)] } else { 0.0 })
    }

    /// The m×n factor with orthonormal rows.
    pub fn q(&self) -> Matrix {
        let (m, n) = (self.lq.nrows(), self.lq.ncols());
        let mut q = self.lq.clone();
        let ldq = q.ld();
        let lwork = query(|w| self.lapack.dorglq(m, n, m, &mut [], ldq, &[], w, -1));
        let mut work = vec![0.0; lwork];
        self.lapack.dorglq(m, n, m, q.as_mut_slice(), ldq, &self.tau, &mut work, lwork as isize);
        q
    }

    /// Overwrite the k×n matrix `c` with `c * Qᵀ`, where Q is the full n×n
    /// orthogonal factor.
    pub fn apply_qt_right(&self, c: &mut Matrix) {
        let (m, n) = (self.lq.nrows(), self.lq.ncols());
        assert_eq!(c.ncols(), n, "column count mismatch");
        let k = c.nrows();
        if k == 0 {
            return;
        }
        let ldc = c.ld();
        let lda = self.lq.ld();
        let mut a = self.lq.clone();
        let trans = Transpose::Trans;
        let lwork = query(|w| self.lapack.dormlq(Side::Right, trans, k, n, m, &mut [], lda, &[], &mut [], ldc, w, -1));
        let mut work = vec![0.0; lwork];
        self.lapack.dormlq(
            Side::Right,
            trans,
            k,
            n,
            m,
            a.as_mut_slice(),
            lda,
            &self.tau,
            c.as_mut_slice(),
            ldc,
            &mut work,
            lwork as isize,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l_times_q_is_a() {
        let a = Matrix::from_fn(3, 6, |i, j| ((2 * i + 5 * j) as f64).cos());
        let lq = a.lq();
        let q = lq.q();
        let back = lq.l().matmul(&q);
        for i in 0..3 {
            for j in 0..6 {
                assert!((back[(i, j)] - a[(i, j)]).abs() < 1e-13);
            }
        }
        let qqt = q.matmul(&q.transpose());
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((qqt[(i, j)] - expect).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn a_times_qt_is_l_padded() {
        // A Qᵀ = [L 0] for the full Q.
        let a = Matrix::from_fn(2, 4, |i, j| (i + j * j) as f64 - 1.5);
        let lq = a.lq();
        let mut c = a.clone();
        lq.apply_qt_right(&mut c);
        let l = lq.l();
        for i in 0..2 {
            for j in 0..4 {
                let expect = if j < 2 { l[(i, j)] } else { 0.0 };
                assert!((c[(i, j)] - expect).abs() < 1e-13, "({}, {})", i, j);
            }
        }
    }
}
