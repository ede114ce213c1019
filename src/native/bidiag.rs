use super::{check, GenOrtho, Lapack};
use crate::blas::{Float64, Side};

impl<B: Float64> Lapack<B> {
    /// Reduce the m×n matrix A to bidiagonal form `B = Qᵀ * A * P` with
    /// unblocked Householder transformations.
    ///
    /// B is upper bidiagonal when `m >= n` and lower bidiagonal otherwise.
    /// Its diagonal goes to `d` (`min(m,n)`) and its off-diagonal to `e`
    /// (`min(m,n)-1`). The reflectors of Q are stored below the diagonal (or
    /// subdiagonal) of A with scalars in `tauq`, those of P to the right of
    /// the superdiagonal (or diagonal) with scalars in `taup`. `work` needs
    /// `max(m,n)` elements.
    #[allow(clippy::too_many_arguments)]
    pub fn dgebd2(
        &self,
        m: usize,
        n: usize,
        a: &mut [f64],
        lda: usize,
        d: &mut [f64],
        e: &mut [f64],
        tauq: &mut [f64],
        taup: &mut [f64],
        work: &mut [f64],
    ) {
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        let mn = m.min(n);
        check::length(d, mn, check::SHORT_D);
        check::length(e, mn.saturating_sub(1), check::SHORT_E);
        check::length(tauq, mn, check::SHORT_TAU);
        check::length(taup, mn, check::SHORT_TAU);
        check::length(work, m.max(n), check::SHORT_WORK);

        if m >= n {
            for i in 0..n {
                // H(i) annihilates A[i+1.., i].
                let (beta, tq) = self.dlarfg(m - i, a[i * lda + i], &mut a[(i + 1).min(m - 1) * lda + i..], lda);
                d[i] = beta;
                tauq[i] = tq;
                if i < n - 1 {
                    a[i * lda + i] = 1.0;
                    self.dlarf_within(Side::Left, m - i, n - i - 1, a, i * lda + i, lda, i * lda + i + 1, lda, tq, work);
                }
                a[i * lda + i] = beta;

                if i < n - 1 {
                    // G(i) annihilates A[i, i+2..].
                    let (beta, tp) =
                        self.dlarfg(n - i - 1, a[i * lda + i + 1], &mut a[i * lda + (i + 2).min(n - 1)..], 1);
                    e[i] = beta;
                    taup[i] = tp;
                    a[i * lda + i + 1] = 1.0;
                    self.dlarf_within(
                        Side::Right,
                        m - i - 1,
                        n - i - 1,
                        a,
                        i * lda + i + 1,
                        1,
                        (i + 1) * lda + i + 1,
                        lda,
                        tp,
                        work,
                    );
                    a[i * lda + i + 1] = beta;
                } else {
                    taup[i] = 0.0;
                }
            }
            return;
        }

        for i in 0..m {
            // G(i) annihilates A[i, i+1..].
            let (beta, tp) = self.dlarfg(n - i, a[i * lda + i], &mut a[i * lda + (i + 1).min(n - 1)..], 1);
            d[i] = beta;
            taup[i] = tp;
            if i < m - 1 {
                a[i * lda + i] = 1.0;
                self.dlarf_within(Side::Right, m - i - 1, n - i, a, i * lda + i, 1, (i + 1) * lda + i, lda, tp, work);
            }
            a[i * lda + i] = beta;

            if i < m - 1 {
                // H(i) annihilates A[i+2.., i].
                let (beta, tq) =
                    self.dlarfg(m - i - 1, a[(i + 1) * lda + i], &mut a[(i + 2).min(m - 1) * lda + i..], lda);
                e[i] = beta;
                tauq[i] = tq;
                a[(i + 1) * lda + i] = 1.0;
                self.dlarf_within(
                    Side::Left,
                    m - i - 1,
                    n - i - 1,
                    a,
                    (i + 1) * lda + i,
                    lda,
                    (i + 1) * lda + i + 1,
                    lda,
                    tq,
                    work,
                );
                a[(i + 1) * lda + i] = beta;
            } else {
                tauq[i] = 0.0;
            }
        }
    }

    /// Generate Q or Pᵀ from the reflectors left by [`dgebd2`](Self::dgebd2).
    ///
    /// For [`GenOrtho::GenerateQ`], A holds the column reflectors of a
    /// reduction of an m×k matrix and is overwritten with the leading n
    /// columns of Q (`min(m,k) <= n <= m`). For [`GenOrtho::GeneratePT`], A
    /// holds the row reflectors of a reduction of a k×n matrix and is
    /// overwritten with the leading m rows of Pᵀ (`min(n,k) <= m <= n`).
    ///
    /// `lwork` must be at least `max(1, min(m,n))`; `lwork == -1` is a
    /// workspace query.
    #[allow(clippy::too_many_arguments)]
    pub fn dorgbr(
        &self,
        vect: GenOrtho,
        m: usize,
        n: usize,
        k: usize,
        a: &mut [f64],
        lda: usize,
        tau: &[f64],
        work: &mut [f64],
        lwork: isize,
    ) {
        let wantq = vect == GenOrtho::GenerateQ;
        let mn = m.min(n);
        if wantq {
            assert!(n <= m && n >= m.min(k), "{}", check::BAD_SHAPE);
        } else {
            assert!(m <= n && m >= n.min(k), "{}", check::BAD_SHAPE);
        }
        check::leading_dim(n, lda, check::BAD_LD_A);
        if check::workspace(work, lwork, mn) {
            work[0] = 1.0;
            if mn > 0 {
                match (wantq, m >= k, k < n) {
                    (true, true, _) => self.dorgqr(m, n, k, &mut [], lda, &[], work, -1),
                    (true, false, _) if m > 1 => self.dorgqr(m - 1, m - 1, m - 1, &mut [], lda, &[], work, -1),
                    (false, _, true) => self.dorglq(m, n, k, &mut [], lda, &[], work, -1),
                    (false, _, false) if n > 1 => self.dorglq(n - 1, n - 1, n - 1, &mut [], lda, &[], work, -1),
                    _ => {}
                }
            }
            work[0] = work[0].max(mn.max(1) as f64);
            return;
        }
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        if mn == 0 {
            return;
        }

        if wantq {
            check::length(tau, m.min(k), check::SHORT_TAU);
            if m >= k {
                self.dorgqr(m, n, k, a, lda, tau, work, lwork);
                return;
            }
            // k > m means n == m. Shift the reflectors one column right and
            // make the first row and column those of the identity.
            for j in (1..m).rev() {
                a[j] = 0.0;
                for i in j + 1..m {
                    a[i * lda + j] = a[i * lda + j - 1];
                }
            }
            a[0] = 1.0;
            for i in 1..m {
                a[i * lda] = 0.0;
            }
            if m > 1 {
                self.dorgqr(m - 1, m - 1, m - 1, &mut a[lda + 1..], lda, tau, work, lwork);
            }
        } else {
            check::length(tau, n.min(k), check::SHORT_TAU);
            if k < n {
                self.dorglq(m, n, k, a, lda, tau, work, lwork);
                return;
            }
            // k >= n means m == n. Shift the reflectors one row down.
            a[0] = 1.0;
            for i in 1..n {
                a[i * lda] = 0.0;
            }
            for j in 1..n {
                for i in (1..j).rev() {
                    a[i * lda + j] = a[(i - 1) * lda + j];
                }
                a[j] = 0.0;
            }
            if n > 1 {
                self.dorglq(n - 1, n - 1, n - 1, &mut a[lda + 1..], lda, tau, work, lwork);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::testutil::{matmul, max_diff, orthonormal_cols_error, orthonormal_rows_error, random_matrix};
    use crate::native::Blocking;

    #[allow(clippy::too_many_arguments)]
    fn generate(l: &Lapack, vect: GenOrtho, m: usize, n: usize, k: usize, a: &mut [f64], lda: usize, tau: &[f64]) {
        let mut q = [0.0];
        l.dorgbr(vect, m, n, k, &mut [], lda, &[], &mut q, -1);
        let mut work = vec![0.0; q[0] as usize];
        l.dorgbr(vect, m, n, k, a, lda, tau, &mut work, q[0] as isize);
    }

    fn check_reduction(l: &Lapack, m: usize, n: usize, seed: u64) {
        let mn = m.min(n);
        let a0 = random_matrix(m, n, n, seed);
        let mut a = a0.clone();
        let mut d = vec![0.0; mn];
        let mut e = vec![0.0; mn - 1];
        let mut tauq = vec![0.0; mn];
        let mut taup = vec![0.0; mn];
        l.dgebd2(m, n, &mut a, n, &mut d, &mut e, &mut tauq, &mut taup, &mut vec![0.0; m.max(n)]);

        // Q is m×mn, B is mn×mn, Pᵀ is mn×n.
        let mut q = vec![0.0; m * mn];
        for i in 0..m {
            q[i * mn..i * mn + mn].copy_from_slice(&a[i * n..i * n + mn]);
        }
        generate(l, GenOrtho::GenerateQ, m, mn, n, &mut q, mn, &tauq);
        let mut pt = vec![0.0; mn * n];
        pt.copy_from_slice(&a[..mn * n]);
        generate(l, GenOrtho::GeneratePT, mn, n, m, &mut pt, n, &taup);

        assert!(orthonormal_cols_error(m, mn, &q, mn) < 1e-13, "{}x{}: Q", m, n);
        assert!(orthonormal_rows_error(mn, n, &pt, n) < 1e-13, "{}x{}: Pᵀ", m, n);

        let mut b = vec![0.0; mn * mn];
        for i in 0..mn {
            b[i * mn + i] = d[i];
            if i + 1 < mn {
                if m >= n {
                    b[i * mn + i + 1] = e[i];
                } else {
                    b[(i + 1) * mn + i] = e[i];
                }
            }
        }
        let qb = matmul(m, mn, mn, &q, mn, &b, mn);
        let qbp = matmul(m, n, mn, &qb, mn, &pt, n);
        assert!(max_diff(m, n, &qbp, n, &a0, n) < 1e-13, "{}x{}: Q B Pᵀ != A", m, n);
    }

    #[test]
    fn bidiagonal_reduction_reconstructs() {
        let small = Lapack::default().with_blocking(Blocking { nb: 2, nbmin: 2, nx: 0 });
        for l in [Lapack::default(), small] {
            check_reduction(&l, 6, 4, 1);
            check_reduction(&l, 4, 6, 2);
            check_reduction(&l, 5, 5, 3);
            check_reduction(&l, 3, 1, 4);
            check_reduction(&l, 1, 3, 5);
        }
    }

    #[test]
    fn orgbr_query_covers_minimum() {
        let l = Lapack::default();
        let mut q = [0.0];
        l.dorgbr(GenOrtho::GenerateQ, 5, 3, 3, &mut [], 3, &[], &mut q, -1);
        assert!(q[0] >= 3.0);
        l.dorgbr(GenOrtho::GeneratePT, 0, 0, 0, &mut [], 1, &[], &mut q, -1);
        assert_eq!(q[0], 1.0);
    }
}
