use super::{check, Direct, Lapack, StoreV};
use crate::blas::{Float64, Side, Transpose, Uplo};

/// Workspace of the blocked QR routines at panel width `nb`: the triangular
/// factor, a staged copy of the reflector panel and the dlarfb scratch.
fn staged_panel_work(m: usize, n: usize, nb: usize) -> usize {
    nb * (nb + m + n)
}

impl<B: Float64> Lapack<B> {
    /// Unblocked QR factorization `A = Q * R` of the m×n matrix A.
    ///
    /// On return R is in the upper triangle of A and the reflectors defining
    /// Q are below the diagonal, with their scalars in `tau` (`min(m,n)`).
    /// `work` needs `n` elements.
    #[allow(clippy::too_many_arguments)]
    pub fn dgeqr2(&self, m: usize, n: usize, a: &mut [f64], lda: usize, tau: &mut [f64], work: &mut [f64]) {
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        let k = m.min(n);
        check::length(tau, k, check::SHORT_TAU);
        check::length(work, n, check::SHORT_WORK);

        for i in 0..k {
            let aii = a[i * lda + i];
            let (beta, t) = self.dlarfg(m - i, aii, &mut a[(i + 1).min(m - 1) * lda + i..], lda);
            tau[i] = t;
            a[i * lda + i] = beta;
            if i < n - 1 {
                a[i * lda + i] = 1.0;
                self.dlarf_within(Side::Left, m - i, n - i - 1, a, i * lda + i, lda, i * lda + i + 1, lda, t, work);
                a[i * lda + i] = beta;
            }
        }
    }

    /// Blocked QR factorization with the same output as [`dgeqr2`](Self::dgeqr2).
    ///
    /// `lwork` must be at least `max(1, n)`; `lwork == -1` is a workspace query.
    /// With less than the optimal workspace the panel width shrinks, down to
    /// the unblocked code.
    #[allow(clippy::too_many_arguments)]
    pub fn dgeqrf(
        &self,
        m: usize,
        n: usize,
        a: &mut [f64],
        lda: usize,
        tau: &mut [f64],
        work: &mut [f64],
        lwork: isize,
    ) {
        check::leading_dim(n, lda, check::BAD_LD_A);
        let k = m.min(n);
        let nx = self.blocking.nx;
        if check::workspace(work, lwork, n) {
            work[0] = match self.panel_width(k, nx, usize::MAX, |nb| staged_panel_work(m, n, nb)) {
                Some(nb) => staged_panel_work(m, n, nb).max(n),
                None => n.max(1),
            } as f64;
            return;
        }
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(tau, k, check::SHORT_TAU);
        if k == 0 {
            return;
        }

        let lwork = lwork as usize;
        let mut i = 0;
        if let Some(nb) = self.panel_width(k, nx, lwork, |nb| staged_panel_work(m, n, nb)) {
            log::debug!("dgeqrf: {}x{} in panels of {}", m, n, nb);
            while i + nx < k {
                let ib = nb.min(k - i);
                self.dgeqr2(m - i, ib, &mut a[i * lda + i..], lda, &mut tau[i..i + ib], work);
                if i + ib < n {
                    let (t, rest) = work.split_at_mut(nb * nb);
                    let (v, w) = rest.split_at_mut(m * nb);
                    self.dlacpy(Uplo::All, m - i, ib, &a[i * lda + i..], lda, v, ib);
                    self.dlarft(Direct::Forward, StoreV::ColumnWise, m - i, ib, v, ib, &tau[i..], t, ib);
                    self.dlarfb(
                        Side::Left,
                        Transpose::Trans,
                        Direct::Forward,
                        StoreV::ColumnWise,
                        m - i,
                        n - i - ib,
                        ib,
                        v,
                        ib,
                        t,
                        ib,
                        &mut a[i * lda + i + ib..],
                        lda,
                        w,
                        ib,
                    );
                }
                i += nb;
            }
        }
        if i < k {
            self.dgeqr2(m - i, n - i, &mut a[i * lda + i..], lda, &mut tau[i..], work);
        }
    }

    /// Overwrite the m×n matrix C with `Q * C`, `Qᵀ * C`, `C * Q` or `C * Qᵀ`,
    /// where Q is the product of the `k` reflectors left by
    /// [`dgeqrf`](Self::dgeqrf) in A.
    ///
    /// A is m×k (left) or n×k (right). Its diagonal is used as scratch and is
    /// restored before returning. `work` needs `n` (left) or `m` (right)
    /// elements.
    #[allow(clippy::too_many_arguments)]
    pub fn dorm2r(
        &self,
        side: Side,
        trans: Transpose,
        m: usize,
        n: usize,
        k: usize,
        a: &mut [f64],
        lda: usize,
        tau: &[f64],
        c: &mut [f64],
        ldc: usize,
        work: &mut [f64],
    ) {
        let left = side == Side::Left;
        let (nq, nw) = if left { (m, n) } else { (n, m) };
        assert!(k <= nq, "{}", if left { check::K_GT_M } else { check::K_GT_N });
        check::matrix(nq, k, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(tau, k, check::SHORT_TAU);
        check::matrix(m, n, c, ldc, check::BAD_LD_C, check::SHORT_C);
        check::length(work, nw, check::SHORT_WORK);
        if m == 0 || n == 0 || k == 0 {
            return;
        }

        let notran = trans == Transpose::NoTrans;
        let forward = left != notran;
        for step in 0..k {
            let i = if forward { step } else { k - 1 - step };
            let (mi, ni, cij) = if left { (m - i, n, i * ldc) } else { (m, n - i, i) };
            let aii = a[i * lda + i];
            a[i * lda + i] = 1.0;
            self.dlarf(side, mi, ni, &a[i * lda + i..], lda as isize, tau[i], &mut c[cij..], ldc, work);
            a[i * lda + i] = aii;
        }
    }

    /// Blocked [`dorm2r`](Self::dorm2r).
    ///
    /// `lwork` must be at least `max(1, n)` (left) or `max(1, m)` (right);
    /// `lwork == -1` is a workspace query.
    #[allow(clippy::too_many_arguments)]
    pub fn dormqr(
        &self,
        side: Side,
        trans: Transpose,
        m: usize,
        n: usize,
        k: usize,
        a: &mut [f64],
        lda: usize,
        tau: &[f64],
        c: &mut [f64],
        ldc: usize,
        work: &mut [f64],
        lwork: isize,
    ) {
        let left = side == Side::Left;
        let (nq, nw) = if left { (m, n) } else { (n, m) };
        assert!(k <= nq, "{}", if left { check::K_GT_M } else { check::K_GT_N });
        check::leading_dim(k, lda, check::BAD_LD_A);
        check::leading_dim(n, ldc, check::BAD_LD_C);
        let need = |nb: usize| nb * (nw + nb);
        if check::workspace(work, lwork, nw) {
            work[0] = match self.panel_width(k, 0, usize::MAX, need) {
                Some(nb) => need(nb),
                None => nw.max(1),
            } as f64;
            return;
        }
        check::matrix(nq, k, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(tau, k, check::SHORT_TAU);
        check::matrix(m, n, c, ldc, check::BAD_LD_C, check::SHORT_C);
        if m == 0 || n == 0 || k == 0 {
            return;
        }

        let Some(nb) = self.panel_width(k, 0, lwork as usize, need) else {
            self.dorm2r(side, trans, m, n, k, a, lda, tau, c, ldc, work);
            return;
        };

        let notran = trans == Transpose::NoTrans;
        let forward = left != notran;
        let (t, w) = work.split_at_mut(nb * nb);
        let last = ((k - 1) / nb) * nb;
        for step in (0..k).step_by(nb) {
            let i = if forward { step } else { last - step };
            let ib = nb.min(k - i);
            let v = &a[i * lda + i..];
            self.dlarft(Direct::Forward, StoreV::ColumnWise, nq - i, ib, v, lda, &tau[i..], t, ib);
            let (mi, ni, cij) = if left { (m - i, n, i * ldc) } else { (m, n - i, i) };
            self.dlarfb(
                side,
                trans,
                Direct::Forward,
                StoreV::ColumnWise,
                mi,
                ni,
                ib,
                v,
                lda,
                t,
                ib,
                &mut c[cij..],
                ldc,
                w,
                ib,
            );
        }
    }

    /// Generate the m×n matrix Q with orthonormal columns defined as the first
    /// `n` columns of the product of `k` reflectors from
    /// [`dgeqrf`](Self::dgeqrf). Requires `k <= n <= m`. `work` needs `n`
    /// elements.
    #[allow(clippy::too_many_arguments)]
    pub fn dorg2r(
        &self,
        m: usize,
        n: usize,
        k: usize,
        a: &mut [f64],
        lda: usize,
        tau: &[f64],
        work: &mut [f64],
    ) {
        assert!(n <= m, "{}", check::N_LT_M);
        assert!(k <= n, "{}", check::K_GT_N);
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(tau, k, check::SHORT_TAU);
        check::length(work, n, check::SHORT_WORK);
        if n == 0 {
            return;
        }

        // Columns k..n start as unit vectors.
        for j in k..n {
            for l in 0..m {
                a[l * lda + j] = 0.0;
            }
            a[j * lda + j] = 1.0;
        }
        for i in (0..k).rev() {
            if i < n - 1 {
                a[i * lda + i] = 1.0;
                self.dlarf_within(Side::Left, m - i, n - i - 1, a, i * lda + i, lda, i * lda + i + 1, lda, tau[i], work);
            }
            if i < m - 1 {
                self.blas.dscal(m - i - 1, -tau[i], &mut a[(i + 1) * lda + i..], lda);
            }
            a[i * lda + i] = 1.0 - tau[i];
            for l in 0..i {
                a[l * lda + i] = 0.0;
            }
        }
    }

    /// Blocked [`dorg2r`](Self::dorg2r).
    ///
    /// `lwork` must be at least `max(1, n)`; `lwork == -1` is a workspace query.
    #[allow(clippy::too_many_arguments)]
    pub fn dorgqr(
        &self,
        m: usize,
        n: usize,
        k: usize,
        a: &mut [f64],
        lda: usize,
        tau: &[f64],
        work: &mut [f64],
        lwork: isize,
    ) {
        assert!(n <= m, "{}", check::N_LT_M);
        assert!(k <= n, "{}", check::K_GT_N);
        check::leading_dim(n, lda, check::BAD_LD_A);
        let nx = self.blocking.nx;
        if check::workspace(work, lwork, n) {
            work[0] = match self.panel_width(k, nx, usize::MAX, |nb| staged_panel_work(m, n, nb)) {
                Some(nb) => staged_panel_work(m, n, nb).max(n),
                None => n.max(1),
            } as f64;
            return;
        }
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(tau, k, check::SHORT_TAU);
        if n == 0 {
            return;
        }

        let blocked = self.panel_width(k, nx, lwork as usize, |nb| staged_panel_work(m, n, nb));
        // The last kk columns of reflectors go through the blocked code.
        let (nb, ki, kk) = match blocked {
            Some(nb) => {
                let ki = ((k - nx - 1) / nb) * nb;
                let kk = k.min(ki + nb);
                for i in 0..kk {
                    for j in kk..n {
                        a[i * lda + j] = 0.0;
                    }
                }
                (nb, ki, kk)
            }
            None => (0, 0, 0),
        };

        if kk < n {
            self.dorg2r(m - kk, n - kk, k - kk, &mut a[kk * lda + kk..], lda, &tau[kk..], work);
        }
        if kk == 0 {
            return;
        }
        log::debug!("dorgqr: {}x{} from {} reflectors in panels of {}", m, n, k, nb);
        for i in (0..=ki).rev().step_by(nb) {
            let ib = nb.min(k - i);
            if i + ib < n {
                let (t, rest) = work.split_at_mut(nb * nb);
                let (v, w) = rest.split_at_mut(m * nb);
                self.dlacpy(Uplo::All, m - i, ib, &a[i * lda + i..], lda, v, ib);
                self.dlarft(Direct::Forward, StoreV::ColumnWise, m - i, ib, v, ib, &tau[i..], t, ib);
                self.dlarfb(
                    Side::Left,
                    Transpose::NoTrans,
                    Direct::Forward,
                    StoreV::ColumnWise,
                    m - i,
                    n - i - ib,
                    ib,
                    v,
                    ib,
                    t,
                    ib,
                    &mut a[i * lda + i + ib..],
                    lda,
                    w,
                    ib,
                );
            }
            self.dorg2r(m - i, ib, ib, &mut a[i * lda + i..], lda, &tau[i..], work);
            for l in 0..i {
                for j in i..i + ib {
                    a[l * lda + j] = 0.0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::testutil::{matmul, max_diff, orthonormal_cols_error, random_matrix};
    use crate::native::Blocking;

    fn small_panels() -> Lapack {
        Lapack::default().with_blocking(Blocking { nb: 2, nbmin: 2, nx: 0 })
    }

    fn query(f: impl FnOnce(&mut [f64])) -> usize {
        let mut w = [0.0];
        f(&mut w);
        w[0] as usize
    }

    /// Factor with `l`, then return (Q m×m, R m×n) as dense matrices.
    fn factor_and_expand(l: &Lapack, m: usize, n: usize, a: &mut [f64], lda: usize) -> (Vec<f64>, Vec<f64>) {
        let k = m.min(n);
        let mut tau = vec![0.0; k];
        let lwork = query(|w| l.dgeqrf(m, n, &mut [], lda, &mut [], w, -1));
        let mut work = vec![0.0; lwork];
        l.dgeqrf(m, n, a, lda, &mut tau, &mut work, lwork as isize);

        let mut r = vec![0.0; m * n];
        for i in 0..m {
            for j in i..n {
                r[i * n + j] = a[i * lda + j];
            }
        }
        let mut q = vec![0.0; m * m];
        for i in 0..m {
            for j in 0..k {
                q[i * m + j] = a[i * lda + j];
            }
        }
        let lwork = query(|w| l.dorgqr(m, m, k, &mut [], m, &[], w, -1));
        let mut work = vec![0.0; lwork];
        l.dorgqr(m, m, k, &mut q, m, &tau, &mut work, lwork as isize);
        (q, r)
    }

    #[test]
    fn qr_reconstructs_tall_and_wide() {
        for l in [Lapack::default(), small_panels()] {
            for (m, n) in [(7, 5), (3, 5), (6, 6), (1, 3), (4, 1)] {
                let lda = n + 2;
                let a0 = random_matrix(m, n, lda, (m * 10 + n) as u64);
                let mut a = a0.clone();
                let (q, r) = factor_and_expand(&l, m, n, &mut a, lda);
                assert!(orthonormal_cols_error(m, m, &q, m) < 1e-13, "{}x{}: Q not orthogonal", m, n);
                let qr = matmul(m, n, m, &q, m, &r, n);
                assert!(max_diff(m, n, &qr, n, &a0, lda) < 1e-13, "{}x{}: QR != A", m, n);
            }
        }
    }

    #[test]
    fn blocked_factor_matches_unblocked() {
        let (m, n) = (9, 7);
        let a0 = random_matrix(m, n, n, 3);

        let mut a1 = a0.clone();
        let mut tau1 = vec![0.0; n];
        Lapack::default().dgeqr2(m, n, &mut a1, n, &mut tau1, &mut vec![0.0; n]);

        let l = small_panels();
        let mut a2 = a0.clone();
        let mut tau2 = vec![0.0; n];
        let lwork = query(|w| l.dgeqrf(m, n, &mut [], n, &mut [], w, -1));
        assert!(lwork > n, "blocked path should ask for panel workspace");
        let mut work = vec![0.0; lwork];
        l.dgeqrf(m, n, &mut a2, n, &mut tau2, &mut work, lwork as isize);

        assert!(max_diff(m, n, &a1, n, &a2, n) < 1e-12);
        assert!(max_diff(1, n, &tau1, n, &tau2, n) < 1e-12);

        // Minimum workspace falls back to narrower panels or none at all.
        let mut a3 = a0.clone();
        let mut tau3 = vec![0.0; n];
        l.dgeqrf(m, n, &mut a3, n, &mut tau3, &mut vec![0.0; n], n as isize);
        assert!(max_diff(m, n, &a1, n, &a3, n) < 1e-12);
    }

    #[test]
    fn ormqr_matches_explicit_q() {
        let (nq, n, k) = (7, 4, 5);
        let mut a = random_matrix(nq, k, k, 21);
        let mut tau = vec![0.0; k];
        let l = Lapack::default();
        l.dgeqr2(7, k, &mut a, k, &mut tau, &mut vec![0.0; k]);
        let a_fact = a.clone();

        let mut q = vec![0.0; 49];
        for i in 0..7 {
            q[i * 7..i * 7 + k].copy_from_slice(&a[i * k..i * k + k]);
        }
        l.dorg2r(7, 7, k, &mut q, 7, &tau, &mut vec![0.0; 7]);
        let mut qt = vec![0.0; 49];
        for i in 0..7 {
            for j in 0..7 {
                qt[j * 7 + i] = q[i * 7 + j];
            }
        }

        for l in [Lapack::default(), small_panels()] {
            for side in [Side::Left, Side::Right] {
                for trans in [Transpose::NoTrans, Transpose::Trans] {
                    let (cm, cn) = if side == Side::Left { (nq, n) } else { (n, nq) };
                    let c0 = random_matrix(cm, cn, cn, 5);
                    let op = if trans == Transpose::NoTrans { &q } else { &qt };
                    let want = if side == Side::Left {
                        matmul(cm, cn, cm, op, 7, &c0, cn)
                    } else {
                        matmul(cm, cn, cn, &c0, cn, op, 7)
                    };

                    let mut c = c0.clone();
                    let lwork = query(|w| l.dormqr(side, trans, cm, cn, k, &mut [], k, &[], &mut [], cn, w, -1));
                    let mut work = vec![0.0; lwork];
                    l.dormqr(side, trans, cm, cn, k, &mut a, k, &tau, &mut c, cn, &mut work, lwork as isize);
                    assert!(max_diff(cm, cn, &c, cn, &want, cn) < 1e-13, "{:?} {:?}", side, trans);
                    assert_eq!(a, a_fact, "diagonal of A restored");
                }
            }
        }
    }

    #[test]
    fn orgqr_blocked_matches_unblocked() {
        let (m, n, k) = (10, 8, 7);
        let mut a = random_matrix(m, n, n, 9);
        let mut tau = vec![0.0; n];
        let l = Lapack::default();
        l.dgeqr2(m, n, &mut a, n, &mut tau, &mut vec![0.0; n]);

        let mut q1 = a.clone();
        l.dorg2r(m, n, k, &mut q1, n, &tau, &mut vec![0.0; n]);

        let sp = small_panels();
        let mut q2 = a.clone();
        let lwork = query(|w| sp.dorgqr(m, n, k, &mut [], n, &[], w, -1));
        let mut work = vec![0.0; lwork];
        sp.dorgqr(m, n, k, &mut q2, n, &tau, &mut work, lwork as isize);

        assert!(orthonormal_cols_error(m, n, &q2, n) < 1e-13);
        assert!(max_diff(m, n, &q1, n, &q2, n) < 1e-12);
    }

    #[test]
    #[should_panic(expected = "insufficient declared workspace length")]
    fn geqrf_rejects_short_lwork() {
        let l = Lapack::default();
        let mut a = vec![0.0; 12];
        let mut tau = vec![0.0; 3];
        l.dgeqrf(4, 3, &mut a, 3, &mut tau, &mut [0.0; 2], 2);
    }
}
