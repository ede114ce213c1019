use super::{check, Direct, Lapack, StoreV};
use crate::blas::{Float64, Side, Transpose};

impl<B: Float64> Lapack<B> {
    /// Unblocked LQ factorization `A = L * Q` of the m×n matrix A.
    ///
    /// L ends up in the lower triangle of A and the reflectors defining Q in
    /// the rows to the right of the diagonal, with their scalars in `tau`
    /// (`min(m,n)`). `work` needs `m` elements.
    pub fn dgelq2(&self, m: usize, n: usize, a: &mut [f64], lda: usize, tau: &mut [f64], work: &mut [f64]) {
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        let k = m.min(n);
        check::length(tau, k, check::SHORT_TAU);
        check::length(work, m, check::SHORT_WORK);

        for i in 0..k {
            let aii = a[i * lda + i];
            let (beta, t) = self.dlarfg(n - i, aii, &mut a[i * lda + (i + 1).min(n - 1)..], 1);
            tau[i] = t;
            if i < m - 1 {
                a[i * lda + i] = 1.0;
                self.dlarf_within(Side::Right, m - i - 1, n - i, a, i * lda + i, 1, (i + 1) * lda + i, lda, t, work);
            }
            a[i * lda + i] = beta;
        }
    }

    /// Blocked LQ factorization with the same output as [`dgelq2`](Self::dgelq2).
    ///
    /// `lwork` must be at least `max(1, m)`; `lwork == -1` is a workspace query.
    #[allow(clippy::too_many_arguments)]
    pub fn dgelqf(
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
        let need = |nb: usize| nb * (nb + m);
        if check::workspace(work, lwork, m) {
            work[0] = match self.panel_width(k, nx, usize::MAX, need) {
                Some(nb) => need(nb).max(m),
                None => m.max(1),
            } as f64;
            return;
        }
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(tau, k, check::SHORT_TAU);
        if k == 0 {
            return;
        }

        let mut i = 0;
        if let Some(nb) = self.panel_width(k, nx, lwork as usize, need) {
            log::debug!("dgelqf: {}x{} in panels of {}", m, n, nb);
            while i + nx < k {
                let ib = nb.min(k - i);
                self.dgelq2(ib, n - i, &mut a[i * lda + i..], lda, &mut tau[i..i + ib], work);
                if i + ib < m {
                    // The panel rows end where the trailing rows begin.
                    let (panel, trailing) = a.split_at_mut((i + ib) * lda);
                    let v = &panel[i * lda + i..];
                    let (t, w) = work.split_at_mut(nb * nb);
                    self.dlarft(Direct::Forward, StoreV::RowWise, n - i, ib, v, lda, &tau[i..], t, ib);
                    self.dlarfb(
                        Side::Right,
                        Transpose::NoTrans,
                        Direct::Forward,
                        StoreV::RowWise,
                        m - i - ib,
                        n - i,
                        ib,
                        v,
                        lda,
                        t,
                        ib,
                        &mut trailing[i..],
                        lda,
                        w,
                        ib,
                    );
                }
                i += nb;
            }
        }
        if i < k {
            self.dgelq2(m - i, n - i, &mut a[i * lda + i..], lda, &mut tau[i..], work);
        }
    }

    /// Overwrite the m×n matrix C with `Q * C`, `Qᵀ * C`, `C * Q` or `C * Qᵀ`,
    /// where Q is the product of the `k` reflectors left by
    /// [`dgelqf`](Self::dgelqf) in A.
    ///
    /// A is k×m (left) or k×n (right). Its diagonal is used as scratch and is
    /// restored before returning. `work` needs `n` (left) or `m` (right)
    /// elements.
    #[allow(clippy::too_many_arguments)]
    pub fn dorml2(
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
        check::matrix(k, nq, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(tau, k, check::SHORT_TAU);
        check::matrix(m, n, c, ldc, check::BAD_LD_C, check::SHORT_C);
        check::length(work, nw, check::SHORT_WORK);
        if m == 0 || n == 0 || k == 0 {
            return;
        }

        let notran = trans == Transpose::NoTrans;
        let forward = left == notran;
        for step in 0..k {
            let i = if forward { step } else { k - 1 - step };
            let (mi, ni, cij) = if left { (m - i, n, i * ldc) } else { (m, n - i, i) };
            let aii = a[i * lda + i];
            a[i * lda + i] = 1.0;
            self.dlarf(side, mi, ni, &a[i * lda + i..], 1, tau[i], &mut c[cij..], ldc, work);
            a[i * lda + i] = aii;
        }
    }

    /// Blocked [`dorml2`](Self::dorml2).
    ///
    /// `lwork` must be at least `max(1, n)` (left) or `max(1, m)` (right);
    /// `lwork == -1` is a workspace query.
    #[allow(clippy::too_many_arguments)]
    pub fn dormlq(
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
        check::leading_dim(nq, lda, check::BAD_LD_A);
        check::leading_dim(n, ldc, check::BAD_LD_C);
        let need = |nb: usize| nb * (nw + nb);
        if check::workspace(work, lwork, nw) {
            work[0] = match self.panel_width(k, 0, usize::MAX, need) {
                Some(nb) => need(nb),
                None => nw.max(1),
            } as f64;
            return;
        }
        check::matrix(k, nq, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(tau, k, check::SHORT_TAU);
        check::matrix(m, n, c, ldc, check::BAD_LD_C, check::SHORT_C);
        if m == 0 || n == 0 || k == 0 {
            return;
        }

        let Some(nb) = self.panel_width(k, 0, lwork as usize, need) else {
            self.dorml2(side, trans, m, n, k, a, lda, tau, c, ldc, work);
            return;
        };

        let notran = trans == Transpose::NoTrans;
        let forward = left == notran;
        // Q = H(0)...H(k-1) is applied through its block form H = I - Vᵀ T V,
        // whose dlarfb transpose is the opposite of the requested one.
        let transt = trans.flip();
        let (t, w) = work.split_at_mut(nb * nb);
        let last = ((k - 1) / nb) * nb;
        for step in (0..k).step_by(nb) {
            let i = if forward { step } else { last - step };
            let ib = nb.min(k - i);
            let v = &a[i * lda + i..];
            self.dlarft(Direct::Forward, StoreV::RowWise, nq - i, ib, v, lda, &tau[i..], t, ib);
            let (mi, ni, cij) = if left { (m - i, n, i * ldc) } else { (m, n - i, i) };
            self.dlarfb(
                side,
                transt,
                Direct::Forward,
                StoreV::RowWise,
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

    /// Generate the m×n matrix Q with orthonormal rows defined as the first
    /// `m` rows of the product of `k` reflectors from
    /// [`dgelqf`](Self::dgelqf). Requires `k <= m <= n`. `work` needs `m`
    /// elements.
    #[allow(clippy::too_many_arguments)]
    pub fn dorgl2(
        &self,
        m: usize,
        n: usize,
        k: usize,
        a: &mut [f64],
        lda: usize,
        tau: &[f64],
        work: &mut [f64],
    ) {
        assert!(m <= n, "{}", check::M_LT_N);
        assert!(k <= m, "{}", check::K_GT_M);
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(tau, k, check::SHORT_TAU);
        check::length(work, m, check::SHORT_WORK);
        if m == 0 {
            return;
        }

        // Rows k..m start as unit vectors.
        for l in k..m {
            a[l * lda..l * lda + n].fill(0.0);
            a[l * lda + l] = 1.0;
        }
        for i in (0..k).rev() {
            if i < n - 1 {
                if i < m - 1 {
                    a[i * lda + i] = 1.0;
                    self.dlarf_within(Side::Right, m - i - 1, n - i, a, i * lda + i, 1, (i + 1) * lda + i, lda, tau[i], work);
                }
                self.blas.dscal(n - i - 1, -tau[i], &mut a[i * lda + i + 1..], 1);
            }
            a[i * lda + i] = 1.0 - tau[i];
            a[i * lda..i * lda + i].fill(0.0);
        }
    }

    /// Blocked [`dorgl2`](Self::dorgl2).
    ///
    /// `lwork` must be at least `max(1, m)`; `lwork == -1` is a workspace query.
    #[allow(clippy::too_many_arguments)]
    pub fn dorglq(
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
        assert!(m <= n, "{}", check::M_LT_N);
        assert!(k <= m, "{}", check::K_GT_M);
        check::leading_dim(n, lda, check::BAD_LD_A);
        let nx = self.blocking.nx;
        let need = |nb: usize| nb * (nb + m);
        if check::workspace(work, lwork, m) {
            work[0] = match self.panel_width(k, nx, usize::MAX, need) {
                Some(nb) => need(nb).max(m),
                None => m.max(1),
            } as f64;
            return;
        }
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(tau, k, check::SHORT_TAU);
        if m == 0 {
            return;
        }

        let (nb, ki, kk) = match self.panel_width(k, nx, lwork as usize, need) {
            Some(nb) => {
                let ki = ((k - nx - 1) / nb) * nb;
                let kk = k.min(ki + nb);
                for l in kk..m {
                    a[l * lda..l * lda + kk].fill(0.0);
                }
                (nb, ki, kk)
            }
            None => (0, 0, 0),
        };

        if kk < m {
            self.dorgl2(m - kk, n - kk, k - kk, &mut a[kk * lda + kk..], lda, &tau[kk..], work);
        }
        if kk == 0 {
            return;
        }
        log::debug!("dorglq: {}x{} from {} reflectors in panels of {}", m, n, k, nb);
        for i in (0..=ki).rev().step_by(nb) {
            let ib = nb.min(k - i);
            if i + ib < m {
                let (panel, trailing) = a.split_at_mut((i + ib) * lda);
                let v = &panel[i * lda + i..];
                let (t, w) = work.split_at_mut(nb * nb);
                self.dlarft(Direct::Forward, StoreV::RowWise, n - i, ib, v, lda, &tau[i..], t, ib);
                self.dlarfb(
                    Side::Right,
                    Transpose::Trans,
                    Direct::Forward,
                    StoreV::RowWise,
                    m - i - ib,
                    n - i,
                    ib,
                    v,
                    lda,
                    t,
                    ib,
                    &mut trailing[i..],
                    lda,
                    w,
                    ib,
                );
            }
            self.dorgl2(ib, n - i, ib, &mut a[i * lda + i..], lda, &tau[i..], work);
            for l in i..i + ib {
                a[l * lda..l * lda + i].fill(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::testutil::{matmul, max_diff, orthonormal_rows_error, random_matrix};
    use crate::native::Blocking;

    fn small_panels() -> Lapack {
        Lapack::default().with_blocking(Blocking { nb: 2, nbmin: 2, nx: 0 })
    }

    fn query(f: impl FnOnce(&mut [f64])) -> usize {
        let mut w = [0.0];
        f(&mut w);
        w[0] as usize
    }

    #[test]
    fn lq_reconstructs_wide_and_tall() {
        for l in [Lapack::default(), small_panels()] {
            for (m, n) in [(5, 7), (5, 3), (6, 6), (3, 1), (1, 4)] {
                let lda = n + 1;
                let a0 = random_matrix(m, n, lda, (m * 13 + n) as u64);
                let mut a = a0.clone();
                let k = m.min(n);
                let mut tau = vec![0.0; k];
                let lwork = query(|w| l.dgelqf(m, n, &mut [], lda, &mut [], w, -1));
                let mut work = vec![0.0; lwork];
                l.dgelqf(m, n, &mut a, lda, &mut tau, &mut work, lwork as isize);

                let mut lower = vec![0.0; m * n];
                for i in 0..m {
                    for j in 0..=i.min(n - 1) {
                        lower[i * n + j] = a[i * lda + j];
                    }
                }
                let mut q = vec![0.0; n * n];
                for i in 0..k {
                    q[i * n..i * n + n].copy_from_slice(&a[i * lda..i * lda + n]);
                }
                let lwork = query(|w| l.dorglq(n, n, k, &mut [], n, &[], w, -1));
                let mut work = vec![0.0; lwork];
                l.dorglq(n, n, k, &mut q, n, &tau, &mut work, lwork as isize);

                assert!(orthonormal_rows_error(n, n, &q, n) < 1e-13, "{}x{}: Q not orthogonal", m, n);
                let lq = matmul(m, n, n, &lower, n, &q, n);
                assert!(max_diff(m, n, &lq, n, &a0, lda) < 1e-13, "{}x{}: LQ != A", m, n);
            }
        }
    }

    #[test]
    fn blocked_factor_matches_unblocked() {
        let (m, n) = (7, 9);
        let a0 = random_matrix(m, n, n, 4);

        let mut a1 = a0.clone();
        let mut tau1 = vec![0.0; m];
        Lapack::default().dgelq2(m, n, &mut a1, n, &mut tau1, &mut vec![0.0; m]);

        let l = small_panels();
        let mut a2 = a0.clone();
        let mut tau2 = vec![0.0; m];
        let lwork = query(|w| l.dgelqf(m, n, &mut [], n, &mut [], w, -1));
        let mut work = vec![0.0; lwork];
        l.dgelqf(m, n, &mut a2, n, &mut tau2, &mut work, lwork as isize);

        assert!(max_diff(m, n, &a1, n, &a2, n) < 1e-12);
        assert!(max_diff(1, m, &tau1, m, &tau2, m) < 1e-12);
    }

    #[test]
    fn ormlq_matches_explicit_q() {
        let (nq, n, k) = (7, 4, 5);
        let mut a = random_matrix(k, nq, nq, 22);
        let mut tau = vec![0.0; k];
        let l = Lapack::default();
        l.dgelq2(k, nq, &mut a, nq, &mut tau, &mut vec![0.0; k]);
        let a_fact = a.clone();

        let mut q = vec![0.0; nq * nq];
        q[..k * nq].copy_from_slice(&a);
        l.dorgl2(nq, nq, k, &mut q, nq, &tau, &mut vec![0.0; nq]);
        let mut qt = vec![0.0; nq * nq];
        for i in 0..nq {
            for j in 0..nq {
                qt[j * nq + i] = q[i * nq + j];
            }
        }

        for l in [Lapack::default(), small_panels()] {
            for side in [Side::Left, Side::Right] {
                for trans in [Transpose::NoTrans, Transpose::Trans] {
                    let (cm, cn) = if side == Side::Left { (nq, n) } else { (n, nq) };
                    let c0 = random_matrix(cm, cn, cn, 6);
                    let op = if trans == Transpose::NoTrans { &q } else { &qt };
                    let want = if side == Side::Left {
                        matmul(cm, cn, cm, op, nq, &c0, cn)
                    } else {
                        matmul(cm, cn, cn, &c0, cn, op, nq)
                    };

                    let mut c = c0.clone();
                    let lwork = query(|w| l.dormlq(side, trans, cm, cn, k, &mut [], nq, &[], &mut [], cn, w, -1));
                    let mut work = vec![0.0; lwork];
                    l.dormlq(side, trans, cm, cn, k, &mut a, nq, &tau, &mut c, cn, &mut work, lwork as isize);
                    assert!(max_diff(cm, cn, &c, cn, &want, cn) < 1e-13, "{:?} {:?}", side, trans);
                    assert_eq!(a, a_fact);
                }
            }
        }
    }

    #[test]
    fn orglq_blocked_matches_unblocked() {
        let (m, n, k) = (8, 10, 7);
        let mut a = random_matrix(m, n, n, 10);
        let mut tau = vec![0.0; m];
        let l = Lapack::default();
        l.dgelq2(m, n, &mut a, n, &mut tau, &mut vec![0.0; m]);

        let mut q1 = a.clone();
        l.dorgl2(m, n, k, &mut q1, n, &tau, &mut vec![0.0; m]);

        let sp = small_panels();
        let mut q2 = a.clone();
        let lwork = query(|w| sp.dorglq(m, n, k, &mut [], n, &[], w, -1));
        let mut work = vec![0.0; lwork];
        sp.dorglq(m, n, k, &mut q2, n, &tau, &mut work, lwork as isize);

        assert!(orthonormal_rows_error(m, n, &q2, n) < 1e-13);
        assert!(max_diff(m, n, &q1, n, &q2, n) < 1e-12);
    }
}
