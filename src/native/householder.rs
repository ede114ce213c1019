use super::{check, sign, Direct, Lapack, StoreV, DLAMCH_E, DLAMCH_S};
use crate::blas::{mat_len, Diag, Float64, Side, Transpose, Uplo};

impl<B: Float64> Lapack<B> {
    /// Generate an elementary reflector `H = I - tau * v * vᵀ` such that
    ///
    /// ```text
    /// H * [alpha]   [beta]
    ///     [  x  ] = [  0 ]
    /// ```
    ///
    /// `v = [1; x']` with `x'` written over the `n-1` elements of `x`. Returns
    /// `(beta, tau)`; `tau == 0` (H is the identity) when `x` is already zero.
    pub fn dlarfg(&self, n: usize, alpha: f64, x: &mut [f64], incx: usize) -> (f64, f64) {
        if n <= 1 {
            return (alpha, 0.0);
        }
        check::vector(n - 1, x, incx as isize);

        let mut xnorm = self.blas.dnrm2(n - 1, x, incx);
        if xnorm == 0.0 {
            return (alpha, 0.0);
        }
        let mut alpha = alpha;
        let mut beta = -sign(self.dlapy2(alpha, xnorm), alpha);
        let safmin = DLAMCH_S / DLAMCH_E;
        let mut knt = 0;
        if beta.abs() < safmin {
            // beta may be inaccurate; scale x and recompute.
            let rsafmn = 1.0 / safmin;
            loop {
                knt += 1;
                self.blas.dscal(n - 1, rsafmn, x, incx);
                beta *= rsafmn;
                alpha *= rsafmn;
                if beta.abs() >= safmin || knt >= 20 {
                    break;
                }
            }
            xnorm = self.blas.dnrm2(n - 1, x, incx);
            beta = -sign(self.dlapy2(alpha, xnorm), alpha);
        }
        let tau = (beta - alpha) / beta;
        self.blas.dscal(n - 1, 1.0 / (alpha - beta), x, incx);
        for _ in 0..knt {
            beta *= safmin;
        }
        (beta, tau)
    }

    /// Apply `H = I - tau * v * vᵀ` to the m×n matrix C from `side`.
    ///
    /// `v` has `m` elements (left) or `n` elements (right) at stride `incv`.
    /// `work` needs `n` (left) or `m` (right) elements.
    #[allow(clippy::too_many_arguments)]
    pub fn dlarf(
        &self,
        side: Side,
        m: usize,
        n: usize,
        v: &[f64],
        incv: isize,
        tau: f64,
        c: &mut [f64],
        ldc: usize,
        work: &mut [f64],
    ) {
        let applyleft = side == Side::Left;
        let lenv = if applyleft { m } else { n };
        check::vector(lenv, v, incv);
        check::matrix(m, n, c, ldc, check::BAD_LD_C, check::SHORT_C);
        check::length(work, if applyleft { n } else { m }, check::SHORT_WORK);

        let lastv = if incv > 0 { trailing_nonzero(v, lenv, incv as usize) } else { lenv };
        if tau == 0.0 || lastv == 0 {
            return;
        }
        if applyleft {
            let lastc = last_nonzero_col(lastv, n, c, ldc);
            if lastc == 0 {
                return;
            }
            // w = C[0..lastv, 0..lastc]ᵀ v;  C -= tau * v * wᵀ
            self.blas.dgemv(Transpose::Trans, lastv, lastc, 1.0, c, ldc, v, incv, 0.0, work, 1);
            self.blas.dger(lastv, lastc, -tau, v, incv, work, 1, c, ldc);
        } else {
            let lastc = last_nonzero_row(m, lastv, c, ldc);
            if lastc == 0 {
                return;
            }
            // w = C[0..lastc, 0..lastv] v;  C -= tau * w * vᵀ
            self.blas.dgemv(Transpose::NoTrans, lastc, lastv, 1.0, c, ldc, v, incv, 0.0, work, 1);
            self.blas.dger(lastc, lastv, -tau, work, 1, v, incv, c, ldc);
        }
    }

    /// [`dlarf`](Self::dlarf) for a reflector stored in the same buffer as C.
    ///
    /// `v` starts at `buf[v_off]` with stride `incv`, C at `buf[c_off]`. The
    /// two must not share elements. The rank-1 update is done one row (left)
    /// or column (right) at a time so that `v` is only read through scalars.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn dlarf_within(
        &self,
        side: Side,
        m: usize,
        n: usize,
        buf: &mut [f64],
        v_off: usize,
        incv: usize,
        c_off: usize,
        ldc: usize,
        tau: f64,
        work: &mut [f64],
    ) {
        let applyleft = side == Side::Left;
        let lenv = if applyleft { m } else { n };
        if tau == 0.0 || m == 0 || n == 0 {
            return;
        }
        let lastv = trailing_nonzero(&buf[v_off..], lenv, incv);
        if lastv == 0 {
            return;
        }
        if applyleft {
            let lastc = last_nonzero_col(lastv, n, &buf[c_off..], ldc);
            if lastc == 0 {
                return;
            }
            self.blas.dgemv(
                Transpose::Trans,
                lastv,
                lastc,
                1.0,
                &buf[c_off..],
                ldc,
                &buf[v_off..],
                incv as isize,
                0.0,
                work,
                1,
            );
            for r in 0..lastv {
                let vr = buf[v_off + r * incv];
                self.blas.daxpy(lastc, -tau * vr, work, 1, &mut buf[c_off + r * ldc..], 1);
            }
        } else {
            let lastc = last_nonzero_row(m, lastv, &buf[c_off..], ldc);
            if lastc == 0 {
                return;
            }
            self.blas.dgemv(
                Transpose::NoTrans,
                lastc,
                lastv,
                1.0,
                &buf[c_off..],
                ldc,
                &buf[v_off..],
                incv as isize,
                0.0,
                work,
                1,
            );
            for j in 0..lastv {
                let vj = buf[v_off + j * incv];
                self.blas.daxpy(lastc, -tau * vj, work, 1, &mut buf[c_off + j..], ldc as isize);
            }
        }
    }

    /// Form the k×k triangular factor T of a block reflector
    /// `H = I - V * T * Vᵀ` built from `k` elementary reflectors of order `n`.
    ///
    /// Column-wise V is n×k, row-wise V is k×n. T is upper triangular for
    /// [`Direct::Forward`] and lower triangular for [`Direct::Backward`]; the
    /// other triangle is not referenced. The unit diagonal of V is implied.
    #[allow(clippy::too_many_arguments)]
    pub fn dlarft(
        &self,
        direct: Direct,
        store: StoreV,
        n: usize,
        k: usize,
        v: &[f64],
        ldv: usize,
        tau: &[f64],
        t: &mut [f64],
        ldt: usize,
    ) {
        assert!(k <= n, "{}", check::K_GT_N);
        if n == 0 || k == 0 {
            return;
        }
        match store {
            StoreV::ColumnWise => check::matrix(n, k, v, ldv, check::BAD_LD_V, check::SHORT_V),
            StoreV::RowWise => check::matrix(k, n, v, ldv, check::BAD_LD_V, check::SHORT_V),
        }
        check::length(tau, k, check::SHORT_TAU);
        check::matrix(k, k, t, ldt, check::BAD_LD_T, check::SHORT_T);

        match direct {
            Direct::Forward => {
                for i in 0..k {
                    if tau[i] == 0.0 {
                        for j in 0..=i {
                            t[j * ldt + i] = 0.0;
                        }
                        continue;
                    }
                    // T[0..i, i] = -tau[i] * V[i.., 0..i]ᵀ * V[i.., i]
                    match store {
                        StoreV::ColumnWise => {
                            for j in 0..i {
                                t[j * ldt + i] = -tau[i] * v[i * ldv + j];
                            }
                            if i > 0 && i + 1 < n {
                                self.blas.dgemv(
                                    Transpose::Trans,
                                    n - i - 1,
                                    i,
                                    -tau[i],
                                    &v[(i + 1) * ldv..],
                                    ldv,
                                    &v[(i + 1) * ldv + i..],
                                    ldv as isize,
                                    1.0,
                                    &mut t[i..],
                                    ldt as isize,
                                );
                            }
                        }
                        StoreV::RowWise => {
                            for j in 0..i {
                                t[j * ldt + i] = -tau[i] * v[j * ldv + i];
                            }
                            if i > 0 && i + 1 < n {
                                self.blas.dgemv(
                                    Transpose::NoTrans,
                                    i,
                                    n - i - 1,
                                    -tau[i],
                                    &v[i + 1..],
                                    ldv,
                                    &v[i * ldv + i + 1..],
                                    1,
                                    1.0,
                                    &mut t[i..],
                                    ldt as isize,
                                );
                            }
                        }
                    }
                    // T[0..i, i] = T[0..i, 0..i] * T[0..i, i], upper triangular.
                    for r in 0..i {
                        let mut sum = 0.0;
                        for c in r..i {
                            sum += t[r * ldt + c] * t[c * ldt + i];
                        }
                        t[r * ldt + i] = sum;
                    }
                    t[i * ldt + i] = tau[i];
                }
            }
            Direct::Backward => {
                for i in (0..k).rev() {
                    if tau[i] == 0.0 {
                        for j in i..k {
                            t[j * ldt + i] = 0.0;
                        }
                        continue;
                    }
                    if i + 1 < k {
                        let p = n - k + i;
                        match store {
                            StoreV::ColumnWise => {
                                for j in i + 1..k {
                                    t[j * ldt + i] = -tau[i] * v[p * ldv + j];
                                }
                                self.blas.dgemv(
                                    Transpose::Trans,
                                    p,
                                    k - i - 1,
                                    -tau[i],
                                    &v[i + 1..],
                                    ldv,
                                    &v[i..],
                                    ldv as isize,
                                    1.0,
                                    &mut t[(i + 1) * ldt + i..],
                                    ldt as isize,
                                );
                            }
                            StoreV::RowWise => {
                                for j in i + 1..k {
                                    t[j * ldt + i] = -tau[i] * v[j * ldv + p];
                                }
                                self.blas.dgemv(
                                    Transpose::NoTrans,
                                    k - i - 1,
                                    p,
                                    -tau[i],
                                    &v[(i + 1) * ldv..],
                                    ldv,
                                    &v[i * ldv..],
                                    1,
                                    1.0,
                                    &mut t[(i + 1) * ldt + i..],
                                    ldt as isize,
                                );
                            }
                        }
                        // T[i+1..k, i] = T[i+1..k, i+1..k] * T[i+1..k, i], lower triangular.
                        for r in (i + 1..k).rev() {
                            let mut sum = 0.0;
                            for c in i + 1..=r {
                                sum += t[r * ldt + c] * t[c * ldt + i];
                            }
                            t[r * ldt + i] = sum;
                        }
                    }
                    t[i * ldt + i] = tau[i];
                }
            }
        }
    }

    /// Apply the block reflector `H = I - V * T * Vᵀ` (or Hᵀ) to the m×n
    /// matrix C from `side`.
    ///
    /// V holds `k` reflectors stored per `store` and `direct` (see
    /// [`dlarft`](Self::dlarft)); its unit triangle is implied. `work` is
    /// n×k (left) or m×k (right) with leading dimension `ldwork >= k`.
    #[allow(clippy::too_many_arguments)]
    pub fn dlarfb(
        &self,
        side: Side,
        trans: Transpose,
        direct: Direct,
        store: StoreV,
        m: usize,
        n: usize,
        k: usize,
        v: &[f64],
        ldv: usize,
        t: &[f64],
        ldt: usize,
        c: &mut [f64],
        ldc: usize,
        work: &mut [f64],
        ldwork: usize,
    ) {
        let nv = if side == Side::Left { m } else { n };
        match store {
            StoreV::ColumnWise => {
                assert!(k <= nv, "{}", check::BAD_SHAPE);
                check::matrix(nv, k, v, ldv, check::BAD_LD_V, check::SHORT_V);
            }
            StoreV::RowWise => {
                assert!(k <= nv, "{}", check::BAD_SHAPE);
                check::matrix(k, nv, v, ldv, check::BAD_LD_V, check::SHORT_V);
            }
        }
        check::matrix(k, k, t, ldt, check::BAD_LD_T, check::SHORT_T);
        check::matrix(m, n, c, ldc, check::BAD_LD_C, check::SHORT_C);
        let nw = if side == Side::Left { n } else { m };
        check::leading_dim(k, ldwork, check::BAD_LD_WORK);
        assert!(work.len() >= mat_len(nw, k, ldwork), "{}", check::SHORT_WORK);
        if m == 0 || n == 0 || k == 0 {
            return;
        }

        let blas = &self.blas;
        let transt = trans.flip();
        let (ldw, w) = (ldwork, work);

        // The unit-triangular block of V and the other block, by layout.
        //   ColumnWise/Forward:  V = [V1; V2], V1 = rows 0..k, unit lower
        //   ColumnWise/Backward: V = [V1; V2], V2 = last k rows, unit upper
        //   RowWise/Forward:     V = [V1 V2], V1 = cols 0..k, unit upper
        //   RowWise/Backward:    V = [V1 V2], V2 = last k cols, unit lower
        match (store, direct, side) {
            (StoreV::ColumnWise, Direct::Forward, Side::Left) => {
                // W = C1ᵀ V1 + C2ᵀ V2
                copy_transposed(k, n, c, ldc, w, ldw);
                blas.dtrmm(Side::Right, Uplo::Lower, Transpose::NoTrans, Diag::Unit, n, k, 1.0, v, ldv, w, ldw);
                if m > k {
                    blas.dgemm(Transpose::Trans, Transpose::NoTrans, n, k, m - k, 1.0, &c[k * ldc..], ldc, &v[k * ldv..], ldv, 1.0, w, ldw);
                }
                blas.dtrmm(Side::Right, Uplo::Upper, transt, Diag::NonUnit, n, k, 1.0, t, ldt, w, ldw);
                // C -= V Wᵀ
                if m > k {
                    blas.dgemm(Transpose::NoTrans, Transpose::Trans, m - k, n, k, -1.0, &v[k * ldv..], ldv, w, ldw, 1.0, &mut c[k * ldc..], ldc);
                }
                blas.dtrmm(Side::Right, Uplo::Lower, Transpose::Trans, Diag::Unit, n, k, 1.0, v, ldv, w, ldw);
                sub_transposed(k, n, c, ldc, w, ldw);
            }
            (StoreV::ColumnWise, Direct::Forward, Side::Right) => {
                // W = C1 V1 + C2 V2
                copy_block(m, k, c, ldc, w, ldw);
                blas.dtrmm(Side::Right, Uplo::Lower, Transpose::NoTrans, Diag::Unit, m, k, 1.0, v, ldv, w, ldw);
                if n > k {
                    blas.dgemm(Transpose::NoTrans, Transpose::NoTrans, m, k, n - k, 1.0, &c[k..], ldc, &v[k * ldv..], ldv, 1.0, w, ldw);
                }
                blas.dtrmm(Side::Right, Uplo::Upper, trans, Diag::NonUnit, m, k, 1.0, t, ldt, w, ldw);
                // C -= W Vᵀ
                if n > k {
                    blas.dgemm(Transpose::NoTrans, Transpose::Trans, m, n - k, k, -1.0, w, ldw, &v[k * ldv..], ldv, 1.0, &mut c[k..], ldc);
                }
                blas.dtrmm(Side::Right, Uplo::Lower, Transpose::Trans, Diag::Unit, m, k, 1.0, v, ldv, w, ldw);
                sub_block(m, k, c, ldc, w, ldw);
            }
            (StoreV::ColumnWise, Direct::Backward, Side::Left) => {
                let v2 = &v[(m - k) * ldv..];
                // W = C2ᵀ V2 + C1ᵀ V1
                copy_transposed(k, n, &c[(m - k) * ldc..], ldc, w, ldw);
                blas.dtrmm(Side::Right, Uplo::Upper, Transpose::NoTrans, Diag::Unit, n, k, 1.0, v2, ldv, w, ldw);
                if m > k {
                    blas.dgemm(Transpose::Trans, Transpose::NoTrans, n, k, m - k, 1.0, c, ldc, v, ldv, 1.0, w, ldw);
                }
                blas.dtrmm(Side::Right, Uplo::Lower, transt, Diag::NonUnit, n, k, 1.0, t, ldt, w, ldw);
                if m > k {
                    blas.dgemm(Transpose::NoTrans, Transpose::Trans, m - k, n, k, -1.0, v, ldv, w, ldw, 1.0, c, ldc);
                }
                blas.dtrmm(Side::Right, Uplo::Upper, Transpose::Trans, Diag::Unit, n, k, 1.0, v2, ldv, w, ldw);
                sub_transposed(k, n, &mut c[(m - k) * ldc..], ldc, w, ldw);
            }
            (StoreV::ColumnWise, Direct::Backward, Side::Right) => {
                let v2 = &v[(n - k) * ldv..];
                // W = C2 V2 + C1 V1
                copy_block(m, k, &c[n - k..], ldc, w, ldw);
                blas.dtrmm(Side::Right, Uplo::Upper, Transpose::NoTrans, Diag::Unit, m, k, 1.0, v2, ldv, w, ldw);
                if n > k {
                    blas.dgemm(Transpose::NoTrans, Transpose::NoTrans, m, k, n - k, 1.0, c, ldc, v, ldv, 1.0, w, ldw);
                }
                blas.dtrmm(Side::Right, Uplo::Lower, trans, Diag::NonUnit, m, k, 1.0, t, ldt, w, ldw);
                if n > k {
                    blas.dgemm(Transpose::NoTrans, Transpose::Trans, m, n - k, k, -1.0, w, ldw, v, ldv, 1.0, c, ldc);
                }
                blas.dtrmm(Side::Right, Uplo::Upper, Transpose::Trans, Diag::Unit, m, k, 1.0, v2, ldv, w, ldw);
                sub_block(m, k, &mut c[n - k..], ldc, w, ldw);
            }
            (StoreV::RowWise, Direct::Forward, Side::Left) => {
                // W = C1ᵀ V1ᵀ + C2ᵀ V2ᵀ
                copy_transposed(k, n, c, ldc, w, ldw);
                blas.dtrmm(Side::Right, Uplo::Upper, Transpose::Trans, Diag::Unit, n, k, 1.0, v, ldv, w, ldw);
                if m > k {
                    blas.dgemm(Transpose::Trans, Transpose::Trans, n, k, m - k, 1.0, &c[k * ldc..], ldc, &v[k..], ldv, 1.0, w, ldw);
                }
                blas.dtrmm(Side::Right, Uplo::Upper, transt, Diag::NonUnit, n, k, 1.0, t, ldt, w, ldw);
                // C -= Vᵀ Wᵀ
                if m > k {
                    blas.dgemm(Transpose::Trans, Transpose::Trans, m - k, n, k, -1.0, &v[k..], ldv, w, ldw, 1.0, &mut c[k * ldc..], ldc);
                }
                blas.dtrmm(Side::Right, Uplo::Upper, Transpose::NoTrans, Diag::Unit, n, k, 1.0, v, ldv, w, ldw);
                sub_transposed(k, n, c, ldc, w, ldw);
            }
            (StoreV::RowWise, Direct::Forward, Side::Right) => {
                // W = C1 V1ᵀ + C2 V2ᵀ
                copy_block(m, k, c, ldc, w, ldw);
                blas.dtrmm(Side::Right, Uplo::Upper, Transpose::Trans, Diag::Unit, m, k, 1.0, v, ldv, w, ldw);
                if n > k {
                    blas.dgemm(Transpose::NoTrans, Transpose::Trans, m, k, n - k, 1.0, &c[k..], ldc, &v[k..], ldv, 1.0, w, ldw);
                }
                blas.dtrmm(Side::Right, Uplo::Upper, trans, Diag::NonUnit, m, k, 1.0, t, ldt, w, ldw);
                // C -= W V
                if n > k {
                    blas.dgemm(Transpose::NoTrans, Transpose::NoTrans, m, n - k, k, -1.0, w, ldw, &v[k..], ldv, 1.0, &mut c[k..], ldc);
                }
                blas.dtrmm(Side::Right, Uplo::Upper, Transpose::NoTrans, Diag::Unit, m, k, 1.0, v, ldv, w, ldw);
                sub_block(m, k, c, ldc, w, ldw);
            }
            (StoreV::RowWise, Direct::Backward, Side::Left) => {
                let v2 = &v[m - k..];
                // W = C2ᵀ V2ᵀ + C1ᵀ V1ᵀ
                copy_transposed(k, n, &c[(m - k) * ldc..], ldc, w, ldw);
                blas.dtrmm(Side::Right, Uplo::Lower, Transpose::Trans, Diag::Unit, n, k, 1.0, v2, ldv, w, ldw);
                if m > k {
                    blas.dgemm(Transpose::Trans, Transpose::Trans, n, k, m - k, 1.0, c, ldc, v, ldv, 1.0, w, ldw);
                }
                blas.dtrmm(Side::Right, Uplo::Lower, transt, Diag::NonUnit, n, k, 1.0, t, ldt, w, ldw);
                if m > k {
                    blas.dgemm(Transpose::Trans, Transpose::Trans, m - k, n, k, -1.0, v, ldv, w, ldw, 1.0, c, ldc);
                }
                blas.dtrmm(Side::Right, Uplo::Lower, Transpose::NoTrans, Diag::Unit, n, k, 1.0, v2, ldv, w, ldw);
                sub_transposed(k, n, &mut c[(m - k) * ldc..], ldc, w, ldw);
            }
            (StoreV::RowWise, Direct::Backward, Side::Right) => {
                let v2 = &v[n - k..];
                // W = C2 V2ᵀ + C1 V1ᵀ
                copy_block(m, k, &c[n - k..], ldc, w, ldw);
                blas.dtrmm(Side::Right, Uplo::Lower, Transpose::Trans, Diag::Unit, m, k, 1.0, v2, ldv, w, ldw);
                if n > k {
                    blas.dgemm(Transpose::NoTrans, Transpose::Trans, m, k, n - k, 1.0, c, ldc, v, ldv, 1.0, w, ldw);
                }
                blas.dtrmm(Side::Right, Uplo::Lower, trans, Diag::NonUnit, m, k, 1.0, t, ldt, w, ldw);
                if n > k {
                    blas.dgemm(Transpose::NoTrans, Transpose::NoTrans, m, n - k, k, -1.0, w, ldw, v, ldv, 1.0, c, ldc);
                }
                blas.dtrmm(Side::Right, Uplo::Lower, Transpose::NoTrans, Diag::Unit, m, k, 1.0, v2, ldv, w, ldw);
                sub_block(m, k, &mut c[n - k..], ldc, w, ldw);
            }
        }
    }
}

/// Number of leading elements of `v` up to and including the last nonzero.
fn trailing_nonzero(v: &[f64], n: usize, inc: usize) -> usize {
    let mut lastv = n;
    while lastv > 0 && v[(lastv - 1) * inc] == 0.0 {
        lastv -= 1;
    }
    lastv
}

/// One past the last column of the leading m×n block holding a nonzero.
fn last_nonzero_col(m: usize, n: usize, a: &[f64], lda: usize) -> usize {
    if n == 0 {
        return 0;
    }
    if a[n - 1] != 0.0 || a[(m - 1) * lda + n - 1] != 0.0 {
        return n;
    }
    (0..n)
        .rev()
        .find(|&j| (0..m).any(|i| a[i * lda + j] != 0.0))
        .map_or(0, |j| j + 1)
}

/// One past the last row of the leading m×n block holding a nonzero.
fn last_nonzero_row(m: usize, n: usize, a: &[f64], lda: usize) -> usize {
    if m == 0 {
        return 0;
    }
    if a[(m - 1) * lda] != 0.0 || a[(m - 1) * lda + n - 1] != 0.0 {
        return m;
    }
    (0..m)
        .rev()
        .find(|&i| a[i * lda..i * lda + n].iter().any(|&x| x != 0.0))
        .map_or(0, |i| i + 1)
}

/// `W[j, l] = C[l, j]` for the leading k×n block of C.
fn copy_transposed(k: usize, n: usize, c: &[f64], ldc: usize, w: &mut [f64], ldw: usize) {
    for l in 0..k {
        for j in 0..n {
            w[j * ldw + l] = c[l * ldc + j];
        }
    }
}

/// `C[l, j] -= W[j, l]` for the leading k×n block of C.
fn sub_transposed(k: usize, n: usize, c: &mut [f64], ldc: usize, w: &[f64], ldw: usize) {
    for l in 0..k {
        for j in 0..n {
            c[l * ldc + j] -= w[j * ldw + l];
        }
    }
}

/// `W = C` for the leading m×k block.
fn copy_block(m: usize, k: usize, c: &[f64], ldc: usize, w: &mut [f64], ldw: usize) {
    for i in 0..m {
        w[i * ldw..i * ldw + k].copy_from_slice(&c[i * ldc..i * ldc + k]);
    }
}

/// `C -= W` for the leading m×k block.
fn sub_block(m: usize, k: usize, c: &mut [f64], ldc: usize, w: &[f64], ldw: usize) {
    for i in 0..m {
        for (cij, wij) in c[i * ldc..i * ldc + k].iter_mut().zip(&w[i * ldw..i * ldw + k]) {
            *cij -= wij;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::testutil::{assert_near, matmul, max_diff, random_matrix};

    /// Explicit n×n `I - tau v vᵀ` for a dense v.
    fn reflector(n: usize, v: &[f64], tau: f64) -> Vec<f64> {
        let mut h = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                h[i * n + j] = if i == j { 1.0 } else { 0.0 } - tau * v[i] * v[j];
            }
        }
        h
    }

    #[test]
    fn larfg_zeroes_tail() {
        let l = Lapack::default();
        for &scale in &[1.0, 1e-300, 1e300] {
            let orig: Vec<f64> = [3.0, -1.0, 2.0, 0.5].iter().map(|v| v * scale).collect();
            let mut x = orig[1..].to_vec();
            let (beta, tau) = l.dlarfg(4, orig[0], &mut x, 1);
            let norm = orig.iter().map(|v| (v / scale) * (v / scale)).sum::<f64>().sqrt();
            assert_near((beta / scale).abs(), norm, 1e-12, "|beta| is the norm");

            let mut v = vec![1.0];
            v.extend_from_slice(&x);
            let h = reflector(4, &v, tau);
            let hx = matmul(4, 1, 4, &h, 4, &orig, 1);
            assert_near(hx[0] / scale, beta / scale, 1e-12, "leading entry");
            for (i, &r) in hx.iter().enumerate().skip(1) {
                assert_near(r / scale, 0.0, 1e-12, &format!("entry {}", i));
            }
        }
    }

    #[test]
    fn larfg_zero_tail_is_identity() {
        let l = Lapack::default();
        let mut x = [0.0, 0.0];
        let (beta, tau) = l.dlarfg(3, -7.0, &mut x, 1);
        assert_eq!((beta, tau), (-7.0, 0.0));
    }

    #[test]
    fn larf_matches_explicit_reflector() {
        let l = Lapack::default();
        let (m, n) = (4, 3);
        let c0 = random_matrix(m, n, n, 1);
        let v = [1.0, 0.3, -0.7, 0.2];
        let tau = 1.3;

        let mut c = c0.clone();
        let mut work = vec![0.0; n];
        l.dlarf(Side::Left, m, n, &v, 1, tau, &mut c, n, &mut work);
        let want = matmul(m, n, m, &reflector(m, &v, tau), m, &c0, n);
        assert!(max_diff(m, n, &c, n, &want, n) < 1e-14);

        let vr = [1.0, -0.4, 0.9];
        let mut c = c0.clone();
        let mut work = vec![0.0; m];
        l.dlarf(Side::Right, m, n, &vr, 1, tau, &mut c, n, &mut work);
        let want = matmul(m, n, n, &c0, n, &reflector(n, &vr, tau), n);
        assert!(max_diff(m, n, &c, n, &want, n) < 1e-14);
    }

    /// Apply k reflectors one at a time with dlarf, as the reference for dlarfb.
    #[allow(clippy::too_many_arguments)]
    fn apply_sequentially(
        side: Side,
        trans: Transpose,
        direct: Direct,
        store: StoreV,
        m: usize,
        n: usize,
        k: usize,
        v: &[f64],
        ldv: usize,
        tau: &[f64],
        c: &mut [f64],
        ldc: usize,
    ) {
        let l = Lapack::default();
        let nv = if side == Side::Left { m } else { n };
        // Dense copy of each reflector with the implied unit and zero entries.
        let vec_of = |i: usize| -> Vec<f64> {
            let mut out = vec![0.0; nv];
            let one_at = match direct {
                Direct::Forward => i,
                Direct::Backward => nv - k + i,
            };
            for (r, o) in out.iter_mut().enumerate() {
                let stored = match store {
                    StoreV::ColumnWise => v[r * ldv + i],
                    StoreV::RowWise => v[i * ldv + r],
                };
                *o = match direct {
                    Direct::Forward if r < one_at => 0.0,
                    Direct::Backward if r > one_at => 0.0,
                    _ if r == one_at => 1.0,
                    _ => stored,
                };
            }
            out
        };
        // H = H(0) H(1) ... H(k-1) (forward) or H(k-1) ... H(0) (backward).
        // Left NoTrans applies H: the rightmost factor acts first.
        let mut order: Vec<usize> = match direct {
            Direct::Forward => (0..k).rev().collect(),
            Direct::Backward => (0..k).collect(),
        };
        let reverse = (side == Side::Left) == (trans == Transpose::Trans);
        if reverse {
            order.reverse();
        }
        let mut work = vec![0.0; m.max(n)];
        for i in order {
            let vi = vec_of(i);
            l.dlarf(side, m, n, &vi, 1, tau[i], c, ldc, &mut work);
        }
    }

    #[test]
    fn larfb_matches_sequential_application() {
        let l = Lapack::default();
        let (m, n, k) = (6, 5, 3);
        let tau = [1.2, 0.7, 1.9];
        for side in [Side::Left, Side::Right] {
            let nv = if side == Side::Left { m } else { n };
            for store in [StoreV::ColumnWise, StoreV::RowWise] {
                for direct in [Direct::Forward, Direct::Backward] {
                    for trans in [Transpose::NoTrans, Transpose::Trans] {
                        let (vr, vc) = match store {
                            StoreV::ColumnWise => (nv, k),
                            StoreV::RowWise => (k, nv),
                        };
                        let v = random_matrix(vr, vc, vc, 7);
                        let mut t = vec![0.0; k * k];
                        l.dlarft(direct, store, nv, k, &v, vc, &tau, &mut t, k);

                        let c0 = random_matrix(m, n, n, 11);
                        let mut c = c0.clone();
                        let nw = if side == Side::Left { n } else { m };
                        let mut work = vec![0.0; nw * k];
                        l.dlarfb(side, trans, direct, store, m, n, k, &v, vc, &t, k, &mut c, n, &mut work, k);

                        let mut want = c0.clone();
                        apply_sequentially(side, trans, direct, store, m, n, k, &v, vc, &tau, &mut want, n);
                        let diff = max_diff(m, n, &c, n, &want, n);
                        assert!(
                            diff < 1e-10,
                            "{:?} {:?} {:?} {:?}: diff {}",
                            side,
                            store,
                            direct,
                            trans,
                            diff
                        );
                    }
                }
            }
        }
    }
}
