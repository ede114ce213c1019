use num_traits::Float;

use super::{check, GenOrtho, Lapack, LinalgError, MatrixNorm, MatrixType, SvdJob, DLAMCH_P, DLAMCH_S};
use crate::blas::{Float64, Transpose, Uplo};

/// Workspace needs of the two reduction strategies for one job combination.
#[derive(Debug, Clone, Copy)]
struct Workspace {
    direct_min: usize,
    direct_opt: usize,
    /// `(min, opt)` for reducing by QR (or LQ) first. `None` when A is too
    /// close to square for that to pay off.
    compressed: Option<(usize, usize)>,
}

/// Run a workspace query and return the reported length.
fn queried(f: impl FnOnce(&mut [f64])) -> usize {
    let mut q = [0.0];
    f(&mut q);
    q[0] as usize
}

/// Aspect ratio beyond which A is compressed to a triangle before
/// bidiagonalization.
fn crossover(mn: usize) -> usize {
    (mn as f64 * 1.6) as usize
}

/// The reference path number for a job combination, for tracing.
fn path_number(short: SvdJob, long: SvdJob) -> u8 {
    match (short, long) {
        (SvdJob::None, _) => 1,
        (SvdJob::Overwrite, SvdJob::None) => 2,
        (SvdJob::Overwrite, _) => 3,
        (SvdJob::Store, SvdJob::None) => 4,
        (SvdJob::Store, SvdJob::Overwrite) => 5,
        (SvdJob::Store, _) => 6,
        (SvdJob::All, SvdJob::None) => 7,
        (SvdJob::All, SvdJob::Overwrite) => 8,
        (SvdJob::All, _) => 9,
    }
}

impl<B: Float64> Lapack<B> {
    /// Singular value decomposition `A = U * Σ * Vᵀ` of the m×n matrix A.
    ///
    /// The `min(m,n)` singular values go to `s` in decreasing order. `jobu`
    /// selects what is computed of U:
    ///
    /// - [`SvdJob::All`]: the full m×m U into `u`;
    /// - [`SvdJob::Store`]: the leading `min(m,n)` columns into `u` (m×min(m,n));
    /// - [`SvdJob::Overwrite`]: the leading `min(m,n)` columns over A;
    /// - [`SvdJob::None`]: nothing.
    ///
    /// `jobvt` does the same for the rows of Vᵀ (n×n for `All`, min(m,n)×n
    /// otherwise). Only one of the two may be `Overwrite`. A is destroyed
    /// unless it receives one of the factors.
    ///
    /// `lwork == -1` is a workspace query. With less than the reported
    /// optimum, matrices far from square are bidiagonalized directly rather
    /// than compressed by QR or LQ first; the result is the same.
    ///
    /// On [`LinalgError::ConvergenceFailure`], `work[1..min(m,n)]` holds the
    /// superdiagonal of a bidiagonal matrix with diagonal `s` that is
    /// orthogonally equivalent to A.
    #[allow(clippy::too_many_arguments)]
    pub fn dgesvd(
        &self,
        jobu: SvdJob,
        jobvt: SvdJob,
        m: usize,
        n: usize,
        a: &mut [f64],
        lda: usize,
        s: &mut [f64],
        u: &mut [f64],
        ldu: usize,
        vt: &mut [f64],
        ldvt: usize,
        work: &mut [f64],
        lwork: isize,
    ) -> Result<(), LinalgError> {
        assert!(!(jobu == SvdJob::Overwrite && jobvt == SvdJob::Overwrite), "{}", check::BAD_SVD_JOB);
        let mn = m.min(n);
        check::leading_dim(n, lda, check::BAD_LD_A);
        let ucol = match jobu {
            SvdJob::All => m,
            SvdJob::Store => mn,
            _ => 0,
        };
        let vtrow = match jobvt {
            SvdJob::All => n,
            SvdJob::Store => mn,
            _ => 0,
        };
        if ucol > 0 {
            check::leading_dim(ucol, ldu, check::BAD_LD_U);
        }
        if vtrow > 0 {
            check::leading_dim(n, ldvt, check::BAD_LD_VT);
        }

        let plan = self.svd_workspace(jobu, jobvt, m, n);
        let opt = plan.compressed.map_or(plan.direct_opt, |c| c.1).max(plan.direct_min);
        if check::workspace(work, lwork, plan.direct_min) {
            work[0] = opt as f64;
            return Ok(());
        }
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::length(s, mn, check::SHORT_S);
        if ucol > 0 {
            check::matrix(m, ucol, u, ldu, check::BAD_LD_U, check::SHORT_U);
        }
        if vtrow > 0 {
            check::matrix(vtrow, n, vt, ldvt, check::BAD_LD_VT, check::SHORT_VT);
        }
        if mn == 0 {
            return Ok(());
        }
        let lwork = lwork as usize;
        let work = &mut work[..lwork];

        // Bring the largest entry into [smlnum, bignum].
        let smlnum = Float::sqrt(DLAMCH_S) / DLAMCH_P;
        let bignum = 1.0 / smlnum;
        let anrm = self.dlange(MatrixNorm::MaxAbs, m, n, a, lda, &mut []);
        let scaled = if anrm > 0.0 && anrm < smlnum {
            Some(smlnum)
        } else if anrm > bignum {
            Some(bignum)
        } else {
            None
        };
        if let Some(to) = scaled {
            self.dlascl(MatrixType::General, anrm, to, m, n, a, lda);
        }

        let compressed = plan.compressed.is_some_and(|(min, _)| lwork >= min);
        let result = match (compressed, m >= n) {
            (true, true) => {
                log::debug!("dgesvd: path {} for {}x{}", path_number(jobu, jobvt), m, n);
                self.svd_qr(jobu, jobvt, m, n, a, lda, s, u, ldu, vt, ldvt, work)
            }
            (true, false) => {
                log::debug!("dgesvd: path {}t for {}x{}", path_number(jobvt, jobu), m, n);
                self.svd_lq(jobu, jobvt, m, n, a, lda, s, u, ldu, vt, ldvt, work)
            }
            (false, tall) => {
                log::debug!("dgesvd: path 10{} for {}x{}", if tall { "" } else { "t" }, m, n);
                self.svd_direct(jobu, jobvt, m, n, a, lda, s, u, ldu, vt, ldvt, work)
            }
        };

        if let Some(to) = scaled {
            self.dlascl(MatrixType::General, to, anrm, mn, 1, s, 1);
            if result.is_err() && mn > 1 {
                self.dlascl(MatrixType::General, to, anrm, mn - 1, 1, &mut work[1..], 1);
            }
        }
        result
    }

    fn svd_workspace(&self, jobu: SvdJob, jobvt: SvdJob, m: usize, n: usize) -> Workspace {
        let mn = m.min(n);
        let mx = m.max(n);
        let wantu = jobu != SvdJob::None;
        let wantvt = jobvt != SvdJob::None;
        if mn == 0 {
            return Workspace { direct_min: 1, direct_opt: 1, compressed: None };
        }

        // Direct: e, tauq, taup, then scratch for dgebd2, dorgbr and dbdsqr.
        let ncu = if jobu == SvdJob::All { m } else { mn };
        let nrvt = if jobvt == SvdJob::All { n } else { mn };
        let mut scratch = mx.max(4 * mn);
        if wantu {
            scratch = scratch.max(queried(|w| self.dorgbr(GenOrtho::GenerateQ, m, ncu, n, &mut [], ncu, &[], w, -1)));
        }
        if wantvt {
            scratch = scratch.max(queried(|w| self.dorgbr(GenOrtho::GeneratePT, nrvt, n, m, &mut [], n, &[], w, -1)));
        }
        let direct_min = 3 * mn + mx.max(4 * mn);
        let direct_opt = 3 * mn + scratch;

        if mx < crossover(mn) {
            return Workspace { direct_min, direct_opt, compressed: None };
        }

        // Compressed: e, tauq, taup and the QR/LQ scalars, plus one or two
        // mn×mn blocks unless the short side's vectors are not wanted.
        let (short, long) = if m >= n { (jobu, jobvt) } else { (jobvt, jobu) };
        let factor = if m >= n {
            queried(|w| self.dgeqrf(m, n, &mut [], n, &mut [], w, -1))
        } else {
            queried(|w| self.dgelqf(m, n, &mut [], n, &mut [], w, -1))
        };
        let gen_short = |w: &mut [f64]| {
            let vect = if m >= n { GenOrtho::GenerateQ } else { GenOrtho::GeneratePT };
            self.dorgbr(vect, mn, mn, mn, &mut [], mn, &[], w, -1)
        };
        let gen_long = |w: &mut [f64]| {
            let vect = if m >= n { GenOrtho::GeneratePT } else { GenOrtho::GenerateQ };
            self.dorgbr(vect, mn, mn, mn, &mut [], mn, &[], w, -1)
        };

        if short == SvdJob::None {
            let mut scratch = (4 * mn).max(factor);
            if long != SvdJob::None {
                scratch = scratch.max(queried(gen_long));
            }
            let compressed = Some((8 * mn, 4 * mn + scratch));
            return Workspace { direct_min, direct_opt, compressed };
        }

        let nfull = if short == SvdJob::All { mx } else { mn };
        let orth = if m >= n {
            queried(|w| self.dorgqr(m, nfull, n, &mut [], nfull, &[], w, -1))
        } else {
            queried(|w| self.dorglq(nfull, n, m, &mut [], n, &[], w, -1))
        };
        let blocks = if long == SvdJob::Overwrite { 2 } else { 1 };
        let base = blocks * mn * mn + 4 * mn;
        let min = base + (4 * mn).max(nfull);
        let mut scratch = (4 * mn).max(nfull).max(factor).max(orth).max(queried(gen_short));
        if long != SvdJob::None {
            scratch = scratch.max(queried(gen_long));
        }
        if short == SvdJob::Overwrite {
            scratch = scratch.max(m * n);
        }
        Workspace { direct_min, direct_opt, compressed: Some((min, base + scratch)) }
    }

    /// Paths 10 and 10t: bidiagonalize A as it stands.
    #[allow(clippy::too_many_arguments)]
    fn svd_direct(
        &self,
        jobu: SvdJob,
        jobvt: SvdJob,
        m: usize,
        n: usize,
        a: &mut [f64],
        lda: usize,
        s: &mut [f64],
        u: &mut [f64],
        ldu: usize,
        vt: &mut [f64],
        ldvt: usize,
        work: &mut [f64],
    ) -> Result<(), LinalgError> {
        let mn = m.min(n);
        let (head, rest) = work.split_at_mut(mn);
        let e = &mut head[1..];
        let (tauq, rest) = rest.split_at_mut(mn);
        let (taup, scratch) = rest.split_at_mut(mn);
        let ls = scratch.len() as isize;

        self.dgebd2(m, n, a, lda, s, e, tauq, taup, scratch);

        if matches!(jobu, SvdJob::All | SvdJob::Store) {
            let ncu = if jobu == SvdJob::All { m } else { mn };
            self.dlacpy(Uplo::Lower, m, mn, a, lda, u, ldu);
            self.dorgbr(GenOrtho::GenerateQ, m, ncu, n, u, ldu, tauq, scratch, ls);
        }
        if matches!(jobvt, SvdJob::All | SvdJob::Store) {
            let nrvt = if jobvt == SvdJob::All { n } else { mn };
            self.dlacpy(Uplo::Upper, mn, n, a, lda, vt, ldvt);
            self.dorgbr(GenOrtho::GeneratePT, nrvt, n, m, vt, ldvt, taup, scratch, ls);
        }
        if jobu == SvdJob::Overwrite {
            self.dorgbr(GenOrtho::GenerateQ, m, mn, n, a, lda, tauq, scratch, ls);
        }
        if jobvt == SvdJob::Overwrite {
            self.dorgbr(GenOrtho::GeneratePT, mn, n, m, a, lda, taup, scratch, ls);
        }

        let uplo = if m >= n { Uplo::Upper } else { Uplo::Lower };
        let nru = if jobu == SvdJob::None { 0 } else { m };
        let ncvt = if jobvt == SvdJob::None { 0 } else { n };
        let (ub, ldub, vb, ldvb): (&mut [f64], usize, &mut [f64], usize) = if jobu == SvdJob::Overwrite {
            (a, lda, vt, ldvt)
        } else if jobvt == SvdJob::Overwrite {
            (u, ldu, a, lda)
        } else {
            (u, ldu, vt, ldvt)
        };
        self.dbdsqr(uplo, mn, ncvt, nru, s, e, vb, ldvb, ub, ldub, scratch)
    }

    /// Paths 1 through 9, m much larger than n: QR first, then work on the
    /// n×n triangle R.
    #[allow(clippy::too_many_arguments)]
    fn svd_qr(
        &self,
        jobu: SvdJob,
        jobvt: SvdJob,
        m: usize,
        n: usize,
        a: &mut [f64],
        lda: usize,
        s: &mut [f64],
        u: &mut [f64],
        ldu: usize,
        vt: &mut [f64],
        ldvt: usize,
        work: &mut [f64],
    ) -> Result<(), LinalgError> {
        let wantvt = jobvt != SvdJob::None;
        let wntvo = jobvt == SvdJob::Overwrite;
        let ncvt = if wantvt { n } else { 0 };
        let (head, rest) = work.split_at_mut(n);
        let e = &mut head[1..];

        if jobu == SvdJob::None {
            // Path 1: only R is needed, so it is reduced in place.
            let (tauq, rest) = rest.split_at_mut(n);
            let (taup, rest) = rest.split_at_mut(n);
            let (tau, scratch) = rest.split_at_mut(n);
            let ls = scratch.len() as isize;
            self.dgeqrf(m, n, a, lda, tau, scratch, ls);
            if n > 1 {
                self.dlaset(Uplo::Lower, n - 1, n - 1, 0.0, 0.0, &mut a[lda..], lda);
            }
            self.dgebd2(n, n, a, lda, s, e, tauq, taup, scratch);
            if wantvt {
                self.dorgbr(GenOrtho::GeneratePT, n, n, n, a, lda, taup, scratch, ls);
            }
            self.dbdsqr(Uplo::Upper, n, ncvt, 0, s, e, a, lda, &mut [], 1, scratch)?;
            if matches!(jobvt, SvdJob::All | SvdJob::Store) {
                self.dlacpy(Uplo::All, n, n, a, lda, vt, ldvt);
            }
            return Ok(());
        }

        let (w1, rest) = rest.split_at_mut(n * n);
        let (w2, rest) = rest.split_at_mut(if wntvo { n * n } else { 0 });
        let (tauq, rest) = rest.split_at_mut(n);
        let (taup, rest) = rest.split_at_mut(n);
        let (tau, scratch) = rest.split_at_mut(n);
        let ls = scratch.len() as isize;

        self.dgeqrf(m, n, a, lda, tau, scratch, ls);
        self.dlacpy(Uplo::Upper, n, n, a, lda, w1, n);
        if n > 1 {
            self.dlaset(Uplo::Lower, n - 1, n - 1, 0.0, 0.0, &mut w1[n..], n);
        }
        if jobu == SvdJob::All {
            self.dlacpy(Uplo::Lower, m, n, a, lda, u, ldu);
            self.dorgqr(m, m, n, u, ldu, tau, scratch, ls);
        } else {
            self.dorgqr(m, n, n, a, lda, tau, scratch, ls);
        }

        // Bidiagonalize R in w1; its right vectors go to VT (or w2), its
        // left vectors stay in w1.
        self.dgebd2(n, n, w1, n, s, e, tauq, taup, scratch);
        match jobvt {
            SvdJob::All | SvdJob::Store => {
                self.dlacpy(Uplo::Upper, n, n, w1, n, vt, ldvt);
                self.dorgbr(GenOrtho::GeneratePT, n, n, n, vt, ldvt, taup, scratch, ls);
            }
            SvdJob::Overwrite => {
                self.dlacpy(Uplo::Upper, n, n, w1, n, w2, n);
                self.dorgbr(GenOrtho::GeneratePT, n, n, n, w2, n, taup, scratch, ls);
            }
            SvdJob::None => {}
        }
        self.dorgbr(GenOrtho::GenerateQ, n, n, n, w1, n, tauq, scratch, ls);
        let (vb, ldvb): (&mut [f64], usize) = if wntvo { (&mut *w2, n) } else { (&mut *vt, ldvt) };
        self.dbdsqr(Uplo::Upper, n, ncvt, n, s, e, vb, ldvb, w1, n, scratch)?;

        // U = Q * U_R.
        match jobu {
            SvdJob::Overwrite => {
                let rows = (scratch.len() / n).min(m);
                let mut i = 0;
                while i < m {
                    let ib = rows.min(m - i);
                    self.blas
                        .dgemm(Transpose::NoTrans, Transpose::NoTrans, ib, n, n, 1.0, &a[i * lda..], lda, w1, n, 0.0, scratch, n);
                    self.dlacpy(Uplo::All, ib, n, scratch, n, &mut a[i * lda..], lda);
                    i += ib;
                }
            }
            SvdJob::Store => {
                self.blas.dgemm(Transpose::NoTrans, Transpose::NoTrans, m, n, n, 1.0, a, lda, w1, n, 0.0, u, ldu);
            }
            SvdJob::All => {
                self.blas.dgemm(Transpose::NoTrans, Transpose::NoTrans, m, n, n, 1.0, u, ldu, w1, n, 0.0, a, lda);
                self.dlacpy(Uplo::All, m, n, a, lda, u, ldu);
            }
            SvdJob::None => {}
        }
        if wntvo {
            self.dlacpy(Uplo::All, n, n, w2, n, a, lda);
        }
        Ok(())
    }

    /// Paths 1t through 9t, n much larger than m: LQ first, then work on
    /// the m×m triangle L.
    #[allow(clippy::too_many_arguments)]
    fn svd_lq(
        &self,
        jobu: SvdJob,
        jobvt: SvdJob,
        m: usize,
        n: usize,
        a: &mut [f64],
        lda: usize,
        s: &mut [f64],
        u: &mut [f64],
        ldu: usize,
        vt: &mut [f64],
        ldvt: usize,
        work: &mut [f64],
    ) -> Result<(), LinalgError> {
        let wantu = jobu != SvdJob::None;
        let wntuo = jobu == SvdJob::Overwrite;
        let nru = if wantu { m } else { 0 };
        let (head, rest) = work.split_at_mut(m);
        let e = &mut head[1..];

        if jobvt == SvdJob::None {
            // Path 1t.
            let (tauq, rest) = rest.split_at_mut(m);
            let (taup, rest) = rest.split_at_mut(m);
            let (tau, scratch) = rest.split_at_mut(m);
            let ls = scratch.len() as isize;
            self.dgelqf(m, n, a, lda, tau, scratch, ls);
            if m > 1 {
                self.dlaset(Uplo::Upper, m - 1, m - 1, 0.0, 0.0, &mut a[1..], lda);
            }
            self.dgebd2(m, m, a, lda, s, e, tauq, taup, scratch);
            if wantu {
                self.dorgbr(GenOrtho::GenerateQ, m, m, m, a, lda, tauq, scratch, ls);
            }
            self.dbdsqr(Uplo::Upper, m, 0, nru, s, e, &mut [], 1, a, lda, scratch)?;
            if matches!(jobu, SvdJob::All | SvdJob::Store) {
                self.dlacpy(Uplo::All, m, m, a, lda, u, ldu);
            }
            return Ok(());
        }

        let (w1, rest) = rest.split_at_mut(m * m);
        let (w2, rest) = rest.split_at_mut(if wntuo { m * m } else { 0 });
        let (tauq, rest) = rest.split_at_mut(m);
        let (taup, rest) = rest.split_at_mut(m);
        let (tau, scratch) = rest.split_at_mut(m);
        let ls = scratch.len() as isize;

        self.dgelqf(m, n, a, lda, tau, scratch, ls);
        self.dlacpy(Uplo::Lower, m, m, a, lda, w1, m);
        if m > 1 {
            self.dlaset(Uplo::Upper, m - 1, m - 1, 0.0, 0.0, &mut w1[1..], m);
        }
        if jobvt == SvdJob::All {
            self.dlacpy(Uplo::Upper, m, n, a, lda, vt, ldvt);
            self.dorglq(n, n, m, vt, ldvt, tau, scratch, ls);
        } else {
            self.dorglq(m, n, m, a, lda, tau, scratch, ls);
        }

        // Bidiagonalize L in w1; its left vectors go to U (or w2), its
        // right vectors stay in w1.
        self.dgebd2(m, m, w1, m, s, e, tauq, taup, scratch);
        match jobu {
            SvdJob::All | SvdJob::Store => {
                self.dlacpy(Uplo::Lower, m, m, w1, m, u, ldu);
                self.dorgbr(GenOrtho::GenerateQ, m, m, m, u, ldu, tauq, scratch, ls);
            }
            SvdJob::Overwrite => {
                self.dlacpy(Uplo::Lower, m, m, w1, m, w2, m);
                self.dorgbr(GenOrtho::GenerateQ, m, m, m, w2, m, tauq, scratch, ls);
            }
            SvdJob::None => {}
        }
        self.dorgbr(GenOrtho::GeneratePT, m, m, m, w1, m, taup, scratch, ls);
        let (ub, ldub): (&mut [f64], usize) = if wntuo { (&mut *w2, m) } else { (&mut *u, ldu) };
        self.dbdsqr(Uplo::Upper, m, m, nru, s, e, w1, m, ub, ldub, scratch)?;

        // Vᵀ = Vᵀ_L * Q.
        match jobvt {
            SvdJob::Overwrite => {
                let cols = (scratch.len() / m).min(n);
                let mut j = 0;
                while j < n {
                    let jb = cols.min(n - j);
                    self.blas
                        .dgemm(Transpose::NoTrans, Transpose::NoTrans, m, jb, m, 1.0, w1, m, &a[j..], lda, 0.0, scratch, jb);
                    self.dlacpy(Uplo::All, m, jb, scratch, jb, &mut a[j..], lda);
                    j += jb;
                }
            }
            SvdJob::Store => {
                self.blas.dgemm(Transpose::NoTrans, Transpose::NoTrans, m, n, m, 1.0, w1, m, a, lda, 0.0, vt, ldvt);
            }
            SvdJob::All => {
                self.blas.dgemm(Transpose::NoTrans, Transpose::NoTrans, m, n, m, 1.0, w1, m, vt, ldvt, 0.0, a, lda);
                self.dlacpy(Uplo::All, m, n, a, lda, vt, ldvt);
            }
            SvdJob::None => {}
        }
        if wntuo {
            self.dlacpy(Uplo::All, m, m, w2, m, a, lda);
        }
        Ok(())
    }
}
