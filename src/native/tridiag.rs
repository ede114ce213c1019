//! Symmetric tridiagonal eigenproblem by implicit QL/QR iteration.
//!
//! Both solvers walk the matrix block by block. The off-diagonal is scanned
//! for negligible entries to find the next unreduced block, the block is
//! scaled into a safe range, and QL or QR sweeps run on it depending on
//! which end has the smaller diagonal entry. Sweeps over the whole matrix
//! are capped at `30 n`.

use num_traits::Float;

use super::{check, sign, Direct, EigComp, Lapack, LinalgError, MatrixNorm, MatrixType, Pivot, Sort};
use super::{DLAMCH_E, DLAMCH_S};
use crate::blas::{Float64, Side, Uplo};

/// Sweeps allowed per eigenvalue.
const MAXIT: usize = 30;

/// Where the iteration is. Each variant is one node of the reduction loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Find the next unreduced block, scale it and pick a direction.
    Split,
    /// QL sweeps on the active block, deflating from the top.
    Ql,
    /// QR sweeps on the active block, deflating from the bottom.
    Qr,
    /// Undo the block scaling and check the sweep budget.
    Unscale,
    /// All blocks done: order the eigenvalues.
    Sort,
}

/// Scaling applied to the active block.
#[derive(Debug, Clone, Copy)]
struct BlockScale {
    anorm: f64,
    to: f64,
}

/// Safe range for the entries of a block during iteration.
struct Thresholds {
    eps: f64,
    eps2: f64,
    safmin: f64,
    ssfmax: f64,
    ssfmin: f64,
}

impl Thresholds {
    fn new() -> Self {
        let eps = DLAMCH_E;
        let eps2 = eps * eps;
        let safmin = DLAMCH_S;
        let safmax = 1.0 / safmin;
        Thresholds {
            eps,
            eps2,
            safmin,
            ssfmax: Float::sqrt(safmax) / 3.0,
            ssfmin: Float::sqrt(safmin) / eps2,
        }
    }
}

/// Index of the last row of the unreduced block starting at `l1`. The
/// negligible off-diagonal entry that ends it is set to zero.
fn next_split(d: &[f64], e: &mut [f64], l1: usize, n: usize, eps: f64) -> usize {
    for m in l1..n - 1 {
        let tst = e[m].abs();
        if tst == 0.0 {
            return m;
        }
        if tst <= (Float::sqrt(d[m].abs()) * Float::sqrt(d[m + 1].abs())) * eps {
            e[m] = 0.0;
            return m;
        }
    }
    n - 1
}

impl<B: Float64> Lapack<B> {
    /// Scale `d[l..=lend]` and `e[l..lend]` into `[ssfmin, ssfmax]`.
    ///
    /// Returns `None` for an all-zero block, otherwise the scaling to undo
    /// (if any).
    fn scale_block(&self, th: &Thresholds, d: &mut [f64], e: &mut [f64], l: usize, lend: usize) -> Option<Option<BlockScale>> {
        let anorm = self.dlanst(MatrixNorm::MaxAbs, lend - l + 1, &d[l..], &e[l..]);
        if anorm == 0.0 {
            return None;
        }
        let to = if anorm > th.ssfmax {
            th.ssfmax
        } else if anorm < th.ssfmin {
            th.ssfmin
        } else {
            return Some(None);
        };
        self.dlascl(MatrixType::General, anorm, to, lend - l + 1, 1, &mut d[l..], 1);
        self.dlascl(MatrixType::General, anorm, to, lend - l, 1, &mut e[l..], 1);
        Some(Some(BlockScale { anorm, to }))
    }

    /// Eigenvalues and, optionally, eigenvectors of the n×n symmetric
    /// tridiagonal matrix with diagonal `d` and off-diagonal `e`, by implicit
    /// QL/QR iteration.
    ///
    /// On success `d` holds the eigenvalues in ascending order. With
    /// [`EigComp::Tridiag`] Z is set to the eigenvectors of the tridiagonal
    /// matrix (column `j` pairs with `d[j]`); with [`EigComp::OrigMatrix`] the
    /// orthogonal matrix passed in Z is multiplied by them, which turns the
    /// output of a tridiagonal reduction into eigenvectors of the original
    /// matrix. `work` needs `2(n-1)` elements when vectors are computed and
    /// is unused otherwise.
    ///
    /// After `30 n` sweeps without full deflation the routine returns
    /// [`LinalgError::ConvergenceFailure`]. `d` and `e` then hold a partially
    /// reduced matrix: blocks whose `e` entries are still nonzero did not
    /// converge, and Z is orthogonally similar to the input.
    #[allow(clippy::too_many_arguments)]
    pub fn dsteqr(
        &self,
        compz: EigComp,
        n: usize,
        d: &mut [f64],
        e: &mut [f64],
        z: &mut [f64],
        ldz: usize,
        work: &mut [f64],
    ) -> Result<(), LinalgError> {
        check::length(d, n, check::SHORT_D);
        check::length(e, n.saturating_sub(1), check::SHORT_E);
        let wantz = compz != EigComp::None;
        if wantz {
            check::matrix(n, n, z, ldz, check::BAD_LD_Z, check::SHORT_Z);
            check::length(work, 2 * n.saturating_sub(1), check::SHORT_WORK);
        }
        if n == 0 {
            return Ok(());
        }
        if n == 1 {
            if compz == EigComp::Tridiag {
                z[0] = 1.0;
            }
            return Ok(());
        }
        if compz == EigComp::Tridiag {
            self.dlaset(Uplo::All, n, n, 0.0, 1.0, z, ldz);
        }

        let th = Thresholds::new();
        let nmaxit = n * MAXIT;
        let mut jtot = 0;
        // Rotation cosines and sines saved for dlasr.
        let (wc, ws) = work.split_at_mut(if wantz { n - 1 } else { 0 });

        let mut phase = Phase::Split;
        let mut l1 = 0;
        let (mut l, mut lend, mut lsv, mut lendsv) = (0, 0, 0, 0);
        let mut scale = None;
        loop {
            match phase {
                Phase::Split => {
                    if l1 >= n {
                        phase = Phase::Sort;
                        continue;
                    }
                    if l1 > 0 {
                        e[l1 - 1] = 0.0;
                    }
                    let m = next_split(d, e, l1, n, th.eps);
                    l = l1;
                    lsv = l;
                    lend = m;
                    lendsv = lend;
                    l1 = m + 1;
                    if lend == l {
                        continue;
                    }
                    scale = match self.scale_block(&th, d, e, l, lend) {
                        Some(s) => s,
                        None => continue,
                    };
                    if d[lend].abs() < d[l].abs() {
                        lend = lsv;
                        l = lendsv;
                    }
                    phase = if lend > l { Phase::Ql } else { Phase::Qr };
                }
                Phase::Ql => {
                    // Look for a small subdiagonal element.
                    let mut m = lend;
                    for mm in l..lend {
                        let tst = e[mm].abs() * e[mm].abs();
                        if tst <= (th.eps2 * d[mm].abs()) * d[mm + 1].abs() + th.safmin {
                            m = mm;
                            break;
                        }
                    }
                    if m < lend {
                        e[m] = 0.0;
                    }
                    let mut p = d[l];
                    if m == l {
                        // Eigenvalue found.
                        d[l] = p;
                        l += 1;
                        phase = if l <= lend { Phase::Ql } else { Phase::Unscale };
                        continue;
                    }
                    if m == l + 1 {
                        let (rt1, rt2) = if wantz {
                            let (rt1, rt2, c, s) = self.dlaev2(d[l], e[l], d[l + 1]);
                            self.dlasr(Side::Right, Pivot::Variable, Direct::Backward, n, 2, &[c], &[s], &mut z[l..], ldz);
                            (rt1, rt2)
                        } else {
                            self.dlae2(d[l], e[l], d[l + 1])
                        };
                        d[l] = rt1;
                        d[l + 1] = rt2;
                        e[l] = 0.0;
                        l += 2;
                        phase = if l <= lend { Phase::Ql } else { Phase::Unscale };
                        continue;
                    }
                    if jtot == nmaxit {
                        phase = Phase::Unscale;
                        continue;
                    }
                    jtot += 1;

                    // Wilkinson-style shift from the leading 2×2.
                    let mut g = (d[l + 1] - p) / (2.0 * e[l]);
                    let mut r = self.dlapy2(g, 1.0);
                    g = d[m] - p + (e[l] / (g + sign(r, g)));
                    let (mut s, mut c) = (1.0, 1.0);
                    p = 0.0;
                    for i in (l..m).rev() {
                        let f = s * e[i];
                        let b = c * e[i];
                        (c, s, r) = self.dlartg(g, f);
                        if i != m - 1 {
                            e[i + 1] = r;
                        }
                        g = d[i + 1] - p;
                        r = (d[i] - g) * s + 2.0 * c * b;
                        p = s * r;
                        d[i + 1] = g + p;
                        g = c * r - b;
                        if wantz {
                            wc[i] = c;
                            ws[i] = -s;
                        }
                    }
                    if wantz {
                        let mm = m - l + 1;
                        self.dlasr(Side::Right, Pivot::Variable, Direct::Backward, n, mm, &wc[l..], &ws[l..], &mut z[l..], ldz);
                    }
                    d[l] -= p;
                    e[l] = g;
                }
                Phase::Qr => {
                    // Look for a small superdiagonal element.
                    let mut m = lend;
                    for mm in (lend + 1..=l).rev() {
                        let tst = e[mm - 1].abs() * e[mm - 1].abs();
                        if tst <= (th.eps2 * d[mm].abs()) * d[mm - 1].abs() + th.safmin {
                            m = mm;
                            break;
                        }
                    }
                    if m > lend {
                        e[m - 1] = 0.0;
                    }
                    let mut p = d[l];
                    if m == l {
                        d[l] = p;
                        if l > lend {
                            l -= 1;
                        } else {
                            phase = Phase::Unscale;
                        }
                        continue;
                    }
                    if m + 1 == l {
                        let (rt1, rt2) = if wantz {
                            let (rt1, rt2, c, s) = self.dlaev2(d[l - 1], e[l - 1], d[l]);
                            self.dlasr(Side::Right, Pivot::Variable, Direct::Forward, n, 2, &[c], &[s], &mut z[l - 1..], ldz);
                            (rt1, rt2)
                        } else {
                            self.dlae2(d[l - 1], e[l - 1], d[l])
                        };
                        d[l - 1] = rt1;
                        d[l] = rt2;
                        e[l - 1] = 0.0;
                        if l >= lend + 2 {
                            l -= 2;
                        } else {
                            phase = Phase::Unscale;
                        }
                        continue;
                    }
                    if jtot == nmaxit {
                        phase = Phase::Unscale;
                        continue;
                    }
                    jtot += 1;

                    let mut g = (d[l - 1] - p) / (2.0 * e[l - 1]);
                    let mut r = self.dlapy2(g, 1.0);
                    g = d[m] - p + (e[l - 1] / (g + sign(r, g)));
                    let (mut s, mut c) = (1.0, 1.0);
                    p = 0.0;
                    for i in m..l {
                        let f = s * e[i];
                        let b = c * e[i];
                        (c, s, r) = self.dlartg(g, f);
                        if i != m {
                            e[i - 1] = r;
                        }
                        g = d[i] - p;
                        r = (d[i + 1] - g) * s + 2.0 * c * b;
                        p = s * r;
                        d[i] = g + p;
                        g = c * r - b;
                        if wantz {
                            wc[i] = c;
                            ws[i] = s;
                        }
                    }
                    if wantz {
                        let mm = l - m + 1;
                        self.dlasr(Side::Right, Pivot::Variable, Direct::Forward, n, mm, &wc[m..], &ws[m..], &mut z[m..], ldz);
                    }
                    d[l] -= p;
                    e[l - 1] = g;
                }
                Phase::Unscale => {
                    if let Some(BlockScale { anorm, to }) = scale.take() {
                        self.dlascl(MatrixType::General, to, anorm, lendsv - lsv + 1, 1, &mut d[lsv..], 1);
                        self.dlascl(MatrixType::General, to, anorm, lendsv - lsv, 1, &mut e[lsv..], 1);
                    }
                    if jtot < nmaxit {
                        phase = Phase::Split;
                        continue;
                    }
                    let unconverged = e[..n - 1].iter().filter(|&&v| v != 0.0).count();
                    if unconverged > 0 {
                        log::warn!("dsteqr: {} off-diagonal entries unconverged after {} sweeps", unconverged, nmaxit);
                        return Err(LinalgError::ConvergenceFailure);
                    }
                    phase = Phase::Sort;
                }
                Phase::Sort => {
                    if !wantz {
                        self.dlasrt(Sort::Increasing, n, d);
                        return Ok(());
                    }
                    // Selection sort keeps column swaps of Z to at most n-1.
                    for i in 0..n - 1 {
                        let mut k = i;
                        let mut p = d[i];
                        for j in i + 1..n {
                            if d[j] < p {
                                k = j;
                                p = d[j];
                            }
                        }
                        if k != i {
                            d[k] = d[i];
                            d[i] = p;
                            for r in 0..n {
                                z.swap(r * ldz + i, r * ldz + k);
                            }
                        }
                    }
                    return Ok(());
                }
            }
        }
    }

    /// Eigenvalues of the n×n symmetric tridiagonal matrix with diagonal `d`
    /// and off-diagonal `e`, by the Pal-Walker-Kahan variant of the QL/QR
    /// iteration, which works on the squares of the off-diagonal.
    ///
    /// On success `d` holds the eigenvalues in ascending order and `e` is
    /// destroyed. Non-convergence after `30 n` sweeps is reported as
    /// [`LinalgError::ConvergenceFailure`], with the unconverged blocks
    /// marked by nonzero `e` entries.
    pub fn dsterf(&self, n: usize, d: &mut [f64], e: &mut [f64]) -> Result<(), LinalgError> {
        check::length(d, n, check::SHORT_D);
        check::length(e, n.saturating_sub(1), check::SHORT_E);
        if n <= 1 {
            return Ok(());
        }

        let th = Thresholds::new();
        let nmaxit = n * MAXIT;
        let mut jtot = 0;

        let mut phase = Phase::Split;
        let mut l1 = 0;
        let (mut l, mut lend, mut lsv, mut lendsv) = (0, 0, 0, 0);
        let mut scale = None;
        loop {
            match phase {
                Phase::Split => {
                    if l1 >= n {
                        phase = Phase::Sort;
                        continue;
                    }
                    if l1 > 0 {
                        e[l1 - 1] = 0.0;
                    }
                    let m = next_split(d, e, l1, n, th.eps);
                    l = l1;
                    lsv = l;
                    lend = m;
                    lendsv = lend;
                    l1 = m + 1;
                    if lend == l {
                        continue;
                    }
                    scale = match self.scale_block(&th, d, e, l, lend) {
                        Some(s) => s,
                        None => continue,
                    };
                    for v in &mut e[l..lend] {
                        *v *= *v;
                    }
                    if d[lend].abs() < d[l].abs() {
                        lend = lsv;
                        l = lendsv;
                    }
                    phase = if lend >= l { Phase::Ql } else { Phase::Qr };
                }
                Phase::Ql => {
                    let mut m = lend;
                    for mm in l..lend {
                        if e[mm].abs() <= th.eps2 * (d[mm] * d[mm + 1]).abs() {
                            m = mm;
                            break;
                        }
                    }
                    if m < lend {
                        e[m] = 0.0;
                    }
                    let mut p = d[l];
                    if m == l {
                        d[l] = p;
                        l += 1;
                        phase = if l <= lend { Phase::Ql } else { Phase::Unscale };
                        continue;
                    }
                    if m == l + 1 {
                        let rte = Float::sqrt(e[l]);
                        let (rt1, rt2) = self.dlae2(d[l], rte, d[l + 1]);
                        d[l] = rt1;
                        d[l + 1] = rt2;
                        e[l] = 0.0;
                        l += 2;
                        phase = if l <= lend { Phase::Ql } else { Phase::Unscale };
                        continue;
                    }
                    if jtot == nmaxit {
                        phase = Phase::Unscale;
                        continue;
                    }
                    jtot += 1;

                    let rte = Float::sqrt(e[l]);
                    let mut sigma = (d[l + 1] - p) / (2.0 * rte);
                    let r = self.dlapy2(sigma, 1.0);
                    sigma = p - (rte / (sigma + sign(r, sigma)));
                    let (mut c, mut s) = (1.0, 0.0);
                    let mut gamma = d[m] - sigma;
                    p = gamma * gamma;
                    for i in (l..m).rev() {
                        let bb = e[i];
                        let r = p + bb;
                        if i != m - 1 {
                            e[i + 1] = s * r;
                        }
                        let oldc = c;
                        c = p / r;
                        s = bb / r;
                        let oldgam = gamma;
                        let alpha = d[i];
                        gamma = c * (alpha - sigma) - s * oldgam;
                        d[i + 1] = oldgam + (alpha - gamma);
                        p = if c != 0.0 { (gamma * gamma) / c } else { oldc * bb };
                    }
                    e[l] = s * p;
                    d[l] = sigma + gamma;
                }
                Phase::Qr => {
                    let mut m = lend;
                    for mm in (lend + 1..=l).rev() {
                        if e[mm - 1].abs() <= th.eps2 * (d[mm] * d[mm - 1]).abs() {
                            m = mm;
                            break;
                        }
                    }
                    if m > lend {
                        e[m - 1] = 0.0;
                    }
                    let mut p = d[l];
                    if m == l {
                        d[l] = p;
                        if l > lend {
                            l -= 1;
                        } else {
                            phase = Phase::Unscale;
                        }
                        continue;
                    }
                    if m + 1 == l {
                        let rte = Float::sqrt(e[l - 1]);
                        let (rt1, rt2) = self.dlae2(d[l], rte, d[l - 1]);
                        d[l] = rt1;
                        d[l - 1] = rt2;
                        e[l - 1] = 0.0;
                        if l >= lend + 2 {
                            l -= 2;
                        } else {
                            phase = Phase::Unscale;
                        }
                        continue;
                    }
                    if jtot == nmaxit {
                        phase = Phase::Unscale;
                        continue;
                    }
                    jtot += 1;

                    let rte = Float::sqrt(e[l - 1]);
                    let mut sigma = (d[l - 1] - p) / (2.0 * rte);
                    let r = self.dlapy2(sigma, 1.0);
                    sigma = p - (rte / (sigma + sign(r, sigma)));
                    let (mut c, mut s) = (1.0, 0.0);
                    let mut gamma = d[m] - sigma;
                    p = gamma * gamma;
                    for i in m..l {
                        let bb = e[i];
                        let r = p + bb;
                        if i != m {
                            e[i - 1] = s * r;
                        }
                        let oldc = c;
                        c = p / r;
                        s = bb / r;
                        let oldgam = gamma;
                        let alpha = d[i + 1];
                        gamma = c * (alpha - sigma) - s * oldgam;
                        d[i] = oldgam + (alpha - gamma);
                        p = if c != 0.0 { (gamma * gamma) / c } else { oldc * bb };
                    }
                    e[l - 1] = s * p;
                    d[l] = sigma + gamma;
                }
                Phase::Unscale => {
                    // e holds squares now and is not rescaled.
                    if let Some(BlockScale { anorm, to }) = scale.take() {
                        self.dlascl(MatrixType::General, to, anorm, lendsv - lsv + 1, 1, &mut d[lsv..], 1);
                    }
                    if jtot < nmaxit {
                        phase = Phase::Split;
                        continue;
                    }
                    let unconverged = e[..n - 1].iter().filter(|&&v| v != 0.0).count();
                    if unconverged > 0 {
                        log::warn!("dsterf: {} off-diagonal entries unconverged after {} sweeps", unconverged, nmaxit);
                        return Err(LinalgError::ConvergenceFailure);
                    }
                    phase = Phase::Sort;
                }
                Phase::Sort => {
                    self.dlasrt(Sort::Increasing, n, d);
                    return Ok(());
                }
            }
        }
    }
}
