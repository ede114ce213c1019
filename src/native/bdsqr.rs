use num_traits::Float;

use super::{check, sign, Direct, Lapack, LinalgError, Pivot, DLAMCH_E, DLAMCH_S};
use crate::blas::{Float64, Side, Uplo};

/// Passes through the inner loop allowed per singular value, squared in `n`.
const MAXITR: usize = 6;

/// Where the iteration is.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Deflate converged values off the bottom and find the active block.
    Locate,
    /// One implicit QR sweep on the block `ll..=m`. `smax` is the largest
    /// entry seen while locating it.
    Chase { ll: usize, smax: f64 },
    /// Make the values non-negative and sort them.
    Finalize,
}

impl<B: Float64> Lapack<B> {
    /// Singular value decomposition of the n×n bidiagonal matrix
    /// `B = Q * S * Pᵀ` by implicit zero-shift and shifted QR sweeps.
    ///
    /// B has diagonal `d` (n) and off-diagonal `e` (n-1); it is upper
    /// bidiagonal for [`Uplo::Upper`] and lower for [`Uplo::Lower`]. On
    /// success `d` holds the singular values in decreasing order, all
    /// non-negative. If `ncvt > 0` the n×ncvt matrix VT is overwritten with
    /// `Pᵀ * VT`; if `nru > 0` the nru×n matrix U is overwritten with `U * Q`.
    /// `work` needs `4(n-1)` elements.
    ///
    /// On [`LinalgError::ConvergenceFailure`] `d` and `e` hold a bidiagonal
    /// matrix orthogonally equivalent to B; its nonzero `e` entries mark the
    /// part that did not converge.
    #[allow(clippy::too_many_arguments)]
    pub fn dbdsqr(
        &self,
        uplo: Uplo,
        n: usize,
        ncvt: usize,
        nru: usize,
        d: &mut [f64],
        e: &mut [f64],
        vt: &mut [f64],
        ldvt: usize,
        u: &mut [f64],
        ldu: usize,
        work: &mut [f64],
    ) -> Result<(), LinalgError> {
        assert!(uplo != Uplo::All, "{}", check::BAD_SHAPE);
        check::length(d, n, check::SHORT_D);
        check::length(e, n.saturating_sub(1), check::SHORT_E);
        if ncvt > 0 {
            check::matrix(n, ncvt, vt, ldvt, check::BAD_LD_VT, check::SHORT_VT);
        }
        if nru > 0 {
            check::matrix(nru, n, u, ldu, check::BAD_LD_U, check::SHORT_U);
        }
        let nm1 = n.saturating_sub(1);
        check::length(work, 4 * nm1, check::SHORT_WORK);
        if n == 0 {
            return Ok(());
        }

        let (w1, rest) = work.split_at_mut(nm1);
        let (w2, rest) = rest.split_at_mut(nm1);
        let (w3, w4) = rest.split_at_mut(nm1);

        // Rotate a lower bidiagonal matrix to upper.
        if uplo == Uplo::Lower {
            for i in 0..nm1 {
                let (cs, sn, r) = self.dlartg(d[i], e[i]);
                d[i] = r;
                e[i] = sn * d[i + 1];
                d[i + 1] *= cs;
                w1[i] = cs;
                w2[i] = sn;
            }
            if nru > 0 {
                self.dlasr(Side::Right, Pivot::Variable, Direct::Forward, nru, n, w1, w2, u, ldu);
            }
        }

        let eps = DLAMCH_E;
        let unfl = DLAMCH_S;
        let tolmul = 10.0_f64.max(100.0_f64.min(Float::powf(eps, -0.125)));
        let tol = tolmul * eps;

        // Threshold for absolute convergence, from an estimate of the
        // smallest singular value.
        let mut sminoa = d[0].abs();
        if sminoa != 0.0 {
            let mut mu = sminoa;
            for i in 1..n {
                mu = d[i].abs() * (mu / (mu + e[i - 1].abs()));
                sminoa = sminoa.min(mu);
                if sminoa == 0.0 {
                    break;
                }
            }
        }
        sminoa /= Float::sqrt(n as f64);
        let thresh = (tol * sminoa).max((MAXITR * n * n) as f64 * unfl);

        let maxit = MAXITR * n * n;
        let mut iter = 0;
        let (mut oldll, mut oldm) = (None, None);
        let mut top_down = true;
        // Last row of the unconverged part.
        let mut m = n - 1;

        let mut phase = if n == 1 { Phase::Finalize } else { Phase::Locate };
        loop {
            match phase {
                Phase::Locate => {
                    if m == 0 {
                        phase = Phase::Finalize;
                        continue;
                    }
                    if iter > maxit {
                        let unconverged = e[..nm1].iter().filter(|&&v| v != 0.0).count();
                        log::warn!("dbdsqr: {} off-diagonal entries unconverged after {} passes", unconverged, maxit);
                        return Err(LinalgError::ConvergenceFailure);
                    }

                    let mut smax = d[m].abs();
                    let mut split = None;
                    for ll in (0..m).rev() {
                        let abss = d[ll].abs();
                        let abse = e[ll].abs();
                        if abse <= thresh {
                            split = Some(ll);
                            break;
                        }
                        smax = smax.max(abss).max(abse);
                    }
                    let ll = match split {
                        Some(ll) => {
                            e[ll] = 0.0;
                            if ll == m - 1 {
                                // Bottom value converged.
                                m -= 1;
                                continue;
                            }
                            ll + 1
                        }
                        None => 0,
                    };

                    if ll == m - 1 {
                        // 2×2 block.
                        let (sigmn, sigmx, sinr, cosr, sinl, cosl) = self.dlasv2(d[m - 1], e[m - 1], d[m]);
                        d[m - 1] = sigmx;
                        e[m - 1] = 0.0;
                        d[m] = sigmn;
                        if ncvt > 0 {
                            self.dlasr(Side::Left, Pivot::Variable, Direct::Forward, 2, ncvt, &[cosr], &[sinr], &mut vt[(m - 1) * ldvt..], ldvt);
                        }
                        if nru > 0 {
                            self.dlasr(Side::Right, Pivot::Variable, Direct::Forward, nru, 2, &[cosl], &[sinl], &mut u[m - 1..], ldu);
                        }
                        m = m.saturating_sub(2);
                        continue;
                    }
                    phase = Phase::Chase { ll, smax };
                }
                Phase::Chase { ll, smax } => {
                    phase = Phase::Locate;

                    // A new block chases the bulge from its larger end.
                    if oldm.map_or(true, |om| ll > om) || oldll.map_or(false, |ol| m < ol) {
                        top_down = d[ll].abs() >= d[m].abs();
                    }

                    // Convergence tests, starting from the end the bulge heads to.
                    let smin;
                    if top_down {
                        if e[m - 1].abs() <= tol * d[m].abs() {
                            e[m - 1] = 0.0;
                            continue;
                        }
                        let mut mu = d[ll].abs();
                        let mut lo = mu;
                        let mut deflated = false;
                        for lll in ll..m {
                            if e[lll].abs() <= tol * mu {
                                e[lll] = 0.0;
                                deflated = true;
                                break;
                            }
                            mu = d[lll + 1].abs() * (mu / (mu + e[lll].abs()));
                            lo = lo.min(mu);
                        }
                        if deflated {
                            continue;
                        }
                        smin = lo;
                    } else {
                        if e[ll].abs() <= tol * d[ll].abs() {
                            e[ll] = 0.0;
                            continue;
                        }
                        let mut mu = d[m].abs();
                        let mut lo = mu;
                        let mut deflated = false;
                        for lll in (ll..m).rev() {
                            if e[lll].abs() <= tol * mu {
                                e[lll] = 0.0;
                                deflated = true;
                                break;
                            }
                            mu = d[lll].abs() * (mu / (mu + e[lll].abs()));
                            lo = lo.min(mu);
                        }
                        if deflated {
                            continue;
                        }
                        smin = lo;
                    }
                    oldll = Some(ll);
                    oldm = Some(m);

                    // A shift that would ruin relative accuracy is replaced by zero.
                    let mut shift = 0.0;
                    if (n as f64) * tol * (smin / smax) > eps.max(0.01 * tol) {
                        let sll;
                        if top_down {
                            sll = d[ll].abs();
                            shift = self.dlas2(d[m - 1], e[m - 1], d[m]).0;
                        } else {
                            sll = d[m].abs();
                            shift = self.dlas2(d[ll], e[ll], d[ll + 1]).0;
                        }
                        if sll > 0.0 && (shift / sll) * (shift / sll) < eps {
                            shift = 0.0;
                        }
                    }
                    iter += m - ll;

                    let nrot = m - ll + 1;
                    if shift == 0.0 && top_down {
                        let (mut cs, mut oldcs, mut oldsn) = (1.0, 1.0, 0.0);
                        for i in ll..m {
                            let (c, sn, r) = self.dlartg(d[i] * cs, e[i]);
                            cs = c;
                            if i > ll {
                                e[i - 1] = oldsn * r;
                            }
                            (oldcs, oldsn, d[i]) = self.dlartg(oldcs * r, d[i + 1] * sn);
                            w1[i - ll] = cs;
                            w2[i - ll] = sn;
                            w3[i - ll] = oldcs;
                            w4[i - ll] = oldsn;
                        }
                        let h = d[m] * cs;
                        d[m] = h * oldcs;
                        e[m - 1] = h * oldsn;
                        if ncvt > 0 {
                            self.dlasr(Side::Left, Pivot::Variable, Direct::Forward, nrot, ncvt, w1, w2, &mut vt[ll * ldvt..], ldvt);
                        }
                        if nru > 0 {
                            self.dlasr(Side::Right, Pivot::Variable, Direct::Forward, nru, nrot, w3, w4, &mut u[ll..], ldu);
                        }
                        if e[m - 1].abs() <= thresh {
                            e[m - 1] = 0.0;
                        }
                    } else if shift == 0.0 {
                        let (mut cs, mut oldcs, mut oldsn) = (1.0, 1.0, 0.0);
                        for i in (ll + 1..=m).rev() {
                            let (c, sn, r) = self.dlartg(d[i] * cs, e[i - 1]);
                            cs = c;
                            if i < m {
                                e[i] = oldsn * r;
                            }
                            (oldcs, oldsn, d[i]) = self.dlartg(oldcs * r, d[i - 1] * sn);
                            w1[i - ll - 1] = cs;
                            w2[i - ll - 1] = -sn;
                            w3[i - ll - 1] = oldcs;
                            w4[i - ll - 1] = -oldsn;
                        }
                        let h = d[ll] * cs;
                        d[ll] = h * oldcs;
                        e[ll] = h * oldsn;
                        if ncvt > 0 {
                            self.dlasr(Side::Left, Pivot::Variable, Direct::Backward, nrot, ncvt, w3, w4, &mut vt[ll * ldvt..], ldvt);
                        }
                        if nru > 0 {
                            self.dlasr(Side::Right, Pivot::Variable, Direct::Backward, nru, nrot, w1, w2, &mut u[ll..], ldu);
                        }
                        if e[ll].abs() <= thresh {
                            e[ll] = 0.0;
                        }
                    } else if top_down {
                        let mut f = (d[ll].abs() - shift) * (sign(1.0, d[ll]) + shift / d[ll]);
                        let mut g = e[ll];
                        for i in ll..m {
                            let (cosr, sinr, r) = self.dlartg(f, g);
                            if i > ll {
                                e[i - 1] = r;
                            }
                            f = cosr * d[i] + sinr * e[i];
                            e[i] = cosr * e[i] - sinr * d[i];
                            g = sinr * d[i + 1];
                            d[i + 1] *= cosr;
                            let (cosl, sinl, r) = self.dlartg(f, g);
                            d[i] = r;
                            f = cosl * e[i] + sinl * d[i + 1];
                            d[i + 1] = cosl * d[i + 1] - sinl * e[i];
                            if i < m - 1 {
                                g = sinl * e[i + 1];
                                e[i + 1] *= cosl;
                            }
                            w1[i - ll] = cosr;
                            w2[i - ll] = sinr;
                            w3[i - ll] = cosl;
                            w4[i - ll] = sinl;
                        }
                        e[m - 1] = f;
                        if ncvt > 0 {
                            self.dlasr(Side::Left, Pivot::Variable, Direct::Forward, nrot, ncvt, w1, w2, &mut vt[ll * ldvt..], ldvt);
                        }
                        if nru > 0 {
                            self.dlasr(Side::Right, Pivot::Variable, Direct::Forward, nru, nrot, w3, w4, &mut u[ll..], ldu);
                        }
                        if e[m - 1].abs() <= thresh {
                            e[m - 1] = 0.0;
                        }
                    } else {
                        let mut f = (d[m].abs() - shift) * (sign(1.0, d[m]) + shift / d[m]);
                        let mut g = e[m - 1];
                        for i in (ll + 1..=m).rev() {
                            let (cosr, sinr, r) = self.dlartg(f, g);
                            if i < m {
                                e[i] = r;
                            }
                            f = cosr * d[i] + sinr * e[i - 1];
                            e[i - 1] = cosr * e[i - 1] - sinr * d[i];
                            g = sinr * d[i - 1];
                            d[i - 1] *= cosr;
                            let (cosl, sinl, r) = self.dlartg(f, g);
                            d[i] = r;
                            f = cosl * e[i - 1] + sinl * d[i - 1];
                            d[i - 1] = cosl * d[i - 1] - sinl * e[i - 1];
                            if i > ll + 1 {
                                g = sinl * e[i - 2];
                                e[i - 2] *= cosl;
                            }
                            w1[i - ll - 1] = cosr;
                            w2[i - ll - 1] = -sinr;
                            w3[i - ll - 1] = cosl;
                            w4[i - ll - 1] = -sinl;
                        }
                        e[ll] = f;
                        if e[ll].abs() <= thresh {
                            e[ll] = 0.0;
                        }
                        if ncvt > 0 {
                            self.dlasr(Side::Left, Pivot::Variable, Direct::Backward, nrot, ncvt, w3, w4, &mut vt[ll * ldvt..], ldvt);
                        }
                        if nru > 0 {
                            self.dlasr(Side::Right, Pivot::Variable, Direct::Backward, nru, nrot, w1, w2, &mut u[ll..], ldu);
                        }
                    }
                }
                Phase::Finalize => {
                    for i in 0..n {
                        if d[i] < 0.0 {
                            d[i] = -d[i];
                            if ncvt > 0 {
                                self.blas.dscal(ncvt, -1.0, &mut vt[i * ldvt..], 1);
                            }
                        }
                    }
                    // Selection sort into decreasing order, one swap per position.
                    for i in 0..nm1 {
                        let last = n - 1 - i;
                        let mut isub = 0;
                        let mut smin = d[0];
                        for j in 1..=last {
                            if d[j] <= smin {
                                isub = j;
                                smin = d[j];
                            }
                        }
                        if isub != last {
                            d[isub] = d[last];
                            d[last] = smin;
                            if ncvt > 0 {
                                let (top, bottom) = vt.split_at_mut(last * ldvt);
                                self.blas.dswap(ncvt, &mut top[isub * ldvt..], 1, bottom, 1);
                            }
                            if nru > 0 {
                                for r in 0..nru {
                                    u.swap(r * ldu + isub, r * ldu + last);
                                }
                            }
                        }
                    }
                    return Ok(());
                }
            }
        }
    }
}
