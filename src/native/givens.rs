use num_traits::Float;

use super::{check, sign, Direct, Lapack, Pivot, DLAMCH_B, DLAMCH_E, DLAMCH_S};
use crate::blas::{Float64, Side};

impl<B: Float64> Lapack<B> {
    /// Generate a plane rotation with
    ///
    /// ```text
    /// [ cs  sn] [f]   [r]
    /// [-sn  cs] [g] = [0]
    /// ```
    ///
    /// Returns `(cs, sn, r)`. When `|f| > |g|`, `cs > 0`. Intermediate values
    /// are scaled so that `f² + g²` never overflows or underflows.
    pub fn dlartg(&self, f: f64, g: f64) -> (f64, f64, f64) {
        if g == 0.0 {
            return (1.0, 0.0, f);
        }
        if f == 0.0 {
            return (0.0, 1.0, g);
        }
        let safmn2 = Float::powi(DLAMCH_B, (Float::log2(DLAMCH_S / DLAMCH_E) / 2.0) as i32);
        let safmx2 = 1.0 / safmn2;

        let mut f1 = f;
        let mut g1 = g;
        let mut scale = f1.abs().max(g1.abs());
        let (mut cs, mut sn, mut r);
        if scale >= safmx2 || scale <= safmn2 {
            let (mul, undo) = if scale >= safmx2 { (safmn2, safmx2) } else { (safmx2, safmn2) };
            let mut count = 0;
            loop {
                count += 1;
                f1 *= mul;
                g1 *= mul;
                scale = f1.abs().max(g1.abs());
                let in_range = if mul < 1.0 { scale < safmx2 } else { scale > safmn2 };
                if in_range || count >= 20 {
                    break;
                }
            }
            r = Float::sqrt(f1 * f1 + g1 * g1);
            cs = f1 / r;
            sn = g1 / r;
            for _ in 0..count {
                r *= undo;
            }
        } else {
            r = Float::sqrt(f1 * f1 + g1 * g1);
            cs = f1 / r;
            sn = g1 / r;
        }
        if f.abs() > g.abs() && cs < 0.0 {
            cs = -cs;
            sn = -sn;
            r = -r;
        }
        (cs, sn, r)
    }

    /// Apply a sequence of plane rotations to the m×n matrix A from `side`.
    ///
    /// Rotation `k` (with cosine `c[k]` and sine `s[k]`) acts on the pair of
    /// rows (left) or columns (right) chosen by `pivot`:
    ///
    /// | Pivot | Planes |
    /// |-------|--------|
    /// | `Variable` | `(k, k+1)` |
    /// | `Top` | `(0, k+1)` |
    /// | `Bottom` | `(k, z)`, `z` the last row/column |
    ///
    /// There are `m-1` rotations (left) or `n-1` (right), applied in
    /// increasing `k` for [`Direct::Forward`]. Each maps the pair `(x, y)` to
    /// `(c*x + s*y, c*y - s*x)`.
    #[allow(clippy::too_many_arguments)]
    pub fn dlasr(
        &self,
        side: Side,
        pivot: Pivot,
        direct: Direct,
        m: usize,
        n: usize,
        c: &[f64],
        s: &[f64],
        a: &mut [f64],
        lda: usize,
    ) {
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        let count = match side {
            Side::Left => m.saturating_sub(1),
            Side::Right => n.saturating_sub(1),
        };
        check::length(c, count, "lapack: insufficient length of c");
        check::length(s, count, "lapack: insufficient length of s");
        if m == 0 || n == 0 {
            return;
        }

        let apply = |k: usize, a: &mut [f64]| {
            let (ct, st) = (c[k], s[k]);
            if ct == 1.0 && st == 0.0 {
                return;
            }
            let (p, q) = match pivot {
                Pivot::Variable => (k, k + 1),
                Pivot::Top => (0, k + 1),
                Pivot::Bottom => (k, count),
            };
            match side {
                Side::Left => {
                    let (top, bottom) = a.split_at_mut(q * lda);
                    self.blas.drot(n, &mut top[p * lda..p * lda + n], 1, &mut bottom[..n], 1, ct, st);
                }
                Side::Right => {
                    for i in 0..m {
                        let x = a[i * lda + p];
                        let y = a[i * lda + q];
                        a[i * lda + p] = ct * x + st * y;
                        a[i * lda + q] = ct * y - st * x;
                    }
                }
            }
        };
        for step in 0..count {
            let k = match direct {
                Direct::Forward => step,
                Direct::Backward => count - 1 - step,
            };
            apply(k, &mut *a);
        }
    }

    /// Eigenvalues of the symmetric 2×2 matrix `[[a, b], [b, c]]`.
    ///
    /// Returns `(rt1, rt2)` with `|rt1| >= |rt2|`.
    pub fn dlae2(&self, a: f64, b: f64, c: f64) -> (f64, f64) {
        let (rt1, rt2, _) = eig2(a, b, c);
        (rt1, rt2)
    }

    /// Eigen-decomposition of the symmetric 2×2 matrix `[[a, b], [b, c]]`.
    ///
    /// Returns `(rt1, rt2, cs1, sn1)` with `|rt1| >= |rt2|` and `(cs1, sn1)`
    /// the unit eigenvector for `rt1`:
    ///
    /// ```text
    /// [ cs1  sn1] [a b] [cs1 -sn1]   [rt1   0]
    /// [-sn1  cs1] [b c] [sn1  cs1] = [  0 rt2]
    /// ```
    pub fn dlaev2(&self, a: f64, b: f64, c: f64) -> (f64, f64, f64, f64) {
        let (rt1, rt2, rt) = eig2(a, b, c);
        let sm = a + c;
        let df = a - c;
        let tb = b + b;
        let ab = tb.abs();
        let sgn1 = if sm < 0.0 { -1.0 } else { 1.0 };

        let (cs, sgn2) = if df >= 0.0 { (df + rt, 1.0) } else { (df - rt, -1.0) };
        let (mut cs1, mut sn1);
        if cs.abs() > ab {
            let ct = -tb / cs;
            sn1 = 1.0 / Float::sqrt(1.0 + ct * ct);
            cs1 = ct * sn1;
        } else if ab == 0.0 {
            cs1 = 1.0;
            sn1 = 0.0;
        } else {
            let tn = -cs / tb;
            cs1 = 1.0 / Float::sqrt(1.0 + tn * tn);
            sn1 = tn * cs1;
        }
        if sgn1 == sgn2 {
            let tn = cs1;
            cs1 = -sn1;
            sn1 = tn;
        }
        (rt1, rt2, cs1, sn1)
    }

    /// Singular values of the upper triangular 2×2 matrix `[[f, g], [0, h]]`.
    ///
    /// Returns `(ssmin, ssmax)`.
    pub fn dlas2(&self, f: f64, g: f64, h: f64) -> (f64, f64) {
        let fa = f.abs();
        let ga = g.abs();
        let ha = h.abs();
        let fhmn = fa.min(ha);
        let fhmx = fa.max(ha);
        if fhmn == 0.0 {
            if fhmx == 0.0 {
                return (0.0, ga);
            }
            let big = fhmx.max(ga);
            let small = fhmx.min(ga);
            return (0.0, big * Float::sqrt(1.0 + (small / big) * (small / big)));
        }
        if ga < fhmx {
            let as_ = 1.0 + fhmn / fhmx;
            let at = (fhmx - fhmn) / fhmx;
            let au = (ga / fhmx) * (ga / fhmx);
            let c = 2.0 / (Float::sqrt(as_ * as_ + au) + Float::sqrt(at * at + au));
            return (fhmn * c, fhmx / c);
        }
        let au = fhmx / ga;
        if au == 0.0 {
            // Avoid underflow in the product; recompute ssmin from the determinant.
            return ((fhmn * fhmx) / ga, ga);
        }
        let as_ = 1.0 + fhmn / fhmx;
        let at = (fhmx - fhmn) / fhmx;
        let c = 1.0 / (Float::sqrt(1.0 + (as_ * au) * (as_ * au)) + Float::sqrt(1.0 + (at * au) * (at * au)));
        let ssmin = (fhmn * c) * au;
        (ssmin + ssmin, ga / (c + c))
    }

    /// SVD of the upper triangular 2×2 matrix `[[f, g], [0, h]]`:
    ///
    /// ```text
    /// [ csl  snl] [f g] [csr -snr]   [ssmax     0]
    /// [-snl  csl] [0 h] [snr  csr] = [    0 ssmin]
    /// ```
    ///
    /// Returns `(ssmin, ssmax, snr, csr, snl, csl)`; `|ssmax| >= |ssmin|`.
    pub fn dlasv2(&self, f: f64, g: f64, h: f64) -> (f64, f64, f64, f64, f64, f64) {
        let mut ft = f;
        let mut fa = ft.abs();
        let mut ht = h;
        let mut ha = h.abs();

        // pmax marks which of f, g, h has the largest magnitude.
        let mut pmax = 1;
        let swap = ha > fa;
        if swap {
            pmax = 3;
            core::mem::swap(&mut ft, &mut ht);
            core::mem::swap(&mut fa, &mut ha);
        }
        let gt = g;
        let ga = gt.abs();

        let (ssmin, ssmax, clt, crt, slt, srt);
        if ga == 0.0 {
            ssmin = ha;
            ssmax = fa;
            clt = 1.0;
            crt = 1.0;
            slt = 0.0;
            srt = 0.0;
        } else {
            let mut gasmal = true;
            let mut early = None;
            if ga > fa {
                pmax = 2;
                if fa / ga < DLAMCH_E {
                    // Very large g.
                    gasmal = false;
                    let smin = if ha > 1.0 { fa / (ga / ha) } else { (fa / ga) * ha };
                    early = Some((smin, ga, 1.0, ft / gt, ht / gt, 1.0));
                }
            }
            if gasmal {
                let d = fa - ha;
                let mut l = if d == fa { 1.0 } else { d / fa };
                let m = gt / ft;
                let mut t = 2.0 - l;
                let mm = m * m;
                let tt = t * t;
                let s = Float::sqrt(tt + mm);
                let r = if l == 0.0 { m.abs() } else { Float::sqrt(l * l + mm) };
                let a = 0.5 * (s + r);
                ssmin = ha / a;
                ssmax = fa * a;
                if mm == 0.0 {
                    t = if l == 0.0 {
                        sign(2.0, ft) * sign(1.0, gt)
                    } else {
                        gt / sign(d, ft) + m / t
                    };
                } else {
                    t = (m / (s + t) + m / (r + l)) * (1.0 + a);
                }
                l = Float::sqrt(t * t + 4.0);
                crt = 2.0 / l;
                srt = t / l;
                clt = (crt + srt * m) / a;
                slt = (ht / ft) * srt / a;
            } else {
                let (smin, smax, c_l, c_r, s_l, s_r) = early.unwrap_or((0.0, 0.0, 1.0, 1.0, 0.0, 0.0));
                ssmin = smin;
                ssmax = smax;
                clt = c_l;
                crt = c_r;
                slt = s_l;
                srt = s_r;
            }
        }

        let (csl, snl, csr, snr) = if swap { (srt, crt, slt, clt) } else { (clt, slt, crt, srt) };

        let tsign = match pmax {
            1 => sign(1.0, csr) * sign(1.0, csl) * sign(1.0, f),
            2 => sign(1.0, snr) * sign(1.0, csl) * sign(1.0, g),
            _ => sign(1.0, snr) * sign(1.0, snl) * sign(1.0, h),
        };
        let ssmax = sign(ssmax, tsign);
        let ssmin = sign(ssmin, tsign * sign(1.0, f) * sign(1.0, h));
        (ssmin, ssmax, snr, csr, snl, csl)
    }
}

/// Shared part of `dlae2` / `dlaev2`: `(rt1, rt2, rt)`.
fn eig2(a: f64, b: f64, c: f64) -> (f64, f64, f64) {
    let sm = a + c;
    let df = a - c;
    let adf = df.abs();
    let tb = b + b;
    let ab = tb.abs();
    let (acmx, acmn) = if a.abs() > c.abs() { (a, c) } else { (c, a) };
    let rt = if adf > ab {
        adf * Float::sqrt(1.0 + (ab / adf) * (ab / adf))
    } else if adf < ab {
        ab * Float::sqrt(1.0 + (adf / ab) * (adf / ab))
    } else {
        ab * core::f64::consts::SQRT_2
    };
    if sm < 0.0 {
        let rt1 = 0.5 * (sm - rt);
        // Order of operations matters for accuracy of rt2.
        (rt1, (acmx / rt1) * acmn - (b / rt1) * b, rt)
    } else if sm > 0.0 {
        let rt1 = 0.5 * (sm + rt);
        (rt1, (acmx / rt1) * acmn - (b / rt1) * b, rt)
    } else {
        (0.5 * rt, -0.5 * rt, rt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::testutil::{assert_near, matmul, max_diff, random_matrix};

    #[test]
    fn lartg_zeroes_g() {
        let l = Lapack::default();
        for &(f, g) in &[
            (3.0, 4.0),
            (-3.0, 4.0),
            (4.0, -3.0),
            (1e300, 1e300),
            (1e-300, 3e-300),
            (0.0, 2.0),
            (2.0, 0.0),
        ] {
            let (cs, sn, r) = l.dlartg(f, g);
            assert_near(cs * cs + sn * sn, 1.0, 1e-14, "unit rotation");
            let scale = f.abs().max(g.abs());
            assert_near((-sn * f + cs * g) / scale, 0.0, 1e-14, "second component");
            assert_near((cs * f + sn * g) / scale, r / scale, 1e-14, "first component");
            if f.abs() > g.abs() {
                assert!(cs > 0.0);
            }
        }
    }

    #[test]
    fn lae2_and_laev2_agree() {
        let l = Lapack::default();
        for &(a, b, c) in &[(2.0, 1.0, 2.0), (-1.0, 3.0, 4.0), (1.0, 0.0, -5.0), (1e-3, 1e3, -2.0)] {
            let (r1, r2) = l.dlae2(a, b, c);
            let (e1, e2, cs, sn) = l.dlaev2(a, b, c);
            assert_eq!((r1, r2), (e1, e2));
            assert!(r1.abs() >= r2.abs());
            // Rotated matrix is diag(rt1, rt2).
            let m = [a, b, b, c];
            let rl = [cs, sn, -sn, cs];
            let rr = [cs, -sn, sn, cs];
            let d = matmul(2, 2, 2, &matmul(2, 2, 2, &rl, 2, &m, 2), 2, &rr, 2);
            let scale = a.abs().max(b.abs()).max(c.abs());
            assert_near(d[0] / scale, r1 / scale, 1e-14, "rt1");
            assert_near(d[3] / scale, r2 / scale, 1e-14, "rt2");
            assert_near(d[1] / scale, 0.0, 1e-14, "off diagonal");
        }
    }

    #[test]
    fn las2_and_lasv2_singular_values() {
        let l = Lapack::default();
        for &(f, g, h) in &[(4.0, 3.0, 1.0), (1.0, 3.0, 4.0), (-2.0, 1e-20, 3.0), (1.0, 1e20, 1.0), (0.0, 2.0, 5.0)] {
            let (smin, smax) = l.dlas2(f, g, h);
            let (vmin, vmax, snr, csr, snl, csl) = l.dlasv2(f, g, h);
            assert_near(vmin.abs() / smax, smin / smax, 1e-14, "ssmin");
            assert_near(vmax.abs() / smax, 1.0, 1e-14, "ssmax");

            let left = [csl, snl, -snl, csl];
            let right = [csr, -snr, snr, csr];
            let b = [f, g, 0.0, h];
            let d = matmul(2, 2, 2, &matmul(2, 2, 2, &left, 2, &b, 2), 2, &right, 2);
            assert_near(d[0] / smax, vmax / smax, 1e-13, "diag max");
            assert_near(d[3] / smax, vmin / smax, 1e-13, "diag min");
            assert_near(d[1] / smax, 0.0, 1e-13, "upper");
            assert_near(d[2] / smax, 0.0, 1e-13, "lower");
        }
    }

    /// Dense plane rotation acting on planes (p, q) of an order-n space.
    fn plane(n: usize, p: usize, q: usize, c: f64, s: f64) -> Vec<f64> {
        let mut g = vec![0.0; n * n];
        for i in 0..n {
            g[i * n + i] = 1.0;
        }
        g[p * n + p] = c;
        g[p * n + q] = s;
        g[q * n + p] = -s;
        g[q * n + q] = c;
        g
    }

    #[test]
    fn lasr_all_variants() {
        let l = Lapack::default();
        let (m, n) = (4, 5);
        let a0 = random_matrix(m, n, n, 3);
        let angles: Vec<f64> = (0..5).map(|k| 0.3 + 0.4 * k as f64).collect();
        let c: Vec<f64> = angles.iter().map(|t| t.cos()).collect();
        let s: Vec<f64> = angles.iter().map(|t| t.sin()).collect();

        for side in [Side::Left, Side::Right] {
            let order = if side == Side::Left { m } else { n };
            for pivot in [Pivot::Variable, Pivot::Top, Pivot::Bottom] {
                for direct in [Direct::Forward, Direct::Backward] {
                    let mut a = a0.clone();
                    l.dlasr(side, pivot, direct, m, n, &c, &s, &mut a, n);

                    let mut want = a0.clone();
                    let ks: Vec<usize> = match direct {
                        Direct::Forward => (0..order - 1).collect(),
                        Direct::Backward => (0..order - 1).rev().collect(),
                    };
                    for k in ks {
                        let (p, q) = match pivot {
                            Pivot::Variable => (k, k + 1),
                            Pivot::Top => (0, k + 1),
                            Pivot::Bottom => (k, order - 1),
                        };
                        let g = plane(order, p, q, c[k], s[k]);
                        want = match side {
                            Side::Left => matmul(m, n, m, &g, m, &want, n),
                            Side::Right => {
                                // A Gᵀ
                                let mut gt = vec![0.0; n * n];
                                for i in 0..n {
                                    for j in 0..n {
                                        gt[i * n + j] = g[j * n + i];
                                    }
                                }
                                matmul(m, n, n, &want, n, &gt, n)
                            }
                        };
                    }
                    assert!(
                        max_diff(m, n, &a, n, &want, n) < 1e-13,
                        "{:?} {:?} {:?}",
                        side,
                        pivot,
                        direct
                    );
                }
            }
        }
    }
}
