use num_traits::Float;

use super::{check, Lapack, MatrixType, Sort, DLAMCH_S};
use crate::blas::{Float64, Uplo};

impl<B: Float64> Lapack<B> {
    /// `sqrt(x² + y²)` without unnecessary overflow. NaN in either argument
    /// is returned as is.
    pub fn dlapy2(&self, x: f64, y: f64) -> f64 {
        if x.is_nan() {
            return x;
        }
        if y.is_nan() {
            return y;
        }
        let xa = x.abs();
        let ya = y.abs();
        let w = xa.max(ya);
        let z = xa.min(ya);
        if z == 0.0 || w > f64::MAX {
            return w;
        }
        w * Float::sqrt(1.0 + (z / w) * (z / w))
    }

    /// Copy the `uplo` part of the m×n matrix A into B. `Uplo::All` copies everything.
    #[allow(clippy::too_many_arguments)]
    pub fn dlacpy(&self, uplo: Uplo, m: usize, n: usize, a: &[f64], lda: usize, b: &mut [f64], ldb: usize) {
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        check::matrix(m, n, b, ldb, check::BAD_LD_V, check::SHORT_V);
        for i in 0..m {
            let (lo, hi) = match uplo {
                Uplo::Upper => (i.min(n), n),
                Uplo::Lower => (0, (i + 1).min(n)),
                Uplo::All => (0, n),
            };
            b[i * ldb + lo..i * ldb + hi].copy_from_slice(&a[i * lda + lo..i * lda + hi]);
        }
    }

    /// Set the strict `uplo` part of A to `alpha` and its diagonal to `beta`.
    #[allow(clippy::too_many_arguments)]
    pub fn dlaset(&self, uplo: Uplo, m: usize, n: usize, alpha: f64, beta: f64, a: &mut [f64], lda: usize) {
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        for i in 0..m {
            for j in 0..n {
                let inside = match uplo {
                    Uplo::Upper => j > i,
                    Uplo::Lower => j < i,
                    Uplo::All => true,
                };
                if i == j {
                    a[i * lda + j] = beta;
                } else if inside {
                    a[i * lda + j] = alpha;
                }
            }
        }
    }

    /// Sort the first `n` entries of `d`.
    pub fn dlasrt(&self, s: Sort, n: usize, d: &mut [f64]) {
        check::length(d, n, check::SHORT_D);
        let d = &mut d[..n];
        match s {
            Sort::Increasing => d.sort_unstable_by(|a, b| a.total_cmp(b)),
            Sort::Decreasing => d.sort_unstable_by(|a, b| b.total_cmp(a)),
        }
    }

    /// Multiply the `kind` part of the m×n matrix A by `cto/cfrom`, in steps
    /// that never overflow or underflow.
    #[allow(clippy::too_many_arguments)]
    pub fn dlascl(
        &self,
        kind: MatrixType,
        cfrom: f64,
        cto: f64,
        m: usize,
        n: usize,
        a: &mut [f64],
        lda: usize,
    ) {
        assert!(cfrom != 0.0 && !cfrom.is_nan() && !cto.is_nan(), "{}", check::BAD_SCALE);
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        if m == 0 || n == 0 {
            return;
        }

        let smlnum = DLAMCH_S;
        let bignum = 1.0 / smlnum;
        let mut cfromc = cfrom;
        let mut ctoc = cto;
        loop {
            let cfrom1 = cfromc * smlnum;
            let (mul, done);
            if cfrom1 == cfromc {
                // cfromc is infinite: one multiply gives a signed zero or NaN.
                mul = ctoc / cfromc;
                done = true;
            } else {
                let cto1 = ctoc / bignum;
                if cto1 == ctoc {
                    // ctoc is zero or infinite.
                    mul = ctoc;
                    done = true;
                    cfromc = 1.0;
                } else if cfrom1.abs() > ctoc.abs() && ctoc != 0.0 {
                    mul = smlnum;
                    done = false;
                    cfromc = cfrom1;
                } else if cto1.abs() > cfromc.abs() {
                    mul = bignum;
                    done = false;
                    ctoc = cto1;
                } else {
                    mul = ctoc / cfromc;
                    done = true;
                    if mul == 1.0 {
                        return;
                    }
                }
            }

            for i in 0..m {
                let (lo, hi) = match kind {
                    MatrixType::General => (0, n),
                    MatrixType::LowerTri => (0, (i + 1).min(n)),
                    MatrixType::UpperTri => (i.min(n), n),
                    MatrixType::UpperHessenberg => (i.saturating_sub(1).min(n), n),
                };
                for v in &mut a[i * lda + lo..i * lda + hi] {
                    *v *= mul;
                }
            }
            if done {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::testutil::assert_near;

    #[test]
    fn lapy2_extremes() {
        let l = Lapack::default();
        assert_near(l.dlapy2(3.0, 4.0), 5.0, 1e-15, "3-4-5");
        assert_near(l.dlapy2(3e300, 4e300) / 5e300, 1.0, 1e-15, "no overflow");
        assert!(l.dlapy2(f64::NAN, 1.0).is_nan());
        assert_eq!(l.dlapy2(0.0, -2.0), 2.0);
    }

    #[test]
    fn lacpy_triangles() {
        let l = Lapack::default();
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut b = [0.0; 6];
        l.dlacpy(Uplo::Upper, 2, 3, &a, 3, &mut b, 3);
        assert_eq!(b, [1.0, 2.0, 3.0, 0.0, 5.0, 6.0]);
        let mut b = [0.0; 6];
        l.dlacpy(Uplo::Lower, 2, 3, &a, 3, &mut b, 3);
        assert_eq!(b, [1.0, 0.0, 0.0, 4.0, 5.0, 0.0]);
    }

    #[test]
    fn laset_identity() {
        let l = Lapack::default();
        let mut a = [9.0; 6];
        l.dlaset(Uplo::All, 3, 2, 0.0, 1.0, &mut a, 2);
        assert_eq!(a, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn lasrt_both_ways() {
        let l = Lapack::default();
        let mut d = [3.0, -1.0, 2.0, 10.0];
        l.dlasrt(Sort::Increasing, 3, &mut d);
        assert_eq!(d, [-1.0, 2.0, 3.0, 10.0]);
        l.dlasrt(Sort::Decreasing, 4, &mut d);
        assert_eq!(d, [10.0, 3.0, 2.0, -1.0]);
    }

    #[test]
    fn lascl_across_range() {
        let l = Lapack::default();
        let mut a = [1e-300, 2e-300, 3e-300, 4e-300];
        l.dlascl(MatrixType::General, 1e-300, 1e300, 2, 2, &mut a, 2);
        for (i, v) in a.iter().enumerate() {
            assert_near(*v / 1e300, (i + 1) as f64, 1e-13, "scaled up");
        }

        let mut u = [1.0, 1.0, 1.0, 1.0];
        l.dlascl(MatrixType::UpperTri, 1.0, 2.0, 2, 2, &mut u, 2);
        assert_eq!(u, [2.0, 2.0, 1.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "cfrom is zero")]
    fn lascl_rejects_zero_cfrom() {
        let l = Lapack::default();
        let mut a = [1.0];
        l.dlascl(MatrixType::General, 0.0, 1.0, 1, 1, &mut a, 1);
    }
}
