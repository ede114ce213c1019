use num_traits::Float;

use super::{check, Lapack, MatrixNorm};
use crate::blas::Float64;

impl<B: Float64> Lapack<B> {
    /// Update a scaled sum of squares with the `n` elements of `x`.
    ///
    /// Returns `(scl, smsq)` with `scl² * smsq = x₀² + … + xₙ₋₁² + scale² * sumsq`.
    pub fn dlassq(&self, n: usize, x: &[f64], incx: usize, scale: f64, sumsq: f64) -> (f64, f64) {
        check::vector(n, x, incx as isize);
        let mut scale = scale;
        let mut sumsq = sumsq;
        for i in 0..n {
            let absxi = x[i * incx].abs();
            if absxi > 0.0 || absxi.is_nan() {
                if scale < absxi {
                    sumsq = 1.0 + sumsq * (scale / absxi) * (scale / absxi);
                    scale = absxi;
                } else {
                    sumsq += (absxi / scale) * (absxi / scale);
                }
            }
        }
        (scale, sumsq)
    }

    /// Norm of the m×n general matrix A. `work` needs `n` elements for
    /// [`MatrixNorm::MaxColumnSum`] and is unused otherwise.
    #[allow(clippy::too_many_arguments)]
    pub fn dlange(&self, norm: MatrixNorm, m: usize, n: usize, a: &[f64], lda: usize, work: &mut [f64]) -> f64 {
        check::matrix(m, n, a, lda, check::BAD_LD_A, check::SHORT_A);
        if m == 0 || n == 0 {
            return 0.0;
        }
        match norm {
            MatrixNorm::MaxAbs => {
                let mut value = 0.0_f64;
                for i in 0..m {
                    for &v in &a[i * lda..i * lda + n] {
                        let t = v.abs();
                        if value < t || t.is_nan() {
                            value = t;
                        }
                    }
                }
                value
            }
            MatrixNorm::MaxColumnSum => {
                check::length(work, n, check::SHORT_WORK);
                let work = &mut work[..n];
                work.fill(0.0);
                for i in 0..m {
                    for (w, &v) in work.iter_mut().zip(&a[i * lda..i * lda + n]) {
                        *w += v.abs();
                    }
                }
                let mut value = 0.0_f64;
                for &t in work.iter() {
                    if value < t || t.is_nan() {
                        value = t;
                    }
                }
                value
            }
            MatrixNorm::MaxRowSum => {
                let mut value = 0.0_f64;
                for i in 0..m {
                    let t: f64 = a[i * lda..i * lda + n].iter().map(|v| v.abs()).sum();
                    if value < t || t.is_nan() {
                        value = t;
                    }
                }
                value
            }
            MatrixNorm::Frobenius => {
                let mut scale = 0.0;
                let mut sum = 1.0;
                for i in 0..m {
                    (scale, sum) = self.dlassq(n, &a[i * lda..], 1, scale, sum);
                }
                scale * Float::sqrt(sum)
            }
        }
    }

    /// Norm of the symmetric tridiagonal matrix with diagonal `d` (n) and
    /// off-diagonal `e` (n-1).
    pub fn dlanst(&self, norm: MatrixNorm, n: usize, d: &[f64], e: &[f64]) -> f64 {
        check::length(d, n, check::SHORT_D);
        check::length(e, n.saturating_sub(1), check::SHORT_E);
        if n == 0 {
            return 0.0;
        }
        match norm {
            MatrixNorm::MaxAbs => {
                let mut anorm = d[n - 1].abs();
                for i in 0..n - 1 {
                    for t in [d[i].abs(), e[i].abs()] {
                        if anorm < t || t.is_nan() {
                            anorm = t;
                        }
                    }
                }
                anorm
            }
            // Symmetric, so the one- and infinity-norms agree.
            MatrixNorm::MaxColumnSum | MatrixNorm::MaxRowSum => {
                if n == 1 {
                    return d[0].abs();
                }
                let mut anorm = d[0].abs() + e[0].abs();
                let last = e[n - 2].abs() + d[n - 1].abs();
                if anorm < last || last.is_nan() {
                    anorm = last;
                }
                for i in 1..n - 1 {
                    let t = d[i].abs() + e[i].abs() + e[i - 1].abs();
                    if anorm < t || t.is_nan() {
                        anorm = t;
                    }
                }
                anorm
            }
            MatrixNorm::Frobenius => {
                let mut scale = 0.0;
                let mut sum = 1.0;
                if n > 1 {
                    (scale, sum) = self.dlassq(n - 1, e, 1, scale, sum);
                    sum *= 2.0;
                }
                (scale, sum) = self.dlassq(n, d, 1, scale, sum);
                scale * Float::sqrt(sum)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::testutil::assert_near;

    #[test]
    fn lange_all_norms() {
        let l = Lapack::default();
        // [[1, -2, 3], [-4, 5, -6]] with lda 4
        let a = [1.0, -2.0, 3.0, 0.0, -4.0, 5.0, -6.0];
        let mut work = [0.0; 3];
        assert_eq!(l.dlange(MatrixNorm::MaxAbs, 2, 3, &a, 4, &mut work), 6.0);
        assert_eq!(l.dlange(MatrixNorm::MaxColumnSum, 2, 3, &a, 4, &mut work), 9.0);
        assert_eq!(l.dlange(MatrixNorm::MaxRowSum, 2, 3, &a, 4, &mut work), 15.0);
        assert_near(
            l.dlange(MatrixNorm::Frobenius, 2, 3, &a, 4, &mut work),
            91.0_f64.sqrt(),
            1e-14,
            "frobenius",
        );
    }

    #[test]
    fn lange_propagates_nan() {
        let l = Lapack::default();
        let a = [1.0, f64::NAN, 2.0, 3.0];
        assert!(l.dlange(MatrixNorm::MaxAbs, 2, 2, &a, 2, &mut []).is_nan());
    }

    #[test]
    fn lanst_matches_dense() {
        let l = Lapack::default();
        let d = [2.0, -3.0, 1.0];
        let e = [1.0, -4.0];
        let dense = [2.0, 1.0, 0.0, 1.0, -3.0, -4.0, 0.0, -4.0, 1.0];
        let mut work = [0.0; 3];
        for norm in [
            MatrixNorm::MaxAbs,
            MatrixNorm::MaxColumnSum,
            MatrixNorm::MaxRowSum,
            MatrixNorm::Frobenius,
        ] {
            assert_near(
                l.dlanst(norm, 3, &d, &e),
                l.dlange(norm, 3, 3, &dense, 3, &mut work),
                1e-14,
                "tridiagonal vs dense",
            );
        }
    }

    #[test]
    fn lassq_accumulates() {
        let l = Lapack::default();
        let x = [3.0, 0.0, 4.0];
        let (scale, sum) = l.dlassq(2, &x, 2, 0.0, 1.0);
        assert_near(scale * sum.sqrt(), 5.0, 1e-14, "norm of [3, 4]");
    }
}
