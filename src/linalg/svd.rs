use alloc::vec;
use alloc::vec::Vec;

use super::qr::query;
use super::{LinalgError, Matrix};
use crate::blas::Float64;
use crate::native::{Lapack, SvdJob};

/// Singular value decomposition `A = U * Σ * Vᵀ`.
///
/// Which factors are kept follows the [`SvdJob`] for each side.
/// [`SvdJob::Overwrite`] is accepted and gives the same factor as
/// [`SvdJob::Store`]; the input matrix is never modified.
///
/// # Example
///
/// ```
/// use native_lapack::linalg::{Matrix, Svd};
/// use native_lapack::SvdJob;
///
/// let a = Matrix::from_rows(3, 2, &[
///     1.0, 0.0,
///     0.0, 1.0,
///     0.0, 0.0,
/// ]);
/// let svd = Svd::new(&a, SvdJob::All, SvdJob::Store).unwrap();
/// assert_eq!(svd.u().unwrap().ncols(), 3);
/// assert_eq!(svd.vt().unwrap().nrows(), 2);
/// assert!((svd.values()[0] - 1.0).abs() < 1e-14);
/// assert!((svd.values()[1] - 1.0).abs() < 1e-14);
/// ```
#[derive(Debug, Clone)]
pub struct Svd {
    values: Vec<f64>,
    u: Option<Matrix>,
    vt: Option<Matrix>,
}

impl Svd {
    /// Decompose with the reference BLAS.
    pub fn new(a: &Matrix, jobu: SvdJob, jobvt: SvdJob) -> Result<Self, LinalgError> {
        Self::with_lapack(&Lapack::default(), a, jobu, jobvt)
    }

    /// Thin factors: U is m×k, Vᵀ is k×n with `k = min(m, n)`.
    pub fn thin(a: &Matrix) -> Result<Self, LinalgError> {
        Self::new(a, SvdJob::Store, SvdJob::Store)
    }

    /// Singular values only, in decreasing order.
    pub fn values_only(a: &Matrix) -> Result<Vec<f64>, LinalgError> {
        Ok(Self::new(a, SvdJob::None, SvdJob::None)?.values)
    }

    pub fn with_lapack<B: Float64>(
        lapack: &Lapack<B>,
        a: &Matrix,
        jobu: SvdJob,
        jobvt: SvdJob,
    ) -> Result<Self, LinalgError> {
        let (m, n) = (a.nrows(), a.ncols());
        let k = m.min(n);
        // Keep the caller's matrix intact.
        let store = |job: SvdJob| if job == SvdJob::Overwrite { SvdJob::Store } else { job };
        let (jobu, jobvt) = (store(jobu), store(jobvt));
        let ucols = match jobu {
            SvdJob::All => m,
            SvdJob::None => 0,
            _ => k,
        };
        let vtrows = match jobvt {
            SvdJob::All => n,
            SvdJob::None => 0,
            _ => k,
        };

        let mut work_a = a.clone();
        let lda = work_a.ld();
        let mut values = vec![0.0; k];
        let mut u = Matrix::zeros(m, ucols);
        let mut vt = Matrix::zeros(vtrows, n);
        let (ldu, ldvt) = (u.ld(), vt.ld());
        let lwork = query(|w| {
            let _ = lapack.dgesvd(jobu, jobvt, m, n, &mut [], lda, &mut [], &mut [], ldu, &mut [], ldvt, w, -1);
        });
        let mut work = vec![0.0; lwork];
        lapack.dgesvd(
            jobu,
            jobvt,
            m,
            n,
            work_a.as_mut_slice(),
            lda,
            &mut values,
            u.as_mut_slice(),
            ldu,
            vt.as_mut_slice(),
            ldvt,
            &mut work,
            lwork as isize,
        )?;

        Ok(Self {
            values,
            u: (jobu != SvdJob::None).then_some(u),
            vt: (jobvt != SvdJob::None).then_some(vt),
        })
    }

    /// Singular values, sorted descending.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Left singular vectors as columns, if requested.
    #[inline]
    pub fn u(&self) -> Option<&Matrix> {
        self.u.as_ref()
    }

    /// Right singular vectors as rows, if requested.
    #[inline]
    pub fn vt(&self) -> Option<&Matrix> {
        self.vt.as_ref()
    }

    /// Number of singular values above `tol`.
    pub fn rank(&self, tol: f64) -> usize {
        self.values.iter().filter(|&&s| s > tol).count()
    }

    /// `σ_max / σ_min`; infinite when the smallest value is zero.
    pub fn condition_number(&self) -> f64 {
        match (self.values.first(), self.values.last()) {
            (Some(&hi), Some(&lo)) if lo == 0.0 => {
                if hi == 0.0 {
                    f64::NAN
                } else {
                    f64::INFINITY
                }
            }
            (Some(&hi), Some(&lo)) => hi / lo,
            _ => 1.0,
        }
    }
}
