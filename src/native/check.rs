//! Argument validation shared by the LAPACK routines.
//!
//! All failures panic: they are caller bugs, never data-dependent.

use crate::blas::{mat_len, vec_len};

pub(crate) const BAD_LD_A: &str = "lapack: bad leading dimension of A";
pub(crate) const BAD_LD_C: &str = "lapack: bad leading dimension of C";
pub(crate) const BAD_LD_T: &str = "lapack: bad leading dimension of T";
pub(crate) const BAD_LD_U: &str = "lapack: bad leading dimension of U";
pub(crate) const BAD_LD_V: &str = "lapack: bad leading dimension of V";
pub(crate) const BAD_LD_VT: &str = "lapack: bad leading dimension of VT";
pub(crate) const BAD_LD_WORK: &str = "lapack: bad leading dimension of work";
pub(crate) const BAD_LD_Z: &str = "lapack: bad leading dimension of Z";
pub(crate) const BAD_INC: &str = "lapack: zero increment";
pub(crate) const BAD_LWORK: &str = "lapack: insufficient declared workspace length";
pub(crate) const SHORT_A: &str = "lapack: insufficient length of A";
pub(crate) const SHORT_C: &str = "lapack: insufficient length of C";
pub(crate) const SHORT_D: &str = "lapack: insufficient length of d";
pub(crate) const SHORT_E: &str = "lapack: insufficient length of e";
pub(crate) const SHORT_S: &str = "lapack: insufficient length of s";
pub(crate) const SHORT_T: &str = "lapack: insufficient length of T";
pub(crate) const SHORT_TAU: &str = "lapack: insufficient length of tau";
pub(crate) const SHORT_U: &str = "lapack: insufficient length of U";
pub(crate) const SHORT_V: &str = "lapack: insufficient length of V";
pub(crate) const SHORT_VT: &str = "lapack: insufficient length of VT";
pub(crate) const SHORT_WORK: &str = "lapack: working array shorter than declared";
pub(crate) const SHORT_X: &str = "lapack: insufficient length of x";
pub(crate) const SHORT_Z: &str = "lapack: insufficient length of Z";
pub(crate) const K_GT_M: &str = "lapack: k > m";
pub(crate) const K_GT_N: &str = "lapack: k > n";
pub(crate) const M_LT_N: &str = "lapack: m < n";
pub(crate) const N_LT_M: &str = "lapack: n < m";
pub(crate) const BAD_SVD_JOB: &str = "lapack: both jobu and jobvt are SvdJob::Overwrite";
pub(crate) const BAD_SHAPE: &str = "lapack: bad matrix shape for the requested operation";
pub(crate) const BAD_SCALE: &str = "lapack: cfrom is zero or NaN, or cto is NaN";

/// Panic unless `lda >= max(1, cols)` and `a` holds an r×c row-major matrix.
#[track_caller]
pub(crate) fn matrix(r: usize, c: usize, a: &[f64], lda: usize, bad_ld: &str, short: &str) {
    assert!(lda >= c.max(1), "{}", bad_ld);
    assert!(a.len() >= mat_len(r, c, lda), "{}", short);
}

/// Panic unless `lda >= max(1, cols)`.
#[track_caller]
pub(crate) fn leading_dim(c: usize, lda: usize, bad_ld: &str) {
    assert!(lda >= c.max(1), "{}", bad_ld);
}

/// Panic unless `x` holds `n` elements at stride `inc`.
#[track_caller]
pub(crate) fn vector(n: usize, x: &[f64], inc: isize) {
    assert!(inc != 0, "{}", BAD_INC);
    assert!(x.len() >= vec_len(n, inc), "{}", SHORT_X);
}

/// Panic unless `x.len() >= n`.
#[track_caller]
pub(crate) fn length(x: &[f64], n: usize, short: &str) {
    assert!(x.len() >= n, "{}", short);
}

/// Validate a declared workspace length against its minimum and the actual buffer.
/// Returns `true` for a workspace query.
#[track_caller]
pub(crate) fn workspace(work: &[f64], lwork: isize, min: usize) -> bool {
    if lwork == -1 {
        assert!(!work.is_empty(), "{}", SHORT_WORK);
        return true;
    }
    assert!(lwork >= min.max(1) as isize, "{}", BAD_LWORK);
    assert!(work.len() >= lwork as usize, "{}", SHORT_WORK);
    false
}
