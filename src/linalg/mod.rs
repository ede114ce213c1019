//! Owned-matrix wrappers over the [`native`](crate::native) routines.
//!
//! [`LinalgError`] is always available; the wrappers need the `alloc`
//! feature. Each wrapper sizes its workspace with a query, allocates once,
//! and keeps only the factors.

#[cfg(feature = "alloc")]
mod lq;
#[cfg(feature = "alloc")]
mod matrix;
#[cfg(feature = "alloc")]
mod qr;
#[cfg(feature = "alloc")]
mod svd;
#[cfg(feature = "alloc")]
mod tridiagonal;

#[cfg(feature = "alloc")]
pub use lq::Lq;
#[cfg(feature = "alloc")]
pub use matrix::Matrix;
#[cfg(feature = "alloc")]
pub use qr::Qr;
#[cfg(feature = "alloc")]
pub use svd::Svd;
#[cfg(feature = "alloc")]
pub use tridiagonal::SymmetricTridiagonal;

/// Errors from linear algebra operations.
///
/// Malformed arguments panic instead; these are the conditions a correct
/// caller can still run into.
///
/// ```
/// use native_lapack::linalg::{LinalgError, Matrix};
///
/// let zero_column = Matrix::from_rows(3, 2, &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
/// let b = [1.0, 2.0, 3.0];
/// assert_eq!(zero_column.qr().solve(&b).unwrap_err(), LinalgError::Singular);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinalgError {
    /// A triangular factor has a zero on its diagonal.
    Singular,
    /// An iterative solver used up its sweep budget before every
    /// off-diagonal entry was negligible.
    ConvergenceFailure,
}

impl core::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinalgError::Singular => write!(f, "matrix is singular"),
            LinalgError::ConvergenceFailure => write!(f, "iterative algorithm did not converge"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinalgError {}
