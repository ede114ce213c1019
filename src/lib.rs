//! # native-lapack
//!
//! Pure-Rust LAPACK routines for real double-precision matrices, layered
//! over an injectable BLAS backend. No-std compatible: the routines in
//! [`native`] never allocate, and all scratch space is passed in through
//! `work` slices sized by a workspace query.
//!
//! ## Quick start
//!
//! ```
//! use native_lapack::linalg::Matrix;
//!
//! let a = Matrix::from_rows(3, 2, &[
//!     3.0, 0.0,
//!     4.0, 5.0,
//!     0.0, 0.0,
//! ]);
//! let s = a.singular_values().unwrap();
//! assert!((s[0] - 45.0_f64.sqrt()).abs() < 1e-13);
//! assert!((s[1] - 5.0_f64.sqrt()).abs() < 1e-13);
//! ```
//!
//! ## Modules
//!
//! - [`blas`]: The [`Float64`] backend trait, i.e. the level 1–3 kernels the
//!   LAPACK layer needs, row-major with explicit leading dimensions.
//!   [`RefBlas`] is a straightforward reference implementation; any other
//!   backend can be plugged in by implementing the trait.
//!
//! - [`native`]: The LAPACK routines themselves as methods on
//!   [`Lapack`]: Householder and Givens building blocks, norms and
//!   scaling, QR and LQ factorization (unblocked and blocked), reduction
//!   to bidiagonal form, implicit-shift QR on bidiagonal and symmetric
//!   tridiagonal matrices, and the driver [`Lapack::dgesvd`].
//!
//! - [`linalg`]: Owned wrappers for everyday use (requires `alloc`):
//!   a row-major [`linalg::Matrix`] plus `Qr`, `Lq`, `Svd` and
//!   `SymmetricTridiagonal`, which size workspaces and call into
//!   [`native`].
//!
//! ## Choosing a backend
//!
//! ```
//! use native_lapack::{Blocking, Lapack, RefBlas};
//!
//! // Small panels force the blocked code paths even on tiny inputs.
//! let lapack = Lapack::new(RefBlas).with_blocking(Blocking { nb: 2, nbmin: 2, nx: 0 });
//! assert_eq!(lapack.blocking().nb, 2);
//! ```
//!
//! ## Cargo features
//!
//! | Feature | Default  | Description |
//! |---------|----------|-------------|
//! | `std`   | yes      | Implies `alloc`. Hardware FPU via system libm |
//! | `alloc` | via std  | The owned wrappers in [`linalg`] |
//! | `libm`  | baseline | Pure-Rust software float fallback for `no_std` |

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod blas;
pub mod linalg;
pub mod native;

pub use blas::{Diag, Float64, RefBlas, Side, Transpose, Uplo};
pub use linalg::LinalgError;
pub use native::{
    Blocking, Direct, EigComp, GenOrtho, Lapack, MatrixNorm, MatrixType, Pivot, Sort, StoreV, SvdJob,
};
