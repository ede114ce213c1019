//! Native LAPACK routines over an injected [`Float64`] backend.
//!
//! Every routine is a method on [`Lapack`], which owns its BLAS backend and
//! its blocking parameters. Matrices are row-major with an explicit leading
//! dimension, as in [`crate::blas`].
//!
//! | Group | Routines |
//! |-------|----------|
//! | Householder | `dlarfg`, `dlarf`, `dlarft`, `dlarfb` |
//! | Givens / 2×2 | `dlartg`, `dlasr`, `dlae2`, `dlaev2`, `dlas2`, `dlasv2` |
//! | Auxiliary | `dlascl`, `dlanst`, `dlange`, `dlassq`, `dlapy2`, `dlacpy`, `dlaset`, `dlasrt` |
//! | QR | `dgeqr2`, `dgeqrf`, `dorm2r`, `dormqr`, `dorg2r`, `dorgqr` |
//! | LQ | `dgelq2`, `dgelqf`, `dorml2`, `dormlq`, `dorgl2`, `dorglq` |
//! | Bidiagonal | `dgebd2`, `dorgbr`, `dbdsqr` |
//! | Tridiagonal eigen | `dsteqr`, `dsterf` |
//! | SVD | `dgesvd` |
//!
//! ## Conventions
//!
//! - Malformed arguments (bad leading dimension, short buffer, short
//!   workspace) panic. They are caller bugs, not runtime conditions.
//! - Iterative solvers report a sweep budget overrun as
//!   [`LinalgError::ConvergenceFailure`] and leave the partially reduced
//!   problem in their output buffers.
//! - Routines taking `lwork` treat `lwork == -1` as a workspace query: the
//!   optimal length is written to `work[0]` and nothing else is touched.
//!   Matrix arguments may be empty slices in that mode.
//! - Blocked routines need room in `work` for the triangular block factor
//!   and, where the reflector panel shares storage with the matrix it
//!   updates, for a staged copy of the panel. The query reports all of it.
//!
//! ```
//! use native_lapack::{Lapack, SvdJob};
//!
//! let lapack = Lapack::default();
//! let (m, n) = (3, 2);
//! let mut a = [3.0, 0.0, 0.0, 2.0, 0.0, 0.0];
//! let mut s = [0.0; 2];
//! let mut query = [0.0];
//! lapack
//!     .dgesvd(SvdJob::None, SvdJob::None, m, n, &mut [], n, &mut s, &mut [], 1, &mut [], 1, &mut query, -1)
//!     .unwrap();
//! let mut work = vec![0.0; query[0] as usize];
//! let lwork = work.len() as isize;
//! lapack
//!     .dgesvd(SvdJob::None, SvdJob::None, m, n, &mut a, n, &mut s, &mut [], 1, &mut [], 1, &mut work, lwork)
//!     .unwrap();
//! assert_eq!(s, [3.0, 2.0]);
//! ```

mod bdsqr;
mod bidiag;
pub(crate) mod check;
mod givens;
mod householder;
mod lq;
mod norm;
mod qr;
mod svd;
mod tridiag;
mod util;

use crate::blas::{Float64, RefBlas};

pub use crate::linalg::LinalgError;

/// Relative machine precision (`dlamch('E')`): half of `f64::EPSILON`.
pub const DLAMCH_E: f64 = f64::EPSILON / 2.0;
/// Safe minimum (`dlamch('S')`): `1/DLAMCH_S` does not overflow.
pub const DLAMCH_S: f64 = f64::MIN_POSITIVE;
/// `DLAMCH_E * base` (`dlamch('P')`).
pub const DLAMCH_P: f64 = f64::EPSILON;
/// Radix of the floating-point representation (`dlamch('B')`).
pub const DLAMCH_B: f64 = 2.0;

/// Largest block size any blocked routine will use.
pub const MAX_BLOCK: usize = 64;

/// Block sizes used by the blocked factorizations.
///
/// `nb` is the panel width, `nbmin` the narrowest panel worth blocking for
/// (below it the unblocked code runs), and `nx` the crossover: once the
/// remaining problem is no wider than `nx` the unblocked code finishes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blocking {
    pub nb: usize,
    pub nbmin: usize,
    pub nx: usize,
}

impl Default for Blocking {
    fn default() -> Self {
        Blocking {
            nb: 32,
            nbmin: 2,
            nx: 128,
        }
    }
}

/// LAPACK routines bound to a BLAS backend.
///
/// ```
/// use native_lapack::{Blocking, Lapack, RefBlas};
///
/// // Small panels and no crossover so that tiny matrices take the blocked path.
/// let lapack = Lapack::new(RefBlas).with_blocking(Blocking { nb: 2, nbmin: 2, nx: 0 });
/// assert_eq!(lapack.blocking().nb, 2);
/// ```
#[derive(Debug, Clone)]
pub struct Lapack<B = RefBlas> {
    blas: B,
    blocking: Blocking,
}

impl Default for Lapack<RefBlas> {
    fn default() -> Self {
        Lapack::new(RefBlas)
    }
}

impl<B: Float64> Lapack<B> {
    /// Bind the routines to `blas` with default blocking.
    pub fn new(blas: B) -> Self {
        Lapack {
            blas,
            blocking: Blocking::default(),
        }
    }

    /// Replace the blocking parameters. `nb` is clamped to [`MAX_BLOCK`] and
    /// `nbmin` to at least 2.
    pub fn with_blocking(mut self, blocking: Blocking) -> Self {
        self.blocking = Blocking {
            nb: blocking.nb.clamp(1, MAX_BLOCK),
            nbmin: blocking.nbmin.max(2),
            nx: blocking.nx,
        };
        self
    }

    /// The BLAS backend.
    pub fn blas(&self) -> &B {
        &self.blas
    }

    /// Current blocking parameters.
    pub fn blocking(&self) -> Blocking {
        self.blocking
    }

    /// Panel width for a blocked sweep over `k` reflectors, or `None` when
    /// the unblocked code should do all of the work.
    ///
    /// `need(nb)` is the workspace the blocked code uses at width `nb`; the
    /// width shrinks until it fits in `lwork`. `nx` is the crossover below
    /// which blocking is not worth it.
    pub(crate) fn panel_width(&self, k: usize, nx: usize, lwork: usize, need: impl Fn(usize) -> usize) -> Option<usize> {
        let mut nb = self.blocking.nb;
        if nb <= 1 || nb >= k || nx >= k {
            return None;
        }
        while nb > 1 && need(nb) > lwork {
            nb -= 1;
        }
        if nb < self.blocking.nbmin {
            None
        } else {
            Some(nb)
        }
    }
}

/// Which singular vectors `dgesvd` computes for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvdJob {
    /// All `m` columns of U (or all `n` rows of Vᵀ).
    All,
    /// The leading `min(m,n)` columns of U (rows of Vᵀ), stored in the output
    /// array.
    Store,
    /// The leading `min(m,n)` columns of U (rows of Vᵀ), written over A.
    Overwrite,
    /// Not computed.
    None,
}

/// Order in which a sequence of reflectors or rotations is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direct {
    /// `H = H(0) H(1) ... H(k-1)`.
    Forward,
    /// `H = H(k-1) ... H(1) H(0)`.
    Backward,
}

/// How reflector vectors are laid out in `V`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreV {
    /// Reflector `i` is column `i` of V.
    ColumnWise,
    /// Reflector `i` is row `i` of V.
    RowWise,
}

/// Plane pairing used by [`Lapack::dlasr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pivot {
    /// Rotation `k` acts on planes `(k, k+1)`.
    Variable,
    /// Rotation `k` acts on planes `(0, k+1)`.
    Top,
    /// Rotation `k` acts on planes `(k, z)` with `z` the last plane.
    Bottom,
}

/// Norm computed by [`Lapack::dlange`] and [`Lapack::dlanst`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixNorm {
    /// `max |a_ij|` (not a consistent matrix norm).
    MaxAbs,
    /// Maximum absolute column sum (one-norm).
    MaxColumnSum,
    /// Maximum absolute row sum (infinity-norm).
    MaxRowSum,
    /// Square root of the sum of squares.
    Frobenius,
}

/// Storage shape understood by [`Lapack::dlascl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixType {
    General,
    LowerTri,
    UpperTri,
    UpperHessenberg,
}

/// Which orthogonal factor of a bidiagonal reduction [`Lapack::dorgbr`] forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenOrtho {
    /// Q, from the column reflectors.
    GenerateQ,
    /// Pᵀ, from the row reflectors.
    GeneratePT,
}

/// Eigenvector request for [`Lapack::dsteqr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EigComp {
    /// Eigenvalues only.
    None,
    /// Z holds an orthogonal matrix on entry; its columns are rotated into
    /// eigenvectors of the original matrix.
    OrigMatrix,
    /// Z is initialized to the identity; eigenvectors of the tridiagonal
    /// matrix are returned.
    Tridiag,
}

/// Direction for [`Lapack::dlasrt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Increasing,
    Decreasing,
}

/// `|a|` with the sign of `b`.
#[inline]
pub(crate) fn sign(a: f64, b: f64) -> f64 {
    if b >= 0.0 {
        a.abs()
    } else {
        -a.abs()
    }
}

#[cfg(test)]
pub(crate) mod testutil;
