//! BLAS interface consumed by the LAPACK routines.
//!
//! | Level | Operations |
//! |-------|------------|
//! | 1 | `ddot`, `dnrm2`, `dasum`, `idamax`, `dswap`, `dcopy`, `daxpy`, `dscal`, `drot`, `drotg` |
//! | 2 | `dgemv`, `dger`, `dtrmv`, `dtrsv` |
//! | 3 | `dgemm`, `dtrmm`, `dtrsm` |
//!
//! All matrices are row-major with an explicit leading dimension. Vector
//! increments are signed where BLAS allows it: a negative increment walks the
//! vector backward starting at element `(n-1)*|inc|`.
//!
//! [`Float64`] is the seam between the LAPACK layer and the arithmetic
//! backend. [`RefBlas`] is a pure-Rust implementation of it; any other
//! backend (a wrapper over a system BLAS, an instrumented one for tests) can
//! be handed to [`Lapack::new`](crate::Lapack::new) instead.

mod level1;
mod level2;
mod level3;

/// Transpose operation applied to a matrix operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum Transpose {
    /// Use the matrix as stored.
    #[default]
    NoTrans = 111,
    /// Use the transpose.
    Trans = 112,
}

impl Transpose {
    /// The opposite operation.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Transpose::NoTrans => Transpose::Trans,
            Transpose::Trans => Transpose::NoTrans,
        }
    }
}

/// Which triangle of a symmetric or triangular matrix is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum Uplo {
    #[default]
    Upper = 121,
    Lower = 122,
    /// The full matrix (only meaningful to LAPACK copy/set helpers).
    All = 99,
}

/// Whether a triangular matrix has an implicit unit diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum Diag {
    #[default]
    NonUnit = 131,
    Unit = 132,
}

/// Side from which a matrix operand multiplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum Side {
    #[default]
    Left = 141,
    Right = 142,
}

/// Double-precision BLAS operations over row-major flat buffers.
///
/// Implementations panic on malformed arguments (negative sizes cannot occur,
/// but short buffers and bad leading dimensions can).
pub trait Float64 {
    // ── Level 1 ─────────────────────────────────────────────────────

    /// `sum(x[i] * y[i])`.
    fn ddot(&self, n: usize, x: &[f64], incx: isize, y: &[f64], incy: isize) -> f64;

    /// Euclidean norm of `x`, computed without undue overflow or underflow.
    fn dnrm2(&self, n: usize, x: &[f64], incx: usize) -> f64;

    /// `sum(|x[i]|)`.
    fn dasum(&self, n: usize, x: &[f64], incx: usize) -> f64;

    /// Index of the first element of largest magnitude, or `None` when `n == 0`.
    fn idamax(&self, n: usize, x: &[f64], incx: usize) -> Option<usize>;

    /// Exchange `x` and `y`.
    fn dswap(&self, n: usize, x: &mut [f64], incx: isize, y: &mut [f64], incy: isize);

    /// `y = x`.
    fn dcopy(&self, n: usize, x: &[f64], incx: isize, y: &mut [f64], incy: isize);

    /// `y += alpha * x`.
    fn daxpy(&self, n: usize, alpha: f64, x: &[f64], incx: isize, y: &mut [f64], incy: isize);

    /// `x *= alpha`.
    fn dscal(&self, n: usize, alpha: f64, x: &mut [f64], incx: usize);

    /// Apply the plane rotation `[c s; -s c]` to the pairs `(x[i], y[i])`.
    #[allow(clippy::too_many_arguments)]
    fn drot(&self, n: usize, x: &mut [f64], incx: isize, y: &mut [f64], incy: isize, c: f64, s: f64);

    /// Construct a Givens rotation zeroing `b`. Returns `(c, s, r, z)`.
    fn drotg(&self, a: f64, b: f64) -> (f64, f64, f64, f64);

    // ── Level 2 ─────────────────────────────────────────────────────

    /// `y = alpha * op(A) * x + beta * y` with `A` m×n.
    #[allow(clippy::too_many_arguments)]
    fn dgemv(
        &self,
        trans: Transpose,
        m: usize,
        n: usize,
        alpha: f64,
        a: &[f64],
        lda: usize,
        x: &[f64],
        incx: isize,
        beta: f64,
        y: &mut [f64],
        incy: isize,
    );

    /// `A += alpha * x * yᵀ` with `A` m×n.
    #[allow(clippy::too_many_arguments)]
    fn dger(
        &self,
        m: usize,
        n: usize,
        alpha: f64,
        x: &[f64],
        incx: isize,
        y: &[f64],
        incy: isize,
        a: &mut [f64],
        lda: usize,
    );

    /// `x = op(A) * x` with `A` n×n triangular.
    #[allow(clippy::too_many_arguments)]
    fn dtrmv(
        &self,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        n: usize,
        a: &[f64],
        lda: usize,
        x: &mut [f64],
        incx: isize,
    );

    /// Solve `op(A) * x = b` in place with `A` n×n triangular.
    #[allow(clippy::too_many_arguments)]
    fn dtrsv(
        &self,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        n: usize,
        a: &[f64],
        lda: usize,
        x: &mut [f64],
        incx: isize,
    );

    // ── Level 3 ─────────────────────────────────────────────────────

    /// `C = alpha * op(A) * op(B) + beta * C` with `C` m×n and inner size k.
    #[allow(clippy::too_many_arguments)]
    fn dgemm(
        &self,
        trans_a: Transpose,
        trans_b: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: f64,
        a: &[f64],
        lda: usize,
        b: &[f64],
        ldb: usize,
        beta: f64,
        c: &mut [f64],
        ldc: usize,
    );

    /// `B = alpha * op(A) * B` (left) or `B = alpha * B * op(A)` (right), `B` m×n.
    #[allow(clippy::too_many_arguments)]
    fn dtrmm(
        &self,
        side: Side,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: f64,
        a: &[f64],
        lda: usize,
        b: &mut [f64],
        ldb: usize,
    );

    /// Solve `op(A) * X = alpha * B` (left) or `X * op(A) = alpha * B` (right), `X`
    /// overwriting `B`.
    #[allow(clippy::too_many_arguments)]
    fn dtrsm(
        &self,
        side: Side,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: f64,
        a: &[f64],
        lda: usize,
        b: &mut [f64],
        ldb: usize,
    );
}

/// Pure-Rust reference backend.
///
/// Straightforward loops over the row-major layout; correct for every
/// argument combination the trait allows, with no blocking or SIMD.
///
/// ```
/// use native_lapack::blas::{Float64, RefBlas, Transpose};
///
/// let a = [1.0, 2.0, 3.0, 4.0]; // [[1, 2], [3, 4]]
/// let x = [1.0, 1.0];
/// let mut y = [0.0; 2];
/// RefBlas.dgemv(Transpose::NoTrans, 2, 2, 1.0, &a, 2, &x, 1, 0.0, &mut y, 1);
/// assert_eq!(y, [3.0, 7.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefBlas;

impl Float64 for RefBlas {
    fn ddot(&self, n: usize, x: &[f64], incx: isize, y: &[f64], incy: isize) -> f64 {
        level1::ddot(n, x, incx, y, incy)
    }

    fn dnrm2(&self, n: usize, x: &[f64], incx: usize) -> f64 {
        level1::dnrm2(n, x, incx)
    }

    fn dasum(&self, n: usize, x: &[f64], incx: usize) -> f64 {
        level1::dasum(n, x, incx)
    }

    fn idamax(&self, n: usize, x: &[f64], incx: usize) -> Option<usize> {
        level1::idamax(n, x, incx)
    }

    fn dswap(&self, n: usize, x: &mut [f64], incx: isize, y: &mut [f64], incy: isize) {
        level1::dswap(n, x, incx, y, incy)
    }

    fn dcopy(&self, n: usize, x: &[f64], incx: isize, y: &mut [f64], incy: isize) {
        level1::dcopy(n, x, incx, y, incy)
    }

    fn daxpy(&self, n: usize, alpha: f64, x: &[f64], incx: isize, y: &mut [f64], incy: isize) {
        level1::daxpy(n, alpha, x, incx, y, incy)
    }

    fn dscal(&self, n: usize, alpha: f64, x: &mut [f64], incx: usize) {
        level1::dscal(n, alpha, x, incx)
    }

    fn drot(&self, n: usize, x: &mut [f64], incx: isize, y: &mut [f64], incy: isize, c: f64, s: f64) {
        level1::drot(n, x, incx, y, incy, c, s)
    }

    fn drotg(&self, a: f64, b: f64) -> (f64, f64, f64, f64) {
        level1::drotg(a, b)
    }

    fn dgemv(
        &self,
        trans: Transpose,
        m: usize,
        n: usize,
        alpha: f64,
        a: &[f64],
        lda: usize,
        x: &[f64],
        incx: isize,
        beta: f64,
        y: &mut [f64],
        incy: isize,
    ) {
        level2::dgemv(trans, m, n, alpha, a, lda, x, incx, beta, y, incy)
    }

    fn dger(
        &self,
        m: usize,
        n: usize,
        alpha: f64,
        x: &[f64],
        incx: isize,
        y: &[f64],
        incy: isize,
        a: &mut [f64],
        lda: usize,
    ) {
        level2::dger(m, n, alpha, x, incx, y, incy, a, lda)
    }

    fn dtrmv(
        &self,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        n: usize,
        a: &[f64],
        lda: usize,
        x: &mut [f64],
        incx: isize,
    ) {
        level2::dtrmv(uplo, trans, diag, n, a, lda, x, incx)
    }

    fn dtrsv(
        &self,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        n: usize,
        a: &[f64],
        lda: usize,
        x: &mut [f64],
        incx: isize,
    ) {
        level2::dtrsv(uplo, trans, diag, n, a, lda, x, incx)
    }

    fn dgemm(
        &self,
        trans_a: Transpose,
        trans_b: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: f64,
        a: &[f64],
        lda: usize,
        b: &[f64],
        ldb: usize,
        beta: f64,
        c: &mut [f64],
        ldc: usize,
    ) {
        level3::dgemm(trans_a, trans_b, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
    }

    fn dtrmm(
        &self,
        side: Side,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: f64,
        a: &[f64],
        lda: usize,
        b: &mut [f64],
        ldb: usize,
    ) {
        level3::dtrmm(side, uplo, trans, diag, m, n, alpha, a, lda, b, ldb)
    }

    fn dtrsm(
        &self,
        side: Side,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: f64,
        a: &[f64],
        lda: usize,
        b: &mut [f64],
        ldb: usize,
    ) {
        level3::dtrsm(side, uplo, trans, diag, m, n, alpha, a, lda, b, ldb)
    }
}

/// Starting offset of a strided vector of length `n`.
#[inline]
pub(crate) fn start(n: usize, inc: isize) -> isize {
    if inc < 0 && n > 0 {
        (1 - n as isize) * inc
    } else {
        0
    }
}

/// Minimum buffer length for a strided vector of length `n`.
#[inline]
pub(crate) fn vec_len(n: usize, inc: isize) -> usize {
    if n == 0 {
        0
    } else {
        1 + (n - 1) * inc.unsigned_abs()
    }
}

/// Minimum buffer length for a row-major r×c matrix with leading dimension `ld`.
#[inline]
pub(crate) fn mat_len(r: usize, c: usize, ld: usize) -> usize {
    if r == 0 || c == 0 {
        0
    } else {
        (r - 1) * ld + c
    }
}

#[cfg(test)]
mod tests;
