//! Level 3: matrix-matrix operations.
//!
//! `dtrmm` and `dtrsm` reduce to one Level 2 call per column (left side) or
//! per row (right side) of `B`.

use super::level2::{dtrmv, dtrsv};
use super::{mat_len, Diag, Side, Transpose, Uplo};

#[allow(clippy::too_many_arguments)]
pub(super) fn dgemm(
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
    let (ar, ac) = match trans_a {
        Transpose::NoTrans => (m, k),
        Transpose::Trans => (k, m),
    };
    let (br, bc) = match trans_b {
        Transpose::NoTrans => (k, n),
        Transpose::Trans => (n, k),
    };
    assert!(lda >= ac.max(1), "blas: bad lda");
    assert!(ldb >= bc.max(1), "blas: bad ldb");
    assert!(ldc >= n.max(1), "blas: bad ldc");
    assert!(a.len() >= mat_len(ar, ac, lda), "blas: a too short");
    assert!(b.len() >= mat_len(br, bc, ldb), "blas: b too short");
    assert!(c.len() >= mat_len(m, n, ldc), "blas: c too short");
    if m == 0 || n == 0 {
        return;
    }

    if beta != 1.0 {
        for i in 0..m {
            for cij in &mut c[i * ldc..i * ldc + n] {
                *cij = if beta == 0.0 { 0.0 } else { beta * *cij };
            }
        }
    }
    if alpha == 0.0 || k == 0 {
        return;
    }

    let a_at = |i: usize, l: usize| match trans_a {
        Transpose::NoTrans => a[i * lda + l],
        Transpose::Trans => a[l * lda + i],
    };
    for i in 0..m {
        for l in 0..k {
            let tmp = alpha * a_at(i, l);
            if tmp == 0.0 {
                continue;
            }
            let crow = &mut c[i * ldc..i * ldc + n];
            match trans_b {
                Transpose::NoTrans => {
                    let brow = &b[l * ldb..l * ldb + n];
                    for (cij, blj) in crow.iter_mut().zip(brow) {
                        *cij += tmp * blj;
                    }
                }
                Transpose::Trans => {
                    for (j, cij) in crow.iter_mut().enumerate() {
                        *cij += tmp * b[j * ldb + l];
                    }
                }
            }
        }
    }
}

fn scale_or_zero(m: usize, n: usize, alpha: f64, b: &mut [f64], ldb: usize) {
    for i in 0..m {
        for bij in &mut b[i * ldb..i * ldb + n] {
            *bij = if alpha == 0.0 { 0.0 } else { alpha * *bij };
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn check_tri(side: Side, uplo: Uplo, m: usize, n: usize, a: &[f64], lda: usize, b: &[f64], ldb: usize) -> usize {
    assert!(uplo != Uplo::All, "blas: bad uplo");
    let k = match side {
        Side::Left => m,
        Side::Right => n,
    };
    assert!(lda >= k.max(1), "blas: bad lda");
    assert!(ldb >= n.max(1), "blas: bad ldb");
    assert!(a.len() >= mat_len(k, k, lda), "blas: a too short");
    assert!(b.len() >= mat_len(m, n, ldb), "blas: b too short");
    k
}

#[allow(clippy::too_many_arguments)]
pub(super) fn dtrmm(
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
    let k = check_tri(side, uplo, m, n, a, lda, b, ldb);
    if m == 0 || n == 0 {
        return;
    }
    if alpha == 0.0 {
        scale_or_zero(m, n, 0.0, b, ldb);
        return;
    }
    match side {
        Side::Left => {
            for j in 0..n {
                dtrmv(uplo, trans, diag, k, a, lda, &mut b[j..], ldb as isize);
            }
        }
        Side::Right => {
            // row_i(B) * op(A) = (op(A)ᵀ * row_i(B)ᵀ)ᵀ
            for i in 0..m {
                dtrmv(uplo, trans.flip(), diag, k, a, lda, &mut b[i * ldb..i * ldb + n], 1);
            }
        }
    }
    if alpha != 1.0 {
        scale_or_zero(m, n, alpha, b, ldb);
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn dtrsm(
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
    let k = check_tri(side, uplo, m, n, a, lda, b, ldb);
    if m == 0 || n == 0 {
        return;
    }
    if alpha != 1.0 {
        scale_or_zero(m, n, alpha, b, ldb);
        if alpha == 0.0 {
            return;
        }
    }
    match side {
        Side::Left => {
            for j in 0..n {
                dtrsv(uplo, trans, diag, k, a, lda, &mut b[j..], ldb as isize);
            }
        }
        Side::Right => {
            for i in 0..m {
                dtrsv(uplo, trans.flip(), diag, k, a, lda, &mut b[i * ldb..i * ldb + n], 1);
            }
        }
    }
}
