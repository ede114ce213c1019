//! Level 2: matrix-vector operations.

use super::{mat_len, start, vec_len, Diag, Transpose, Uplo};

fn check_mat(r: usize, c: usize, a: &[f64], lda: usize) {
    assert!(lda >= c.max(1), "blas: bad leading dimension");
    assert!(a.len() >= mat_len(r, c, lda), "blas: matrix buffer too short");
}

fn check_vec(n: usize, x: &[f64], inc: isize, name: &str) {
    assert!(inc != 0, "blas: zero increment for {}", name);
    assert!(x.len() >= vec_len(n, inc), "blas: {} too short", name);
}

#[allow(clippy::too_many_arguments)]
pub(super) fn dgemv(
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
    check_mat(m, n, a, lda);
    let (lenx, leny) = match trans {
        Transpose::NoTrans => (n, m),
        Transpose::Trans => (m, n),
    };
    check_vec(lenx, x, incx, "x");
    check_vec(leny, y, incy, "y");
    if m == 0 || n == 0 || (alpha == 0.0 && beta == 1.0) {
        return;
    }

    let kx = start(lenx, incx);
    let ky = start(leny, incy);

    // y = beta * y
    if beta != 1.0 {
        let mut iy = ky;
        for _ in 0..leny {
            let yi = &mut y[iy as usize];
            *yi = if beta == 0.0 { 0.0 } else { beta * *yi };
            iy += incy;
        }
    }
    if alpha == 0.0 {
        return;
    }

    match trans {
        Transpose::NoTrans => {
            let mut iy = ky;
            for i in 0..m {
                let row = &a[i * lda..i * lda + n];
                let mut sum = 0.0;
                let mut jx = kx;
                for &aij in row {
                    sum += aij * x[jx as usize];
                    jx += incx;
                }
                y[iy as usize] += alpha * sum;
                iy += incy;
            }
        }
        Transpose::Trans => {
            let mut ix = kx;
            for i in 0..m {
                let tmp = alpha * x[ix as usize];
                if tmp != 0.0 {
                    let row = &a[i * lda..i * lda + n];
                    let mut jy = ky;
                    for &aij in row {
                        y[jy as usize] += tmp * aij;
                        jy += incy;
                    }
                }
                ix += incx;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn dger(
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
    check_mat(m, n, a, lda);
    check_vec(m, x, incx, "x");
    check_vec(n, y, incy, "y");
    if m == 0 || n == 0 || alpha == 0.0 {
        return;
    }
    let mut ix = start(m, incx);
    let ky = start(n, incy);
    for i in 0..m {
        let tmp = alpha * x[ix as usize];
        if tmp != 0.0 {
            let row = &mut a[i * lda..i * lda + n];
            let mut jy = ky;
            for aij in row.iter_mut() {
                *aij += tmp * y[jy as usize];
                jy += incy;
            }
        }
        ix += incx;
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn dtrmv(
    uplo: Uplo,
    trans: Transpose,
    diag: Diag,
    n: usize,
    a: &[f64],
    lda: usize,
    x: &mut [f64],
    incx: isize,
) {
    assert!(uplo != Uplo::All, "blas: bad uplo");
    check_mat(n, n, a, lda);
    check_vec(n, x, incx, "x");
    if n == 0 {
        return;
    }
    let kx = start(n, incx);
    let ix = |i: usize| (kx + i as isize * incx) as usize;
    let unit = diag == Diag::Unit;

    match (trans, uplo) {
        // x[i] = sum_{j >= i} A[i,j] x[j]
        (Transpose::NoTrans, Uplo::Upper) => {
            for i in 0..n {
                let mut sum = if unit { x[ix(i)] } else { a[i * lda + i] * x[ix(i)] };
                for j in i + 1..n {
                    sum += a[i * lda + j] * x[ix(j)];
                }
                x[ix(i)] = sum;
            }
        }
        // x[i] = sum_{j <= i} A[i,j] x[j]
        (Transpose::NoTrans, _) => {
            for i in (0..n).rev() {
                let mut sum = if unit { x[ix(i)] } else { a[i * lda + i] * x[ix(i)] };
                for j in 0..i {
                    sum += a[i * lda + j] * x[ix(j)];
                }
                x[ix(i)] = sum;
            }
        }
        // x[j] = sum_{i <= j} A[i,j] x[i]
        (Transpose::Trans, Uplo::Upper) => {
            for j in (0..n).rev() {
                let mut sum = if unit { x[ix(j)] } else { a[j * lda + j] * x[ix(j)] };
                for i in 0..j {
                    sum += a[i * lda + j] * x[ix(i)];
                }
                x[ix(j)] = sum;
            }
        }
        // x[j] = sum_{i >= j} A[i,j] x[i]
        (Transpose::Trans, _) => {
            for j in 0..n {
                let mut sum = if unit { x[ix(j)] } else { a[j * lda + j] * x[ix(j)] };
                for i in j + 1..n {
                    sum += a[i * lda + j] * x[ix(i)];
                }
                x[ix(j)] = sum;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn dtrsv(
    uplo: Uplo,
    trans: Transpose,
    diag: Diag,
    n: usize,
    a: &[f64],
    lda: usize,
    x: &mut [f64],
    incx: isize,
) {
    assert!(uplo != Uplo::All, "blas: bad uplo");
    check_mat(n, n, a, lda);
    check_vec(n, x, incx, "x");
    if n == 0 {
        return;
    }
    let kx = start(n, incx);
    let ix = |i: usize| (kx + i as isize * incx) as usize;
    let unit = diag == Diag::Unit;

    match (trans, uplo) {
        (Transpose::NoTrans, Uplo::Upper) => {
            for i in (0..n).rev() {
                let mut sum = x[ix(i)];
                for j in i + 1..n {
                    sum -= a[i * lda + j] * x[ix(j)];
                }
                x[ix(i)] = if unit { sum } else { sum / a[i * lda + i] };
            }
        }
        (Transpose::NoTrans, _) => {
            for i in 0..n {
                let mut sum = x[ix(i)];
                for j in 0..i {
                    sum -= a[i * lda + j] * x[ix(j)];
                }
                x[ix(i)] = if unit { sum } else { sum / a[i * lda + i] };
            }
        }
        (Transpose::Trans, Uplo::Upper) => {
            for j in 0..n {
                let mut sum = x[ix(j)];
                for i in 0..j {
                    sum -= a[i * lda + j] * x[ix(i)];
                }
                x[ix(j)] = if unit { sum } else { sum / a[j * lda + j] };
            }
        }
        (Transpose::Trans, _) => {
            for j in (0..n).rev() {
                let mut sum = x[ix(j)];
                for i in j + 1..n {
                    sum -= a[i * lda + j] * x[ix(i)];
                }
                x[ix(j)] = if unit { sum } else { sum / a[j * lda + j] };
            }
        }
    }
}
