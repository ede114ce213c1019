//! Level 1: vector-vector operations.

use super::{start, vec_len};
use num_traits::Float;

fn check_inc(n: usize, len: usize, inc: isize, name: &str) {
    assert!(inc != 0, "blas: zero increment for {}", name);
    assert!(len >= vec_len(n, inc), "blas: {} too short", name);
}

pub(super) fn ddot(n: usize, x: &[f64], incx: isize, y: &[f64], incy: isize) -> f64 {
    check_inc(n, x.len(), incx, "x");
    check_inc(n, y.len(), incy, "y");
    if incx == 1 && incy == 1 {
        return x[..n].iter().zip(&y[..n]).map(|(a, b)| a * b).sum();
    }
    let mut ix = start(n, incx);
    let mut iy = start(n, incy);
    let mut sum = 0.0;
    for _ in 0..n {
        sum += x[ix as usize] * y[iy as usize];
        ix += incx;
        iy += incy;
    }
    sum
}

pub(super) fn dnrm2(n: usize, x: &[f64], incx: usize) -> f64 {
    check_inc(n, x.len(), incx as isize, "x");
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return x[0].abs();
    }
    // Scaled sum of squares: ssq * scale² is the running sum.
    let mut scale = 0.0_f64;
    let mut ssq = 1.0_f64;
    for i in 0..n {
        let v = x[i * incx];
        if v == 0.0 {
            continue;
        }
        let absxi = v.abs();
        if absxi.is_nan() {
            return f64::NAN;
        }
        if scale < absxi {
            let r = scale / absxi;
            ssq = 1.0 + ssq * r * r;
            scale = absxi;
        } else {
            let r = absxi / scale;
            ssq += r * r;
        }
    }
    if scale.is_infinite() {
        return f64::INFINITY;
    }
    scale * Float::sqrt(ssq)
}

pub(super) fn dasum(n: usize, x: &[f64], incx: usize) -> f64 {
    check_inc(n, x.len(), incx as isize, "x");
    (0..n).map(|i| x[i * incx].abs()).sum()
}

pub(super) fn idamax(n: usize, x: &[f64], incx: usize) -> Option<usize> {
    check_inc(n, x.len(), incx as isize, "x");
    if n == 0 {
        return None;
    }
    let mut idx = 0;
    let mut max = x[0].abs();
    for i in 1..n {
        let v = x[i * incx].abs();
        if v > max {
            max = v;
            idx = i;
        }
    }
    Some(idx)
}

pub(super) fn dswap(n: usize, x: &mut [f64], incx: isize, y: &mut [f64], incy: isize) {
    check_inc(n, x.len(), incx, "x");
    check_inc(n, y.len(), incy, "y");
    let mut ix = start(n, incx);
    let mut iy = start(n, incy);
    for _ in 0..n {
        core::mem::swap(&mut x[ix as usize], &mut y[iy as usize]);
        ix += incx;
        iy += incy;
    }
}

pub(super) fn dcopy(n: usize, x: &[f64], incx: isize, y: &mut [f64], incy: isize) {
    check_inc(n, x.len(), incx, "x");
    check_inc(n, y.len(), incy, "y");
    if incx == 1 && incy == 1 {
        y[..n].copy_from_slice(&x[..n]);
        return;
    }
    let mut ix = start(n, incx);
    let mut iy = start(n, incy);
    for _ in 0..n {
        y[iy as usize] = x[ix as usize];
        ix += incx;
        iy += incy;
    }
}

pub(super) fn daxpy(n: usize, alpha: f64, x: &[f64], incx: isize, y: &mut [f64], incy: isize) {
    check_inc(n, x.len(), incx, "x");
    check_inc(n, y.len(), incy, "y");
    if alpha == 0.0 {
        return;
    }
    if incx == 1 && incy == 1 {
        for (yi, xi) in y[..n].iter_mut().zip(&x[..n]) {
            *yi += alpha * xi;
        }
        return;
    }
    let mut ix = start(n, incx);
    let mut iy = start(n, incy);
    for _ in 0..n {
        y[iy as usize] += alpha * x[ix as usize];
        ix += incx;
        iy += incy;
    }
}

pub(super) fn dscal(n: usize, alpha: f64, x: &mut [f64], incx: usize) {
    check_inc(n, x.len(), incx as isize, "x");
    for i in 0..n {
        x[i * incx] *= alpha;
    }
}

pub(super) fn drot(n: usize, x: &mut [f64], incx: isize, y: &mut [f64], incy: isize, c: f64, s: f64) {
    check_inc(n, x.len(), incx, "x");
    check_inc(n, y.len(), incy, "y");
    let mut ix = start(n, incx);
    let mut iy = start(n, incy);
    for _ in 0..n {
        let (xv, yv) = (x[ix as usize], y[iy as usize]);
        x[ix as usize] = c * xv + s * yv;
        y[iy as usize] = c * yv - s * xv;
        ix += incx;
        iy += incy;
    }
}

pub(super) fn drotg(a: f64, b: f64) -> (f64, f64, f64, f64) {
    let absa = a.abs();
    let absb = b.abs();
    let roe = if absa > absb { a } else { b };
    let scale = absa + absb;
    if scale == 0.0 {
        return (1.0, 0.0, 0.0, 0.0);
    }
    let sa = a / scale;
    let sb = b / scale;
    let mut r = scale * Float::sqrt(sa * sa + sb * sb);
    if roe < 0.0 {
        r = -r;
    }
    let c = a / r;
    let s = b / r;
    let z = if absa > absb {
        s
    } else if c != 0.0 {
        1.0 / c
    } else {
        1.0
    };
    (c, s, r, z)
}
