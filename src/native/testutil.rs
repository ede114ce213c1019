use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

pub(crate) fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
    assert!(
        (a - b).abs() < tol,
        "{}: {} vs {} (diff {})",
        msg,
        a,
        b,
        (a - b).abs()
    );
}

/// Row-major m×n matrix with entries uniform in [-1, 1) and leading dimension `lda`.
/// Padding columns are filled with a sentinel.
pub(crate) fn random_matrix(m: usize, n: usize, lda: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut a = vec![f64::NAN; if m == 0 { 0 } else { (m - 1) * lda + n }];
    for i in 0..m {
        for j in 0..n {
            a[i * lda + j] = 2.0 * rng.random::<f64>() - 1.0;
        }
    }
    a
}

/// C = A * B for dense row-major operands.
#[allow(clippy::too_many_arguments)]
pub(crate) fn matmul(m: usize, n: usize, k: usize, a: &[f64], lda: usize, b: &[f64], ldb: usize) -> Vec<f64> {
    let mut c = vec![0.0; m * n];
    for i in 0..m {
        for l in 0..k {
            let ail = a[i * lda + l];
            for j in 0..n {
                c[i * n + j] += ail * b[l * ldb + j];
            }
        }
    }
    c
}

/// Max |QᵀQ - I| over the n columns of an m×n matrix.
pub(crate) fn orthonormal_cols_error(m: usize, n: usize, q: &[f64], ldq: usize) -> f64 {
    let mut worst = 0.0_f64;
    for i in 0..n {
        for j in 0..n {
            let dot: f64 = (0..m).map(|r| q[r * ldq + i] * q[r * ldq + j]).sum();
            let want = if i == j { 1.0 } else { 0.0 };
            worst = worst.max((dot - want).abs());
        }
    }
    worst
}

/// Max |Q Qᵀ - I| over the m rows of an m×n matrix.
pub(crate) fn orthonormal_rows_error(m: usize, n: usize, q: &[f64], ldq: usize) -> f64 {
    let mut worst = 0.0_f64;
    for i in 0..m {
        for j in 0..m {
            let dot: f64 = (0..n).map(|c| q[i * ldq + c] * q[j * ldq + c]).sum();
            let want = if i == j { 1.0 } else { 0.0 };
            worst = worst.max((dot - want).abs());
        }
    }
    worst
}

/// Max |a_ij - b_ij| over an m×n block.
pub(crate) fn max_diff(m: usize, n: usize, a: &[f64], lda: usize, b: &[f64], ldb: usize) -> f64 {
    let mut worst = 0.0_f64;
    for i in 0..m {
        for j in 0..n {
            worst = worst.max((a[i * lda + j] - b[i * ldb + j]).abs());
        }
    }
    worst
}
