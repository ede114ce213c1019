use super::*;

const TOL: f64 = 1e-12;

fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
    assert!(
        (a - b).abs() < tol,
        "{}: {} vs {} (diff {})",
        msg,
        a,
        b,
        (a - b).abs()
    );
}

#[test]
fn dot_negative_increment() {
    let x = [1.0, 2.0, 3.0];
    let y = [4.0, 5.0, 6.0];
    // x reversed: [3, 2, 1] · [4, 5, 6]
    assert_near(RefBlas.ddot(3, &x, -1, &y, 1), 28.0, TOL, "reverse dot");
    assert_near(RefBlas.ddot(3, &x, 1, &y, 1), 32.0, TOL, "dot");
}

#[test]
fn nrm2_avoids_overflow() {
    let x = [3e200, 4e200];
    assert_near(RefBlas.dnrm2(2, &x, 1) / 5e200, 1.0, TOL, "scaled norm");
    let tiny = [3e-200, 0.0, 4e-200];
    assert_near(RefBlas.dnrm2(2, &tiny, 2) / 5e-200, 1.0, TOL, "strided tiny norm");
}

#[test]
fn idamax_first_of_ties() {
    let x = [1.0, -5.0, 5.0, 2.0];
    assert_eq!(RefBlas.idamax(4, &x, 1), Some(1));
    assert_eq!(RefBlas.idamax(0, &x, 1), None);
}

#[test]
fn axpy_and_rot() {
    let x = [1.0, 2.0];
    let mut y = [10.0, 20.0];
    RefBlas.daxpy(2, 2.0, &x, 1, &mut y, 1);
    assert_eq!(y, [12.0, 24.0]);

    let mut a = [1.0, 0.0];
    let mut b = [0.0, 1.0];
    let (c, s) = (0.6, 0.8);
    RefBlas.drot(2, &mut a, 1, &mut b, 1, c, s);
    assert_near(a[0], 0.6, TOL, "rot x0");
    assert_near(b[0], -0.8, TOL, "rot y0");
    assert_near(a[1], 0.8, TOL, "rot x1");
    assert_near(b[1], 0.6, TOL, "rot y1");
}

#[test]
fn rotg_zeroes_second() {
    let (c, s, r, _) = RefBlas.drotg(3.0, 4.0);
    assert_near(r, 5.0, TOL, "r");
    assert_near(-s * 3.0 + c * 4.0, 0.0, TOL, "zeroed");
}

#[test]
fn gemv_transpose_strided() {
    // A is 2x3 stored with lda = 4
    let a = [1.0, 2.0, 3.0, 99.0, 4.0, 5.0, 6.0, 99.0];
    let x = [1.0, 0.0, 1.0];
    let mut y = [0.0; 3];
    RefBlas.dgemv(Transpose::Trans, 2, 3, 1.0, &a, 4, &x, 2, 0.0, &mut y, 1);
    assert_eq!(y, [5.0, 7.0, 9.0]);
}

#[test]
fn trmv_trsv_inverse() {
    let a = [2.0, 1.0, -1.0, 0.0, 3.0, 2.0, 0.0, 0.0, 4.0];
    for &uplo in &[Uplo::Upper, Uplo::Lower] {
        for &trans in &[Transpose::NoTrans, Transpose::Trans] {
            for &diag in &[Diag::NonUnit, Diag::Unit] {
                // Mirror the upper triangle for Lower so both have content.
                let mut m = a;
                if uplo == Uplo::Lower {
                    for i in 0..3 {
                        for j in 0..3 {
                            m[i * 3 + j] = a[j * 3 + i];
                        }
                    }
                }
                let orig = [1.0, -2.0, 0.5];
                let mut x = orig;
                RefBlas.dtrmv(uplo, trans, diag, 3, &m, 3, &mut x, -1);
                RefBlas.dtrsv(uplo, trans, diag, 3, &m, 3, &mut x, -1);
                for i in 0..3 {
                    assert_near(x[i], orig[i], 1e-12, "trmv then trsv");
                }
            }
        }
    }
}

#[test]
fn gemm_all_transposes() {
    // A 2x3, B 3x2
    let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
    let expected = [58.0, 64.0, 139.0, 154.0];

    let mut c = [0.0; 4];
    RefBlas.dgemm(Transpose::NoTrans, Transpose::NoTrans, 2, 2, 3, 1.0, &a, 3, &b, 2, 0.0, &mut c, 2);
    assert_eq!(c, expected);

    // Aᵀ stored 3x2, Bᵀ stored 2x3
    let at = [1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
    let bt = [7.0, 9.0, 11.0, 8.0, 10.0, 12.0];
    let mut c = [1.0; 4];
    RefBlas.dgemm(Transpose::Trans, Transpose::Trans, 2, 2, 3, 1.0, &at, 2, &bt, 3, 0.0, &mut c, 2);
    assert_eq!(c, expected);
}

#[test]
fn trmm_right_matches_gemm() {
    let t = [1.0, 2.0, 0.0, 3.0]; // upper
    let b0 = [1.0, 1.0, 2.0, -1.0];
    let mut b = b0;
    RefBlas.dtrmm(Side::Right, Uplo::Upper, Transpose::Trans, Diag::NonUnit, 2, 2, 2.0, &t, 2, &mut b, 2);
    let mut c = [0.0; 4];
    RefBlas.dgemm(Transpose::NoTrans, Transpose::Trans, 2, 2, 2, 2.0, &b0, 2, &t, 2, 0.0, &mut c, 2);
    for i in 0..4 {
        assert_near(b[i], c[i], TOL, "trmm right");
    }

    RefBlas.dtrsm(Side::Right, Uplo::Upper, Transpose::Trans, Diag::NonUnit, 2, 2, 0.5, &t, 2, &mut b, 2);
    for i in 0..4 {
        assert_near(b[i], b0[i], TOL, "trsm undoes trmm");
    }
}

#[test]
#[should_panic(expected = "bad leading dimension")]
fn gemv_rejects_short_lda() {
    let a = [0.0; 4];
    let x = [0.0; 2];
    let mut y = [0.0; 2];
    RefBlas.dgemv(Transpose::NoTrans, 2, 2, 1.0, &a, 1, &x, 1, 0.0, &mut y, 1);
}
