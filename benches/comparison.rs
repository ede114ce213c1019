use criterion::{criterion_group, criterion_main, Criterion};
use native_lapack::linalg::{Matrix, SymmetricTridiagonal};
use native_lapack::{Lapack, SvdJob};

// ---------------------------------------------------------------------------
// Helpers: deterministic dense and tridiagonal test matrices
// ---------------------------------------------------------------------------

fn entry(i: usize, j: usize) -> f64 {
    ((i * 7 + j * 13) % 17) as f64 / 17.0 + if i == j { 1.0 } else { 0.0 }
}

fn native_mat(m: usize, n: usize) -> Matrix {
    Matrix::from_fn(m, n, entry)
}

fn nalgebra_mat(m: usize, n: usize) -> nalgebra::DMatrix<f64> {
    nalgebra::DMatrix::from_fn(m, n, entry)
}

fn faer_mat(m: usize, n: usize) -> faer::Mat<f64> {
    faer::Mat::from_fn(m, n, entry)
}

fn tridiagonal(n: usize) -> (Vec<f64>, Vec<f64>) {
    let d = (0..n).map(|i| 2.0 + (i as f64 * 0.37).sin()).collect();
    let e = (0..n - 1).map(|i| -1.0 + 0.1 * (i % 5) as f64).collect();
    (d, e)
}

fn dense_tridiagonal<'a>(d: &'a [f64], e: &'a [f64]) -> impl Fn(usize, usize) -> f64 + 'a {
    move |i, j| {
        if i == j {
            d[i]
        } else if i + 1 == j {
            e[i]
        } else if j + 1 == i {
            e[j]
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// QR
// ---------------------------------------------------------------------------

fn qr_dyn(c: &mut Criterion, m: usize, n: usize) {
    let mut g = c.benchmark_group(format!("qr_{}x{}", m, n));

    g.bench_function("native", |b| {
        let a = native_mat(m, n);
        b.iter(|| std::hint::black_box(&a).qr())
    });

    g.bench_function("native_unblocked", |b| {
        let a = native_mat(m, n);
        let lapack = Lapack::default();
        let mut tau = vec![0.0; n];
        let mut work = vec![0.0; n];
        b.iter(|| {
            let mut qr = a.clone();
            lapack.dgeqr2(m, n, qr.as_mut_slice(), n, &mut tau, &mut work);
            qr
        })
    });

    g.bench_function("nalgebra", |b| {
        let a = nalgebra_mat(m, n);
        b.iter(|| std::hint::black_box(a.clone()).qr())
    });

    g.bench_function("faer", |b| {
        let a = faer_mat(m, n);
        b.iter(|| std::hint::black_box(&a).qr())
    });

    g.finish();
}

fn qr_50x50(c: &mut Criterion) {
    qr_dyn(c, 50, 50);
}

fn qr_200x50(c: &mut Criterion) {
    qr_dyn(c, 200, 50);
}

// ---------------------------------------------------------------------------
// SVD
// ---------------------------------------------------------------------------

fn svd_dyn(c: &mut Criterion, m: usize, n: usize) {
    let mut g = c.benchmark_group(format!("svd_{}x{}", m, n));

    g.bench_function("native", |b| {
        let a = native_mat(m, n);
        b.iter(|| std::hint::black_box(&a).svd())
    });

    g.bench_function("native_values", |b| {
        let a = native_mat(m, n);
        b.iter(|| std::hint::black_box(&a).singular_values())
    });

    g.bench_function("native_overwrite", |b| {
        // U overwrites A in place; no wrapper copies.
        let a = native_mat(m, n);
        let lapack = Lapack::default();
        let k = m.min(n);
        let mut s = vec![0.0; k];
        let mut vt = vec![0.0; k * n];
        let mut q = [0.0];
        let _ = lapack.dgesvd(SvdJob::Overwrite, SvdJob::Store, m, n, &mut [], n, &mut [], &mut [], 1, &mut [], n, &mut q, -1);
        let mut work = vec![0.0; q[0] as usize];
        let lwork = work.len() as isize;
        b.iter(|| {
            let mut x = a.clone();
            lapack.dgesvd(
                SvdJob::Overwrite,
                SvdJob::Store,
                m,
                n,
                x.as_mut_slice(),
                n,
                &mut s,
                &mut [],
                1,
                &mut vt,
                n,
                &mut work,
                lwork,
            )
        })
    });

    g.bench_function("nalgebra", |b| {
        let a = nalgebra_mat(m, n);
        b.iter(|| std::hint::black_box(a.clone()).svd(true, true))
    });

    g.bench_function("faer", |b| {
        let a = faer_mat(m, n);
        b.iter(|| std::hint::black_box(&a).thin_svd())
    });

    g.finish();
}

fn svd_20x20(c: &mut Criterion) {
    svd_dyn(c, 20, 20);
}

fn svd_100x20(c: &mut Criterion) {
    svd_dyn(c, 100, 20);
}

fn svd_20x100(c: &mut Criterion) {
    svd_dyn(c, 20, 100);
}

// ---------------------------------------------------------------------------
// Symmetric tridiagonal eigendecomposition
// ---------------------------------------------------------------------------

fn eigen_tridiagonal_50(c: &mut Criterion) {
    let n = 50;
    let (d, e) = tridiagonal(n);
    let mut g = c.benchmark_group("eigen_tridiagonal_50");

    g.bench_function("native_vectors", |b| {
        b.iter(|| SymmetricTridiagonal::eigen(std::hint::black_box(&d), &e))
    });

    g.bench_function("native_values", |b| {
        b.iter(|| SymmetricTridiagonal::eigenvalues(std::hint::black_box(&d), &e))
    });

    g.bench_function("nalgebra", |b| {
        let a = nalgebra::DMatrix::from_fn(n, n, dense_tridiagonal(&d, &e));
        b.iter(|| std::hint::black_box(a.clone()).symmetric_eigen())
    });

    g.bench_function("faer", |b| {
        let a = faer::Mat::from_fn(n, n, dense_tridiagonal(&d, &e));
        b.iter(|| std::hint::black_box(&a).selfadjoint_eigendecomposition(faer::Side::Lower))
    });

    g.finish();
}

// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    qr_50x50,
    qr_200x50,
    svd_20x20,
    svd_100x20,
    svd_20x100,
    eigen_tridiagonal_50,
);
criterion_main!(benches);
