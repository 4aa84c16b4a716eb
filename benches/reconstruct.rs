use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array5;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use spectral_post::{reconstruct, reduce, Boundary, Dimension, Resolution, TensorField};

/// identity plus a small random fluctuation in every cell
fn defgrad(n: usize) -> (Resolution, TensorField) {
    let resolution = Resolution::new(n, n, n).unwrap();
    let mut array: Array5<f64> = Array5::random((n, n, n, 3, 3), Uniform::new(-0.01, 0.01));
    for i in 0..3 {
        array
            .slice_mut(ndarray::s![.., .., .., i, i])
            .mapv_inplace(|v| v + 1.0);
    }

    (resolution, TensorField::new(array).unwrap())
}

fn reconstruct_bench(c: &mut Criterion) {
    let dimension = Dimension::new(1.0, 1.0, 1.0);

    for n in [16, 32] {
        let (resolution, field) = defgrad(n);
        let average = reduce::average(&field);

        c.bench_function(&format!("direct {}", n), |b| {
            b.iter(|| {
                reconstruct::deformed(&resolution, &dimension, black_box(&field), &average).unwrap()
            })
        });

        c.bench_function(&format!("fft {}", n), |b| {
            b.iter(|| {
                reconstruct::deformed_fft(&resolution, &dimension, black_box(&field), &average, 1.0)
                    .unwrap()
            })
        });

        let centroids = reconstruct::deformed(&resolution, &dimension, &field, &average).unwrap();
        c.bench_function(&format!("mesh {}", n), |b| {
            b.iter(|| {
                reconstruct::mesh(
                    &resolution,
                    &dimension,
                    &average,
                    black_box(&centroids),
                    Boundary::Periodic,
                )
                .unwrap()
            })
        });
    }
}

criterion_group!(benches, reconstruct_bench);
criterion_main!(benches);
