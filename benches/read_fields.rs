use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array1;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use std::io::Cursor;

use spectral_post::{Dimension, Header, Resolution, ResultFile};

const RECORD_SIZE: usize = 61;

/// an in-memory result file with two increments of random records
fn result_stream(n: usize) -> Cursor<Vec<u8>> {
    let resolution = Resolution::new(n, n, n).unwrap();
    let header = Header::new(
        "shear",
        "/scratch/run",
        "dipl.geom",
        1,
        RECORD_SIZE,
        resolution,
        Dimension::new(1.0, 1.0, 1.0),
    );

    let mut bytes = header.encode();
    let n_values = RECORD_SIZE * resolution.n_cells();
    for _ in 0..2 {
        let marker = ((n_values * 4) as i32).to_ne_bytes();
        bytes.extend_from_slice(&marker);
        let values: Array1<f32> = Array1::random(n_values, Uniform::new(0.0, 1.0));
        for value in values.iter() {
            bytes.extend_from_slice(&value.to_ne_bytes());
        }
        bytes.extend_from_slice(&marker);
    }

    Cursor::new(bytes)
}

fn read_fields_bench(c: &mut Criterion) {
    let mut file = ResultFile::from_reader(result_stream(32)).unwrap();

    c.bench_function("read tensor 32", |b| {
        b.iter(|| file.read_tensor(black_box(1), 7).unwrap())
    });

    c.bench_function("read scalar 32", |b| {
        b.iter(|| file.read_scalar(black_box(1), 0).unwrap())
    });
}

criterion_group!(benches, read_fields_bench);
criterion_main!(benches);
