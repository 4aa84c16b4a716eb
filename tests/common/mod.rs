#![allow(dead_code)]

use spectral_post::na::Matrix3;
use spectral_post::{Dimension, Header, Resolution};

use std::path::PathBuf;

/// element offset of the deformation gradient in the synthetic records
pub const DEFGRAD_OFFSET: usize = 7;
/// element offset of the first Piola-Kirchhoff stress in the synthetic records
pub const STRESS_OFFSET: usize = 16;
pub const RECORD_SIZE: usize = 25;

pub fn header(resolution: Resolution, dimension: Dimension, increments: usize) -> Header {
    Header::new(
        "shear",
        "/scratch/run",
        "dipl32.geom",
        increments,
        RECORD_SIZE,
        resolution,
        dimension,
    )
}

/// A complete result stream: `header`, then blocks `0..=increments`, every record holding the
/// cell index at element 0, the deformation gradient `defgrad(increment, cell)` at
/// [`DEFGRAD_OFFSET`] and `stress(increment, cell)` at [`STRESS_OFFSET`].
pub fn result_stream<F, P>(header: &Header, defgrad: F, stress: P) -> Vec<u8>
where
    F: Fn(usize, (usize, usize, usize)) -> Matrix3<f64>,
    P: Fn(usize, (usize, usize, usize)) -> Matrix3<f64>,
{
    let mut bytes = header.encode();
    assert_eq!(bytes.len() as u64, header.data_offset);

    let marker = ((RECORD_SIZE * header.n_cells() * 4) as i32).to_ne_bytes();

    for increment in 0..=header.increments {
        bytes.extend_from_slice(&marker);

        for cell in header.resolution.cells() {
            let mut record = vec![0f32; RECORD_SIZE];
            record[0] = header.resolution.cell_index(cell.0, cell.1, cell.2) as f32;

            let f = defgrad(increment, cell);
            let p = stress(increment, cell);
            for i in 0..3 {
                for j in 0..3 {
                    record[DEFGRAD_OFFSET + 3 * i + j] = f[(i, j)] as f32;
                    record[STRESS_OFFSET + 3 * i + j] = p[(i, j)] as f32;
                }
            }

            for value in record {
                bytes.extend_from_slice(&value.to_ne_bytes());
            }
        }

        bytes.extend_from_slice(&marker);
    }

    bytes
}

/// Deformation gradient `I + increment * shear`, the same in every cell.
pub fn uniform_stream(header: &Header, shear: Matrix3<f64>) -> Vec<u8> {
    result_stream(
        header,
        |increment, _| Matrix3::identity() + shear * increment as f64,
        |_, _| Matrix3::from_diagonal_element(2.0),
    )
}

/// A fresh, empty directory below the system temp directory.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "spectral-post-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
