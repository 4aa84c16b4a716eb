use crate::prelude::*;
use ndarray::Axis;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Deformed cell centroids computed in Fourier space.
///
/// The position of a cell is split into the affine part `average · X` and a periodic fluctuation
/// `ũ` with `∇ũ = F - average`. Taking the divergence gives a Poisson problem per component,
/// which is diagonal in Fourier space:
///
/// ```text
/// û_i(k) = -i k_j F̂_ij(k) / |k|²        (k ≠ 0)
/// ```
///
/// The zero mode of `ũ` is dropped, so the mean centroid is exactly `average · dimension / 2`.
/// `scaling` multiplies the fluctuation (1.0 for the true geometry, larger values exaggerate it).
/// Nyquist frequencies of even resolutions carry no derivative information and are treated as
/// zero wave numbers.
pub fn deformed_fft(
    resolution: &Resolution,
    dimension: &Dimension,
    defgrad: &TensorField,
    average: &Matrix3<f64>,
    scaling: f64,
) -> Result<VectorField, Error> {
    super::check_defgrad(defgrad, resolution)?;

    let shape = (resolution.nx, resolution.ny, resolution.nz);
    let mut planner = FftPlanner::new();

    // F̂_ij for every component
    let mut transformed = Vec::with_capacity(9);
    for i in 0..3 {
        for j in 0..3 {
            let mut component = Array3::from_shape_fn(shape, |(x, y, z)| {
                Complex::new(defgrad[[x, y, z, i, j]], 0.0)
            });
            fft3(&mut component, &mut planner, false);
            transformed.push(component);
        }
    }

    let wave_numbers: Vec<Vec<f64>> = (0..3)
        .map(|axis| {
            let n = resolution.as_array()[axis];
            (0..n)
                .map(|m| wave_number(m, n, dimension.0[axis]))
                .collect()
        })
        .collect();

    let mut centroids = crate::grid::reference_centroids(resolution, dimension);
    for (x, y, z) in resolution.cells() {
        let moved = average * centroids.vector(x, y, z);
        centroids.set_vector(x, y, z, &moved);
    }

    let n_cells = resolution.n_cells() as f64;

    for i in 0..3 {
        let mut displacement = Array3::from_shape_fn(shape, |(x, y, z)| {
            let k = [wave_numbers[0][x], wave_numbers[1][y], wave_numbers[2][z]];
            let k_squared: f64 = k.iter().map(|k| k * k).sum();

            if k_squared == 0.0 {
                return Complex::new(0.0, 0.0);
            }

            (0..3).fold(Complex::new(0.0, 0.0), |acc, j| {
                // -i k_j / |k|²
                let factor = Complex::new(0.0, -k[j] / k_squared);
                acc + factor * transformed[3 * i + j][[x, y, z]]
            })
        });

        fft3(&mut displacement, &mut planner, true);

        for (x, y, z) in resolution.cells() {
            centroids[[x, y, z, i]] += scaling * displacement[[x, y, z]].re / n_cells;
        }
    }

    Ok(centroids)
}

/// `2π m / L` for the signed frequency belonging to index `m` of an `n` point transform
fn wave_number(m: usize, n: usize, length: f64) -> f64 {
    let frequency = if 2 * m < n {
        m as f64
    } else if 2 * m == n {
        // Nyquist
        0.0
    } else {
        m as f64 - n as f64
    };

    2.0 * std::f64::consts::PI * frequency / length
}

/// Unnormalized 3D transform, one axis at a time.
fn fft3(data: &mut Array3<Complex<f64>>, planner: &mut FftPlanner<f64>, inverse: bool) {
    for axis in 0..3 {
        let n = data.len_of(Axis(axis));
        if n == 1 {
            continue;
        }

        let fft = if inverse {
            planner.plan_fft_inverse(n)
        } else {
            planner.plan_fft_forward(n)
        };

        let mut buffer = vec![Complex::new(0.0, 0.0); n];

        for mut lane in data.lanes_mut(Axis(axis)) {
            for (b, value) in buffer.iter_mut().zip(lane.iter()) {
                *b = *value;
            }

            fft.process(&mut buffer);

            for (value, b) in lane.iter_mut().zip(buffer.iter()) {
                *value = *b;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::reference_centroids;
    use crate::reconstruct::deformed;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    /// `F = I + a sin(2π z / L) e_x ⊗ e_z`, a compatible periodic simple shear
    fn sine_shear(resolution: &Resolution, dimension: &Dimension, amplitude: f64) -> TensorField {
        let h = dimension.cell_size(resolution);
        let mut field = TensorField::uniform(resolution, &Matrix3::identity());
        for (x, y, z) in resolution.cells() {
            let z0 = (z as f64 + 0.5) * h[2];
            field[[x, y, z, 0, 2]] = amplitude * (2.0 * PI * z0 / dimension.0[2]).sin();
        }
        field
    }

    #[test]
    fn wave_numbers_are_signed() {
        assert_eq!(wave_number(0, 4, 1.0), 0.0);
        assert_relative_eq!(wave_number(1, 4, 1.0), 2.0 * PI);
        assert_eq!(wave_number(2, 4, 1.0), 0.0);
        assert_relative_eq!(wave_number(3, 4, 1.0), -2.0 * PI);
        assert_relative_eq!(wave_number(2, 5, 2.0), 2.0 * PI);
        assert_relative_eq!(wave_number(3, 5, 2.0), -2.0 * PI);
    }

    #[test]
    fn affine_field_has_no_fluctuation() {
        let res = Resolution::new(4, 4, 4).unwrap();
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let f = Matrix3::new(1.0, 0.3, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.8);
        let field = TensorField::uniform(&res, &f);

        let centroids = deformed_fft(&res, &dim, &field, &f, 1.0).unwrap();
        let reference = reference_centroids(&res, &dim);

        for (x, y, z) in res.cells() {
            assert_relative_eq!(
                centroids.vector(x, y, z),
                f * reference.vector(x, y, z),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn sine_shear_matches_analytic_displacement() {
        let res = Resolution::new(2, 2, 16).unwrap();
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let a = 0.1;
        let field = sine_shear(&res, &dim, a);

        let centroids = deformed_fft(&res, &dim, &field, &Matrix3::identity(), 1.0).unwrap();
        let reference = reference_centroids(&res, &dim);

        for (x, y, z) in res.cells() {
            let z0 = reference[[x, y, z, 2]];
            let expected = reference[[x, y, z, 0]] - a / (2.0 * PI) * (2.0 * PI * z0).cos();
            assert_relative_eq!(centroids[[x, y, z, 0]], expected, epsilon = 1e-10);
            assert_relative_eq!(centroids[[x, y, z, 2]], z0, epsilon = 1e-12);
        }
    }

    #[test]
    fn agrees_with_direct_integration() {
        let res = Resolution::new(4, 4, 16).unwrap();
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let field = sine_shear(&res, &dim, 0.1);
        let average = crate::reduce::average(&field);

        let spectral = deformed_fft(&res, &dim, &field, &average, 1.0).unwrap();
        let direct = deformed(&res, &dim, &field, &average).unwrap();

        for (a, b) in spectral.iter().zip(direct.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-3);
        }
    }

    #[test]
    fn scaling_exaggerates_fluctuation() {
        let res = Resolution::new(1, 1, 8).unwrap();
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let field = sine_shear(&res, &dim, 0.05);
        let identity = Matrix3::identity();

        let reference = reference_centroids(&res, &dim);
        let once = deformed_fft(&res, &dim, &field, &identity, 1.0).unwrap();
        let twice = deformed_fft(&res, &dim, &field, &identity, 2.0).unwrap();

        for z in 0..8 {
            let u1 = once[[0, 0, z, 0]] - reference[[0, 0, z, 0]];
            let u2 = twice[[0, 0, z, 0]] - reference[[0, 0, z, 0]];
            assert_relative_eq!(u2, 2.0 * u1, epsilon = 1e-12);
        }
    }
}
