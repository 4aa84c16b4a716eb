use crate::prelude::*;

/// Deformation gradient per cell from a reference and a current mesh of the same grid.
///
/// For every cell the 8 corner positions are centered on their mean and `F` is the least squares
/// fit of `dx = F dX` over the corners, `F = (Σ dx ⊗ dX)(Σ dX ⊗ dX)⁻¹`. For a trilinear cell
/// this is its affine part; for meshes built by [`mesh`](super::mesh) from an affine field it
/// recovers that field exactly.
///
/// A flat or inverted reference cell makes the fit singular and is reported as
/// [`DegenerateDeformation`] carrying the determinant of `Σ dX ⊗ dX`.
pub fn inverse_reconstruction(
    resolution: &Resolution,
    reference: &Mesh,
    current: &Mesh,
) -> Result<TensorField, Error> {
    reference.check_resolution(resolution)?;
    current.check_resolution(resolution)?;

    let mut defgrad = TensorField::zeros(resolution);

    for (x, y, z) in resolution.cells() {
        let dx = centered(current.cell_corners(x, y, z));
        let d_x0 = centered(reference.cell_corners(x, y, z));

        let mut moment = Matrix3::zeros();
        let mut gram = Matrix3::zeros();
        for (a, b) in dx.iter().zip(d_x0.iter()) {
            moment += a * b.transpose();
            gram += b * b.transpose();
        }

        let jacobian = gram.determinant();
        let inverse = match gram.try_inverse() {
            Some(inverse) if jacobian > 0.0 => inverse,
            _ => return Err(DegenerateDeformation::new([x, y, z], jacobian).into()),
        };

        defgrad.set_tensor(x, y, z, &(moment * inverse));
    }

    Ok(defgrad)
}

fn centered(corners: [Vector3<f64>; 8]) -> [Vector3<f64>; 8] {
    let mean = corners.iter().fold(Vector3::zeros(), |acc, c| acc + c) / 8.0;
    corners.map(|c| c - mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::reference_nodes;
    use crate::reconstruct::{deformed, mesh};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn identity_meshes_give_identity() {
        let res = Resolution::new(2, 3, 2).unwrap();
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let reference = reference_nodes(&res, &dim);

        let f = inverse_reconstruction(&res, &reference, &reference).unwrap();

        for (x, y, z) in res.cells() {
            assert_relative_eq!(f.tensor(x, y, z), Matrix3::identity(), epsilon = 1e-12);
        }
    }

    #[test]
    fn affine_round_trip() {
        let res = Resolution::new(3, 3, 3).unwrap();
        let dim = Dimension::new(1.0, 2.0, 1.0);
        let f = Matrix3::new(1.1, 0.2, -0.1, 0.0, 0.95, 0.3, 0.1, 0.0, 1.05);
        let field = TensorField::uniform(&res, &f);

        let centroids = deformed(&res, &dim, &field, &f).unwrap();
        let current = mesh(&res, &dim, &f, &centroids, Boundary::Periodic).unwrap();
        let reference = reference_nodes(&res, &dim);

        let recovered = inverse_reconstruction(&res, &reference, &current).unwrap();
        for (x, y, z) in res.cells() {
            assert_relative_eq!(recovered.tensor(x, y, z), f, epsilon = 1e-10);
        }
    }

    #[test]
    fn smooth_field_round_trip() {
        let res = Resolution::new(4, 4, 16).unwrap();
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let h = dim.cell_size(&res);
        let amplitude = 0.1;

        let mut field = TensorField::uniform(&res, &Matrix3::identity());
        for (x, y, z) in res.cells() {
            let z0 = (z as f64 + 0.5) * h[2];
            field[[x, y, z, 0, 2]] = amplitude * (2.0 * PI * z0).sin();
        }
        let average = crate::reduce::average(&field);

        let centroids = deformed(&res, &dim, &field, &average).unwrap();
        let current = mesh(&res, &dim, &average, &centroids, Boundary::Periodic).unwrap();
        let reference = reference_nodes(&res, &dim);

        let recovered = inverse_reconstruction(&res, &reference, &current).unwrap();
        for (x, y, z) in res.cells() {
            assert_relative_eq!(recovered.tensor(x, y, z), field.tensor(x, y, z), epsilon = 1e-2);
        }
    }

    #[test]
    fn flat_reference_cell_is_degenerate() {
        let res = Resolution::new(1, 1, 1).unwrap();
        let flat = Dimension::new(1.0, 1.0, 0.0);
        let reference = reference_nodes(&res, &flat);

        let err = inverse_reconstruction(&res, &reference, &reference).unwrap_err();
        assert!(matches!(err, Error::DegenerateDeformation(_)));
    }

    #[test]
    fn mismatched_meshes_are_rejected() {
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let a = Resolution::new(2, 2, 2).unwrap();
        let b = Resolution::new(2, 2, 1).unwrap();

        let err = inverse_reconstruction(&a, &reference_nodes(&a, &dim), &reference_nodes(&b, &dim))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }
}
