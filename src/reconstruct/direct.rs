use crate::prelude::*;

/// all orders in which the three axes can be walked
const AXIS_ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Deformed cell centroids by integrating `defgrad` over the grid.
///
/// Starting from cell `(0, 0, 0)`, each step to a neighbouring cell along axis `a` adds
/// `½ (F_from + F_to) · h_a e_a` (trapezoidal rule). Reaching a cell takes steps along the three
/// axes in some order; for a compatible field every order gives the same result, for measured data
/// they differ slightly, so the result is the mean over all six orders. Finally the field is
/// translated so its mean equals `average · dimension / 2`.
///
/// An axis with a single cell simply has no steps along it.
pub fn deformed(
    resolution: &Resolution,
    dimension: &Dimension,
    defgrad: &TensorField,
    average: &Matrix3<f64>,
) -> Result<VectorField, Error> {
    super::check_defgrad(defgrad, resolution)?;

    let h = dimension.cell_size(resolution);
    let mut centroids = VectorField::zeros(resolution);

    for order in AXIS_ORDERS.iter() {
        let path = integrate(resolution, &h, defgrad, order);
        *centroids += &*path;
    }
    *centroids /= AXIS_ORDERS.len() as f64;

    let shift = super::mean_target(average, dimension) - centroids.mean();
    for (x, y, z) in resolution.cells() {
        let moved = centroids.vector(x, y, z) + shift;
        centroids.set_vector(x, y, z, &moved);
    }

    Ok(centroids)
}

/// Integrate along the axes in `order`: first along `order[0]` from the origin, then along
/// `order[1]`, then along `order[2]`.
fn integrate(
    resolution: &Resolution,
    h: &[f64; 3],
    defgrad: &TensorField,
    order: &[usize; 3],
) -> VectorField {
    let mut coords = VectorField::zeros(resolution);

    // the predecessor of a cell always has a smaller linear index, so file order works
    for (x, y, z) in resolution.cells() {
        let cell = [x, y, z];

        let axis = match order.iter().rev().find(|axis| cell[**axis] > 0) {
            Some(axis) => *axis,
            None => continue,
        };

        let mut from = cell;
        from[axis] -= 1;
        let [fx, fy, fz] = from;

        let slope = (defgrad.tensor(fx, fy, fz).column(axis) + defgrad.tensor(x, y, z).column(axis))
            * (0.5 * h[axis]);
        let position = coords.vector(fx, fy, fz) + slope;
        coords.set_vector(x, y, z, &position);
    }

    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::reference_centroids;
    use approx::assert_relative_eq;

    #[test]
    fn identity_reproduces_reference_centroids() {
        let res = Resolution::new(4, 3, 5).unwrap();
        let dim = Dimension::new(1.0, 2.0, 0.5);
        let f = TensorField::uniform(&res, &Matrix3::identity());

        let centroids = deformed(&res, &dim, &f, &Matrix3::identity()).unwrap();
        let reference = reference_centroids(&res, &dim);

        for (a, b) in centroids.iter().zip(reference.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn affine_field_maps_reference_centroids() {
        let res = Resolution::new(3, 4, 2).unwrap();
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let f = Matrix3::new(1.1, 0.2, 0.0, 0.0, 0.9, 0.1, 0.05, 0.0, 1.2);
        let field = TensorField::uniform(&res, &f);

        let centroids = deformed(&res, &dim, &field, &f).unwrap();
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
    fn single_cell_axes() {
        let res = Resolution::new(1, 1, 1).unwrap();
        let dim = Dimension::new(2.0, 2.0, 2.0);
        let f = Matrix3::identity() * 2.0;
        let field = TensorField::uniform(&res, &f);

        let centroids = deformed(&res, &dim, &field, &f).unwrap();
        assert_relative_eq!(centroids.vector(0, 0, 0), Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let res = Resolution::new(2, 2, 2).unwrap();
        let other = Resolution::new(2, 2, 3).unwrap();
        let field = TensorField::uniform(&other, &Matrix3::identity());

        let err = deformed(&res, &Dimension::new(1.0, 1.0, 1.0), &field, &Matrix3::identity())
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }
}
