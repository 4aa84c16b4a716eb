//! averages of tensor fields

use crate::prelude::*;

/// Arithmetic mean of a tensor field over all cells.
///
/// Every cell counts the same, which is exact for the uniform grids the spectral solver works on.
/// Use [`average_weighted`] if cells need different weights.
pub fn average(field: &TensorField) -> Matrix3<f64> {
    let grid = field.grid();
    let sum = grid
        .cells()
        .fold(Matrix3::zeros(), |acc, (x, y, z)| acc + field.tensor(x, y, z));

    sum / grid.n_cells() as f64
}

/// Weighted mean `sum(w * T) / sum(w)` of a tensor field.
pub fn average_weighted(field: &TensorField, weights: &ScalarField) -> Result<Matrix3<f64>, Error> {
    let grid = field.grid();
    weights.check_resolution(&grid)?;

    let (sum, total) = grid.cells().fold(
        (Matrix3::zeros(), 0.0),
        |(sum, total), (x, y, z)| {
            let w = weights[[x, y, z]];
            (sum + field.tensor(x, y, z) * w, total + w)
        },
    );

    if total == 0.0 {
        return Err(ShapeMismatch::new(
            "weights with a non-zero sum".into(),
            "weights summing to zero".into(),
        )
        .into());
    }

    Ok(sum / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn field(resolution: &Resolution) -> TensorField {
        let mut field = TensorField::zeros(resolution);
        for (x, y, z) in resolution.cells() {
            let n = resolution.cell_index(x, y, z) as f64;
            let t = Matrix3::new(1.0 + n, 0.1 * n, 0.0, 0.0, 1.0, -n, 0.5, 0.0, 2.0 * n);
            field.set_tensor(x, y, z, &t);
        }
        field
    }

    #[test]
    fn identity_averages_to_identity() {
        let res = Resolution::new(4, 4, 4).unwrap();
        let field = TensorField::uniform(&res, &Matrix3::identity());
        assert_eq!(average(&field), Matrix3::identity());
    }

    #[test]
    fn average_is_independent_of_cell_order() {
        let res = Resolution::new(3, 4, 5).unwrap();
        let original = field(&res);

        // reverse the cells along every axis
        let mut reversed = TensorField::zeros(&res);
        for (x, y, z) in res.cells() {
            let t = original.tensor(res.nx - 1 - x, res.ny - 1 - y, res.nz - 1 - z);
            reversed.set_tensor(x, y, z, &t);
        }

        assert_relative_eq!(average(&original), average(&reversed), epsilon = 1e-12);
    }

    #[test]
    fn average_of_linear_field() {
        let res = Resolution::new(2, 2, 1).unwrap();
        // cells 0..4, mean index 1.5
        let expected = Matrix3::new(2.5, 0.15, 0.0, 0.0, 1.0, -1.5, 0.5, 0.0, 3.0);
        assert_relative_eq!(average(&field(&res)), expected, epsilon = 1e-12);
    }

    #[test]
    fn uniform_weights_match_plain_average() {
        let res = Resolution::new(3, 2, 2).unwrap();
        let mut weights = ScalarField::zeros(&res);
        weights.fill(2.0);

        let f = field(&res);
        assert_relative_eq!(
            average_weighted(&f, &weights).unwrap(),
            average(&f),
            epsilon = 1e-12
        );
    }

    #[test]
    fn zero_weights_are_rejected() {
        let res = Resolution::new(1, 1, 2).unwrap();
        let weights = ScalarField::zeros(&res);
        assert!(average_weighted(&field(&res), &weights).is_err());
    }
}
