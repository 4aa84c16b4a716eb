//! container types for the per-cell fields read from a result file
//!
//! All three containers wrap an `ndarray` array whose leading three axes are `(x, y, z)` and
//! dereference to it, so the whole `ndarray` API is available. The trailing axes hold the
//! components of one cell: none for [`ScalarField`], `3` for [`VectorField`] and `3 x 3` for
//! [`TensorField`].

mod scalar;
mod tensor;
mod vector;

pub use scalar::ScalarField;
pub use tensor::TensorField;
pub use vector::VectorField;

use crate::grid::Resolution;
use crate::ShapeMismatch;

/// Build the grid a field is defined on from the leading axes of its shape.
pub(crate) fn grid_from_shape(shape: &[usize]) -> Result<Resolution, ShapeMismatch> {
    match shape {
        [nx, ny, nz, ..] => Resolution::new(*nx, *ny, *nz),
        _ => Err(ShapeMismatch::new(
            "at least three axes".into(),
            format!("{shape:?}"),
        )),
    }
}

/// Error out unless `field` lives on `resolution`.
pub(crate) fn check_grid(
    field: Resolution,
    resolution: &Resolution,
    what: &str,
) -> Result<(), ShapeMismatch> {
    if field != *resolution {
        return Err(ShapeMismatch::new(
            format!("{what} on a {resolution} grid"),
            format!("{what} on a {field} grid"),
        ));
    }
    Ok(())
}
