use crate::prelude::*;

#[derive(Deref, DerefMut, Into, Clone, PartialEq, Default, Debug)]
/// Array container for a second order tensor per cell, such as the deformation gradient or a
/// stress measure.
///
/// The array shape is `(nx, ny, nz, 3, 3)`; the last two axes are row and column of the tensor,
/// in the order the solver writes them.
pub struct TensorField(Array5<f64>);

impl TensorField {
    /// Construct a `TensorField` from an array of shape `(nx, ny, nz, 3, 3)`
    pub fn new(arr: Array5<f64>) -> Result<Self, ShapeMismatch> {
        super::grid_from_shape(arr.shape())?;
        let (_, _, _, rows, cols) = arr.dim();
        if (rows, cols) != (3, 3) {
            return Err(ShapeMismatch::new(
                "3 x 3 tensor per cell".into(),
                format!("{rows} x {cols} tensor per cell"),
            ));
        }
        Ok(Self(arr))
    }

    /// all zero field on `resolution`
    pub fn zeros(resolution: &Resolution) -> Self {
        Self(Array5::zeros((
            resolution.nx,
            resolution.ny,
            resolution.nz,
            3,
            3,
        )))
    }

    /// the same tensor in every cell
    pub fn uniform(resolution: &Resolution, tensor: &Matrix3<f64>) -> Self {
        let mut field = Self::zeros(resolution);
        for (x, y, z) in resolution.cells() {
            field.set_tensor(x, y, z, tensor);
        }
        field
    }

    /// get the array that this type wraps.
    pub fn inner(self) -> Array5<f64> {
        self.0
    }

    pub fn tensor(&self, x: usize, y: usize, z: usize) -> Matrix3<f64> {
        Matrix3::from_fn(|i, j| self.0[[x, y, z, i, j]])
    }

    pub fn set_tensor(&mut self, x: usize, y: usize, z: usize, value: &Matrix3<f64>) {
        for i in 0..3 {
            for j in 0..3 {
                self.0[[x, y, z, i, j]] = value[(i, j)];
            }
        }
    }

    /// one component `(i, j)` of every tensor as a scalar field
    pub fn component(&self, i: usize, j: usize) -> ScalarField {
        let grid = self.grid();
        let mut field = ScalarField::zeros(&grid);
        for (x, y, z) in grid.cells() {
            field[[x, y, z]] = self.0[[x, y, z, i, j]];
        }
        field
    }

    /// Apply a fallible per-cell map, stopping at the first error. The closure also
    /// receives the cell index.
    pub fn try_map<F, E>(&self, mut f: F) -> Result<TensorField, E>
    where
        F: FnMut([usize; 3], &Matrix3<f64>) -> Result<Matrix3<f64>, E>,
    {
        let grid = self.grid();
        let mut out = TensorField::zeros(&grid);
        for (x, y, z) in grid.cells() {
            let value = f([x, y, z], &self.tensor(x, y, z))?;
            out.set_tensor(x, y, z, &value);
        }
        Ok(out)
    }

    /// Error out unless the field lives on `resolution`.
    pub fn check_resolution(&self, resolution: &Resolution) -> Result<(), ShapeMismatch> {
        super::check_grid(self.grid(), resolution, "tensor field")
    }
}

impl CellArray for TensorField {
    fn components(&self) -> usize {
        9
    }

    fn grid(&self) -> Resolution {
        let (nx, ny, nz, _, _) = self.dim();
        Resolution { nx, ny, nz }
    }

    fn flat_values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.len());
        for (x, y, z) in self.grid().cells() {
            for i in 0..3 {
                for j in 0..3 {
                    values.push(self.0[[x, y, z, i, j]]);
                }
            }
        }
        values
    }
}

#[test]
fn tensor_roundtrip_through_cells() {
    let res = Resolution::new(2, 1, 1).unwrap();
    let mut field = TensorField::zeros(&res);
    let t = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);

    field.set_tensor(1, 0, 0, &t);

    assert_eq!(field.tensor(1, 0, 0), t);
    assert_eq!(field.tensor(0, 0, 0), Matrix3::zeros());
    assert_eq!(field.component(0, 1)[[1, 0, 0]], 2.0);
    assert_eq!(&field.flat_values()[9..], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
}
