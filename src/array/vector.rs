use crate::prelude::*;

#[derive(Deref, DerefMut, Into, Clone, PartialEq, Default, Debug)]
/// Array container for a 3 component vector per cell, such as cell centroid coordinates.
///
/// The array shape is `(nx, ny, nz, 3)`.
pub struct VectorField(Array4<f64>);

impl VectorField {
    /// Construct a `VectorField` from an array of shape `(nx, ny, nz, 3)`
    pub fn new(arr: Array4<f64>) -> Result<Self, ShapeMismatch> {
        super::grid_from_shape(arr.shape())?;
        if arr.dim().3 != 3 {
            return Err(ShapeMismatch::new(
                "3 components per cell".into(),
                format!("{} components per cell", arr.dim().3),
            ));
        }
        Ok(Self(arr))
    }

    /// all zero field on `resolution`
    pub fn zeros(resolution: &Resolution) -> Self {
        Self(Array4::zeros((resolution.nx, resolution.ny, resolution.nz, 3)))
    }

    /// get the array that this type wraps.
    pub fn inner(self) -> Array4<f64> {
        self.0
    }

    pub fn vector(&self, x: usize, y: usize, z: usize) -> Vector3<f64> {
        Vector3::new(
            self.0[[x, y, z, 0]],
            self.0[[x, y, z, 1]],
            self.0[[x, y, z, 2]],
        )
    }

    pub fn set_vector(&mut self, x: usize, y: usize, z: usize, value: &Vector3<f64>) {
        for a in 0..3 {
            self.0[[x, y, z, a]] = value[a];
        }
    }

    /// arithmetic mean over all cells
    pub fn mean(&self) -> Vector3<f64> {
        let grid = self.grid();
        let sum = grid
            .cells()
            .fold(Vector3::zeros(), |acc, (x, y, z)| acc + self.vector(x, y, z));
        sum / grid.n_cells() as f64
    }

    /// Error out unless the field lives on `resolution`.
    pub fn check_resolution(&self, resolution: &Resolution) -> Result<(), ShapeMismatch> {
        super::check_grid(self.grid(), resolution, "vector field")
    }
}

impl CellArray for VectorField {
    fn components(&self) -> usize {
        3
    }

    fn grid(&self) -> Resolution {
        let (nx, ny, nz, _) = self.dim();
        Resolution { nx, ny, nz }
    }

    fn flat_values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.len());
        for (x, y, z) in self.grid().cells() {
            for a in 0..3 {
                values.push(self.0[[x, y, z, a]]);
            }
        }
        values
    }
}

#[test]
fn mean_of_shifted_field() {
    let res = Resolution::new(2, 2, 1).unwrap();
    let mut field = VectorField::zeros(&res);

    for (x, y, z) in res.cells() {
        field.set_vector(x, y, z, &Vector3::new(x as f64, y as f64, 1.0));
    }

    assert_eq!(field.mean(), Vector3::new(0.5, 0.5, 1.0));
}

#[test]
fn wrong_component_count_is_rejected() {
    assert!(VectorField::new(Array4::zeros((2, 2, 2, 2))).is_err());
}
