use crate::prelude::*;

#[derive(Deref, DerefMut, Into, Clone, PartialEq, Default, Debug)]
/// Array container for one scalar per cell, such as the von Mises stress
///
/// The first axis holds X, the second Y, the third Z. For a `16 x 16 x 32` grid the array shape
/// is `(16, 16, 32)`.
pub struct ScalarField(Array3<f64>);

impl ScalarField {
    /// Construct a `ScalarField` from an array. Every axis must be non-empty.
    pub fn new(arr: Array3<f64>) -> Result<Self, ShapeMismatch> {
        super::grid_from_shape(arr.shape())?;
        Ok(Self(arr))
    }

    /// all zero field on `resolution`
    pub fn zeros(resolution: &Resolution) -> Self {
        Self(Array3::zeros((resolution.nx, resolution.ny, resolution.nz)))
    }

    /// get the array that this type wraps.
    /// usually this method is not required because `ScalarField` implements [`DerefMut`](std::ops::DerefMut) and
    /// [`Deref`](std::ops::Deref)
    pub fn inner(self) -> Array3<f64> {
        self.0
    }

    /// Error out unless the field lives on `resolution`.
    pub fn check_resolution(&self, resolution: &Resolution) -> Result<(), ShapeMismatch> {
        super::check_grid(self.grid(), resolution, "scalar field")
    }
}

impl CellArray for ScalarField {
    fn components(&self) -> usize {
        1
    }

    fn grid(&self) -> Resolution {
        let (nx, ny, nz) = self.dim();
        Resolution { nx, ny, nz }
    }

    fn flat_values(&self) -> Vec<f64> {
        self.grid()
            .cells()
            .map(|(x, y, z)| self.0[[x, y, z]])
            .collect()
    }
}

#[test]
fn iter_order() {
    let nx = 3;
    let ny = 2;
    let nz = 4;

    let arr = ndarray::Array1::range(0., (nx * ny * nz) as f64, 1.)
        .into_shape((nx, ny, nz))
        .unwrap();
    let mut expected = Vec::new();

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                expected.push(*arr.get((i, j, k)).unwrap());
            }
        }
    }

    let actual = ScalarField::new(arr).unwrap().flat_values();

    assert_eq!(expected, actual)
}

#[test]
fn empty_axis_is_rejected() {
    assert!(ScalarField::new(Array3::zeros((2, 0, 2))).is_err());
}
