//! # Reconstructing the deformed grid
//!
//! A spectral solver only stores per-cell deformation gradients; positions are never written.
//! The routines here rebuild geometry from a deformation gradient field `F` and its average
//! `F̄`:
//!
//! 1. [`deformed`] integrates `F` from cell to cell to get deformed cell centroids,
//!    [`deformed_fft`] does the same in Fourier space, which respects periodicity exactly.
//! 2. [`mesh`] turns centroids into a conforming hexahedral node lattice of
//!    `(nx + 1) x (ny + 1) x (nz + 1)` points. Nodes inside the domain are the mean of the 8
//!    surrounding centroids; on the boundary the missing centroids are supplied by a
//!    [`Boundary`] policy.
//! 3. [`inverse_reconstruction`] goes back from a pair of meshes to a deformation gradient per
//!    cell.
//!
//! Both reconstructions fix the free rigid translation by requiring the mean centroid to equal
//! `F̄ · (dimension / 2)`, the image of the mean undeformed centroid.

mod direct;
mod fourier;
mod inverse;
mod nodes;

pub use direct::deformed;
pub use fourier::deformed_fft;
pub use inverse::inverse_reconstruction;
pub use nodes::mesh;

use crate::prelude::*;

/// How the centroids missing beyond the faces of the domain are made up when building nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Boundary {
    /// The periodic image of the opposite face, shifted by `F̄` applied to the box edge.
    #[default]
    Periodic,
    /// Linear extrapolation from the two outermost centroids (a single `F̄` step when an axis
    /// only has one cell).
    Linear,
    /// One `F̄` step beyond the outermost centroid, so boundary nodes sit half an average cell
    /// width outside it.
    Affine,
}

/// Error out unless `defgrad` is defined on `resolution`.
fn check_defgrad(defgrad: &TensorField, resolution: &Resolution) -> Result<(), ShapeMismatch> {
    defgrad.check_resolution(resolution)
}

/// `F̄ · (dimension / 2)`, where the mean centroid of a reconstruction has to end up
fn mean_target(average: &Matrix3<f64>, dimension: &Dimension) -> Vector3<f64> {
    average * (dimension.as_vector() * 0.5)
}
