//! # Mesh Information
//!
//! Two kinds of geometry come out of this crate:
//!
//! * [`Mesh`]: the node lattice of a (possibly deformed) grid, `(nx + 1) x (ny + 1) x (nz + 1)`
//!   points connected by one linear hexahedron per cell. This is what the reconstruction
//!   produces and what the legacy writer emits as an unstructured grid.
//! * [`Rectilinear3D`]: an undeformed, axis aligned grid described by three coordinate lists
//!   ([`Mesh3D`]) plus its extent ([`Spans3D`]). This is what the XML rectilinear writer
//!   emits.
//!
//! ## Node ordering
//!
//! Nodes are numbered x fastest: node `(i, j, k)` has index `i + (nx + 1) (j + (ny + 1) k)`.
//! The hexahedron of cell `(x, y, z)` lists its corners in the VTK order: the bottom face
//! `(x, y), (x+1, y), (x+1, y+1), (x, y+1)` at `z`, then the same face at `z + 1`.

mod hexahedral;
mod rectilinear;

pub use hexahedral::{Mesh, HEX_CORNERS};
pub use rectilinear::{Mesh3D, Rectilinear3D, Spans3D};
