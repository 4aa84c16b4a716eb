//! reading vtk files back
//!
//! [`read_legacy`] understands the legacy ASCII unstructured grids written by
//! [`write_vtk`](crate::write_vtk) (points, cells, cell types and one optional scalar array each
//! for cells and points). [`read_vtr`] reads XML rectilinear grids with inline ascii or base64
//! arrays.

pub(crate) mod error;
mod event_summary;
mod legacy;
mod rectilinear;

pub use error::ParseError;
pub use legacy::{read_legacy, LegacyGrid, NamedScalars};
pub use rectilinear::read_vtr;

use crate::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// read a legacy `.vtk` file from disk
pub fn read_legacy_file(path: impl AsRef<Path>) -> Result<LegacyGrid, Error> {
    let file = File::open(path)?;
    read_legacy(BufReader::new(file))
}

/// read a `.vtr` file from disk
pub fn read_vtr_file(path: impl AsRef<Path>) -> Result<VtkData<Rectilinear3D>, Error> {
    let file = File::open(path)?;
    read_vtr(BufReader::new(file))
}
