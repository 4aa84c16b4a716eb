//! # spectral-post
//!
//! Post-processing for results of spectral (FFT based) crystal plasticity solvers. The solver writes
//! a `*.spectralOut` file: a small tagged header followed by one fixed-size block of per-cell
//! records for every increment. This crate
//!
//! * decodes the header ([`header`]) and reads scalar / tensor fields of any increment with
//!   positional reads ([`reader`]),
//! * averages tensor fields ([`reduce`]),
//! * reconstructs the deformed configuration of the periodic grid from a deformation gradient
//!   field, either by direct path integration or in Fourier space, and inverts that step
//!   ([`reconstruct`]),
//! * converts stress measures ([`stress`]),
//! * writes (and reads back) legacy ASCII and XML rectilinear VTK files ([`write_vtk`],
//!   [`parse`]),
//! * runs all of the above per increment, sequentially or on the rayon pool ([`post`], configured
//!   by [`config::PostConfig`]).
//!
//! ```no_run
//! use spectral_post::prelude::*;
//!
//! let mut file = ResultFile::open("dipl32_shear.spectralOut")?;
//! let defgrad = file.read_tensor(240, 7)?;
//! let average = spectral_post::reduce::average(&defgrad);
//!
//! let header = file.header();
//! let centroids = spectral_post::reconstruct::deformed(
//!     &header.resolution,
//!     &header.dimension,
//!     &defgrad,
//!     &average,
//! )?;
//! let mesh = spectral_post::reconstruct::mesh(
//!     &header.resolution,
//!     &header.dimension,
//!     &average,
//!     &centroids,
//!     Boundary::Periodic,
//! )?;
//! # Ok::<(), spectral_post::Error>(())
//! ```

pub mod array;
pub mod config;
mod data;
pub mod grid;
pub mod header;
pub mod mesh;
pub mod parse;
pub mod post;
pub mod prelude;
pub mod reader;
pub mod reconstruct;
pub mod reduce;
pub mod stress;
mod traits;
mod utils;
pub mod write_vtk;

pub use array::{ScalarField, TensorField, VectorField};
pub use config::PostConfig;
pub use data::{DataArray, VtkData};
pub use grid::{Dimension, Resolution};
pub use header::Header;
pub use mesh::{Mesh, Mesh3D, Rectilinear3D, Spans3D};
pub use reader::ResultFile;
pub use reconstruct::Boundary;
pub use traits::CellArray;

pub use parse::ParseError;
pub use write_vtk::Encoding;

pub use na;
pub use ndarray;

use derive_more::{Constructor, Display};

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse result file header: {0}")]
    HeaderParse(#[from] header::HeaderError),
    #[error("{0}")]
    DegenerateDeformation(#[from] DegenerateDeformation),
    #[error("{0}")]
    ShapeMismatch(#[from] ShapeMismatch),
    #[error("increment {increment} is not stored in the file (blocks 0..={last})")]
    IncrementOutOfRange { increment: usize, last: usize },
    #[error("Could not load configuration: `{0}`")]
    Config(#[from] ron::error::SpannedError),
    #[error("Could not serialize configuration: `{0}`")]
    ConfigWrite(#[from] ron::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Error while parsing VTK file: {0}")]
    Parse(#[from] parse::ParseError),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
}

/// A field or grid did not have the shape the consuming step expects.
#[derive(Debug, Display, Constructor, Clone, PartialEq)]
#[display(fmt = "shape mismatch: expected {expected}, got {actual}")]
pub struct ShapeMismatch {
    pub expected: String,
    pub actual: String,
}

impl std::error::Error for ShapeMismatch {}

/// A deformation gradient with a non-positive (or NaN) determinant was about to be used.
#[derive(Debug, Display, Constructor, Clone, PartialEq)]
#[display(fmt = "non-positive jacobian {jacobian} in cell {cell:?}")]
pub struct DegenerateDeformation {
    pub cell: [usize; 3],
    pub jacobian: f64,
}

impl std::error::Error for DegenerateDeformation {}
