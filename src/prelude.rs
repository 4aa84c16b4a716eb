//! Common traits and types that are useful for working with `spectral_post`
#![allow(unused_imports)]

pub use crate::array::{ScalarField, TensorField, VectorField};
pub use crate::config::PostConfig;
pub use crate::data::{DataArray, VtkData};
pub use crate::grid::{Dimension, Resolution};
pub use crate::header::Header;
pub use crate::mesh::{Mesh, Mesh3D, Rectilinear3D, Spans3D};
pub use crate::reader::ResultFile;
pub use crate::reconstruct::Boundary;
pub use crate::traits::CellArray;
pub use crate::write_vtk::Encoding;

pub(crate) use crate::{DegenerateDeformation, Error, ShapeMismatch};
pub(crate) use crate::{parse, utils};

pub(crate) use std::io::{BufRead, Read, Seek, SeekFrom, Write};

pub(crate) use derive_more::{Constructor, Deref, DerefMut, Display, From, Into};
pub(crate) use serde::{Deserialize, Serialize};

pub(crate) use na::{Matrix3, Vector3};
pub(crate) use ndarray::{Array3, Array4, Array5};
