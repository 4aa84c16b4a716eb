use crate::prelude::*;

/// One named array of cell values as it appears in a vtk file.
///
/// `values` are stored x fastest with the components of a cell innermost, the order every
/// [`CellArray`] produces.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct DataArray {
    pub name: String,
    pub components: usize,
    pub values: Vec<f64>,
}

impl DataArray {
    /// Flatten a grid field into a named array.
    pub fn from_field<A: CellArray>(name: impl Into<String>, field: &A) -> Self {
        Self {
            name: name.into(),
            components: field.components(),
            values: field.flat_values(),
        }
    }

    /// number of cells (tuples) the array covers
    pub fn n_tuples(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.values.len() / self.components
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
/// Container type to read and write `.vtr` files from.
///
/// `VtkData` holds the undeformed grid in `domain` and any number of cell attached arrays in
/// `cell_data`.
pub struct VtkData<DOMAIN> {
    pub domain: DOMAIN,
    pub cell_data: Vec<DataArray>,
}

impl<DOMAIN> VtkData<DOMAIN> {
    /// Construct a `vtk` container with no arrays yet
    pub fn new(domain: DOMAIN) -> VtkData<DOMAIN> {
        VtkData {
            domain,
            cell_data: Vec::new(),
        }
    }

    /// add another cell array
    pub fn with_array(mut self, array: DataArray) -> Self {
        self.cell_data.push(array);
        self
    }

    /// look up a cell array by name
    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.cell_data.iter().find(|array| array.name == name)
    }
}
