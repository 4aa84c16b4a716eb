//! # Traits
//!
//! [`CellArray`] is the bridge between the grid fields of [`crate::array`] and everything that
//! serializes them. Whatever the in-memory layout of a field is, a writer only ever sees the
//! values through [`CellArray::flat_values`], which walks the grid x fastest with the components
//! of a single cell innermost. That is the order the result file stores cells in and the order
//! VTK expects cell / point data in.

use crate::grid::Resolution;

pub trait CellArray {
    /// number of values attached to every cell (1 for scalars, 3 for vectors, 9 for tensors)
    fn components(&self) -> usize;

    /// grid the field is defined on
    fn grid(&self) -> Resolution;

    /// all values, x fastest, components innermost
    fn flat_values(&self) -> Vec<f64>;

    /// total number of values, `cells * components`
    fn length(&self) -> usize {
        self.grid().n_cells() * self.components()
    }
}
