//! # Grid description
//!
//! A spectral result lives on a structured, periodic grid of `nx * ny * nz` cells spanning a box
//! of physical size `dimension`. Every field in this crate is indexed `(x, y, z, ..)` and every
//! traversal that touches a file or a serialized output walks the cells with **x innermost, then
//! y, then z**. [`Resolution::cells`] and [`Resolution::nodes`] are the only places that ordering
//! is spelled out; use them instead of writing the loops by hand.

use crate::prelude::*;

/// Number of cells along each axis of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl Resolution {
    /// Create a resolution. Every axis needs at least one cell.
    pub fn new(nx: usize, ny: usize, nz: usize) -> Result<Self, ShapeMismatch> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(ShapeMismatch::new(
                "resolution with at least one cell per axis".into(),
                format!("{nx} x {ny} x {nz}"),
            ));
        }

        Ok(Self { nx, ny, nz })
    }

    pub fn as_array(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    /// `nx * ny * nz`
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// `(nx + 1) * (ny + 1) * (nz + 1)`
    pub fn n_nodes(&self) -> usize {
        (self.nx + 1) * (self.ny + 1) * (self.nz + 1)
    }

    /// shape of a node lattice: one more point than cells along each axis
    pub fn node_shape(&self) -> (usize, usize, usize) {
        (self.nx + 1, self.ny + 1, self.nz + 1)
    }

    /// Linear (file order) index of a cell
    pub fn cell_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.nx * (y + self.ny * z)
    }

    /// Linear index of a node in the `(n + 1)` lattice, x innermost
    pub fn node_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + (self.nx + 1) * (j + (self.ny + 1) * k)
    }

    /// Iterate over cell indices in file order (x fastest).
    pub fn cells(&self) -> LatticeIter {
        LatticeIter::new([self.nx, self.ny, self.nz])
    }

    /// Iterate over node indices (x fastest).
    pub fn nodes(&self) -> LatticeIter {
        LatticeIter::new([self.nx + 1, self.ny + 1, self.nz + 1])
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.nx, self.ny, self.nz)
    }
}

/// Walks a 3D index space with the first axis innermost.
#[derive(Debug, Clone)]
pub struct LatticeIter {
    shape: [usize; 3],
    x: usize,
    y: usize,
    z: usize,
}

impl LatticeIter {
    fn new(shape: [usize; 3]) -> Self {
        // an empty axis means an empty iteration
        let z = if shape.iter().any(|n| *n == 0) {
            shape[2]
        } else {
            0
        };

        Self {
            shape,
            x: 0,
            y: 0,
            z,
        }
    }
}

impl Iterator for LatticeIter {
    type Item = (usize, usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let [nx, ny, nz] = self.shape;

        if self.z >= nz {
            return None;
        }

        let value = (self.x, self.y, self.z);

        self.x += 1;

        if self.x == nx {
            self.x = 0;
            self.y += 1;
        }

        if self.y == ny {
            self.y = 0;
            self.z += 1;
        }

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let [nx, ny, _] = self.shape;
        let total: usize = self.shape.iter().product();
        let done = self.x + nx * (self.y + ny * self.z);
        let left = total.saturating_sub(done);
        (left, Some(left))
    }
}

impl ExactSizeIterator for LatticeIter {}

/// Physical extent of the periodic box along each axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension(pub [f64; 3]);

impl Dimension {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self([dx, dy, dz])
    }

    /// edge lengths of a single cell
    pub fn cell_size(&self, resolution: &Resolution) -> [f64; 3] {
        let res = resolution.as_array();
        [
            self.0[0] / res[0] as f64,
            self.0[1] / res[1] as f64,
            self.0[2] / res[2] as f64,
        ]
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.0[0], self.0[1], self.0[2])
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.0[0], self.0[1], self.0[2])
    }
}

/// Undeformed cell centers: `(x + 1/2) * dimension / resolution` along each axis.
pub fn reference_centroids(resolution: &Resolution, dimension: &Dimension) -> VectorField {
    let h = dimension.cell_size(resolution);
    let mut field = VectorField::zeros(resolution);

    for (x, y, z) in resolution.cells() {
        let ijk = [x, y, z];
        for a in 0..3 {
            field[[x, y, z, a]] = (ijk[a] as f64 + 0.5) * h[a];
        }
    }

    field
}

/// Undeformed node lattice: `i * dimension / resolution` along each axis.
pub fn reference_nodes(resolution: &Resolution, dimension: &Dimension) -> Mesh {
    let h = dimension.cell_size(resolution);
    let (ni, nj, nk) = resolution.node_shape();
    let mut nodes = Array4::zeros((ni, nj, nk, 3));

    for (i, j, k) in resolution.nodes() {
        let ijk = [i, j, k];
        for a in 0..3 {
            nodes[[i, j, k, a]] = ijk[a] as f64 * h[a];
        }
    }

    Mesh::from_nodes(*resolution, nodes)
}

#[test]
fn cell_iteration_is_x_fastest() {
    let res = Resolution::new(3, 2, 2).unwrap();

    let visited: Vec<_> = res.cells().collect();

    assert_eq!(visited.len(), 12);
    assert_eq!(visited[0], (0, 0, 0));
    assert_eq!(visited[1], (1, 0, 0));
    assert_eq!(visited[3], (0, 1, 0));
    assert_eq!(visited[6], (0, 0, 1));

    for (n, (x, y, z)) in visited.into_iter().enumerate() {
        assert_eq!(res.cell_index(x, y, z), n);
    }
}

#[test]
fn node_iteration_matches_node_index() {
    let res = Resolution::new(2, 3, 1).unwrap();
    assert_eq!(res.nodes().len(), res.n_nodes());

    for (n, (i, j, k)) in res.nodes().enumerate() {
        assert_eq!(res.node_index(i, j, k), n);
    }
}

#[test]
fn zero_resolution_is_rejected() {
    assert!(Resolution::new(4, 0, 4).is_err());
}

#[test]
fn reference_lattice_spans_box() {
    let res = Resolution::new(4, 2, 1).unwrap();
    let dim = Dimension::new(2.0, 1.0, 0.5);

    let nodes = reference_nodes(&res, &dim);
    assert_eq!(nodes.nodes()[[4, 2, 1, 0]], 2.0);
    assert_eq!(nodes.nodes()[[4, 2, 1, 1]], 1.0);
    assert_eq!(nodes.nodes()[[4, 2, 1, 2]], 0.5);

    let centroids = reference_centroids(&res, &dim);
    assert_eq!(centroids[[0, 0, 0, 0]], 0.25);
    assert_eq!(centroids[[3, 1, 0, 1]], 0.75);
    assert_eq!(centroids[[3, 1, 0, 2]], 0.25);
}
