use crate::prelude::*;

/// corner offsets of a cell in VTK hexahedron order
pub const HEX_CORNERS: [(usize, usize, usize); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (1, 1, 0),
    (0, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (1, 1, 1),
    (0, 1, 1),
];

/// Node coordinates of a structured hexahedral mesh, array shape `(nx + 1, ny + 1, nz + 1, 3)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    resolution: Resolution,
    nodes: Array4<f64>,
}

impl Mesh {
    /// Construct a mesh from node coordinates, checking the lattice fits `resolution`.
    pub fn new(resolution: Resolution, nodes: Array4<f64>) -> Result<Self, ShapeMismatch> {
        let (ni, nj, nk) = resolution.node_shape();
        if nodes.dim() != (ni, nj, nk, 3) {
            return Err(ShapeMismatch::new(
                format!("node array of shape {:?}", (ni, nj, nk, 3)),
                format!("node array of shape {:?}", nodes.dim()),
            ));
        }
        Ok(Self::from_nodes(resolution, nodes))
    }

    /// only for node arrays built from `resolution.node_shape()`
    pub(crate) fn from_nodes(resolution: Resolution, nodes: Array4<f64>) -> Self {
        debug_assert_eq!(nodes.dim().3, 3);
        Self { resolution, nodes }
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn nodes(&self) -> &Array4<f64> {
        &self.nodes
    }

    pub fn into_nodes(self) -> Array4<f64> {
        self.nodes
    }

    pub fn n_nodes(&self) -> usize {
        self.resolution.n_nodes()
    }

    pub fn n_cells(&self) -> usize {
        self.resolution.n_cells()
    }

    pub fn node(&self, i: usize, j: usize, k: usize) -> Vector3<f64> {
        Vector3::new(
            self.nodes[[i, j, k, 0]],
            self.nodes[[i, j, k, 1]],
            self.nodes[[i, j, k, 2]],
        )
    }

    /// all node positions, x fastest
    pub fn points(&self) -> Vec<[f64; 3]> {
        self.resolution
            .nodes()
            .map(|(i, j, k)| {
                [
                    self.nodes[[i, j, k, 0]],
                    self.nodes[[i, j, k, 1]],
                    self.nodes[[i, j, k, 2]],
                ]
            })
            .collect()
    }

    /// node indices of the hexahedron of cell `(x, y, z)`
    pub fn hexahedron(&self, x: usize, y: usize, z: usize) -> [usize; 8] {
        HEX_CORNERS.map(|(di, dj, dk)| self.resolution.node_index(x + di, y + dj, z + dk))
    }

    /// connectivity of all cells, in cell order (x fastest)
    pub fn hexahedra(&self) -> impl Iterator<Item = [usize; 8]> + '_ {
        self.resolution
            .cells()
            .map(move |(x, y, z)| self.hexahedron(x, y, z))
    }

    /// corner positions of cell `(x, y, z)` in hexahedron order
    pub fn cell_corners(&self, x: usize, y: usize, z: usize) -> [Vector3<f64>; 8] {
        HEX_CORNERS.map(|(di, dj, dk)| self.node(x + di, y + dj, z + dk))
    }

    /// mean of the 8 corners of a cell
    pub fn cell_center(&self, x: usize, y: usize, z: usize) -> Vector3<f64> {
        self.cell_corners(x, y, z)
            .iter()
            .fold(Vector3::zeros(), |acc, corner| acc + corner)
            / 8.0
    }

    /// largest distance between corresponding nodes of two meshes of the same grid
    pub fn max_distance(&self, other: &Mesh) -> Result<f64, ShapeMismatch> {
        other.check_resolution(&self.resolution)?;

        let distance = self
            .resolution
            .nodes()
            .map(|(i, j, k)| (self.node(i, j, k) - other.node(i, j, k)).norm())
            .fold(0.0, f64::max);

        Ok(distance)
    }

    /// Error out unless the mesh belongs to `resolution`.
    pub fn check_resolution(&self, resolution: &Resolution) -> Result<(), ShapeMismatch> {
        crate::array::check_grid(self.resolution, resolution, "mesh")
    }
}
