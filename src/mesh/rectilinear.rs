use crate::parse::error::MalformedExtent;
use crate::prelude::*;

#[derive(Debug, Clone, PartialEq)]
/// Full information on an undeformed 3D grid. This is the `domain` stored in a
/// [`VtkData`](crate::VtkData) when writing or reading `.vtr` files.
pub struct Rectilinear3D {
    pub spans: Spans3D,
    pub mesh: Mesh3D,
}

impl Rectilinear3D {
    /// create a new domain from mesh information and span information.
    pub fn new(mesh: Mesh3D, spans: Spans3D) -> Rectilinear3D {
        Self { mesh, spans }
    }

    /// The undeformed grid of a result file: `resolution + 1` evenly spaced node coordinates
    /// along each axis, from `0` to `dimension`.
    pub fn reference(resolution: &Resolution, dimension: &Dimension) -> Self {
        let h = dimension.cell_size(resolution);
        let locations =
            |n: usize, h: f64| -> Vec<f64> { (0..=n).map(|i| i as f64 * h).collect() };

        let mesh = Mesh3D::new(
            locations(resolution.nx, h[0]),
            locations(resolution.ny, h[1]),
            locations(resolution.nz, h[2]),
        );

        Self::new(mesh, Spans3D::new(resolution.nx, resolution.ny, resolution.nz))
    }

    /// cell counts along each axis
    pub fn resolution(&self) -> Result<Resolution, ShapeMismatch> {
        Resolution::new(
            self.spans.x_len() - 1,
            self.spans.y_len() - 1,
            self.spans.z_len() - 1,
        )
    }

    /// Error out if the coordinate lists do not match the extent.
    pub fn check_locations(&self) -> Result<(), ShapeMismatch> {
        let expected = [self.spans.x_len(), self.spans.y_len(), self.spans.z_len()];
        let actual = [
            self.mesh.x_locations.len(),
            self.mesh.y_locations.len(),
            self.mesh.z_locations.len(),
        ];

        if expected != actual {
            return Err(ShapeMismatch::new(
                format!("{expected:?} node coordinates for extent `{}`", self.spans),
                format!("{actual:?} node coordinates"),
            ));
        }

        Ok(())
    }
}

/// Node coordinates along each axis of a rectilinear grid
#[derive(Debug, Clone, Default, PartialEq, Constructor)]
pub struct Mesh3D {
    pub x_locations: Vec<f64>,
    pub y_locations: Vec<f64>,
    pub z_locations: Vec<f64>,
}

/// Describes the node index range a `.vtr` file covers.
///
/// Most often you want to use the [`Spans3D::new`] constructor, which covers a complete grid of
/// `nx * ny * nz` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Display)]
#[display(
    fmt = "{} {} {} {} {} {}",
    x_start,
    x_end,
    y_start,
    y_end,
    z_start,
    z_end
)]
pub struct Spans3D {
    pub x_start: usize,
    pub x_end: usize,
    pub y_start: usize,
    pub y_end: usize,
    pub z_start: usize,
    pub z_end: usize,
}

impl Spans3D {
    /// extent of a grid with `nx * ny * nz` cells, i.e. nodes `0..=nx` along x
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            x_start: 0,
            x_end: nx,
            y_start: 0,
            y_end: ny,
            z_start: 0,
            z_end: nz,
        }
    }

    /// Parse an extent in the form `"x_start x_end y_start y_end z_start z_end"`, as found in the
    /// `WholeExtent` attribute of a vtk file.
    ///
    /// # Example
    /// ```
    /// let spans = spectral_post::Spans3D::from_span_string("0 10 0 20 0 10").unwrap();
    /// assert_eq!(spans.y_len(), 21);
    /// ```
    pub fn from_span_string(span_string: &str) -> Result<Self, MalformedExtent> {
        let malformed = || MalformedExtent::new(span_string.to_string());

        let values = span_string
            .split_ascii_whitespace()
            .map(|x| x.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed())?;

        match values.as_slice() {
            &[x_start, x_end, y_start, y_end, z_start, z_end]
                if x_start < x_end && y_start < y_end && z_start < z_end =>
            {
                Ok(Spans3D {
                    x_start,
                    x_end,
                    y_start,
                    y_end,
                    z_start,
                    z_end,
                })
            }
            _ => Err(malformed()),
        }
    }

    /// Number of nodes in the X direction, as paraview would interpret it
    pub fn x_len(&self) -> usize {
        self.x_end - self.x_start + 1
    }

    /// Number of nodes in the Y direction
    pub fn y_len(&self) -> usize {
        self.y_end - self.y_start + 1
    }

    /// Number of nodes in the Z direction
    pub fn z_len(&self) -> usize {
        self.z_end - self.z_start + 1
    }

    /// number of cells covered by the extent
    pub fn n_cells(&self) -> usize {
        (self.x_len() - 1) * (self.y_len() - 1) * (self.z_len() - 1)
    }
}
