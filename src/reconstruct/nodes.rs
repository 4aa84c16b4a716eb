use super::Boundary;
use crate::prelude::*;

/// Node positions of the conforming hexahedral mesh around a centroid field.
///
/// The centroids are padded by one layer of ghost centroids on every face (supplied by
/// `boundary`), then node `(i, j, k)` is the mean of the 8 padded centroids around it, i.e. of
/// cells `i-1..=i`, `j-1..=j`, `k-1..=k`. Neighbouring cells therefore share their nodes and
/// for an affine field the 8 corners of a cell average exactly to its centroid.
pub fn mesh(
    resolution: &Resolution,
    dimension: &Dimension,
    average: &Matrix3<f64>,
    centroids: &VectorField,
    boundary: Boundary,
) -> Result<Mesh, Error> {
    centroids.check_resolution(resolution)?;

    let padded = pad(resolution, dimension, average, centroids, boundary);

    let (ni, nj, nk) = resolution.node_shape();
    let mut nodes = Array4::zeros((ni, nj, nk, 3));

    for (i, j, k) in resolution.nodes() {
        for a in 0..3 {
            let mut sum = 0.0;
            for (di, dj, dk) in crate::mesh::HEX_CORNERS.iter() {
                sum += padded[[i + di, j + dj, k + dk, a]];
            }
            nodes[[i, j, k, a]] = sum / 8.0;
        }
    }

    Ok(Mesh::from_nodes(*resolution, nodes))
}

/// Centroids with one ghost layer per face: padded index `p` along an axis holds cell `p - 1`.
fn pad(
    resolution: &Resolution,
    dimension: &Dimension,
    average: &Matrix3<f64>,
    centroids: &VectorField,
    boundary: Boundary,
) -> Array4<f64> {
    let n = resolution.as_array();
    let h = dimension.cell_size(resolution);
    let mut padded = Array4::zeros((n[0] + 2, n[1] + 2, n[2] + 2, 3));

    for (x, y, z) in resolution.cells() {
        for a in 0..3 {
            padded[[x + 1, y + 1, z + 1, a]] = centroids[[x, y, z, a]];
        }
    }

    // Axes are padded one after the other. When axis `axis` is handled, earlier axes already
    // span the whole padded range and later ones only the interior, so corners and edges are
    // filled from values that already exist.
    for axis in 0..3 {
        let step = average.column(axis) * h[axis];
        let period = average.column(axis) * dimension.0[axis];
        let last = n[axis];

        let ranges: Vec<std::ops::Range<usize>> = (0..3)
            .map(|other| {
                if other < axis {
                    0..n[other] + 2
                } else {
                    1..n[other] + 1
                }
            })
            .collect();

        for p in ranges[0].clone() {
            for q in ranges[1].clone() {
                for r in ranges[2].clone() {
                    let mut index = [p, q, r];

                    // only the two ghost layers of this axis
                    if index[axis] != 1 {
                        continue;
                    }

                    let at = |padded: &Array4<f64>, position: usize| -> Vector3<f64> {
                        let mut idx = index;
                        idx[axis] = position;
                        Vector3::new(
                            padded[[idx[0], idx[1], idx[2], 0]],
                            padded[[idx[0], idx[1], idx[2], 1]],
                            padded[[idx[0], idx[1], idx[2], 2]],
                        )
                    };

                    let (low, high) = match boundary {
                        Boundary::Periodic => {
                            (at(&padded, last) - period, at(&padded, 1) + period)
                        }
                        Boundary::Linear if last >= 2 => (
                            at(&padded, 1) * 2.0 - at(&padded, 2),
                            at(&padded, last) * 2.0 - at(&padded, last - 1),
                        ),
                        Boundary::Linear | Boundary::Affine => {
                            (at(&padded, 1) - step, at(&padded, last) + step)
                        }
                    };

                    index[axis] = 0;
                    for a in 0..3 {
                        padded[[index[0], index[1], index[2], a]] = low[a];
                    }
                    index[axis] = last + 1;
                    for a in 0..3 {
                        padded[[index[0], index[1], index[2], a]] = high[a];
                    }
                }
            }
        }
    }

    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{reference_centroids, reference_nodes};
    use crate::reconstruct::deformed;
    use approx::assert_relative_eq;

    fn affine_centroids(
        resolution: &Resolution,
        dimension: &Dimension,
        f: &Matrix3<f64>,
    ) -> VectorField {
        let mut centroids = reference_centroids(resolution, dimension);
        for (x, y, z) in resolution.cells() {
            let moved = f * centroids.vector(x, y, z);
            centroids.set_vector(x, y, z, &moved);
        }
        centroids
    }

    #[test]
    fn identity_gives_unit_cube_lattice() {
        let res = Resolution::new(4, 4, 4).unwrap();
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let identity = Matrix3::identity();
        let f = TensorField::uniform(&res, &identity);

        let centroids = deformed(&res, &dim, &f, &identity).unwrap();

        for boundary in [Boundary::Periodic, Boundary::Linear, Boundary::Affine] {
            let mesh = mesh(&res, &dim, &identity, &centroids, boundary).unwrap();
            assert_eq!(mesh.nodes().dim(), (5, 5, 5, 3));
            assert_eq!(mesh.n_nodes(), 125);

            for (i, j, k) in res.nodes() {
                let expected = Vector3::new(i as f64, j as f64, k as f64) * 0.25;
                assert_relative_eq!(mesh.node(i, j, k), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn affine_mesh_is_affine_image_of_lattice() {
        let res = Resolution::new(3, 2, 4).unwrap();
        let dim = Dimension::new(1.5, 1.0, 2.0);
        let f = Matrix3::new(1.2, 0.1, 0.0, -0.1, 0.9, 0.2, 0.0, 0.05, 1.1);
        let centroids = affine_centroids(&res, &dim, &f);
        let reference = reference_nodes(&res, &dim);

        for boundary in [Boundary::Periodic, Boundary::Linear, Boundary::Affine] {
            let mesh = mesh(&res, &dim, &f, &centroids, boundary).unwrap();
            for (i, j, k) in res.nodes() {
                assert_relative_eq!(
                    mesh.node(i, j, k),
                    f * reference.node(i, j, k),
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn corners_subtend_centroid() {
        let res = Resolution::new(3, 3, 2).unwrap();
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let f = Matrix3::new(1.0, 0.4, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        let centroids = affine_centroids(&res, &dim, &f);

        let mesh = mesh(&res, &dim, &f, &centroids, Boundary::Periodic).unwrap();

        for (x, y, z) in res.cells() {
            assert_relative_eq!(
                mesh.cell_center(x, y, z),
                centroids.vector(x, y, z),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn affine_boundary_steps_half_a_cell_out() {
        let res = Resolution::new(3, 4, 3).unwrap();
        let dim = Dimension::new(1.5, 2.0, 1.0);
        let f = Matrix3::new(1.1, 0.2, 0.0, 0.0, 0.9, 0.1, 0.05, 0.0, 1.2);
        let h = dim.cell_size(&res);

        let mut centroids = affine_centroids(&res, &dim, &f);
        for (x, y, z) in res.cells() {
            let (a, b, c) = (x as f64, y as f64, z as f64);
            let bumped = centroids.vector(x, y, z)
                + Vector3::new(0.01 * a * a, 0.02 * b * c, 0.01 * a.sin());
            centroids.set_vector(x, y, z, &bumped);
        }

        let mesh = mesh(&res, &dim, &f, &centroids, Boundary::Affine).unwrap();

        // interior nodes of the x faces: four edge centroids around the node, half a step out
        let half_step = f.column(0) * h[0] / 2.0;
        for j in 1..res.ny {
            for k in 1..res.nz {
                let low = (centroids.vector(0, j - 1, k - 1)
                    + centroids.vector(0, j, k - 1)
                    + centroids.vector(0, j - 1, k)
                    + centroids.vector(0, j, k))
                    / 4.0;
                let high = (centroids.vector(2, j - 1, k - 1)
                    + centroids.vector(2, j, k - 1)
                    + centroids.vector(2, j - 1, k)
                    + centroids.vector(2, j, k))
                    / 4.0;

                assert_relative_eq!(mesh.node(0, j, k), low - half_step, epsilon = 1e-12);
                assert_relative_eq!(mesh.node(3, j, k), high + half_step, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn single_cell_linear_boundary() {
        let res = Resolution::new(1, 1, 1).unwrap();
        let dim = Dimension::new(1.0, 1.0, 1.0);
        let f = Matrix3::identity() * 1.5;
        let centroids = affine_centroids(&res, &dim, &f);

        let mesh = mesh(&res, &dim, &f, &centroids, Boundary::Linear).unwrap();
        assert_relative_eq!(mesh.node(1, 1, 1), Vector3::new(1.5, 1.5, 1.5), epsilon = 1e-12);
        assert_relative_eq!(mesh.node(0, 0, 0), Vector3::zeros(), epsilon = 1e-12);
    }
}
