//! stress and strain measures derived from the fields of a result file

use crate::prelude::*;

/// Configuration a logarithmic strain is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    /// `½ ln(Fᵀ F)`, the Hencky strain in the reference configuration
    Material,
    /// `½ ln(F Fᵀ)`, the Hencky strain in the current configuration
    Spatial,
}

/// Cauchy stress `σ = P Fᵀ / det F` from the first Piola-Kirchhoff stress `P`.
///
/// Fails with [`DegenerateDeformation`] for the first cell whose `det F` is not positive (NaN
/// included), so no infinite or NaN stress ever leaves this function.
pub fn cauchy(defgrad: &TensorField, first_piola: &TensorField) -> Result<TensorField, Error> {
    first_piola.check_resolution(&defgrad.grid())?;

    let stress = defgrad.try_map(|[x, y, z], f| {
        let jacobian = positive_jacobian([x, y, z], f)?;
        Ok::<_, DegenerateDeformation>(first_piola.tensor(x, y, z) * f.transpose() / jacobian)
    })?;

    Ok(stress)
}

/// von Mises equivalent `sqrt(3/2 s:s)` of every tensor, `s` being the deviatoric part.
pub fn von_mises(stress: &TensorField) -> ScalarField {
    let grid = stress.grid();
    let mut mises = ScalarField::zeros(&grid);

    for (x, y, z) in grid.cells() {
        let sigma = stress.tensor(x, y, z);
        let deviator = sigma - Matrix3::identity() * (sigma.trace() / 3.0);
        mises[[x, y, z]] = (1.5 * deviator.component_mul(&deviator).sum()).sqrt();
    }

    mises
}

/// Logarithmic (Hencky) strain of every cell, see [`Frame`].
pub fn log_strain(defgrad: &TensorField, frame: Frame) -> Result<TensorField, Error> {
    let strain = defgrad.try_map(|cell, f| {
        positive_jacobian(cell, f)?;

        let stretch = match frame {
            Frame::Material => f.transpose() * f,
            Frame::Spatial => f * f.transpose(),
        };

        // symmetric positive definite, so the eigenvalues are real and positive
        let eigen = stretch.symmetric_eigen();
        let log_values = eigen.eigenvalues.map(|lambda| 0.5 * lambda.ln());
        let q = eigen.eigenvectors;

        Ok::<_, DegenerateDeformation>(q * Matrix3::from_diagonal(&log_values) * q.transpose())
    })?;

    Ok(strain)
}

fn positive_jacobian(cell: [usize; 3], f: &Matrix3<f64>) -> Result<f64, DegenerateDeformation> {
    let jacobian = f.determinant();

    // written so that NaN is rejected too
    if !(jacobian > 0.0) {
        return Err(DegenerateDeformation::new(cell, jacobian));
    }

    Ok(jacobian)
}
