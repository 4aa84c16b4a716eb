//! Settings of a post-processing run.
//!
//! A configuration is usually stored as RON:
//!
//! ```text
//! (
//!     increments: (first: 0, last: 240),
//!     deformation_gradient_offset: 7,
//!     stress_offset: Some(52),
//!     boundary: Periodic,
//!     write_mises: true,
//! )
//! ```
//!
//! Missing fields take their [`Default`] values.

use crate::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Inclusive range of increment blocks to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementRange {
    pub first: usize,
    pub last: usize,
}

impl IncrementRange {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.first..=self.last
    }

    /// number of increments in the range
    pub fn len(&self) -> usize {
        self.last
            .checked_sub(self.first)
            .map_or(0, |span| span.saturating_add(1))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IncrementRange {
    fn default() -> Self {
        Self::new(240, 240)
    }
}

/// Everything the per-increment pipeline needs to know besides the result file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    /// increment blocks to process
    pub increments: IncrementRange,
    /// element offset of the deformation gradient inside a cell record
    pub deformation_gradient_offset: usize,
    /// element offset of the first Piola-Kirchhoff stress inside a cell record, if stored
    pub stress_offset: Option<usize>,
    /// how ghost centroids beyond the domain faces are built
    pub boundary: Boundary,
    /// exaggeration of the fluctuation in the Fourier reconstruction
    pub fft_scaling: f64,
    /// component `(i, j)` of the deformation gradient written as the cell scalar
    pub scalar_component: (usize, usize),
    /// second line of every legacy vtk file
    pub title: String,
    /// also write the deformed centroids as a point cloud
    pub write_centroids: bool,
    /// also write the box spanned by the average deformation gradient
    pub write_average_box: bool,
    /// also write the von Mises equivalent of the Cauchy stress on the deformed mesh
    pub write_mises: bool,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            increments: IncrementRange::default(),
            deformation_gradient_offset: 7,
            stress_offset: Some(52),
            boundary: Boundary::Periodic,
            fft_scaling: 1.0,
            scalar_component: (1, 2),
            title: "spectral post".into(),
            write_centroids: false,
            write_average_box: false,
            write_mises: false,
        }
    }
}

impl PostConfig {
    /// Load and check a configuration stored as RON.
    pub fn load_from_ron(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::open(path)?;
        let config: Self = ron::de::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and check a configuration from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, Error> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_as_ron(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let file = File::create(path)?;
        self.write_as_ron(BufWriter::new(file))
    }

    pub fn write_as_ron<W: Write>(&self, writer: W) -> Result<(), Error> {
        ron::ser::to_writer_pretty(writer, self, ron::ser::PrettyConfig::new())?;
        Ok(())
    }

    /// Reject settings that can never work, independent of any result file.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |reason: String| Err(Error::InvalidConfig(reason));

        if self.increments.is_empty() {
            return invalid(format!(
                "increment range {}..={} is empty",
                self.increments.first, self.increments.last
            ));
        }

        let (i, j) = self.scalar_component;
        if i > 2 || j > 2 {
            return invalid(format!("scalar component ({i}, {j}) is not a 3 x 3 tensor index"));
        }

        if !self.fft_scaling.is_finite() {
            return invalid(format!("fft scaling {} is not finite", self.fft_scaling));
        }

        if self.write_mises && self.stress_offset.is_none() {
            return invalid("von Mises output needs a stress offset".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_script_constants() {
        let config = PostConfig::default();
        assert_eq!(config.increments.iter(), 240..=240);
        assert_eq!(config.deformation_gradient_offset, 7);
        assert_eq!(config.stress_offset, Some(52));
        assert_eq!(config.scalar_component, (1, 2));
        assert_eq!(config.boundary, Boundary::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn range_length_at_the_ends() {
        assert_eq!(IncrementRange::new(3, 3).len(), 1);
        assert!(IncrementRange::new(4, 3).is_empty());
        assert_eq!(IncrementRange::new(usize::MAX, usize::MAX).len(), 1);
        assert_eq!(IncrementRange::new(1, usize::MAX).len(), usize::MAX);
        assert_eq!(IncrementRange::new(0, usize::MAX).len(), usize::MAX);
    }

    #[test]
    fn partial_ron_fills_defaults() {
        let config = PostConfig::from_ron_str(
            "(increments: (first: 1, last: 3), boundary: Linear, write_mises: true)",
        )
        .unwrap();

        assert_eq!(config.increments.len(), 3);
        assert_eq!(config.boundary, Boundary::Linear);
        assert_eq!(config.fft_scaling, 1.0);
        assert!(config.write_mises);

        let affine = PostConfig::from_ron_str("(boundary: Affine)").unwrap();
        assert_eq!(affine.boundary, Boundary::Affine);
    }

    #[test]
    fn ron_round_trip() {
        let config = PostConfig {
            stress_offset: None,
            title: "shear test".into(),
            write_centroids: true,
            ..PostConfig::default()
        };

        let mut out = Vec::new();
        config.write_as_ron(&mut out).unwrap();
        let read = PostConfig::from_ron_str(std::str::from_utf8(&out).unwrap()).unwrap();

        assert_eq!(read, config);
    }

    #[test]
    fn invalid_settings() {
        let empty = PostConfig {
            increments: IncrementRange::new(5, 4),
            ..PostConfig::default()
        };
        assert!(matches!(empty.validate(), Err(Error::InvalidConfig(_))));

        let component = PostConfig {
            scalar_component: (0, 3),
            ..PostConfig::default()
        };
        assert!(component.validate().is_err());

        let mises = PostConfig {
            stress_offset: None,
            write_mises: true,
            ..PostConfig::default()
        };
        assert!(mises.validate().is_err());

        assert!(matches!(
            PostConfig::from_ron_str("(increments: 3)"),
            Err(Error::Config(_))
        ));
    }
}
