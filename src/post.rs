//! # Per-increment pipeline
//!
//! For every selected increment: read the deformation gradient, average it, reconstruct the
//! deformed centroids directly and in Fourier space, build a mesh from each and write both as
//! legacy vtk files named
//!
//! ```text
//! <stem>-mesh-usual-<increment>.vtk
//! <stem>-mesh-fft-<increment>.vtk
//! ```
//!
//! The cell scalar is one component of the deformation gradient. Optional outputs (see
//! [`PostConfig`]) are the von Mises stress on the direct mesh (`-mesh-mises-`), the centroid
//! cloud (`-points-`) and the average box (`-box-`).
//!
//! Increments are independent. [`run`] walks them in order on one handle, [`run_parallel`] spreads
//! them over the rayon pool with one read-only handle per worker. Both skip (and log) increments
//! that fail and report them in the returned [`BatchReport`].

use crate::prelude::*;
use crate::{reconstruct, reduce, stress, write_vtk};

use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Where the files of a run go: `<directory>/<stem>-<kind>-<increment>.vtk`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub directory: PathBuf,
    pub stem: String,
}

impl OutputPaths {
    pub fn new(directory: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            stem: stem.into(),
        }
    }

    /// Outputs named after the result file, written next to it unless `directory` is given.
    pub fn for_input(input: &Path, directory: Option<&Path>) -> Self {
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "spectral".into());

        let directory = match directory {
            Some(directory) => directory.to_path_buf(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };

        Self::new(directory, stem)
    }

    pub fn path(&self, kind: &str, increment: usize) -> PathBuf {
        self.directory
            .join(format!("{}-{}-{}.vtk", self.stem, kind, increment))
    }
}

/// What processing one increment produced.
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementOutput {
    pub increment: usize,
    /// average deformation gradient
    pub average: Matrix3<f64>,
    /// largest node distance between the direct and the Fourier mesh
    pub discrepancy: f64,
    pub files: Vec<PathBuf>,
}

/// Outcome of a batch run, ordered by increment.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<IncrementOutput>,
    pub failed: Vec<(usize, Error)>,
}

impl BatchReport {
    fn push(&mut self, increment: usize, result: Result<IncrementOutput, Error>) {
        match result {
            Ok(output) => self.processed.push(output),
            Err(e) => {
                log::warn!("skipping increment {}: {}", increment, e);
                self.failed.push((increment, e));
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run the whole pipeline for a single increment.
pub fn process_increment<R: Read + Seek>(
    file: &mut ResultFile<R>,
    increment: usize,
    config: &PostConfig,
    output: &OutputPaths,
) -> Result<IncrementOutput, Error> {
    let header = file.header().clone();
    let resolution = &header.resolution;
    let dimension = &header.dimension;

    let defgrad = file.read_tensor(increment, config.deformation_gradient_offset)?;
    let average = reduce::average(&defgrad);
    log::info!("increment {}: average deformation gradient {:?}", increment, average);

    let centroids = reconstruct::deformed(resolution, dimension, &defgrad, &average)?;
    let centroids_fft =
        reconstruct::deformed_fft(resolution, dimension, &defgrad, &average, config.fft_scaling)?;

    let mesh = reconstruct::mesh(resolution, dimension, &average, &centroids, config.boundary)?;
    let mesh_fft =
        reconstruct::mesh(resolution, dimension, &average, &centroids_fft, config.boundary)?;

    let discrepancy = mesh.max_distance(&mesh_fft)?;
    log::info!(
        "increment {}: direct and fft meshes differ by at most {}",
        increment,
        discrepancy
    );

    let (i, j) = config.scalar_component;
    let scalar = defgrad.component(i, j);
    let scalar_name = format!("F{}{}", i + 1, j + 1);

    let mut files = Vec::new();

    let path = output.path("mesh-usual", increment);
    write_vtk::write_legacy_hexahedra(
        create(&path)?,
        &mesh,
        &scalar,
        &scalar_name,
        &config.title,
    )?;
    files.push(path);

    let path = output.path("mesh-fft", increment);
    write_vtk::write_legacy_hexahedra(
        create(&path)?,
        &mesh_fft,
        &scalar,
        &scalar_name,
        &config.title,
    )?;
    files.push(path);

    if config.write_mises {
        if let Some(stress_offset) = config.stress_offset {
            let first_piola = file.read_tensor(increment, stress_offset)?;
            let sigma = stress::cauchy(&defgrad, &first_piola)?;
            let mises = stress::von_mises(&sigma);

            let path = output.path("mesh-mises", increment);
            write_vtk::write_legacy_hexahedra(
                create(&path)?,
                &mesh,
                &mises,
                "mises",
                &config.title,
            )?;
            files.push(path);
        }
    }

    if config.write_centroids {
        let path = output.path("points", increment);
        write_vtk::write_legacy_points(
            create(&path)?,
            &centroids,
            &scalar,
            &scalar_name,
            &config.title,
        )?;
        files.push(path);
    }

    if config.write_average_box {
        let path = output.path("box", increment);
        write_vtk::write_legacy_box(create(&path)?, dimension, &average, &config.title)?;
        files.push(path);
    }

    Ok(IncrementOutput {
        increment,
        average,
        discrepancy,
        files,
    })
}

/// Process every configured increment in order on a single handle.
pub fn run<R: Read + Seek>(
    file: &mut ResultFile<R>,
    config: &PostConfig,
    output: &OutputPaths,
) -> Result<BatchReport, Error> {
    config.validate()?;

    let mut report = BatchReport::default();
    for increment in config.increments.iter() {
        let result = process_increment(file, increment, config, output);
        report.push(increment, result);
    }

    Ok(report)
}

/// Process every configured increment of the result file at `path` on the rayon pool.
///
/// The header is decoded once; every worker opens its own handle on the file.
pub fn run_parallel(
    path: impl AsRef<Path>,
    config: &PostConfig,
    output: &OutputPaths,
) -> Result<BatchReport, Error> {
    config.validate()?;

    let path = path.as_ref();
    let header = ResultFile::open(path)?.header().clone();
    log::debug!("processing {} in parallel:\n{}", path.display(), header);

    let results: Vec<(usize, Result<IncrementOutput, Error>)> = config
        .increments
        .iter()
        .into_par_iter()
        .map_init(
            || File::open(path).map(|file| ResultFile::with_header(file, header.clone())),
            |file, increment| {
                let result = match file {
                    Ok(file) => process_increment(file, increment, config, output),
                    Err(e) => Err(std::io::Error::new(e.kind(), e.to_string()).into()),
                };
                (increment, result)
            },
        )
        .collect();

    let mut report = BatchReport::default();
    for (increment, result) in results {
        report.push(increment, result);
    }

    Ok(report)
}

fn create(path: &Path) -> Result<BufWriter<File>, Error> {
    log::debug!("writing {}", path.display());
    Ok(BufWriter::new(File::create(path)?))
}
