use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use spectral_post::config::IncrementRange;
use spectral_post::post::{self, OutputPaths};
use spectral_post::{PostConfig, ResultFile};

const ABOUT: &str = "
Reconstructs the deformed geometry of spectral solver results and writes it as legacy VTK files.";

#[derive(Parser)]
#[clap(author, about = ABOUT, name = "spectral_post")]
struct Opt {
    /// Path to the `*.spectralOut` result file.
    #[clap(name = "RESULT", parse(from_os_str))]
    result: PathBuf,

    /// Post-processing settings in `ron` format.
    ///
    /// Settings missing from the file (or all of them, if no file is given) take their
    /// default values.
    #[clap(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Directory the vtk files are written to. Defaults to the directory of the result file.
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// First increment to process, overrides the configuration.
    #[clap(long)]
    first: Option<usize>,

    /// Last increment to process, overrides the configuration.
    #[clap(long)]
    last: Option<usize>,

    /// Process increments on all cores.
    #[clap(short, long)]
    parallel: bool,

    /// Only print the header of the result file.
    #[clap(long)]
    info: bool,

    /// Write the effective configuration to this `ron` file before processing.
    #[clap(long, parse(from_os_str))]
    save_config: Option<PathBuf>,
}

pub fn main() {
    if let Err(err) = try_main() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

pub fn try_main() -> Result<()> {
    let _ = env_logger::Builder::from_env("SPECTRAL_POST_LOG").try_init();

    let opt = Opt::parse();

    let mut file = ResultFile::open(&opt.result)?;
    println!("{}", file.header());

    if opt.info {
        return Ok(());
    }

    let mut config = match opt.config.as_ref() {
        Some(path) => PostConfig::load_from_ron(path)?,
        None => PostConfig::default(),
    };

    if opt.first.is_some() || opt.last.is_some() {
        config.increments = IncrementRange::new(
            opt.first.unwrap_or(config.increments.first),
            opt.last.unwrap_or(config.increments.last),
        );
    }

    if let Some(path) = opt.save_config.as_ref() {
        config.save_as_ron(path)?;
    }

    let last = file.header().last_increment();
    if config.increments.last > last {
        anyhow::bail!(
            "last requested increment {} is not stored in {} (blocks 0..={})",
            config.increments.last,
            opt.result.display(),
            last
        );
    }

    let paths = OutputPaths::for_input(&opt.result, opt.output.as_deref());
    if !paths.directory.as_os_str().is_empty() {
        std::fs::create_dir_all(&paths.directory)?;
    }

    let report = if opt.parallel {
        post::run_parallel(&opt.result, &config, &paths)?
    } else {
        post::run(&mut file, &config, &paths)?
    };

    for output in report.processed.iter() {
        println!(
            "increment {}: {} files, direct/fft discrepancy {}",
            output.increment,
            output.files.len(),
            output.discrepancy
        );
    }

    if !report.is_complete() {
        for (increment, err) in report.failed.iter() {
            eprintln!("increment {} failed: {}", increment, err);
        }
        anyhow::bail!(
            "{} of {} increments failed",
            report.failed.len(),
            config.increments.len()
        );
    }

    Ok(())
}
