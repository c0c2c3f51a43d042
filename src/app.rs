//! End-to-end comparison run: reference product, parallel product,
//! verification and persisted artifacts.

use std::path::{Path, PathBuf};
use std::time::Instant;

use matrix_mul::{io, reference, Coordinator, Inputs, Launcher, ProcessLauncher, ThreadLauncher};
use shm_matmul_types::Matrix;
use tracing::info;

use crate::config::{LaunchMode, RunConfig};
use crate::report::TimingReport;
use crate::Error;

pub const SEQUENTIAL_FILE: &str = "C_seq.txt";
pub const PARALLEL_FILE: &str = "C_par.txt";
pub const LOG_FILE: &str = "log.txt";

/// Files written by a successful run.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub sequential: PathBuf,
    pub parallel: PathBuf,
    pub log: PathBuf,
}

#[derive(Debug)]
pub struct RunSummary {
    pub report: TimingReport,
    pub artifacts: Artifacts,
}

pub async fn run(config: &RunConfig) -> Result<RunSummary, Error> {
    match config.launch {
        LaunchMode::Process => {
            let launcher = ProcessLauncher::current_exe().map_err(Error::WorkerExe)?;
            run_with(config, launcher).await
        }
        LaunchMode::Thread => run_with(config, ThreadLauncher).await,
    }
}

/// Runs both products with `launcher` starting the workers.
///
/// Nothing is written to the output directory unless both products
/// succeed and agree bit for bit.
pub async fn run_with<L: Launcher + 'static>(
    config: &RunConfig,
    launcher: L,
) -> Result<RunSummary, Error> {
    let inputs = Inputs::load(&config.matrix_a, &config.matrix_b)?;
    info!(product = %inputs.dims, workers = config.workers, "inputs loaded");

    let started = Instant::now();
    let sequential = reference::multiply(&inputs.a, &inputs.b)?;
    let sequential_time = started.elapsed();
    info!(elapsed = ?sequential_time, "sequential product done");

    let mut coordinator = Coordinator::new(launcher, config.workers, &config.buffer)
        .with_worker_timeout(config.worker_timeout);
    let parallel = coordinator.run(&inputs).await?;
    info!(elapsed = ?parallel.elapsed, workers = config.workers, "parallel product done");

    if let Some((row, col)) = parallel.result.first_difference(&sequential) {
        return Err(Error::ResultMismatch {
            row,
            col,
            sequential: sequential[(row, col)],
            parallel: parallel.result[(row, col)],
        });
    }

    let report = TimingReport::new(inputs.dims, config.workers, sequential_time, parallel.elapsed);
    info!(speedup = ?report.speedup(), "timing summary");

    let artifacts = persist(&config.output_dir, &sequential, &parallel.result, &report)?;
    Ok(RunSummary { report, artifacts })
}

fn persist(
    dir: &Path,
    sequential: &Matrix,
    parallel: &Matrix,
    report: &TimingReport,
) -> Result<Artifacts, Error> {
    std::fs::create_dir_all(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let artifacts = Artifacts {
        sequential: dir.join(SEQUENTIAL_FILE),
        parallel: dir.join(PARALLEL_FILE),
        log: dir.join(LOG_FILE),
    };
    io::write_matrix(&artifacts.parallel, parallel)?;
    io::write_matrix(&artifacts.sequential, sequential)?;
    std::fs::write(&artifacts.log, report.to_string()).map_err(|source| Error::Io {
        path: artifacts.log.clone(),
        source,
    })?;

    info!(dir = %dir.display(), "results written");
    Ok(artifacts)
}
