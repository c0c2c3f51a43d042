//! Command-line configuration.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::Error;

#[derive(Debug, Parser)]
#[command(name = "shm-matmul", version, about = "Sequential vs. multi-process matrix multiplication")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Multiply A by B sequentially and in parallel, then compare timings.
    Run(RunArgs),

    /// Worker mode: <start> <end> <buffer> <P> <A> <B>. Started by `run`.
    #[command(hide = true)]
    Child {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Text file holding matrix A.
    #[arg(short = 'A', long = "matrix-a")]
    pub matrix_a: PathBuf,

    /// Text file holding matrix B.
    #[arg(short = 'B', long = "matrix-b")]
    pub matrix_b: PathBuf,

    /// Number of workers.
    #[arg(short = 'N', long = "workers", default_value_t = 1, allow_negative_numbers = true)]
    pub workers: i64,

    /// Directory receiving C_seq.txt, C_par.txt and log.txt.
    #[arg(long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Backing file of the shared result buffer.
    #[arg(long)]
    pub buffer: Option<PathBuf>,

    /// Kill workers still running after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub worker_timeout: Option<u64>,

    #[arg(long, value_enum, default_value_t = LaunchMode::Process)]
    pub launch: LaunchMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LaunchMode {
    /// One OS process per worker.
    Process,
    /// One blocking thread per worker, inside this process.
    Thread,
}

/// Validated settings for a `run`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub matrix_a: PathBuf,
    pub matrix_b: PathBuf,
    pub workers: usize,
    pub output_dir: PathBuf,
    pub buffer: PathBuf,
    pub worker_timeout: Option<Duration>,
    pub launch: LaunchMode,
}

impl TryFrom<RunArgs> for RunConfig {
    type Error = Error;

    fn try_from(args: RunArgs) -> Result<Self, Error> {
        let workers = usize::try_from(args.workers)
            .ok()
            .filter(|&w| w > 0)
            .ok_or(Error::InvalidWorkerCount(args.workers))?;

        let worker_timeout = match args.worker_timeout {
            Some(0) => return Err(Error::ZeroTimeout),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let buffer = args.buffer.unwrap_or_else(|| {
            std::env::temp_dir().join(format!("shm-matmul-{}.dat", std::process::id()))
        });

        Ok(Self {
            matrix_a: args.matrix_a,
            matrix_b: args.matrix_b,
            workers,
            output_dir: args.output_dir,
            buffer,
            worker_timeout,
            launch: args.launch,
        })
    }
}
