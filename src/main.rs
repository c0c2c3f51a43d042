use std::ffi::OsString;
use std::process::ExitCode;

use clap::Parser;
use matrix_mul::worker;
use shm_matmul::app;
use shm_matmul::config::{Cli, Command, RunArgs, RunConfig};
use shm_matmul_types::WorkerArgs;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(args).await,
        Command::Child { args } => child(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = RunConfig::try_from(args)?;
    let summary = app::run(&config).await?;
    print!("{}", summary.report);
    println!("Results in {}", config.output_dir.display());
    Ok(())
}

fn child(args: Vec<OsString>) -> Result<(), Box<dyn std::error::Error>> {
    let args = WorkerArgs::from_args(args)?;
    let report = worker::run(&args)?;
    debug!(pid = std::process::id(), range = %report.range, slots = report.slots_written, "child exiting");
    Ok(())
}
