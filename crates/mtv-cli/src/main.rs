//! # mtv CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mtv_cli::mutate::{run_archive, run_create, run_delete, CreateArgs, PlanNameArgs};
use mtv_cli::pipeline::{run_pipeline, PipelineArgs};
use mtv_cli::status::{run_status, StatusArgs};

/// Migration plan status and lifecycle tool.
///
/// Derives plan and VM pipeline status from Plan and Migration resources,
/// and creates, archives or deletes plans through the cluster API.
#[derive(Parser, Debug)]
#[command(name = "mtv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Cluster connection file. Falls back to MTV_* environment variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify plans read from files.
    Status(StatusArgs),

    /// Show the task pipeline of one VM in a migration.
    Pipeline(PipelineArgs),

    /// Create a plan with its mappings and hooks.
    Create(CreateArgs),

    /// Archive a plan.
    Archive(PlanNameArgs),

    /// Delete a plan.
    Delete(PlanNameArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "mtv CLI starting");

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Status(args) => run_status(&args),
        Commands::Pipeline(args) => run_pipeline(&args),
        Commands::Create(args) => run_create(&args, config),
        Commands::Archive(args) => run_archive(&args, config),
        Commands::Delete(args) => run_delete(&args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
