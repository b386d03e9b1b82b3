//! # Pipeline Subcommand
//!
//! Prints the per-task view of one VM's migration pipeline.
//!
//! ```bash
//! mtv pipeline --migration migration.yaml --vm vm-1431
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use mtv_core::{Migration, VmRef, VmStatus};
use mtv_state::{current_step, task_views, TaskView};

use crate::input::load_one;
use crate::status::OutputFormat;

/// Arguments for the `pipeline` subcommand.
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// File holding exactly one Migration.
    #[arg(long)]
    pub migration: PathBuf,

    /// VM id, or VM name when no status carries that id.
    #[arg(long)]
    pub vm: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Find the status of `vm` in a migration, by id first and then by name.
pub fn find_vm<'a>(migration: &'a Migration, vm: &str) -> Option<&'a VmStatus> {
    let by_id = VmRef {
        id: Some(vm.to_string()),
        name: None,
    };
    let by_name = VmRef {
        id: None,
        name: Some(vm.to_string()),
    };
    let vms = migration.vms();
    vms.iter()
        .find(|s| s.matches(&by_id))
        .or_else(|| vms.iter().find(|s| s.matches(&by_name)))
}

/// Render task views with the active step marked.
pub fn render_pipeline(status: &VmStatus, views: &[TaskView]) -> String {
    let current = current_step(&status.pipeline).index;
    let name_width = views.iter().map(|v| v.name.len()).max().unwrap_or(0).max(4);
    let mut out = format!("  #  {:<name_width$}  STATE     PROGRESS  ERROR\n", "TASK");
    for (i, view) in views.iter().enumerate() {
        let marker = if i == current && !status.is_completed() { '>' } else { ' ' };
        let progress = view
            .progress_percent
            .map_or_else(|| "-".to_string(), |p| format!("{p:.0}%"));
        let error = if view.has_error { "yes" } else { "" };
        let line = format!(
            "{marker}{:>2}  {:<name_width$}  {:<8}  {:<8}  {error}",
            i + 1,
            view.name,
            view.state.as_str(),
            progress,
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Execute the pipeline subcommand.
pub fn run_pipeline(args: &PipelineArgs) -> Result<u8> {
    let migration: Migration = load_one(&args.migration)?;
    let status = find_vm(&migration, &args.vm).ok_or_else(|| {
        anyhow!(
            "VM {} not found in migration {}",
            args.vm,
            migration.metadata.to_ref()
        )
    })?;
    let views = task_views(status, status.is_canceled());
    tracing::debug!(vm = %args.vm, tasks = views.len(), "pipeline loaded");

    match args.format {
        OutputFormat::Table => print!("{}", render_pipeline(status, &views)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&views).context("failed to serialize task views")?
        ),
    }
    Ok(0)
}
