//! # Status Subcommand
//!
//! Classifies plans read from files, without contacting a cluster.
//!
//! ```bash
//! mtv status --plans plans.yaml --migrations migrations.yaml --providers inventory.json
//! mtv status --plans plans.yaml --format json --now 2024-05-01T10:00:00Z
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use mtv_core::temporal::minutes_until;
use mtv_core::{Migration, ObjectRef, Plan, Timestamp};
use mtv_inventory::{resolve_providers, InventoryProvider, Lookup};
use mtv_state::{classify, status_title, PlanActions, PlanState, Progress, StatusTitle, VmTally};
use serde::Serialize;

use crate::input::{load_inventory, load_objects};

/// Output rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Arguments for the `status` subcommand.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// File holding one or more Plan objects.
    #[arg(long)]
    pub plans: PathBuf,

    /// File holding the Migration objects of those plans.
    #[arg(long)]
    pub migrations: Option<PathBuf>,

    /// Provider inventory, flat or grouped by provider type.
    #[arg(long)]
    pub providers: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Include archived and archiving plans.
    #[arg(long)]
    pub show_archived: bool,

    /// Evaluate scheduled cutovers against this RFC 3339 instant instead of
    /// the system clock.
    #[arg(long)]
    pub now: Option<String>,
}

/// One classified plan, as printed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRow {
    pub name: String,
    pub namespace: String,
    pub state: PlanState,
    pub status: StatusTitle,
    pub progress: Progress,
    pub tally: VmTally,
    pub actions: PlanActions,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutover: Option<String>,
    pub attempts: usize,
}

impl PlanRow {
    fn is_archival(&self) -> bool {
        self.state.is_archival()
    }

    fn status_cell(&self) -> String {
        match &self.cutover {
            Some(countdown) if self.state == PlanState::CopyingCutoverScheduled => {
                format!("{} (cutover in {countdown})", self.status.title)
            }
            _ => self.status.title.to_string(),
        }
    }

    fn progress_cell(&self) -> String {
        if self.state == PlanState::Running {
            format!("{}% ({})", self.progress.value, self.progress.message)
        } else {
            "-".to_string()
        }
    }
}

fn provider_cell(
    lookup: Lookup<'_, InventoryProvider>,
    reference: Option<&ObjectRef>,
) -> String {
    match lookup {
        Lookup::Found(p) => match p.kind() {
            Some(kind) => format!("{} ({})", p.name, kind.as_str()),
            None => p.name.clone(),
        },
        Lookup::Missing(r) => format!("{r} (not found)"),
        Lookup::Unset => reference.map_or_else(|| "-".to_string(), |r| r.to_string()),
    }
}

/// Classify every plan. `inventory` is `None` when no snapshot was given.
pub fn build_rows(
    plans: &[Plan],
    migrations: &[Migration],
    inventory: Option<&[InventoryProvider]>,
    now: Timestamp,
) -> Vec<PlanRow> {
    plans
        .iter()
        .map(|plan| {
            let overview = classify(plan, None, migrations, now);
            tracing::debug!(
                plan = %plan.metadata.to_ref(),
                state = %overview.state,
                attempts = overview.attempts,
                "classified plan"
            );
            let providers = resolve_providers(&plan.spec.provider, inventory);
            PlanRow {
                name: plan.metadata.name_or_empty().to_string(),
                namespace: plan.metadata.namespace_or_empty().to_string(),
                state: overview.state,
                status: status_title(&overview),
                progress: overview.progress.clone(),
                tally: overview.tally,
                actions: PlanActions::resolve(&overview),
                source: provider_cell(providers.source, plan.spec.provider.source.as_ref()),
                target: provider_cell(providers.target, plan.spec.provider.destination.as_ref()),
                cutover: overview.cutover.map(|at| minutes_until(at, now)),
                attempts: overview.attempts,
            }
        })
        .collect()
}

/// Render rows as an aligned text table.
pub fn render_table(rows: &[PlanRow]) -> String {
    const HEADERS: [&str; 6] = ["NAME", "STATUS", "PROGRESS", "ACTION", "SOURCE", "TARGET"];
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|row| {
            [
                row.name.clone(),
                row.status_cell(),
                row.progress_cell(),
                row.actions
                    .primary
                    .map_or_else(|| "-".to_string(), |a| a.to_string()),
                row.source.clone(),
                row.target.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |fields: &[&str]| {
        let line: Vec<String> = fields
            .iter()
            .zip(widths)
            .map(|(field, width)| format!("{field:<width$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };
    push_line(&HEADERS);
    for row in &cells {
        let fields: Vec<&str> = row.iter().map(String::as_str).collect();
        push_line(&fields);
    }
    out
}

/// Execute the status subcommand.
pub fn run_status(args: &StatusArgs) -> Result<u8> {
    let now = match &args.now {
        Some(raw) => Timestamp::parse(raw).with_context(|| format!("invalid --now value {raw:?}"))?,
        None => Timestamp::now(),
    };
    let plans: Vec<Plan> = load_objects(&args.plans)?;
    let migrations: Vec<Migration> = match &args.migrations {
        Some(path) => load_objects(path)?,
        None => Vec::new(),
    };
    let inventory = args.providers.as_deref().map(load_inventory).transpose()?;

    let mut rows = build_rows(&plans, &migrations, inventory.as_deref(), now);
    if !args.show_archived {
        rows.retain(|row| !row.is_archival());
    }
    tracing::info!(plans = plans.len(), shown = rows.len(), "plans classified");

    match args.format {
        OutputFormat::Table => print!("{}", render_table(&rows)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("failed to serialize plan rows")?
        ),
    }
    Ok(0)
}
