//! # Mutating Subcommands
//!
//! `create`, `archive` and `delete` against a cluster API. Connection
//! settings come from `--config <file>` or the `MTV_*` environment.
//!
//! ```bash
//! mtv create --form plan.yaml --saga plan1.saga.json
//! mtv --config cluster.yaml archive plan1
//! mtv delete plan1 --namespace openshift-mtv
//! ```
//!
//! A failed `create` with `--saga` writes its progress to that file; the
//! next `create` with the same file resumes from the failed step.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use mtv_client::{ClientConfig, HttpResourceStore, ResourceKind, ResourceStore, StoreExt};
use mtv_core::Plan;
use mtv_orchestrator::{
    MutationSaga, NamingPolicy, OrchestratorConfig, PlanForm, PlanOrchestrator,
};

use crate::input::load_one;

/// Arguments for the `create` subcommand.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Plan form (YAML or JSON).
    #[arg(long)]
    pub form: PathBuf,

    /// Name mappings and hooks after the plan so a re-run reuses them.
    #[arg(long)]
    pub deterministic_names: bool,

    /// Saga file to resume from and to record a failed create into.
    #[arg(long)]
    pub saga: Option<PathBuf>,

    /// Override the configured namespace.
    #[arg(long)]
    pub namespace: Option<String>,
}

/// Arguments for `archive` and `delete`.
#[derive(Args, Debug)]
pub struct PlanNameArgs {
    /// Plan name.
    pub name: String,

    /// Override the configured namespace.
    #[arg(long)]
    pub namespace: Option<String>,
}

/// Resolve client settings from a config file or the environment.
pub fn client_config(path: Option<&Path>, namespace: Option<&str>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::from_yaml_file(path)?,
        None => ClientConfig::from_env().context("no --config given and environment incomplete")?,
    };
    if let Some(ns) = namespace {
        config.namespace = ns.to_string();
    }
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn http_orchestrator(
    config_path: Option<&Path>,
    namespace: Option<&str>,
    naming: NamingPolicy,
) -> Result<PlanOrchestrator<HttpResourceStore>> {
    let config = client_config(config_path, namespace)?;
    tracing::debug!(?config, "client configured");
    let store = HttpResourceStore::new(&config)?;
    let orch_config = OrchestratorConfig::new(config.namespace.clone()).with_naming(naming);
    Ok(PlanOrchestrator::new(store, orch_config))
}

fn read_saga(path: &Path) -> Result<MutationSaga> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read saga {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse saga {}", path.display()))
}

fn write_saga(path: &Path, saga: &MutationSaga) -> Result<()> {
    let json = serde_json::to_string_pretty(saga).context("failed to serialize saga")?;
    std::fs::write(path, json).with_context(|| format!("failed to write saga {}", path.display()))
}

/// Create (or resume creating) the plan described by `form`.
pub async fn create_with<S: ResourceStore>(
    orch: &PlanOrchestrator<S>,
    form: &PlanForm,
    saga_path: Option<&Path>,
) -> Result<Plan> {
    let resume_from = match saga_path {
        Some(path) if path.exists() => Some(read_saga(path)?),
        _ => None,
    };
    let result = match resume_from {
        Some(saga) => orch.resume_create(form, saga).await,
        None => orch.create_plan(form).await,
    };
    match result {
        Ok(plan) => {
            if let Some(path) = saga_path.filter(|p| p.exists()) {
                std::fs::remove_file(path)
                    .with_context(|| format!("failed to remove saga {}", path.display()))?;
            }
            Ok(plan)
        }
        Err(err) => {
            if let (Some(path), Some(saga)) = (saga_path, err.saga()) {
                write_saga(path, saga)?;
                tracing::warn!(
                    saga = %path.display(),
                    created = saga.created().len(),
                    "saga recorded"
                );
            }
            Err(err).with_context(|| format!("failed to create plan {}", form.name))
        }
    }
}

async fn fetch_plan<S: ResourceStore>(orch: &PlanOrchestrator<S>, name: &str) -> Result<Plan> {
    let namespace = &orch.config().namespace;
    match orch
        .store()
        .get_as::<Plan>(ResourceKind::Plan, namespace, name)
        .await?
    {
        Some(plan) => Ok(plan),
        None => bail!("plan {namespace}/{name} not found"),
    }
}

/// Archive the named plan.
pub async fn archive_with<S: ResourceStore>(
    orch: &PlanOrchestrator<S>,
    name: &str,
) -> Result<Plan> {
    let plan = fetch_plan(orch, name).await?;
    Ok(orch.archive_plan(&plan).await?)
}

/// Delete the named plan.
pub async fn delete_with<S: ResourceStore>(orch: &PlanOrchestrator<S>, name: &str) -> Result<()> {
    let plan = fetch_plan(orch, name).await?;
    Ok(orch.delete_plan(&plan).await?)
}

/// Execute the create subcommand.
pub fn run_create(args: &CreateArgs, config: Option<&Path>) -> Result<u8> {
    let form: PlanForm = load_one(&args.form)?;
    let naming = if args.deterministic_names {
        NamingPolicy::Deterministic
    } else {
        NamingPolicy::Generated
    };
    let orch = http_orchestrator(config, args.namespace.as_deref(), naming)?;
    let plan = runtime()?.block_on(create_with(&orch, &form, args.saga.as_deref()))?;
    println!("plan/{} created", plan.metadata.name_or_empty());
    Ok(0)
}

/// Execute the archive subcommand.
pub fn run_archive(args: &PlanNameArgs, config: Option<&Path>) -> Result<u8> {
    let orch = http_orchestrator(config, args.namespace.as_deref(), NamingPolicy::default())?;
    runtime()?.block_on(archive_with(&orch, &args.name))?;
    println!("plan/{} archived", args.name);
    Ok(0)
}

/// Execute the delete subcommand.
pub fn run_delete(args: &PlanNameArgs, config: Option<&Path>) -> Result<u8> {
    let orch = http_orchestrator(config, args.namespace.as_deref(), NamingPolicy::default())?;
    runtime()?.block_on(delete_with(&orch, &args.name))?;
    println!("plan/{} deleted", args.name);
    Ok(0)
}
