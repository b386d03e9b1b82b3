//! # Plan State Classifier
//!
//! The backend never reports a plan's lifecycle state directly. It is
//! inferred here from the plan's conditions and spec, the latest Migration,
//! and each VM's pipeline.
//!
//! ## Decision Order
//!
//! First match wins:
//!
//! 1. `Archived` condition on the plan → [`PlanState::Archived`]
//! 2. `spec.archived` set → [`PlanState::Archiving`]
//! 3. No latest migration, or it has not started → `NotStarted-Ready` /
//!    `NotStarted-NotReady` from the plan's `Ready` condition
//! 4. Latest migration belongs to another plan, or the plan has no VMs
//!    → [`PlanState::Unknown`]
//! 5. No VM has started its first task → [`PlanState::Starting`]
//! 6. Warm plan, judged on VMs that are not yet done:
//!    all before `Cutover` with a future cutover → `Copying-CutoverScheduled`;
//!    all before `Cutover` with a reached cutover → `StartingCutover`;
//!    all before `Cutover` with no cutover → `Copying`;
//!    any at `Cutover` → `StartingCutover`
//! 7. → [`PlanState::Running`]
//!
//! The cutover comparison reads `now`, which the caller passes in. Two
//! calls a poll tick apart may legitimately disagree around the cutover
//! instant.

use mtv_core::{Migration, Plan, Timestamp, VmStatus};
use serde::Serialize;

use crate::pipeline::{current_step, has_task_error};

/// Name of the pipeline task that finalizes a warm migration.
pub const CUTOVER_TASK: &str = "Cutover";

/// Lifecycle state of a Plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlanState {
    #[serde(rename = "NotStarted-Ready")]
    NotStartedReady,
    #[serde(rename = "NotStarted-NotReady")]
    NotStartedNotReady,
    Starting,
    Copying,
    #[serde(rename = "Copying-CutoverScheduled")]
    CopyingCutoverScheduled,
    StartingCutover,
    Running,
    Unknown,
    Archiving,
    Archived,
}

impl PlanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStartedReady => "NotStarted-Ready",
            Self::NotStartedNotReady => "NotStarted-NotReady",
            Self::Starting => "Starting",
            Self::Copying => "Copying",
            Self::CopyingCutoverScheduled => "Copying-CutoverScheduled",
            Self::StartingCutover => "StartingCutover",
            Self::Running => "Running",
            Self::Unknown => "Unknown",
            Self::Archiving => "Archiving",
            Self::Archived => "Archived",
        }
    }

    /// All states, in classifier order.
    pub fn all() -> &'static [PlanState] {
        &[
            Self::Archived,
            Self::Archiving,
            Self::NotStartedReady,
            Self::NotStartedNotReady,
            Self::Unknown,
            Self::Starting,
            Self::CopyingCutoverScheduled,
            Self::StartingCutover,
            Self::Copying,
            Self::Running,
        ]
    }

    pub fn is_not_started(&self) -> bool {
        matches!(self, Self::NotStartedReady | Self::NotStartedNotReady)
    }

    /// A migration attempt is under way and must not be disturbed.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Starting | Self::Copying | Self::CopyingCutoverScheduled | Self::StartingCutover
        )
    }

    pub fn is_archival(&self) -> bool {
        matches!(self, Self::Archived | Self::Archiving)
    }
}

impl std::fmt::Display for PlanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where one VM of a warm migration stands relative to its cutover task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WarmPhase {
    /// Incremental copies; the active step is before `Cutover`.
    Precopy,
    /// The active step is the `Cutover` task and it has not completed.
    Cutover,
    PostCutover,
    /// The VM's migration has completed.
    Done,
}

/// Warm phase of a VM, `None` when its pipeline has no `Cutover` task.
pub fn vm_warm_phase(vm: &VmStatus) -> Option<WarmPhase> {
    if vm.is_completed() {
        return Some(WarmPhase::Done);
    }
    let cutover = vm.pipeline.iter().position(|t| t.name == CUTOVER_TASK)?;
    let current = current_step(&vm.pipeline);
    let phase = if current.index < cutover {
        WarmPhase::Precopy
    } else if current.index == cutover && !current.task.is_some_and(|t| t.is_completed()) {
        WarmPhase::Cutover
    } else {
        WarmPhase::PostCutover
    };
    Some(phase)
}

/// Completion ratio of a plan's VMs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    /// Percentage in `0..=100`, rounded to two decimals.
    pub value: f64,
    /// `"X of Y VMs migrated"`.
    pub message: String,
}

impl Progress {
    fn from_counts(migrated: usize, total: usize) -> Self {
        let value = if total == 0 {
            0.0
        } else {
            round2(migrated as f64 * 100.0 / total as f64)
        };
        Self {
            value,
            message: format!("{migrated} of {total} VMs migrated"),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Per-outcome VM counts for the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VmTally {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub canceled: usize,
    /// Still running, or not reported yet.
    pub unresolved: usize,
    /// Completed VMs whose status or pipeline reports an error.
    pub gatherable: usize,
}

impl VmTally {
    /// Count outcomes over `vms`. Plan VMs with no status yet count as
    /// unresolved.
    pub fn from_statuses(vms: &[VmStatus], planned: usize) -> Self {
        let mut tally = vms.iter().fold(Self::default(), |mut t, vm| {
            let errored = vm_has_error(vm);
            if errored && vm.is_completed() {
                t.gatherable += 1;
            }
            if vm.is_canceled() {
                t.canceled += 1;
            } else if errored {
                t.failed += 1;
            } else if vm.is_completed() {
                t.succeeded += 1;
            } else {
                t.unresolved += 1;
            }
            t
        });
        tally.unresolved += planned.saturating_sub(vms.len());
        tally.total = vms.len().max(planned);
        tally
    }

    /// Every VM reached a terminal outcome.
    pub fn all_resolved(&self) -> bool {
        self.total > 0 && self.unresolved == 0
    }
}

/// A VM-level error, or an error on any task of the VM's pipeline.
fn vm_has_error(vm: &VmStatus) -> bool {
    vm.has_error() || (0..vm.pipeline.len()).any(|i| has_task_error(vm, i))
}

/// Outcome of a run that has passed the warm/starting phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RunOutcome {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
    Incomplete,
}

impl RunOutcome {
    fn derive(tally: &VmTally, executing: bool) -> Self {
        if executing || tally.unresolved > 0 {
            Self::InProgress
        } else if tally.failed > 0 {
            Self::Failed
        } else if tally.canceled > 0 && tally.canceled == tally.total {
            Self::Canceled
        } else if tally.canceled > 0 {
            Self::Incomplete
        } else {
            Self::Succeeded
        }
    }
}

/// Derived status of one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOverview {
    pub state: PlanState,
    pub warm: bool,
    pub ready: bool,
    pub progress: Progress,
    pub tally: VmTally,
    /// Set only for [`PlanState::Running`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RunOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutover: Option<Timestamp>,
    /// Migrations recorded for this plan.
    pub attempts: usize,
}

/// Whether `migration` was created for `plan`.
///
/// A reference without a namespace resolves against the migration's own
/// namespace. Uids are compared only when both sides carry one.
pub fn migration_targets(plan: &Plan, migration: &Migration) -> bool {
    let target = &migration.spec.plan;
    let namespace = target
        .namespace
        .as_deref()
        .or(migration.metadata.namespace.as_deref())
        .unwrap_or_default();
    let uid_ok = match (&target.uid, &plan.metadata.uid) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };
    uid_ok
        && !target.name.is_empty()
        && target.name == plan.metadata.name_or_empty()
        && namespace == plan.metadata.namespace_or_empty()
}

/// The most recent migration of `plan`.
///
/// Ordered by `status.started`. Migrations that have not started rank below
/// every started one, and among themselves by creation time. Equal start
/// stamps fall back to creation time.
pub fn find_latest_migration<'a>(
    plan: &Plan,
    migrations: &'a [Migration],
) -> Option<&'a Migration> {
    migrations
        .iter()
        .filter(|m| migration_targets(plan, m))
        .max_by_key(|m| (m.started_at(), m.created_at()))
}

/// Classify `plan`.
///
/// `latest` may be supplied by the caller; when `None` it is derived from
/// `migrations`.
pub fn classify(
    plan: &Plan,
    latest: Option<&Migration>,
    migrations: &[Migration],
    now: Timestamp,
) -> PlanOverview {
    let latest = latest.or_else(|| find_latest_migration(plan, migrations));
    let planned = plan.spec.vms.len();

    let progress_vms = plan
        .summary_vms()
        .or_else(|| latest.map(Migration::vms).filter(|v| !v.is_empty()))
        .unwrap_or_default();
    let pipeline_vms = latest
        .map(Migration::vms)
        .filter(|v| !v.is_empty())
        .or_else(|| plan.summary_vms())
        .unwrap_or_default();

    let tally = VmTally::from_statuses(progress_vms, planned);
    let cutover = latest.and_then(Migration::cutover_at);
    let state = derive_state(plan, latest, pipeline_vms, cutover, now);
    let outcome = (state == PlanState::Running)
        .then(|| RunOutcome::derive(&tally, plan.has_condition("Executing")));

    PlanOverview {
        state,
        warm: plan.spec.warm,
        ready: plan.has_condition("Ready"),
        progress: Progress::from_counts(tally.succeeded, planned),
        tally,
        outcome,
        cutover,
        attempts: migrations.iter().filter(|m| migration_targets(plan, m)).count(),
    }
}

fn derive_state(
    plan: &Plan,
    latest: Option<&Migration>,
    vms: &[VmStatus],
    cutover: Option<Timestamp>,
    now: Timestamp,
) -> PlanState {
    if plan.has_condition("Archived") {
        return PlanState::Archived;
    }
    if plan.spec.archived {
        return PlanState::Archiving;
    }
    let Some(latest) = latest.filter(|m| m.started_at().is_some()) else {
        return if plan.has_condition("Ready") {
            PlanState::NotStartedReady
        } else {
            PlanState::NotStartedNotReady
        };
    };
    if !migration_targets(plan, latest) || plan.spec.vms.is_empty() {
        return PlanState::Unknown;
    }
    let any_begun = vms
        .iter()
        .any(|vm| vm.pipeline.first().is_some_and(|t| t.is_started()));
    if !any_begun {
        return PlanState::Starting;
    }
    if plan.spec.warm {
        if let Some(state) = warm_state(vms, cutover, now) {
            return state;
        }
    }
    PlanState::Running
}

fn warm_state(vms: &[VmStatus], cutover: Option<Timestamp>, now: Timestamp) -> Option<PlanState> {
    let phases: Vec<WarmPhase> = vms
        .iter()
        .filter_map(vm_warm_phase)
        .filter(|p| *p != WarmPhase::Done)
        .collect();
    if phases.is_empty() {
        return None;
    }
    if phases.iter().all(|p| *p == WarmPhase::Precopy) {
        return Some(match cutover {
            Some(at) if at > now => PlanState::CopyingCutoverScheduled,
            Some(_) => PlanState::StartingCutover,
            None => PlanState::Copying,
        });
    }
    phases
        .contains(&WarmPhase::Cutover)
        .then_some(PlanState::StartingCutover)
}
