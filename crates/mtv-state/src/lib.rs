//! # mtv-state: Plan and Pipeline Status Derivation
//!
//! Pure functions that turn observed Plan, Migration and per-VM pipeline
//! data into one stable status for rendering and for action decisions.
//!
//! ## Modules
//!
//! - **Pipeline** (`pipeline.rs`): active step of a VM pipeline and the
//!   `Empty / Half / Full / Canceled` display state of every task.
//!
//! - **Plan** (`plan.rs`): lifecycle classifier over a Plan, its latest
//!   Migration and the Migration history, plus progress and VM tallies.
//!
//! - **Action** (`action.rs`): primary action and action-menu eligibility
//!   for a classified plan.
//!
//! - **Display** (`display.rs`): status titles and filter buckets.
//!
//! ## Design
//!
//! Nothing in this crate performs I/O or reads a clock. Functions are
//! total over partial data: a half-written resource yields a conservative
//! state (`Unknown`, `NotStarted-NotReady`, an empty pipeline), never an
//! error. The current time is an explicit argument to [`classify`].

pub mod action;
pub mod display;
pub mod pipeline;
pub mod plan;

// ─── Pipeline re-exports ────────────────────────────────────────────

pub use pipeline::{
    current_step, has_task_error, step_state, task_views, CurrentStep, StepState, TaskView,
};

// ─── Plan re-exports ────────────────────────────────────────────────

pub use plan::{
    classify, find_latest_migration, migration_targets, vm_warm_phase, PlanOverview, PlanState,
    Progress, RunOutcome, VmTally, WarmPhase, CUTOVER_TASK,
};

// ─── Action re-exports ──────────────────────────────────────────────

pub use action::{can_restart, primary_action, PlanActions, PrimaryAction};

// ─── Display re-exports ─────────────────────────────────────────────

pub use display::{status_title, StatusTitle, TitleVariant, FILTER_VALUES};
