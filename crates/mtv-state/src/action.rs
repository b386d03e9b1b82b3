//! # Action Eligibility
//!
//! Maps a classified plan to the primary action a user may take and to the
//! entries of the plan's action menu. The mapping is a fixed table over
//! [`PlanOverview`]; nothing here reads resources directly.
//!
//! Restart is refused while any attempt is in flight so that two
//! Migrations for the same plan never run at once.

use serde::Serialize;

use crate::plan::{PlanOverview, PlanState, RunOutcome};

/// The single prominent action offered for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimaryAction {
    Start,
    Cutover,
    ScheduledCutover,
    MustGather,
}

impl PrimaryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Cutover => "Cutover",
            Self::ScheduledCutover => "ScheduledCutover",
            Self::MustGather => "MustGather",
        }
    }
}

impl std::fmt::Display for PrimaryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary action for a classified plan, if any.
pub fn primary_action(overview: &PlanOverview) -> Option<PrimaryAction> {
    match overview.state {
        PlanState::Archived | PlanState::Archiving => None,
        _ if overview.tally.gatherable > 0 => Some(PrimaryAction::MustGather),
        PlanState::NotStartedReady => Some(PrimaryAction::Start),
        PlanState::CopyingCutoverScheduled => Some(PrimaryAction::ScheduledCutover),
        PlanState::Copying if overview.warm => Some(PrimaryAction::Cutover),
        _ => None,
    }
}

/// Whether a finished attempt may be restarted.
pub fn can_restart(overview: &PlanOverview) -> bool {
    overview.state == PlanState::Running && overview.tally.all_resolved()
}

/// Everything a renderer needs to draw a plan's action controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanActions {
    pub primary: Option<PrimaryAction>,
    pub can_restart: bool,
    pub can_archive: bool,
    pub can_delete: bool,
    pub can_edit: bool,
}

impl PlanActions {
    pub fn resolve(overview: &PlanOverview) -> Self {
        let state = overview.state;
        let in_flight = state.is_in_flight() || overview.outcome == Some(RunOutcome::InProgress);
        Self {
            primary: primary_action(overview),
            can_restart: can_restart(overview),
            can_archive: !state.is_archival() && !in_flight,
            can_delete: !in_flight,
            can_edit: state.is_not_started(),
        }
    }
}
