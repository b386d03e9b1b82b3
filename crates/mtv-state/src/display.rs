//! Status titles and filter buckets for plan listings.

use serde::Serialize;

use crate::plan::{PlanOverview, PlanState, RunOutcome};

/// Colour hint for a status title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TitleVariant {
    Default,
    Success,
    Warning,
    Danger,
}

/// Human status line for one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusTitle {
    pub title: &'static str,
    pub variant: TitleVariant,
    /// Bucket used by status filters (`Ready`, `Running`, `Finished - Incomplete`, ...).
    pub filter: &'static str,
}

impl StatusTitle {
    const fn new(title: &'static str, variant: TitleVariant, filter: &'static str) -> Self {
        Self {
            title,
            variant,
            filter,
        }
    }

    /// Whether the listing should draw a progress bar rather than a label.
    pub fn shows_progress(overview: &PlanOverview) -> bool {
        overview.state == PlanState::Running
    }
}

/// Every filter bucket, in menu order.
pub const FILTER_VALUES: [&str; 8] = [
    "Ready",
    "Not Ready",
    "Running",
    "Succeeded",
    "Failed",
    "Canceled",
    "Finished - Incomplete",
    "Archived",
];

/// Title for a classified plan.
pub fn status_title(overview: &PlanOverview) -> StatusTitle {
    use TitleVariant::*;
    match overview.state {
        PlanState::Archiving => StatusTitle::new("Archiving", Default, "Archived"),
        PlanState::Archived => StatusTitle::new("Archived", Default, "Archived"),
        PlanState::Starting if overview.warm => StatusTitle::new(
            "Running - preparing for incremental data copies",
            Default,
            "Running",
        ),
        PlanState::Starting => {
            StatusTitle::new("Running - preparing for migration", Default, "Running")
        }
        PlanState::Unknown => StatusTitle::new("Unknown", Warning, "Unknown"),
        PlanState::NotStartedReady => StatusTitle::new("Ready", Success, "Ready"),
        PlanState::NotStartedNotReady => StatusTitle::new("Not Ready", Warning, "Not Ready"),
        PlanState::Copying | PlanState::CopyingCutoverScheduled => StatusTitle::new(
            "Running - performing incremental data copies",
            Default,
            "Running",
        ),
        PlanState::StartingCutover => {
            StatusTitle::new("Running - preparing for cutover", Default, "Running")
        }
        PlanState::Running => match overview.outcome.unwrap_or(RunOutcome::InProgress) {
            RunOutcome::InProgress => StatusTitle::new("Running", Default, "Running"),
            RunOutcome::Succeeded => StatusTitle::new("Succeeded", Success, "Succeeded"),
            RunOutcome::Failed => StatusTitle::new("Failed", Danger, "Failed"),
            RunOutcome::Canceled => StatusTitle::new("Canceled", Warning, "Canceled"),
            RunOutcome::Incomplete => {
                StatusTitle::new("Finished - Incomplete", Warning, "Finished - Incomplete")
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Progress, VmTally};

    fn overview(state: PlanState, warm: bool, outcome: Option<RunOutcome>) -> PlanOverview {
        PlanOverview {
            state,
            warm,
            ready: false,
            progress: Progress {
                value: 0.0,
                message: String::new(),
            },
            tally: VmTally::default(),
            outcome,
            cutover: None,
            attempts: 0,
        }
    }

    #[test]
    fn starting_title_depends_on_mode() {
        assert_eq!(
            status_title(&overview(PlanState::Starting, false, None)).title,
            "Running - preparing for migration"
        );
        assert_eq!(
            status_title(&overview(PlanState::Starting, true, None)).title,
            "Running - preparing for incremental data copies"
        );
    }

    #[test]
    fn running_titles_follow_outcome() {
        let t = |o| status_title(&overview(PlanState::Running, false, Some(o)));
        assert_eq!(t(RunOutcome::Succeeded).variant, TitleVariant::Success);
        assert_eq!(t(RunOutcome::Failed).title, "Failed");
        assert_eq!(t(RunOutcome::Incomplete).filter, "Finished - Incomplete");
        assert_eq!(t(RunOutcome::InProgress).title, "Running");
    }

    #[test]
    fn every_filter_bucket_except_unknown_is_listed() {
        for state in PlanState::all() {
            for outcome in [
                None,
                Some(RunOutcome::Succeeded),
                Some(RunOutcome::Failed),
                Some(RunOutcome::Canceled),
                Some(RunOutcome::Incomplete),
            ] {
                let title = status_title(&overview(*state, true, outcome));
                assert!(
                    title.filter == "Unknown" || FILTER_VALUES.contains(&title.filter),
                    "{state}: {}",
                    title.filter
                );
            }
        }
    }

    #[test]
    fn only_running_shows_progress() {
        assert!(StatusTitle::shows_progress(&overview(PlanState::Running, false, None)));
        assert!(!StatusTitle::shows_progress(&overview(PlanState::Copying, true, None)));
    }
}
