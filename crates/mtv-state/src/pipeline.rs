//! # Pipeline Task Reducer
//!
//! Each VM in a Migration carries an ordered pipeline of tasks. This module
//! finds the active task and assigns every task a display state.
//!
//! ## Active Step
//!
//! The active step is the most recently touched task, not the first
//! incomplete one: after the first task has started, the pipeline is
//! scanned from the end for the last task that has started or reports an
//! error. Tasks that complete out of declared order therefore never pull
//! the pointer backwards.
//!
//! ## Display States
//!
//! | Condition (first match wins) | State |
//! |------------------------------|-------|
//! | started + completed, at the active index, VM canceled | `Canceled` |
//! | completed, or before the active index | `Full` |
//! | VM started, at the active index | `Canceled` if canceled, else `Half` |
//! | otherwise | `Empty` |
//!
//! States are computed per index on every call. The canceled flag and the
//! active index are VM-scoped, so nothing is cached between calls.

use mtv_core::{Task, VmStatus};
use serde::Serialize;

/// The active task of a pipeline and its index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentStep<'a> {
    pub task: Option<&'a Task>,
    pub index: usize,
}

/// Visual state of one pipeline task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StepState {
    Empty,
    Half,
    Full,
    Canceled,
}

impl StepState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Half => "Half",
            Self::Full => "Full",
            Self::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locate the active step of a pipeline.
pub fn current_step(pipeline: &[Task]) -> CurrentStep<'_> {
    let Some(first) = pipeline.first() else {
        return CurrentStep {
            task: None,
            index: 0,
        };
    };
    if !first.is_started() {
        return CurrentStep {
            task: Some(first),
            index: 0,
        };
    }
    let last = pipeline.len() - 1;
    let index = pipeline
        .iter()
        .rposition(|task| task.has_error() || task.is_started())
        .unwrap_or(last);
    CurrentStep {
        task: pipeline.get(index),
        index,
    }
}

/// Display state of the task at `index` in `status`'s pipeline.
pub fn step_state(status: &VmStatus, index: usize, is_canceled: bool) -> StepState {
    let current = current_step(&status.pipeline).index;
    let task = status.pipeline.get(index);
    let started = task.is_some_and(Task::is_started);
    let completed = task.is_some_and(Task::is_completed);

    if started && completed && index == current && is_canceled {
        return StepState::Canceled;
    }
    if completed || index < current {
        return StepState::Full;
    }
    if status.is_started() && index == current {
        return if is_canceled {
            StepState::Canceled
        } else {
            StepState::Half
        };
    }
    StepState::Empty
}

/// Whether the task at `index` reports a non-empty error. Out of range is
/// `false`.
pub fn has_task_error(status: &VmStatus, index: usize) -> bool {
    status.pipeline.get(index).is_some_and(Task::has_error)
}

/// Per-task output consumed by renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub name: String,
    pub description: Option<String>,
    pub state: StepState,
    pub has_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<f64>,
}

/// Views for every task of a VM's pipeline, in pipeline order.
pub fn task_views(status: &VmStatus, is_canceled: bool) -> Vec<TaskView> {
    status
        .pipeline
        .iter()
        .enumerate()
        .map(|(index, task)| TaskView {
            name: task.name.clone(),
            description: task.description.clone(),
            state: step_state(status, index, is_canceled),
            has_error: has_task_error(status, index),
            progress_percent: task.progress.and_then(|p| p.percent()),
        })
        .collect()
}
