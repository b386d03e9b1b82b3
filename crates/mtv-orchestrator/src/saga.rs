//! # Mutation Saga
//!
//! An inspectable record of a multi-resource write. Each step that
//! finished is appended with the objects it touched, and the references
//! produced along the way (mappings, hooks, the plan) are kept so a failed
//! create can be resumed from the step that failed.
//!
//! ## Create order
//!
//! ```text
//! CheckName → CreateMappings → CreateHooks → CreatePlan → PatchOwners
//! ```
//!
//! ## Edit order
//!
//! ```text
//! CreateHooks (upsert) → PatchPlan → PatchOwners → DeleteHooks
//! ```
//!
//! Nothing is compensated. A saga that failed at `CreatePlan` leaves its
//! mappings and hooks in place; [`MutationSaga::created`] lists them.

use mtv_core::ObjectRef;
use serde::{Deserialize, Serialize};

use crate::form::HookStep;

/// One step of a plan mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SagaStep {
    CheckName,
    CreateMappings,
    CreateHooks,
    CreatePlan,
    PatchOwners,
    PatchPlan,
    DeleteHooks,
}

impl SagaStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckName => "CheckName",
            Self::CreateMappings => "CreateMappings",
            Self::CreateHooks => "CreateHooks",
            Self::CreatePlan => "CreatePlan",
            Self::PatchOwners => "PatchOwners",
            Self::PatchPlan => "PatchPlan",
            Self::DeleteHooks => "DeleteHooks",
        }
    }
}

impl std::fmt::Display for SagaStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SagaKind {
    Create,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SagaPhase {
    Pending,
    InProgress(SagaStep),
    Completed,
    Failed(SagaStep),
}

/// A finished step and the objects it wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub step: SagaStep,
    #[serde(default)]
    pub touched: Vec<ObjectRef>,
}

/// Progress of one create or edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationSaga {
    pub plan: String,
    pub kind: SagaKind,
    pub phase: SagaPhase,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub network_ref: Option<ObjectRef>,
    #[serde(default)]
    pub storage_ref: Option<ObjectRef>,
    /// One slot per form hook, filled once that hook exists.
    #[serde(default)]
    pub hook_refs: Vec<Option<ObjectRef>>,
    #[serde(default)]
    pub plan_ref: Option<ObjectRef>,
}

impl MutationSaga {
    pub fn new(plan: impl Into<String>, kind: SagaKind) -> Self {
        Self {
            plan: plan.into(),
            kind,
            phase: SagaPhase::Pending,
            steps: Vec::new(),
            network_ref: None,
            storage_ref: None,
            hook_refs: Vec::new(),
            plan_ref: None,
        }
    }

    pub fn begin(&mut self, step: SagaStep) {
        self.phase = SagaPhase::InProgress(step);
    }

    pub fn complete(&mut self, step: SagaStep, touched: Vec<ObjectRef>) {
        self.steps.push(StepRecord { step, touched });
    }

    pub fn fail(&mut self, step: SagaStep) {
        self.phase = SagaPhase::Failed(step);
    }

    pub fn finish(&mut self) {
        self.phase = SagaPhase::Completed;
    }

    pub fn is_done(&self, step: SagaStep) -> bool {
        self.steps.iter().any(|r| r.step == step)
    }

    pub fn failed_step(&self) -> Option<SagaStep> {
        match self.phase {
            SagaPhase::Failed(step) => Some(step),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SagaPhase::Completed
    }

    /// Size the hook slots to the form's hook count, keeping filled slots.
    pub(crate) fn reserve_hooks(&mut self, count: usize) {
        if self.hook_refs.len() != count {
            self.hook_refs.resize(count, None);
        }
    }

    /// Hook refs paired with their steps, in form order. `None` when any
    /// hook has not been created yet.
    pub(crate) fn hook_pairs(&self, steps: &[HookStep]) -> Option<Vec<(ObjectRef, HookStep)>> {
        self.hook_refs
            .iter()
            .zip(steps)
            .map(|(r, step)| r.clone().map(|r| (r, *step)))
            .collect()
    }

    /// Every object this saga has created so far.
    pub fn created(&self) -> Vec<ObjectRef> {
        self.network_ref
            .iter()
            .chain(self.storage_ref.iter())
            .chain(self.hook_refs.iter().flatten())
            .chain(self.plan_ref.iter())
            .cloned()
            .collect()
    }
}
