//! Orchestrator error types.

use mtv_client::StoreError;
use mtv_core::ValidationError;

use crate::saga::{MutationSaga, SagaStep};

/// Errors from plan mutations.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The form or plan name was rejected before any write.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A plan with this name already exists.
    #[error("a plan named {0:?} already exists")]
    NameInUse(String),

    /// A saga step failed. Earlier steps are not rolled back; `saga` holds
    /// what was written and can be passed to `resume_create`.
    #[error("{step} failed: {source}")]
    Step {
        step: SagaStep,
        source: StoreError,
        saga: Box<MutationSaga>,
    },

    /// A single-call mutation (archive, delete, mapping replace) failed.
    #[error("{action} {target} failed: {source}")]
    Store {
        action: &'static str,
        target: String,
        source: StoreError,
    },

    /// A saga was handed to the wrong resume call.
    #[error("cannot resume saga for plan {saga_plan:?} with form for {form_plan:?}")]
    ResumeMismatch { saga_plan: String, form_plan: String },
}

impl OrchestratorError {
    /// The saga step that failed, if any.
    pub fn step(&self) -> Option<SagaStep> {
        match self {
            Self::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn saga(&self) -> Option<&MutationSaga> {
        match self {
            Self::Step { saga, .. } => Some(saga),
            _ => None,
        }
    }

    /// Consume the error and take its saga, for a later resume.
    pub fn into_saga(self) -> Option<MutationSaga> {
        match self {
            Self::Step { saga, .. } => Some(*saga),
            _ => None,
        }
    }

    /// HTTP status of the underlying store failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Step { source, .. } | Self::Store { source, .. } => source.status(),
            _ => None,
        }
    }
}
