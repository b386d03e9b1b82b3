//! # mtv-orchestrator: Plan Mutations
//!
//! Writes a plan together with the mappings and hooks it references,
//! in the order the references require: sub-resources first, then the plan,
//! then owner references back from each sub-resource to the plan.
//!
//! ## Modules
//!
//! - **Form** (`form.rs`): [`PlanForm`], the wizard output, and plan name
//!   validation.
//! - **Naming** (`naming.rs`): [`NamingPolicy`], server-generated or
//!   plan-derived sub-resource names.
//! - **Saga** (`saga.rs`): [`MutationSaga`], the step-by-step record of a
//!   mutation that a failed create resumes from.
//! - **Orchestrator** (`orchestrator.rs`): [`PlanOrchestrator`], generic
//!   over any [`mtv_client::ResourceStore`].
//!
//! Failures are never compensated. A create that fails after its mappings
//! exist leaves them in place and reports them through the saga.

pub mod error;
pub mod form;
pub mod naming;
pub mod orchestrator;
pub mod saga;

pub use error::OrchestratorError;
pub use form::{validate_plan_name, HookInstance, HookStep, PlanForm, RESERVED_PLAN_NAME};
pub use naming::NamingPolicy;
pub use orchestrator::{removed_hooks, OrchestratorConfig, PlanOrchestrator};
pub use saga::{MutationSaga, SagaKind, SagaPhase, SagaStep, StepRecord};
