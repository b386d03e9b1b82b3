//! # mtv-core: Foundational Types for the MTV Status Stack
//!
//! This crate is the leaf of the workspace DAG. It defines the plain data
//! delivered by the cluster (plans, migrations, mappings, hooks, providers)
//! and the condition primitives every other crate reasons about. Every other
//! `mtv-*` crate depends on `mtv-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Partial data is normal.** Resources are observed mid-write, so every
//!    status field is optional and every collection defaults to empty.
//!    Deserializing a half-populated Plan never fails on a missing field.
//!
//! 2. **Closed category enum.** Condition categories are a tagged variant,
//!    not free-form strings, and the "most serious category" reduction is a
//!    single ordered rule table ([`condition::most_severe_category`]).
//!
//! 3. **Presence, not truthiness.** Task and VM stamps are significant by
//!    presence alone. An empty string counts as absent.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mtv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod condition;
pub mod error;
pub mod identity;
pub mod parse;
pub mod resource;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use condition::{
    find_condition_by_category, has_condition, most_severe_category, Category, Condition,
    StatusCategory, StatusType,
};
pub use error::{MtvError, ValidationError};
pub use identity::{
    is_same_resource, validate_dns_label, ObjectMeta, ObjectRef, OwnerReference,
};
pub use parse::{format_go_bool, parse_go_bool};
pub use resource::{
    Hook, HookSpec, Mapping, MappingKind, MappingPair, MappingSpec, Migration, MigrationSpec,
    MigrationStatus, Plan, PlanHookRef, PlanMappingRefs, PlanMigrationSummary, PlanProviderRefs,
    PlanSpec, PlanStatus, PlanVm, ProviderObject, ProviderSpec, Resource, Secret, Task, TaskError,
    TaskProgress, VmRef, VmStatus, FORKLIFT_API_VERSION,
};
pub use temporal::Timestamp;
