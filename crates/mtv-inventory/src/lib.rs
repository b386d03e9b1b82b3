//! # mtv-inventory: Provider and Mapping Resolution
//!
//! Resolves the references a Plan carries against inventory snapshots and
//! describes provider kinds through a static capability table.
//!
//! ## Modules
//!
//! - **Provider** (`provider.rs`): [`ProviderKind`] and its per-kind table
//!   (titles, storage nouns, source/target capability).
//! - **Resolve** (`resolve.rs`): provider and mapping lookups returning an
//!   explicit [`Lookup`] rather than an error.
//! - **Capability** (`capability.rs`): role-filtered kind listing, local
//!   target detection, oVirt TLS opt-out from provider secrets.

pub mod capability;
pub mod provider;
pub mod resolve;

pub use capability::{available_provider_kinds, is_local_target, ovirt_insecure_skip_verify};
pub use provider::{
    flatten_inventory, InventoryProvider, ProviderKind, ProviderKindInfo, ProviderRole,
};
pub use resolve::{
    filter_shared_mappings, resolve_mapping, resolve_plan_mappings, resolve_providers,
    unique_by_name, Lookup, ResolvedMappings, ResolvedProviders, SHARED_ANNOTATION,
};
