//! # Reference Resolution
//!
//! Resolves the by-name references a Plan carries (providers, network and
//! storage mappings) against inventory snapshots. Inventory can lag behind
//! spec references, so a miss is an ordinary value ([`Lookup::Missing`]),
//! never an error.

use mtv_core::{Mapping, ObjectRef, Plan, PlanProviderRefs};

use crate::provider::InventoryProvider;

/// Annotation marking a mapping as owned by a single plan.
pub const SHARED_ANNOTATION: &str = "forklift.konveyor.io/shared";

/// Outcome of resolving one optional reference.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a, T> {
    Found(&'a T),
    /// Referenced but absent from the snapshot.
    Missing(&'a ObjectRef),
    /// Nothing was referenced, or no snapshot was available.
    Unset,
}

impl<T> Clone for Lookup<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Lookup<'_, T> {}

impl<'a, T> Lookup<'a, T> {
    pub fn found(&self) -> Option<&'a T> {
        match *self {
            Self::Found(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedProviders<'a> {
    pub source: Lookup<'a, InventoryProvider>,
    pub target: Lookup<'a, InventoryProvider>,
}

/// Resolve a plan's provider references. `inventory` is `None` while the
/// inventory has not loaded.
pub fn resolve_providers<'a>(
    refs: &'a PlanProviderRefs,
    inventory: Option<&'a [InventoryProvider]>,
) -> ResolvedProviders<'a> {
    let lookup = |r: &'a Option<ObjectRef>| match (r, inventory) {
        (Some(r), Some(providers)) => providers
            .iter()
            .find(|p| p.name == r.name && Some(p.namespace.as_str()) == r.namespace.as_deref())
            .map_or(Lookup::Missing(r), Lookup::Found),
        _ => Lookup::Unset,
    };
    ResolvedProviders {
        source: lookup(&refs.source),
        target: lookup(&refs.destination),
    }
}

/// Find the mapping a reference names.
pub fn resolve_mapping<'a>(reference: &ObjectRef, mappings: &'a [Mapping]) -> Option<&'a Mapping> {
    mappings.iter().find(|m| reference.matches(&m.metadata))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMappings<'a> {
    pub network: Lookup<'a, Mapping>,
    pub storage: Lookup<'a, Mapping>,
}

/// Resolve a plan's network and storage mapping references.
pub fn resolve_plan_mappings<'a>(
    plan: &'a Plan,
    network_maps: &'a [Mapping],
    storage_maps: &'a [Mapping],
) -> ResolvedMappings<'a> {
    let lookup = |r: &'a Option<ObjectRef>, pool: &'a [Mapping]| match r {
        Some(r) => resolve_mapping(r, pool).map_or(Lookup::Missing(r), Lookup::Found),
        None => Lookup::Unset,
    };
    ResolvedMappings {
        network: lookup(&plan.spec.map.network, network_maps),
        storage: lookup(&plan.spec.map.storage, storage_maps),
    }
}

/// Drop mappings owned by a single plan (annotated `shared: "false"`).
pub fn filter_shared_mappings(mappings: &[Mapping]) -> Vec<&Mapping> {
    mappings
        .iter()
        .filter(|m| {
            m.metadata
                .annotations
                .get(SHARED_ANNOTATION)
                .map(String::as_str)
                != Some("false")
        })
        .collect()
}

/// First occurrence of every name, order preserved.
pub fn unique_by_name<T, F>(items: impl IntoIterator<Item = T>, name: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(name(&item).to_string()) {
            out.push(item);
        }
    }
    out
}
