//! Sub-resource naming.

use mtv_core::{MappingKind, ObjectMeta};
use serde::{Deserialize, Serialize};

use crate::form::HookStep;

/// How mappings and hooks created for a plan are named.
///
/// `Generated` leaves naming to the server through `generateName`, so a
/// retried create produces a second copy. `Deterministic` derives names
/// from the plan name and reuses an object that already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingPolicy {
    #[default]
    Generated,
    Deterministic,
}

impl NamingPolicy {
    pub fn mapping_meta(&self, plan: &str, kind: MappingKind, namespace: &str) -> ObjectMeta {
        match self {
            Self::Generated => ObjectMeta::generated(format!("{plan}-"), namespace),
            Self::Deterministic => {
                ObjectMeta::named(format!("{plan}-{}", kind.suffix()), namespace)
            }
        }
    }

    pub fn hook_meta(
        &self,
        plan: &str,
        index: usize,
        step: HookStep,
        namespace: &str,
    ) -> ObjectMeta {
        match self {
            Self::Generated => ObjectMeta::generated(format!("{plan}-hook-"), namespace),
            Self::Deterministic => {
                ObjectMeta::named(format!("{plan}-hook-{index}-{}", step.slug()), namespace)
            }
        }
    }

    /// Whether a 409 on create means "already created by an earlier attempt".
    pub fn reuses_existing(&self) -> bool {
        matches!(self, Self::Deterministic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_use_prefixes() {
        let meta = NamingPolicy::Generated.mapping_meta("p1", MappingKind::Network, "mtv");
        assert_eq!(meta.generate_name.as_deref(), Some("p1-"));
        assert!(meta.name.is_none());
        let hook = NamingPolicy::Generated.hook_meta("p1", 0, HookStep::PreHook, "mtv");
        assert_eq!(hook.generate_name.as_deref(), Some("p1-hook-"));
    }

    #[test]
    fn deterministic_names_derive_from_plan() {
        let policy = NamingPolicy::Deterministic;
        assert_eq!(
            policy.mapping_meta("p1", MappingKind::Storage, "mtv").name.as_deref(),
            Some("p1-storage")
        );
        assert_eq!(
            policy.hook_meta("p1", 1, HookStep::PostHook, "mtv").name.as_deref(),
            Some("p1-hook-1-posthook")
        );
        assert!(policy.reuses_existing());
        assert!(!NamingPolicy::Generated.reuses_existing());
    }
}
