//! # Plan Form
//!
//! The wizard's output: everything needed to write a Plan and the mappings
//! and hooks it references. The form is plain data; [`PlanForm::validate`]
//! is the only check applied before any store call.

use mtv_core::{
    validate_dns_label, HookSpec, MappingKind, MappingPair, MappingSpec, ObjectRef, PlanHookRef,
    PlanMappingRefs, PlanProviderRefs, PlanSpec, PlanVm, ValidationError, VmRef,
};
use serde::{Deserialize, Serialize};

/// Name that collides with the console's creation route.
pub const RESERVED_PLAN_NAME: &str = "create";

/// Pipeline step a hook runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookStep {
    PreHook,
    PostHook,
}

impl HookStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreHook => "PreHook",
            Self::PostHook => "PostHook",
        }
    }

    /// Lowercase form used in deterministic hook names.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::PreHook => "prehook",
            Self::PostHook => "posthook",
        }
    }
}

impl std::fmt::Display for HookStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hook in the form. `prefilled_from` points at the existing Hook
/// object when editing; such hooks are patched rather than created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookInstance {
    pub step: HookStep,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playbook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefilled_from: Option<ObjectRef>,
}

impl HookInstance {
    pub fn hook_spec(&self) -> HookSpec {
        HookSpec {
            image: self.image.clone(),
            playbook: self.playbook.clone(),
            service_account: self.service_account.clone(),
            deadline: None,
        }
    }
}

/// Wizard output for creating or editing a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanForm {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source_provider: ObjectRef,
    pub target_provider: ObjectRef,
    #[serde(default)]
    pub target_namespace: String,
    #[serde(default)]
    pub warm: bool,
    #[serde(default)]
    pub vms: Vec<VmRef>,
    #[serde(default)]
    pub network_pairs: Vec<MappingPair>,
    #[serde(default)]
    pub storage_pairs: Vec<MappingPair>,
    #[serde(default)]
    pub hooks: Vec<HookInstance>,
}

/// Check a plan name: a DNS-1123 label that is not the reserved `create`.
pub fn validate_plan_name(name: &str) -> Result<(), ValidationError> {
    validate_dns_label(name)?;
    if name == RESERVED_PLAN_NAME {
        return Err(ValidationError::ReservedName(name.to_string()));
    }
    Ok(())
}

impl PlanForm {
    /// Reject a form that cannot produce a valid plan.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_plan_name(&self.name)?;
        if self.source_provider.name.is_empty() {
            return Err(ValidationError::MissingField("sourceProvider"));
        }
        if self.target_provider.name.is_empty() {
            return Err(ValidationError::MissingField("targetProvider"));
        }
        if self.vms.is_empty() {
            return Err(ValidationError::MissingField("vms"));
        }
        if self.hooks.iter().any(|h| h.image.trim().is_empty()) {
            return Err(ValidationError::MissingField("hooks.image"));
        }
        Ok(())
    }

    pub fn provider_refs(&self) -> PlanProviderRefs {
        PlanProviderRefs {
            source: Some(self.source_provider.clone()),
            destination: Some(self.target_provider.clone()),
        }
    }

    pub fn pairs(&self, kind: MappingKind) -> &[MappingPair] {
        match kind {
            MappingKind::Network => &self.network_pairs,
            MappingKind::Storage => &self.storage_pairs,
        }
    }

    pub fn mapping_spec(&self, kind: MappingKind) -> MappingSpec {
        MappingSpec {
            provider: self.provider_refs(),
            map: self.pairs(kind).to_vec(),
        }
    }

    /// Plan spec referencing the given mappings. Every VM carries every
    /// hook, paired with its step.
    pub fn plan_spec(
        &self,
        network: ObjectRef,
        storage: ObjectRef,
        hooks: &[(ObjectRef, HookStep)],
    ) -> PlanSpec {
        let hook_refs: Vec<PlanHookRef> = hooks
            .iter()
            .map(|(hook, step)| PlanHookRef {
                hook: hook.clone(),
                step: step.as_str().to_string(),
            })
            .collect();
        PlanSpec {
            description: self.description.clone(),
            target_namespace: Some(self.target_namespace.clone()).filter(|ns| !ns.is_empty()),
            warm: self.warm,
            archived: false,
            provider: self.provider_refs(),
            map: PlanMappingRefs {
                network: Some(network),
                storage: Some(storage),
            },
            vms: self
                .vms
                .iter()
                .map(|vm| PlanVm {
                    id: vm.id.clone(),
                    name: vm.name.clone(),
                    hooks: hook_refs.clone(),
                })
                .collect(),
        }
    }
}
