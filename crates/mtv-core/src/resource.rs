//! # Resource Data Model
//!
//! Plain data shapes for the Forklift resources the stack reads and writes:
//! Plan, Migration, NetworkMap / StorageMap, Hook, Provider and Secret.
//!
//! Every field the controller fills in is optional and every collection
//! defaults to empty, so a resource observed half-written still decodes.
//! Unknown fields are ignored. Task and VM timestamps stay as raw strings
//! here; presence checks treat an empty string as absent and parsing is
//! left to the consumer through [`Timestamp::parse_opt`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::condition::{has_condition, Condition};
use crate::error::MtvError;
use crate::identity::{ObjectMeta, ObjectRef, OwnerReference};
use crate::temporal::Timestamp;

/// API group and version of every Forklift resource.
pub const FORKLIFT_API_VERSION: &str = "forklift.konveyor.io/v1beta1";

/// Whether an optional stamp is present and non-empty. Any non-empty
/// string counts, whitespace included.
pub(crate) fn present(stamp: &Option<String>) -> bool {
    stamp.as_deref().is_some_and(|s| !s.is_empty())
}

/// Common surface of every resource kind.
pub trait Resource: Serialize + DeserializeOwned {
    /// The `kind` string carried on the wire.
    const KIND: &'static str;

    fn metadata(&self) -> &ObjectMeta;
    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    /// Decode from a JSON body.
    fn from_value(value: serde_json::Value) -> Result<Self, MtvError> {
        serde_json::from_value(value).map_err(|source| MtvError::Decode {
            kind: Self::KIND,
            source,
        })
    }

    /// Encode to a JSON body.
    fn to_value(&self) -> Result<serde_json::Value, MtvError> {
        serde_json::to_value(self).map_err(|source| MtvError::Encode {
            kind: Self::KIND,
            source,
        })
    }

    /// Reference to this object by name and namespace.
    fn object_ref(&self) -> ObjectRef {
        self.metadata().to_ref()
    }
}

macro_rules! impl_resource {
    ($ty:ty, $kind:literal) => {
        impl Resource for $ty {
            const KIND: &'static str = $kind;

            fn metadata(&self) -> &ObjectMeta {
                &self.metadata
            }

            fn metadata_mut(&mut self) -> &mut ObjectMeta {
                &mut self.metadata
            }
        }
    };
}

// ── Plan ─────────────────────────────────────────────────────────────

/// A declarative request to migrate a set of VMs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PlanSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlanStatus>,
}

impl_resource!(Plan, "Plan");

impl Plan {
    /// Fresh plan body with no status.
    pub fn new(metadata: ObjectMeta, spec: PlanSpec) -> Self {
        Self {
            api_version: Some(FORKLIFT_API_VERSION.to_string()),
            kind: Some("Plan".to_string()),
            metadata,
            spec,
            status: None,
        }
    }

    /// Owner back-reference pointing at this plan. `None` until the server
    /// has assigned a uid.
    pub fn owner_reference(&self) -> Option<OwnerReference> {
        Some(OwnerReference {
            api_version: FORKLIFT_API_VERSION.to_string(),
            kind: "Plan".to_string(),
            name: self.metadata.name.clone()?,
            uid: self.metadata.uid.clone()?,
        })
    }

    /// Conditions on the plan, empty when no status has been written.
    pub fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    pub fn has_condition(&self, type_: &str) -> bool {
        has_condition(self.conditions(), type_)
    }

    /// Per-VM statuses from the plan's own migration summary block.
    pub fn summary_vms(&self) -> Option<&[VmStatus]> {
        self.status
            .as_ref()
            .and_then(|s| s.migration.as_ref())
            .map(|m| m.vms.as_slice())
            .filter(|vms| !vms.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
    #[serde(default)]
    pub warm: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub provider: PlanProviderRefs,
    #[serde(default)]
    pub map: PlanMappingRefs,
    #[serde(default)]
    pub vms: Vec<PlanVm>,
}

/// Source and destination provider references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanProviderRefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ObjectRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<ObjectRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMappingRefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<ObjectRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<ObjectRef>,
}

/// A VM selected for migration, with its hook attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanVm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<PlanHookRef>,
}

impl PlanVm {
    pub fn vm_ref(&self) -> VmRef {
        VmRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Hook attached to a VM at a pipeline step (`PreHook` or `PostHook`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanHookRef {
    pub hook: ObjectRef,
    pub step: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration: Option<PlanMigrationSummary>,
}

/// The plan's copy of its most recent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMigrationSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default)]
    pub vms: Vec<VmStatus>,
}

// ── Migration ────────────────────────────────────────────────────────

/// One execution attempt of a Plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Migration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: MigrationSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MigrationStatus>,
}

impl_resource!(Migration, "Migration");

impl Migration {
    /// Start stamp, when present and parseable.
    pub fn started_at(&self) -> Option<Timestamp> {
        Timestamp::parse_opt(self.status.as_ref().and_then(|s| s.started.as_deref()))
    }

    pub fn created_at(&self) -> Option<Timestamp> {
        Timestamp::parse_opt(self.metadata.creation_timestamp.as_deref())
    }

    /// Scheduled cutover. A malformed value reads as unscheduled.
    pub fn cutover_at(&self) -> Option<Timestamp> {
        Timestamp::parse_opt(self.spec.cutover.as_deref())
    }

    pub fn vms(&self) -> &[VmStatus] {
        self.status
            .as_ref()
            .map(|s| s.vms.as_slice())
            .unwrap_or_default()
    }

    pub fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSpec {
    #[serde(default)]
    pub plan: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutover: Option<String>,
    #[serde(default, alias = "canceledVms", skip_serializing_if = "Vec::is_empty")]
    pub cancel: Vec<VmRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub vms: Vec<VmStatus>,
}

/// Identifies a VM by inventory id, name, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Per-VM progress within one Migration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub pipeline: Vec<Task>,
}

impl VmStatus {
    pub fn is_started(&self) -> bool {
        present(&self.started)
    }

    pub fn is_completed(&self) -> bool {
        present(&self.completed)
    }

    /// Whether the VM reports a non-empty error payload.
    pub fn has_error(&self) -> bool {
        self.error.as_ref().is_some_and(|e| !e.is_empty())
    }

    pub fn is_canceled(&self) -> bool {
        has_condition(&self.conditions, "Canceled")
    }

    /// Completed with no error and not canceled.
    pub fn is_succeeded(&self) -> bool {
        self.is_completed() && !self.has_error() && !self.is_canceled()
    }

    /// Whether this status describes the VM identified by `vm`.
    pub fn matches(&self, vm: &VmRef) -> bool {
        match (&vm.id, &self.id) {
            (Some(a), Some(b)) => a == b,
            _ => vm.name.is_some() && vm.name == self.name,
        }
    }
}

/// One pipeline step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<TaskProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl Task {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_started(&self) -> bool {
        present(&self.started)
    }

    pub fn is_completed(&self) -> bool {
        present(&self.completed)
    }

    pub fn has_error(&self) -> bool {
        self.error.as_ref().is_some_and(|e| !e.is_empty())
    }
}

/// A `completed` of `total` counter. Units vary by task (MB, disks, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub total: u64,
}

impl TaskProgress {
    /// Completion percentage, `None` when the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        (self.total > 0)
            .then(|| (self.completed.min(self.total) as f64 / self.total as f64) * 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl TaskError {
    pub fn is_empty(&self) -> bool {
        !present(&self.phase) && self.reasons.iter().all(|r| r.trim().is_empty())
    }
}

// ── Mappings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingKind {
    Network,
    Storage,
}

impl MappingKind {
    /// Wire `kind` of this mapping flavour.
    pub fn as_kind(&self) -> &'static str {
        match self {
            Self::Network => "NetworkMap",
            Self::Storage => "StorageMap",
        }
    }

    /// Suffix used for deterministic sub-resource names.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Storage => "storage",
        }
    }
}

impl std::fmt::Display for MappingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_kind())
    }
}

/// A NetworkMap or StorageMap. Both share one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: MappingSpec,
}

impl_resource!(Mapping, "Mapping");

impl Mapping {
    /// Fresh mapping body of the given kind.
    pub fn new(kind: MappingKind, metadata: ObjectMeta, spec: MappingSpec) -> Self {
        Self {
            api_version: Some(FORKLIFT_API_VERSION.to_string()),
            kind: Some(kind.as_kind().to_string()),
            metadata,
            spec,
        }
    }

    pub fn mapping_kind(&self) -> Option<MappingKind> {
        match self.kind.as_deref() {
            Some("NetworkMap") => Some(MappingKind::Network),
            Some("StorageMap") => Some(MappingKind::Storage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSpec {
    #[serde(default)]
    pub provider: PlanProviderRefs,
    #[serde(default)]
    pub map: Vec<MappingPair>,
}

/// Source and destination of one mapping entry. Shapes differ between
/// network and storage entries, so both sides stay as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingPair {
    pub source: serde_json::Value,
    pub destination: serde_json::Value,
}

// ── Hooks, providers, secrets ────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: HookSpec,
}

impl_resource!(Hook, "Hook");

impl Hook {
    pub fn new(metadata: ObjectMeta, spec: HookSpec) -> Self {
        Self {
            api_version: Some(FORKLIFT_API_VERSION.to_string()),
            kind: Some("Hook".to_string()),
            metadata,
            spec,
        }
    }
}

/// Container image plus an optional base64 Ansible playbook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpec {
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playbook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<u64>,
}

/// A Provider custom resource as stored in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ProviderSpec,
}

impl_resource!(ProviderObject, "Provider");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<ObjectRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
}

/// Core `v1` Secret. Values in `data` are base64-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl_resource!(Secret, "Secret");
