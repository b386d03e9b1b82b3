//! # Provider Kinds
//!
//! Every per-kind label and capability lives in one static table indexed by
//! [`ProviderKind`]. Nothing branches on provider-type strings outside
//! [`ProviderKind::parse`].

use std::collections::BTreeMap;

use mtv_core::{ObjectRef, ProviderObject};
use serde::{Deserialize, Serialize};

/// Supported provider technologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Vsphere,
    Ovirt,
    Openstack,
    Openshift,
    Ova,
}

/// Static description of a provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderKindInfo {
    pub kind: ProviderKind,
    /// Wire `spec.type` value.
    pub type_name: &'static str,
    pub title: &'static str,
    /// Lowercase plural noun for the kind's storage objects, empty when the
    /// kind exposes none.
    pub storage_title: &'static str,
    pub can_be_source: bool,
    pub can_be_target: bool,
    /// Inventory collection holding the kind's networks.
    pub network_collection: &'static str,
}

const KIND_TABLE: [ProviderKindInfo; 5] = [
    ProviderKindInfo {
        kind: ProviderKind::Vsphere,
        type_name: "vsphere",
        title: "VMware",
        storage_title: "datastores",
        can_be_source: true,
        can_be_target: false,
        network_collection: "networks",
    },
    ProviderKindInfo {
        kind: ProviderKind::Ovirt,
        type_name: "ovirt",
        title: "Red Hat Virtualization",
        storage_title: "storage domains",
        can_be_source: true,
        can_be_target: false,
        network_collection: "networks",
    },
    ProviderKindInfo {
        kind: ProviderKind::Openstack,
        type_name: "openstack",
        title: "OpenStack",
        storage_title: "volume types",
        can_be_source: true,
        can_be_target: false,
        network_collection: "networks",
    },
    ProviderKindInfo {
        kind: ProviderKind::Openshift,
        type_name: "openshift",
        title: "KubeVirt",
        storage_title: "storage classes",
        can_be_source: true,
        can_be_target: true,
        network_collection: "networkattachmentdefinitions",
    },
    ProviderKindInfo {
        kind: ProviderKind::Ova,
        type_name: "ova",
        title: "Open Virtual Appliance",
        storage_title: "",
        can_be_source: true,
        can_be_target: false,
        network_collection: "networks",
    },
];

impl ProviderKind {
    /// All kinds, in table order.
    pub fn all() -> &'static [ProviderKind] {
        &[
            Self::Vsphere,
            Self::Ovirt,
            Self::Openstack,
            Self::Openshift,
            Self::Ova,
        ]
    }

    pub fn info(&self) -> &'static ProviderKindInfo {
        // Table order matches declaration order.
        &KIND_TABLE[*self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        self.info().type_name
    }

    /// Parse a wire `spec.type` value.
    pub fn parse(type_name: &str) -> Option<Self> {
        KIND_TABLE
            .iter()
            .find(|info| info.type_name == type_name)
            .map(|info| info.kind)
    }

    /// Storage noun, optionally capitalised (`"Datastores"`).
    pub fn storage_title(&self, capitalize: bool) -> String {
        let title = self.info().storage_title;
        if !capitalize {
            return title.to_string();
        }
        let mut chars = title.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn supports(&self, role: ProviderRole) -> bool {
        match role {
            ProviderRole::Source => self.info().can_be_source,
            ProviderRole::Target => self.info().can_be_target,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    Source,
    Target,
}

/// A provider as reported by the inventory service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryProvider {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default, rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<ProviderObject>,
}

impl InventoryProvider {
    pub fn kind(&self) -> Option<ProviderKind> {
        ProviderKind::parse(&self.type_)
    }

    pub fn to_ref(&self) -> ObjectRef {
        ObjectRef {
            name: self.name.clone(),
            namespace: Some(self.namespace.clone()),
            uid: (!self.uid.is_empty()).then(|| self.uid.clone()),
        }
    }
}

/// Flatten the inventory's per-kind grouping (`{"vsphere": [...], ...}`)
/// into one list. Unknown groups are kept.
pub fn flatten_inventory(
    grouped: BTreeMap<String, Vec<InventoryProvider>>,
) -> Vec<InventoryProvider> {
    grouped
        .into_iter()
        .flat_map(|(type_, providers)| {
            providers.into_iter().map(move |mut p| {
                if p.type_.is_empty() {
                    p.type_ = type_.clone();
                }
                p
            })
        })
        .collect()
}
