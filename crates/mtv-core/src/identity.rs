//! # Object Identity
//!
//! Metadata and reference types shared by every resource: the object
//! metadata block, the by-name reference a Plan uses to point at its
//! mappings, hooks and providers, and the owner-reference the orchestrator
//! patches onto sub-resources once their Plan exists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Kubernetes-style object metadata. Only the fields the stack reads or
/// writes are modeled; unknown fields are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    /// Metadata with a fixed name in a namespace.
    pub fn named(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    /// Metadata asking the server to generate a name from `prefix`.
    pub fn generated(prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            generate_name: Some(prefix.into()),
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    /// Name, or the empty string when not yet assigned.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Namespace, or the empty string when cluster-scoped or unset.
    pub fn namespace_or_empty(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }

    /// Reference to this object by name and namespace.
    pub fn to_ref(&self) -> ObjectRef {
        ObjectRef {
            name: self.name_or_empty().to_string(),
            namespace: self.namespace.clone(),
            uid: self.uid.clone(),
        }
    }
}

/// A by-name reference to another object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl ObjectRef {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            uid: None,
        }
    }

    /// Whether `meta` names the same object as this reference.
    ///
    /// Name and namespace must match; the uid is compared only when both
    /// sides carry one.
    pub fn matches(&self, meta: &ObjectMeta) -> bool {
        let uid_ok = match (&self.uid, &meta.uid) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        uid_ok
            && self.name == meta.name_or_empty()
            && self.namespace.as_deref().unwrap_or_default() == meta.namespace_or_empty()
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => write!(f, "{ns}/{}", self.name),
            _ => f.write_str(&self.name),
        }
    }
}

/// Owner back-reference. Garbage collection of mappings and hooks hangs
/// off this once the owning Plan is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: String,
}

/// Whether two metadata blocks identify the same object (name + namespace).
pub fn is_same_resource(a: Option<&ObjectMeta>, b: Option<&ObjectMeta>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.name.is_some() && a.name == b.name && a.namespace == b.namespace
        }
        _ => false,
    }
}

/// Validate a name as a DNS-1123 label: at most 63 characters of lowercase
/// alphanumerics or `-`, starting and ending with an alphanumeric.
pub fn validate_dns_label(name: &str) -> Result<(), ValidationError> {
    let reject = |reason: &str| {
        Err(ValidationError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };
    if name.is_empty() {
        return reject("name must not be empty");
    }
    if name.len() > 63 {
        return reject("name must be no more than 63 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return reject("name must consist of lower case alphanumeric characters or '-'");
    }
    if name.starts_with('-') || name.ends_with('-') {
        return reject("name must start and end with an alphanumeric character");
    }
    Ok(())
}
