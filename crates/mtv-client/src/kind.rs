//! Resource kinds and their API paths.

use mtv_core::MappingKind;

const FORKLIFT_GROUP_VERSION: &str = "forklift.konveyor.io/v1beta1";

/// A kind of object the store can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Plan,
    Migration,
    NetworkMap,
    StorageMap,
    Hook,
    Provider,
    Secret,
}

impl ResourceKind {
    /// The wire `kind` string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "Plan",
            Self::Migration => "Migration",
            Self::NetworkMap => "NetworkMap",
            Self::StorageMap => "StorageMap",
            Self::Hook => "Hook",
            Self::Provider => "Provider",
            Self::Secret => "Secret",
        }
    }

    /// Lowercase plural used in URL paths.
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Plan => "plans",
            Self::Migration => "migrations",
            Self::NetworkMap => "networkmaps",
            Self::StorageMap => "storagemaps",
            Self::Hook => "hooks",
            Self::Provider => "providers",
            Self::Secret => "secrets",
        }
    }

    /// `group/version` for Forklift kinds, `v1` for core kinds.
    pub fn api_version(&self) -> &'static str {
        match self {
            Self::Secret => "v1",
            _ => FORKLIFT_GROUP_VERSION,
        }
    }

    pub fn for_mapping(kind: MappingKind) -> Self {
        match kind {
            MappingKind::Network => Self::NetworkMap,
            MappingKind::Storage => Self::StorageMap,
        }
    }

    /// Collection path, or object path when `name` is given.
    ///
    /// `/apis/forklift.konveyor.io/v1beta1/namespaces/{ns}/plans[/{name}]`,
    /// `/api/v1/namespaces/{ns}/secrets[/{name}]` for core kinds.
    pub fn path(&self, namespace: &str, name: Option<&str>) -> String {
        let root = match self {
            Self::Secret => "/api".to_string(),
            _ => "/apis".to_string(),
        };
        let mut path = format!(
            "{root}/{}/namespaces/{namespace}/{}",
            self.api_version(),
            self.plural()
        );
        if let Some(name) = name {
            path.push('/');
            path.push_str(name);
        }
        path
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forklift_paths() {
        assert_eq!(
            ResourceKind::Plan.path("mtv", None),
            "/apis/forklift.konveyor.io/v1beta1/namespaces/mtv/plans"
        );
        assert_eq!(
            ResourceKind::StorageMap.path("mtv", Some("p-storage")),
            "/apis/forklift.konveyor.io/v1beta1/namespaces/mtv/storagemaps/p-storage"
        );
    }

    #[test]
    fn secrets_use_core_group() {
        assert_eq!(
            ResourceKind::Secret.path("mtv", Some("creds")),
            "/api/v1/namespaces/mtv/secrets/creds"
        );
    }

    #[test]
    fn mapping_kinds() {
        assert_eq!(ResourceKind::for_mapping(MappingKind::Network), ResourceKind::NetworkMap);
        assert_eq!(ResourceKind::for_mapping(MappingKind::Storage).as_str(), "StorageMap");
    }
}
