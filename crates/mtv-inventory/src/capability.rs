//! Provider capability checks over cluster provider objects and secrets.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mtv_core::{parse_go_bool, ProviderObject, Secret};

use crate::provider::{InventoryProvider, ProviderKind, ProviderRole};

/// Secret key holding the TLS verification opt-out.
pub const INSECURE_SKIP_VERIFY_KEY: &str = "insecureSkipVerify";

/// Provider kinds present in the cluster that can play `role`, sorted by
/// type name and deduplicated.
pub fn available_provider_kinds(
    providers: &[ProviderObject],
    role: ProviderRole,
) -> Vec<ProviderKind> {
    let mut kinds: Vec<ProviderKind> = providers
        .iter()
        .filter_map(|p| p.spec.type_.as_deref().and_then(ProviderKind::parse))
        .filter(|k| k.supports(role))
        .collect();
    kinds.sort_by_key(|k| k.as_str());
    kinds.dedup();
    kinds
}

/// An OpenShift provider with no URL is the cluster the stack runs in.
pub fn is_local_target(provider: &ProviderObject) -> bool {
    provider.spec.type_.as_deref() == Some(ProviderKind::Openshift.as_str())
        && provider.spec.url.as_deref().unwrap_or_default().is_empty()
}

/// Whether an oVirt provider's secret disables TLS verification.
///
/// Non-oVirt providers, missing secrets and undecodable values all read
/// as `false`.
pub fn ovirt_insecure_skip_verify(provider: &InventoryProvider, secrets: &[Secret]) -> bool {
    if provider.kind() != Some(ProviderKind::Ovirt) {
        return false;
    }
    let Some(secret_ref) = provider
        .object
        .as_ref()
        .and_then(|o| o.spec.secret.as_ref())
    else {
        return false;
    };
    let secret = secrets.iter().find(|s| {
        s.metadata.name_or_empty() == secret_ref.name
            && secret_ref
                .namespace
                .as_deref()
                .map_or(true, |ns| ns == s.metadata.namespace_or_empty())
    });
    secret
        .and_then(|s| s.data.get(INSECURE_SKIP_VERIFY_KEY))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|value| parse_go_bool(&value))
        .unwrap_or(false)
}
