//! Resource store client configuration.
//!
//! Points the HTTP store at a Kubernetes-style API server. Values come from
//! environment variables, a YAML file, or explicit construction for tests.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "openshift-mtv";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the cluster API server.
///
/// Custom `Debug` implementation redacts the `token` field.
#[derive(Clone)]
pub struct ClientConfig {
    /// API server base URL, e.g. `https://api.cluster.example:6443`.
    pub api_url: Url,
    /// Bearer token. Anonymous requests are sent when absent.
    pub token: Option<Zeroizing<String>>,
    /// Namespace holding plans, mappings and hooks.
    pub namespace: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("namespace", &self.namespace)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `MTV_API_URL` (required)
    /// - `MTV_API_TOKEN` (optional)
    /// - `MTV_NAMESPACE` (default: `openshift-mtv`)
    /// - `MTV_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = var("MTV_API_URL").ok_or(ConfigError::MissingVar("MTV_API_URL"))?;
        let api_url = parse_url("MTV_API_URL", &raw_url)?;
        let timeout_secs = match var("MTV_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "MTV_TIMEOUT_SECS".to_string(),
                value: raw,
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            api_url,
            token: var("MTV_API_TOKEN")
                .filter(|t| !t.is_empty())
                .map(Zeroizing::new),
            namespace: var("MTV_NAMESPACE")
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            timeout_secs,
        })
    }

    /// Load configuration from a YAML file.
    ///
    /// ```yaml
    /// apiUrl: https://api.cluster.example:6443
    /// token: sha256~...          # or tokenFile: /var/run/secrets/.../token
    /// namespace: openshift-mtv   # optional
    /// timeoutSecs: 30            # optional
    /// ```
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let token = match (file.token, file.token_file) {
            (Some(token), _) => Some(token),
            (None, Some(token_path)) => Some(
                std::fs::read_to_string(&token_path)
                    .map_err(|source| ConfigError::Io {
                        path: token_path.clone(),
                        source,
                    })?
                    .trim()
                    .to_string(),
            ),
            (None, None) => None,
        };
        Ok(Self {
            api_url: parse_url("apiUrl", &file.api_url)?,
            token: token.filter(|t| !t.is_empty()).map(Zeroizing::new),
            namespace: file
                .namespace
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            timeout_secs: file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Configuration pointing at a local server (for testing).
    pub fn local(url: &str, namespace: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_url("local", url)?,
            token: Some(Zeroizing::new("test-token".to_string())),
            namespace: namespace.to_string(),
            timeout_secs: 5,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    api_url: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    token_file: Option<PathBuf>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(key.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn env_defaults() {
        let cfg =
            ClientConfig::from_vars(vars(&[("MTV_API_URL", "https://api.example:6443")])).unwrap();
        assert_eq!(cfg.namespace, DEFAULT_NAMESPACE);
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(cfg.token.is_none());
    }

    #[test]
    fn env_requires_url() {
        let err = ClientConfig::from_vars(vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("MTV_API_URL")));
    }

    #[test]
    fn env_rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_vars(vars(&[("MTV_API_URL", "not a url")])),
            Err(ConfigError::InvalidUrl(..))
        ));
        assert!(matches!(
            ClientConfig::from_vars(vars(&[
                ("MTV_API_URL", "https://api.example"),
                ("MTV_TIMEOUT_SECS", "soon"),
            ])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = ClientConfig::from_vars(vars(&[
            ("MTV_API_URL", "https://api.example"),
            ("MTV_API_TOKEN", "sha256~secret"),
            ("MTV_NAMESPACE", "konveyor-forklift"),
        ]))
        .unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("sha256~secret"));
        assert!(debug.contains("[REDACTED]"));
        assert_eq!(cfg.namespace, "konveyor-forklift");
    }

    #[test]
    fn yaml_file_with_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token");
        std::fs::write(&token_path, "abc123\n").unwrap();
        let cfg_path = dir.path().join("mtv.yaml");
        let mut f = std::fs::File::create(&cfg_path).unwrap();
        writeln!(f, "apiUrl: https://api.example:6443").unwrap();
        writeln!(f, "tokenFile: {}", token_path.display()).unwrap();
        writeln!(f, "timeoutSecs: 12").unwrap();
        drop(f);

        let cfg = ClientConfig::from_yaml_file(&cfg_path).unwrap();
        assert_eq!(cfg.token.as_deref().map(String::as_str), Some("abc123"));
        assert_eq!(cfg.timeout_secs, 12);
        assert_eq!(cfg.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn yaml_file_missing_is_io_error() {
        let err = ClientConfig::from_yaml_file(Path::new("/nonexistent/mtv.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn local_builds_valid_config() {
        let cfg = ClientConfig::local("http://127.0.0.1:9000", "mtv").unwrap();
        assert_eq!(cfg.api_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(cfg.timeout_secs, 5);
    }
}
