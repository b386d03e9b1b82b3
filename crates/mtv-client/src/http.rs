//! Resource store backed by a Kubernetes-style API server.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `{prefix}/namespaces/{ns}/{plural}` | list |
//! | GET    | `{prefix}/namespaces/{ns}/{plural}/{name}` | get |
//! | POST   | `{prefix}/namespaces/{ns}/{plural}` | create |
//! | PATCH  | `{prefix}/namespaces/{ns}/{plural}/{name}` | merge patch |
//! | DELETE | `{prefix}/namespaces/{ns}/{plural}/{name}` | delete |
//!
//! `{prefix}` is `/apis/forklift.konveyor.io/v1beta1` for Forklift kinds and
//! `/api/v1` for secrets. Requests are sent once; failures surface directly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, ConfigError};
use crate::error::StoreError;
use crate::kind::ResourceKind;
use crate::store::ResourceStore;

const MERGE_PATCH: &str = "application/merge-patch+json";

#[derive(Deserialize)]
struct ListBody {
    #[serde(default)]
    items: Vec<Value>,
}

/// HTTP implementation of [`ResourceStore`].
#[derive(Debug, Clone)]
pub struct HttpResourceStore {
    http: reqwest::Client,
    base_url: url::Url,
}

impl HttpResourceStore {
    /// Build a store from configuration. The bearer token, when present, is
    /// attached to every request.
    pub fn new(config: &ClientConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ConfigError::InvalidValue {
                    key: "token".to_string(),
                    value: "[REDACTED]".to_string(),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }

    fn url(&self, kind: ResourceKind, namespace: &str, name: Option<&str>) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            kind.path(namespace, name)
        )
    }

    async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        debug!(%endpoint, "store request");
        request.send().await.map_err(|e| StoreError::Http {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }

    async fn check(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, StoreError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        debug!(%endpoint, status, "store request rejected");
        Err(StoreError::Api {
            endpoint: endpoint.to_string(),
            status,
            body,
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T, StoreError> {
        resp.json().await.map_err(|e| StoreError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl ResourceStore for HttpResourceStore {
    async fn list(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<Value>, StoreError> {
        let endpoint = format!("GET {}", kind.path(namespace, None));
        let url = self.url(kind, namespace, None);
        let resp = self.send(&endpoint, self.http.get(&url)).await?;
        let resp = Self::check(&endpoint, resp).await?;
        let body: ListBody = Self::json(&endpoint, resp).await?;
        Ok(body.items)
    }

    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Value>, StoreError> {
        let endpoint = format!("GET {}", kind.path(namespace, Some(name)));
        let url = self.url(kind, namespace, Some(name));
        let resp = self.send(&endpoint, self.http.get(&url)).await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(&endpoint, resp).await?;
        Self::json(&endpoint, resp).await.map(Some)
    }

    async fn create(
        &self,
        kind: ResourceKind,
        namespace: &str,
        body: &Value,
    ) -> Result<Value, StoreError> {
        let endpoint = format!("POST {}", kind.path(namespace, None));
        let url = self.url(kind, namespace, None);
        let resp = self.send(&endpoint, self.http.post(&url).json(body)).await?;
        let resp = Self::check(&endpoint, resp).await?;
        Self::json(&endpoint, resp).await
    }

    async fn patch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<Value, StoreError> {
        let endpoint = format!("PATCH {}", kind.path(namespace, Some(name)));
        let url = self.url(kind, namespace, Some(name));
        let request = self
            .http
            .patch(&url)
            .header(CONTENT_TYPE, MERGE_PATCH)
            .body(patch.to_string());
        let resp = self.send(&endpoint, request).await?;
        let resp = Self::check(&endpoint, resp).await?;
        Self::json(&endpoint, resp).await
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let endpoint = format!("DELETE {}", kind.path(namespace, Some(name)));
        let url = self.url(kind, namespace, Some(name));
        let resp = self.send(&endpoint, self.http.delete(&url)).await?;
        Self::check(&endpoint, resp).await?;
        Ok(())
    }
}
