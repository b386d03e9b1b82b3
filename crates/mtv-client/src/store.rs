//! # Resource Store Trait
//!
//! The seam between the orchestrator and whatever holds the objects. Bodies
//! travel as `serde_json::Value` so the store stays kind-agnostic;
//! [`StoreExt`] layers typed access over any store.

use async_trait::async_trait;
use mtv_core::Resource;
use serde_json::Value;

use crate::error::StoreError;
use crate::kind::ResourceKind;

/// CRUD over namespaced objects.
///
/// `patch` applies a JSON merge patch (RFC 7386). `get` maps a missing
/// object to `Ok(None)`; every other call surfaces 404 as an error.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn list(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<Value>, StoreError>;

    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// Create an object. The returned body carries server-assigned fields
    /// (name when `generateName` was used, uid, creation timestamp).
    async fn create(
        &self,
        kind: ResourceKind,
        namespace: &str,
        body: &Value,
    ) -> Result<Value, StoreError>;

    async fn patch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<Value, StoreError>;

    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str)
        -> Result<(), StoreError>;
}

/// Typed helpers over [`ResourceStore`].
#[async_trait]
pub trait StoreExt: ResourceStore {
    async fn list_as<T>(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<T>, StoreError>
    where
        T: Resource + Send + Sync + 'static,
    {
        self.list(kind, namespace)
            .await?
            .into_iter()
            .map(|v| T::from_value(v).map_err(StoreError::from))
            .collect()
    }

    async fn get_as<T>(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<T>, StoreError>
    where
        T: Resource + Send + Sync + 'static,
    {
        match self.get(kind, namespace, name).await? {
            Some(v) => Ok(Some(T::from_value(v)?)),
            None => Ok(None),
        }
    }

    async fn create_as<T>(
        &self,
        kind: ResourceKind,
        namespace: &str,
        object: &T,
    ) -> Result<T, StoreError>
    where
        T: Resource + Send + Sync + 'static,
    {
        let body = object.to_value()?;
        let created = self.create(kind, namespace, &body).await?;
        Ok(T::from_value(created)?)
    }

    async fn patch_as<T>(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<T, StoreError>
    where
        T: Resource + Send + Sync + 'static,
    {
        let patched = self.patch(kind, namespace, name, patch).await?;
        Ok(T::from_value(patched)?)
    }
}

impl<S: ResourceStore + ?Sized> StoreExt for S {}
