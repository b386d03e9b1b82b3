//! # In-Memory Resource Store
//!
//! A [`ResourceStore`] that keeps objects in a map and answers like the API
//! server: 409 on duplicate create, 404 on missing patch or delete, server
//! fields filled on create. Failures can be injected per operation and kind,
//! and every call is recorded so tests can assert on ordering.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use mtv_core::Timestamp;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::kind::ResourceKind;
use crate::store::ResourceStore;

/// Store operation, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Get,
    Create,
    Patch,
    Delete,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "LIST",
            Self::Get => "GET",
            Self::Create => "CREATE",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One recorded call. `name` is the resolved object name for creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: Option<String>,
}

type Key = (ResourceKind, String, String);

#[derive(Default)]
struct Inner {
    objects: BTreeMap<Key, Value>,
    failures: HashMap<(StoreOp, ResourceKind), u16>,
    calls: Vec<StoreCall>,
}

/// In-memory [`ResourceStore`].
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object directly, bypassing create semantics and the call log.
    pub fn seed(&self, kind: ResourceKind, namespace: &str, object: Value) {
        let name = object
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.inner
            .lock()
            .objects
            .insert((kind, namespace.to_string(), name), object);
    }

    /// Current body of an object, without touching the call log.
    pub fn snapshot(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<Value> {
        self.inner
            .lock()
            .objects
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Number of stored objects of `kind` in `namespace`.
    pub fn count(&self, kind: ResourceKind, namespace: &str) -> usize {
        self.inner
            .lock()
            .objects
            .keys()
            .filter(|(k, ns, _)| *k == kind && ns == namespace)
            .count()
    }

    /// Make every `op` on `kind` fail with `status` until cleared.
    pub fn fail(&self, op: StoreOp, kind: ResourceKind, status: u16) {
        self.inner.lock().failures.insert((op, kind), status);
    }

    pub fn clear_failures(&self) {
        self.inner.lock().failures.clear();
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().calls.clone()
    }

    fn begin(
        inner: &mut Inner,
        op: StoreOp,
        kind: ResourceKind,
        namespace: &str,
        name: Option<&str>,
    ) -> Result<(), StoreError> {
        inner.calls.push(StoreCall {
            op,
            kind,
            namespace: namespace.to_string(),
            name: name.map(str::to_string),
        });
        match inner.failures.get(&(op, kind)) {
            Some(&status) => Err(api_error(op, kind, namespace, name, status, "injected failure")),
            None => Ok(()),
        }
    }
}

fn api_error(
    op: StoreOp,
    kind: ResourceKind,
    namespace: &str,
    name: Option<&str>,
    status: u16,
    body: &str,
) -> StoreError {
    StoreError::Api {
        endpoint: format!("{} {}", op.as_str(), kind.path(namespace, name)),
        status,
        body: body.to_string(),
    }
}

/// Apply a JSON merge patch (RFC 7386) to `target` in place.
pub fn apply_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Some(target) = target.as_object_mut() {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                apply_merge_patch(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

fn generated_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..5].to_string()
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn list(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<Value>, StoreError> {
        let mut inner = self.inner.lock();
        Self::begin(&mut inner, StoreOp::List, kind, namespace, None)?;
        Ok(inner
            .objects
            .iter()
            .filter(|((k, ns, _), _)| *k == kind && ns == namespace)
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Value>, StoreError> {
        let mut inner = self.inner.lock();
        Self::begin(&mut inner, StoreOp::Get, kind, namespace, Some(name))?;
        Ok(inner
            .objects
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create(
        &self,
        kind: ResourceKind,
        namespace: &str,
        body: &Value,
    ) -> Result<Value, StoreError> {
        let mut object = body.clone();
        let explicit = object
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let prefix = object
            .pointer("/metadata/generateName")
            .and_then(Value::as_str)
            .map(str::to_string);
        let name = match (explicit, prefix) {
            (Some(name), _) => name,
            (None, Some(prefix)) => format!("{prefix}{}", generated_suffix()),
            (None, None) => {
                let mut inner = self.inner.lock();
                Self::begin(&mut inner, StoreOp::Create, kind, namespace, None)?;
                return Err(api_error(
                    StoreOp::Create,
                    kind,
                    namespace,
                    None,
                    422,
                    "metadata.name or metadata.generateName is required",
                ));
            }
        };

        let mut inner = self.inner.lock();
        Self::begin(&mut inner, StoreOp::Create, kind, namespace, Some(&name))?;
        let key = (kind, namespace.to_string(), name.clone());
        if inner.objects.contains_key(&key) {
            return Err(api_error(
                StoreOp::Create,
                kind,
                namespace,
                Some(&name),
                409,
                "AlreadyExists",
            ));
        }

        apply_merge_patch(
            &mut object,
            &serde_json::json!({
                "metadata": {
                    "name": name,
                    "namespace": namespace,
                    "uid": uuid::Uuid::new_v4().to_string(),
                    "creationTimestamp": Timestamp::now().to_rfc3339(),
                }
            }),
        );
        if let Some(map) = object.as_object_mut() {
            map.entry("apiVersion")
                .or_insert_with(|| Value::from(kind.api_version()));
            map.entry("kind").or_insert_with(|| Value::from(kind.as_str()));
        }
        inner.objects.insert(key, object.clone());
        Ok(object)
    }

    async fn patch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<Value, StoreError> {
        let mut inner = self.inner.lock();
        Self::begin(&mut inner, StoreOp::Patch, kind, namespace, Some(name))?;
        let key = (kind, namespace.to_string(), name.to_string());
        let Some(object) = inner.objects.get_mut(&key) else {
            return Err(api_error(StoreOp::Patch, kind, namespace, Some(name), 404, "NotFound"));
        };
        apply_merge_patch(object, patch);
        Ok(object.clone())
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        Self::begin(&mut inner, StoreOp::Delete, kind, namespace, Some(name))?;
        match inner
            .objects
            .remove(&(kind, namespace.to_string(), name.to_string()))
        {
            Some(_) => Ok(()),
            None => Err(api_error(StoreOp::Delete, kind, namespace, Some(name), 404, "NotFound")),
        }
    }
}
