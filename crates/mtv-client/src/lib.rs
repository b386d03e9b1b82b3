//! # mtv-client: Resource Store Access
//!
//! The only path by which the stack reads or writes cluster objects. Two
//! [`ResourceStore`] implementations share one trait:
//!
//! - [`HttpResourceStore`] talks to a Kubernetes-style API server.
//! - [`InMemoryStore`] answers the same way from a map, with injectable
//!   failures, and backs the orchestrator tests.
//!
//! ## API Path Convention
//!
//! Forklift kinds live under `/apis/forklift.konveyor.io/v1beta1/namespaces/{ns}/{plural}`;
//! secrets under `/api/v1/namespaces/{ns}/secrets`. See [`ResourceKind::path`].

pub mod config;
pub mod error;
pub mod http;
pub mod kind;
pub mod memory;
pub mod store;

pub use config::{ClientConfig, ConfigError, DEFAULT_NAMESPACE, DEFAULT_TIMEOUT_SECS};
pub use error::StoreError;
pub use http::HttpResourceStore;
pub use kind::ResourceKind;
pub use memory::{apply_merge_patch, InMemoryStore, StoreCall, StoreOp};
pub use store::{ResourceStore, StoreExt};
