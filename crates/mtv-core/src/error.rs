//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types shared across the stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Classification never errors: the classifier and reducer are total
//!   functions over optional fields, so nothing in this module is produced
//!   on the read path.
//! - Validation errors name the offending field and value.
//! - Serialization errors carry the resource kind being decoded.

use thiserror::Error;

/// Top-level error type for the MTV stack.
#[derive(Error, Debug)]
pub enum MtvError {
    /// Input failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A resource could not be decoded from its wire form.
    #[error("failed to decode {kind}: {source}")]
    Decode {
        /// Resource kind being decoded (e.g. "Plan").
        kind: &'static str,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    /// A resource could not be encoded to its wire form.
    #[error("failed to encode {kind}: {source}")]
    Encode {
        /// Resource kind being encoded.
        kind: &'static str,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    /// A timestamp string was not valid RFC 3339.
    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp {
        /// The rejected input.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// Error raised when user-supplied input is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A resource name is not a valid DNS-1123 label.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// A name is reserved and may not be used for a resource.
    #[error("name {0:?} is reserved due to a path conflict and cannot be used")]
    ReservedName(String),

    /// A required field was empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
