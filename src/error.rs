//! Error types for schema construction, definition loading and serialization.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while constructing a [`SchemaSerializer`](crate::SchemaSerializer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("you have to provide a schema definition")]
    MissingDefinition,
}

impl ConfigurationError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading JSON documents or parsing declarative definitions.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("invalid schema definition with {} issue(s)", issues.len())]
    InvalidDefinition { issues: Vec<DefinitionIssue> },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Single problem found in a declarative definition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DefinitionIssue {
    /// JSON Pointer (RFC 6901) into the definition document.
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for DefinitionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.message)
    }
}

/// Irregularities reported by strict-mode serialization.
///
/// Permissive serialization never produces these; the same situations
/// surface there as omitted values.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("schema has no resource type")]
    MissingType,

    #[error("resource at index {index} has no id")]
    MissingId { index: usize },

    #[error("resource at index {index} has no field \"{field}\" for attribute \"{attribute}\"")]
    MissingAttribute {
        index: usize,
        attribute: String,
        field: String,
    },

    #[error("relationship \"{relationship}\" of resource at index {index} has an identifier without id")]
    MissingRelationshipId { index: usize, relationship: String },

    #[error("input cannot be represented as JSON: {source}")]
    InvalidInput {
        #[source]
        source: serde_json::Error,
    },
}

impl SerializeError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SerializeError::MissingType => 2,
            _ => 1,
        }
    }
}
