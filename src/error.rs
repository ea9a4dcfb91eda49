//! Error types for the normalizer.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! the exact failure. Scope misses (unconfigured types, missing targets)
//! are not errors and never surface here.

use thiserror::Error;

/// Validation errors raised by builders and helper constructors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Field '{field}' cannot be empty")]
    EmptyField {
        field: String,
    },
}

/// Relationship-shape errors raised while applying an event.
///
/// These abort the whole `apply` call and signal an integration bug in the
/// producer of the event, never a transient condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReduceError {
    #[error("Attempted to update relationship '{relationship}' that does not exist on {resource_type}/{id}")]
    UnknownRelationship {
        resource_type: String,
        id: String,
        relationship: String,
    },

    #[error("Relationship '{relationship}' on {resource_type}/{id} is {expected}, update data MUST be {expected} as well")]
    CardinalityMismatch {
        resource_type: String,
        id: String,
        relationship: String,
        expected: Cardinality,
    },

    #[error("Relationship '{relationship}' links the current resource, but the event carries no single primary resource")]
    NoCurrentResource {
        relationship: String,
    },
}

/// Shape of relationship data, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Single identifier or null.
    ToOne,
    /// Ordered list of identifiers.
    ToMany,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToOne => write!(f, "to-one"),
            Self::ToMany => write!(f, "to-many"),
        }
    }
}

/// Errors raised while loading declarative configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse merge configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Target bucket for type '{resource_type}' cannot be empty")]
    EmptyTarget {
        resource_type: String,
    },
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum NormalizerError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Reduce error: {0}")]
    Reduce(#[from] ReduceError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl NormalizerError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a reduce error.
    #[must_use]
    pub const fn is_reduce(&self) -> bool {
        matches!(self, Self::Reduce(_))
    }

    /// Returns true if this is a config error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Result type alias for normalizer operations.
pub type NormalizerResult<T> = Result<T, NormalizerError>;
