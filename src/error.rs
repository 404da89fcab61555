//! Error types for the screenplay core.

use thiserror::Error;

/// Result type alias for screenplay operations.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors surfaced synchronously at the call site of a document operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Unknown element (or tag) identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Mutation attempted on a locked element without an override.
    #[error("Element is locked: {0}")]
    Locked(String),

    /// Disallowed element type change.
    #[error("Cannot convert {from} to {to}: {reason}")]
    InvalidConversion {
        from: String,
        to: String,
        reason: String,
    },

    /// Offsets outside the current text bounds.
    #[error("Invalid range {start}..{end} for text of length {length}")]
    InvalidRange {
        start: usize,
        end: usize,
        length: usize,
    },

    /// Malformed identifier string.
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Settings that cannot be used (e.g. zero lines per page).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ScriptError {
    /// Creates a NotFound error.
    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound(id.to_string())
    }

    /// Creates a Locked error.
    pub fn locked(id: impl ToString) -> Self {
        Self::Locked(id.to_string())
    }

    /// Creates an InvalidConversion error.
    pub fn invalid_conversion(
        from: impl ToString,
        to: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConversion {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidRange error.
    pub fn invalid_range(start: usize, end: usize, length: usize) -> Self {
        Self::InvalidRange { start, end, length }
    }

    /// Creates an InvalidId error.
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    /// Creates an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates a Serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<serde_json::Error> for ScriptError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
