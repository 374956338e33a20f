//! Error types for the config snapshot protocol

use std::path::PathBuf;

use thiserror::Error;

use crate::compatibility::ViolationReport;
use crate::wire::DecodeError;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Config snapshot protocol errors
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Schema compatibility check failed:\n{0}")]
    Incompatible(ViolationReport),

    #[error("Codegen failed for target {target}: {reason}")]
    Codegen { target: String, reason: String },

    #[error("Transmission failed{}: {reason}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Transmission { status: Option<u16>, reason: String },

    #[error("Timed out after {millis}ms during {step}")]
    Timeout { step: &'static str, millis: u64 },

    #[error("Cannot encode {field}: {reason}")]
    Encode { field: &'static str, reason: String },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Baseline lock held at {}: another schema gate run is in progress", .0.display())]
    Locked(PathBuf),

    #[error("Invalid baseline format: {0}")]
    InvalidBaseline(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Version counter overflow at {0}")]
    VersionOverflow(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl ProtocolError {
    /// Whether a publish cycle that failed with this error may simply be run again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProtocolError::Transmission { .. } | ProtocolError::Timeout { .. } | ProtocolError::Store(_)
        )
    }
}
