//! # Store Errors

use std::path::Path;

use thiserror::Error;

use crate::program::ProgramId;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record and concept store errors.
///
/// These are environment failures. They are never folded into field errors;
/// callers see them as-is.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store file corrupted: {0}")]
    Corrupted(String),

    #[error("Duplicate program id: {0}")]
    DuplicateProgramId(ProgramId),

    /// The program's id and uuid point at different stored records
    #[error("Identity conflict: {0}")]
    IdentityConflict(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "PROG_STORE_UNAVAILABLE",
            StoreError::Corrupted(_) => "PROG_STORE_CORRUPTED",
            StoreError::DuplicateProgramId(_) => "PROG_STORE_DUPLICATE_ID",
            StoreError::IdentityConflict(_) => "PROG_STORE_IDENTITY_CONFLICT",
            StoreError::IoError(_) => "PROG_STORE_IO_ERROR",
            StoreError::Serialization(_) => "PROG_STORE_SERIALIZATION",
            StoreError::Internal(_) => "PROG_STORE_INTERNAL",
        }
    }

    /// I/O failure at a path
    pub fn io_at_path(action: &str, path: &Path, e: std::io::Error) -> Self {
        StoreError::IoError(format!("{} '{}': {}", action, path.display(), e))
    }

    pub(crate) fn poisoned() -> Self {
        StoreError::Internal("Lock poisoned".to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
