//! # Program Service Errors

use thiserror::Error;

use crate::program::{ConceptId, ProgramId};
use crate::store::StoreError;
use crate::validation::{Errors, ValidationError};

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Program service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Save refused; carries every field error found
    #[error("Program failed validation: {0}")]
    Invalid(Errors),

    #[error("Program not found: {0}")]
    NotFound(ProgramId),

    /// The uuid does not belong to the program with this id
    #[error("Program {0} has a different uuid")]
    IdentityMismatch(ProgramId),

    #[error("Concept not found: {0}")]
    UnknownConcept(ConceptId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Invalid(_) => "PROG_INVALID",
            ServiceError::NotFound(_) => "PROG_NOT_FOUND",
            ServiceError::IdentityMismatch(_) => "PROG_IDENTITY_MISMATCH",
            ServiceError::UnknownConcept(_) => "PROG_UNKNOWN_CONCEPT",
            ServiceError::Validation(ValidationError::Store(e)) => e.code(),
            ServiceError::Validation(ValidationError::MissingRecord) => "PROG_MISSING_RECORD",
            ServiceError::Validation(_) => "PROG_MALFORMED",
            ServiceError::Store(e) => e.code(),
        }
    }

    /// Field errors, when this is a validation rejection
    pub fn field_errors(&self) -> Option<&Errors> {
        match self {
            ServiceError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}
