//! Field errors and the error sink
//!
//! Field errors are accumulated, never raised:
//! - FIELD_REQUIRED: value absent, empty or whitespace only
//! - FIELD_DUPLICATE: value already used by another program
//! - FIELD_LENGTH_EXCEEDED: trimmed value longer than its limit
//!
//! `ValidationError` is reserved for failures that stop validation itself
//! (missing input, store failures).

use std::fmt;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::store::StoreError;

/// Kind of field-level violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Value is absent, empty or whitespace only
    RequiredField,
    /// Another record already uses this value
    DuplicateValue,
    /// Trimmed value is longer than allowed
    LengthExceeded { max: usize, actual: usize },
}

impl FieldErrorKind {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FieldErrorKind::RequiredField => "FIELD_REQUIRED",
            FieldErrorKind::DuplicateValue => "FIELD_DUPLICATE",
            FieldErrorKind::LengthExceeded { .. } => "FIELD_LENGTH_EXCEEDED",
        }
    }
}

/// A violation recorded against one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    field: String,
    kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> FieldErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        match self.kind {
            FieldErrorKind::RequiredField => format!("{} is required", self.field),
            FieldErrorKind::DuplicateValue => format!("{} is already in use", self.field),
            FieldErrorKind::LengthExceeded { max, actual } => format!(
                "{} exceeds maximum length of {} (got {})",
                self.field, max, actual
            ),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

/// Error sink: an ordered multimap from field name to field errors.
///
/// Owned by the caller and created fresh for each validation attempt. The
/// validator only appends. Fields keep the order in which they first failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Errors {
    entries: Vec<(String, Vec<FieldError>)>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error for `field`
    pub fn add_field_error(&mut self, field: &str, kind: FieldErrorKind) {
        let error = FieldError::new(field, kind);
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some((_, errors)) => errors.push(error),
            None => self.entries.push((field.to_string(), vec![error])),
        }
    }

    /// Whether any error was recorded
    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Whether `field` has at least one error
    pub fn has_field_errors(&self, field: &str) -> bool {
        !self.field_errors(field).is_empty()
    }

    /// Errors recorded for `field`, in insertion order
    pub fn field_errors(&self, field: &str) -> &[FieldError] {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, errors)| errors.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of errors across all fields
    pub fn error_count(&self) -> usize {
        self.entries.iter().map(|(_, errors)| errors.len()).sum()
    }

    /// Field names that have errors, in first-failure order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// All errors, grouped by field
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.entries
            .iter()
            .map(|(name, errors)| (name.as_str(), errors.as_slice()))
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (_, errors) in self.iter() {
            for error in errors {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}", error)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Serialize for Errors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, errors) in &self.entries {
            map.serialize_entry(field, errors)?;
        }
        map.end()
    }
}

/// Failures that stop validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Input was null; a record is a precondition of validation
    #[error("No program supplied for validation")]
    MissingRecord,

    #[error("Malformed program: {0}")]
    Malformed(String),

    #[error("Invalid field limits: {0}")]
    InvalidLimits(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;
