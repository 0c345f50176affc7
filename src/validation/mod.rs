//! Program validation
//!
//! Validation reports problems, it does not raise them. Each violated rule
//! appends a `FieldError` to a caller-owned `Errors` sink:
//!
//! - Required name and concept
//! - Unique name (case-insensitive, trimmed)
//! - Length limits on name, description and retire reason
//!
//! Only environment failures (an unreachable store) or a missing record
//! surface as `ValidationError`.

mod errors;
mod limits;
mod validator;

pub use errors::{Errors, FieldError, FieldErrorKind, ValidationError, ValidationResult};
pub use limits::FieldLimits;
pub use validator::{fields, parse_program, ProgramValidator};
