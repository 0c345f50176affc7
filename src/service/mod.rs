//! Program service
//!
//! Ties the validator to the stores: validate, refuse on field errors,
//! persist otherwise.

mod errors;
mod program_service;

pub use errors::{ServiceError, ServiceResult};
pub use program_service::ProgramService;
