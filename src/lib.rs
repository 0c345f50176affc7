//! careprog - care program registry for EMR systems
//!
//! Programs (HIV, MDR-TB, ...) are validated field by field before they are
//! persisted. Validation accumulates field errors into a caller-owned sink
//! instead of failing on the first problem.

pub mod cli;
pub mod observability;
pub mod program;
pub mod service;
pub mod store;
pub mod validation;
