//! Program domain model
//!
//! A program is an enrollable course of care (HIV, MDR-TB, ...) named by a
//! concept from the concept dictionary.

mod types;

pub use types::{is_blank, Concept, ConceptId, Program, ProgramId};
