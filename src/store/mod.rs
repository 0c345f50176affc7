//! Program and concept stores
//!
//! The validator and service only ever talk to the `ProgramStore` and
//! `ConceptStore` traits. Two implementations are provided:
//!
//! - `InMemoryProgramStore` / `InMemoryConceptStore` for tests and fixtures
//! - `FileStore`, a checksummed JSON file under the data directory
//!
//! Name lookups are case-insensitive and ignore surrounding whitespace.

mod dataset;
mod errors;
mod file;
mod memory;

pub use dataset::Dataset;
pub use errors::{StoreError, StoreResult};
pub use file::{FileStore, STORE_FILE_NAME};
pub use memory::{InMemoryConceptStore, InMemoryProgramStore};

use crate::program::{Concept, ConceptId, Program, ProgramId};

/// Persisted programs
pub trait ProgramStore: Send + Sync {
    /// Get a program by id
    fn find_by_id(&self, id: ProgramId) -> StoreResult<Option<Program>>;

    /// Get a program by name, using the store's name comparison rule
    fn find_by_name(&self, name: &str) -> StoreResult<Option<Program>>;

    /// All programs, ordered by id
    fn all(&self) -> StoreResult<Vec<Program>>;

    /// Insert or replace a program.
    ///
    /// Assigns the next free id when `program_id` is `None`. Returns the
    /// program as stored. Fails with `IdentityConflict` when the id and the
    /// uuid belong to different stored programs, or a new program reuses a
    /// stored uuid.
    fn save(&self, program: Program) -> StoreResult<Program>;
}

/// Concept dictionary lookups
pub trait ConceptStore: Send + Sync {
    fn find_by_id(&self, id: ConceptId) -> StoreResult<Option<Concept>>;
}

/// Normalize a program name for comparison
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_key_ignores_case_and_padding() {
        assert_eq!(name_key("  MDR-TB Program "), name_key("mdr-tb program"));
        assert_ne!(name_key("TB PROGRAM"), name_key("MDR-TB PROGRAM"));
    }
}
