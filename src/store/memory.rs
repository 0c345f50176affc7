//! In-memory stores
//!
//! Used directly by tests and as the working set behind `FileStore`.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::{name_key, ConceptStore, ProgramStore};
use crate::program::{Concept, ConceptId, Program, ProgramId};

#[derive(Debug, Clone, Default)]
struct ProgramTable {
    programs: BTreeMap<ProgramId, Program>,
    next_id: u64,
}

impl ProgramTable {
    fn allocate_id(&mut self) -> ProgramId {
        self.next_id = self.next_id.max(1);
        let id = ProgramId(self.next_id);
        self.next_id += 1;
        id
    }

    /// An id and a uuid must name the same record, or both be new.
    fn check_identity(&self, program: &Program) -> StoreResult<()> {
        if let Some(id) = program.program_id {
            if let Some(stored) = self.programs.get(&id) {
                if stored.uuid != program.uuid {
                    return Err(StoreError::IdentityConflict(format!(
                        "program {} has uuid {}, not {}",
                        id, stored.uuid, program.uuid
                    )));
                }
            }
        }

        let owner = self
            .programs
            .values()
            .find(|p| p.uuid == program.uuid)
            .and_then(|p| p.program_id);
        match owner {
            Some(owner) if Some(owner) != program.program_id => {
                Err(StoreError::IdentityConflict(format!(
                    "uuid {} belongs to program {}",
                    program.uuid, owner
                )))
            }
            _ => Ok(()),
        }
    }

    fn insert(&mut self, mut program: Program) -> StoreResult<Program> {
        self.check_identity(&program)?;
        let id = match program.program_id {
            Some(id) => id,
            None => self.allocate_id(),
        };
        program.program_id = Some(id);
        self.next_id = self.next_id.max(id.0 + 1);
        self.programs.insert(id, program.clone());
        Ok(program)
    }
}

/// In-memory program store
#[derive(Debug, Default)]
pub struct InMemoryProgramStore {
    table: RwLock<ProgramTable>,
}

impl InMemoryProgramStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing programs.
    ///
    /// Programs without an id are assigned one. Two programs claiming the
    /// same id or the same uuid are rejected.
    pub fn with_programs(programs: impl IntoIterator<Item = Program>) -> StoreResult<Self> {
        let mut table = ProgramTable::default();
        for program in programs {
            if let Some(id) = program.program_id {
                if table.programs.contains_key(&id) {
                    return Err(StoreError::DuplicateProgramId(id));
                }
            }
            table.insert(program)?;
        }
        Ok(Self {
            table: RwLock::new(table),
        })
    }

    pub fn len(&self) -> StoreResult<usize> {
        let table = self.table.read().map_err(|_| StoreError::poisoned())?;
        Ok(table.programs.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Save a program and hand the resulting contents to `commit`.
    ///
    /// The write lock is held throughout. The live table only changes once
    /// `commit` succeeds.
    pub(crate) fn save_with<F>(&self, program: Program, commit: F) -> StoreResult<Program>
    where
        F: FnOnce(Vec<Program>) -> StoreResult<()>,
    {
        let mut table = self.table.write().map_err(|_| StoreError::poisoned())?;
        let mut staged = table.clone();
        let saved = staged.insert(program)?;
        commit(staged.programs.values().cloned().collect())?;
        *table = staged;
        Ok(saved)
    }
}

impl ProgramStore for InMemoryProgramStore {
    fn find_by_id(&self, id: ProgramId) -> StoreResult<Option<Program>> {
        let table = self.table.read().map_err(|_| StoreError::poisoned())?;
        Ok(table.programs.get(&id).cloned())
    }

    fn find_by_name(&self, name: &str) -> StoreResult<Option<Program>> {
        let key = name_key(name);
        let table = self.table.read().map_err(|_| StoreError::poisoned())?;
        Ok(table
            .programs
            .values()
            .find(|p| p.name.as_deref().map(name_key).as_deref() == Some(key.as_str()))
            .cloned())
    }

    fn all(&self) -> StoreResult<Vec<Program>> {
        let table = self.table.read().map_err(|_| StoreError::poisoned())?;
        Ok(table.programs.values().cloned().collect())
    }

    fn save(&self, program: Program) -> StoreResult<Program> {
        let mut table = self.table.write().map_err(|_| StoreError::poisoned())?;
        table.insert(program)
    }
}

/// In-memory concept dictionary
#[derive(Debug, Default)]
pub struct InMemoryConceptStore {
    concepts: RwLock<BTreeMap<ConceptId, Concept>>,
}

impl InMemoryConceptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concepts(concepts: impl IntoIterator<Item = Concept>) -> Self {
        let concepts = concepts.into_iter().map(|c| (c.concept_id, c)).collect();
        Self {
            concepts: RwLock::new(concepts),
        }
    }

    /// All concepts, ordered by id
    pub fn all(&self) -> StoreResult<Vec<Concept>> {
        let concepts = self.concepts.read().map_err(|_| StoreError::poisoned())?;
        Ok(concepts.values().cloned().collect())
    }
}

impl ConceptStore for InMemoryConceptStore {
    fn find_by_id(&self, id: ConceptId) -> StoreResult<Option<Concept>> {
        let concepts = self.concepts.read().map_err(|_| StoreError::poisoned())?;
        Ok(concepts.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program_with_id(id: u64, name: &str) -> Program {
        Program {
            program_id: Some(ProgramId(id)),
            ..Program::named(name, ConceptId(3))
        }
    }

    #[test]
    fn test_save_assigns_sequential_ids() {
        let store = InMemoryProgramStore::new();
        let a = store.save(Program::named("A", ConceptId(1))).unwrap();
        let b = store.save(Program::named("B", ConceptId(1))).unwrap();
        assert_eq!(a.program_id, Some(ProgramId(1)));
        assert_eq!(b.program_id, Some(ProgramId(2)));
    }

    #[test]
    fn test_ids_continue_after_seeded_programs() {
        let store = InMemoryProgramStore::with_programs(vec![program_with_id(5, "SEEDED")]).unwrap();
        let saved = store.save(Program::named("NEW", ConceptId(1))).unwrap();
        assert_eq!(saved.program_id, Some(ProgramId(6)));
    }

    #[test]
    fn test_with_programs_rejects_duplicate_ids() {
        let result = InMemoryProgramStore::with_programs(vec![
            program_with_id(1, "A"),
            program_with_id(1, "B"),
        ]);
        assert!(matches!(result, Err(StoreError::DuplicateProgramId(ProgramId(1)))));
    }

    #[test]
    fn test_save_replaces_existing() {
        let store = InMemoryProgramStore::with_programs(vec![program_with_id(1, "A")]).unwrap();
        let mut program = store.find_by_id(ProgramId(1)).unwrap().unwrap();
        program.description = Some("changed".to_string());
        store.save(program).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        let reloaded = store.find_by_id(ProgramId(1)).unwrap().unwrap();
        assert_eq!(reloaded.description.as_deref(), Some("changed"));
    }

    #[test]
    fn test_save_rejects_id_with_foreign_uuid() {
        let store = InMemoryProgramStore::with_programs(vec![
            program_with_id(1, "HIV PROGRAM"),
            program_with_id(2, "MDR-TB PROGRAM"),
        ])
        .unwrap();
        let mdr_tb = store.find_by_id(ProgramId(2)).unwrap().unwrap();

        let mut hijack = store.find_by_id(ProgramId(1)).unwrap().unwrap();
        hijack.uuid = mdr_tb.uuid;
        hijack.name = Some("MDR-TB PROGRAM".to_string());

        let result = store.save(hijack);
        assert!(matches!(result, Err(StoreError::IdentityConflict(_))));
        let stored = store.find_by_id(ProgramId(1)).unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("HIV PROGRAM"));
    }

    #[test]
    fn test_save_rejects_new_program_reusing_uuid() {
        let store = InMemoryProgramStore::with_programs(vec![program_with_id(1, "HIV PROGRAM")]).unwrap();
        let mut copy = store.find_by_id(ProgramId(1)).unwrap().unwrap();
        copy.program_id = None;

        assert!(matches!(store.save(copy), Err(StoreError::IdentityConflict(_))));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_save_with_failed_commit_leaves_table_unchanged() {
        let store = InMemoryProgramStore::with_programs(vec![program_with_id(1, "HIV PROGRAM")]).unwrap();

        let result = store.save_with(Program::named("Oncology", ConceptId(3)), |programs| {
            assert_eq!(programs.len(), 2);
            Err(StoreError::IoError("disk full".into()))
        });

        assert!(matches!(result, Err(StoreError::IoError(_))));
        assert!(store.find_by_name("Oncology").unwrap().is_none());
        let next = store.save(Program::named("Oncology", ConceptId(3))).unwrap();
        assert_eq!(next.program_id, Some(ProgramId(2)));
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let store = InMemoryProgramStore::with_programs(vec![program_with_id(2, "MDR-TB PROGRAM")]).unwrap();
        assert!(store.find_by_name("mdr-tb program").unwrap().is_some());
        assert!(store.find_by_name(" MDR-TB PROGRAM ").unwrap().is_some());
        assert!(store.find_by_name("TB PROGRAM").unwrap().is_none());
    }

    #[test]
    fn test_concept_lookup() {
        let concepts = InMemoryConceptStore::with_concepts(vec![Concept::new(ConceptId(3), "COUGH SYRUP")]);
        assert!(concepts.find_by_id(ConceptId(3)).unwrap().is_some());
        assert!(concepts.find_by_id(ConceptId(4)).unwrap().is_none());
    }
}
