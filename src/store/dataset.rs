//! Dataset snapshots
//!
//! A dataset is the full contents of a store: the concept dictionary plus all
//! programs. It is the unit that gets seeded from fixtures and written to disk.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::memory::{InMemoryConceptStore, InMemoryProgramStore};
use super::ProgramStore;
use crate::program::{Concept, Program};

/// Concepts and programs, serialized as one JSON document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub programs: Vec<Program>,
}

impl Dataset {
    /// Load a dataset fixture from a JSON file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::io_at_path("Failed to read dataset", path, e))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build in-memory stores holding this dataset
    pub fn into_memory_stores(self) -> StoreResult<(InMemoryProgramStore, InMemoryConceptStore)> {
        let programs = InMemoryProgramStore::with_programs(self.programs)?;
        let concepts = InMemoryConceptStore::with_concepts(self.concepts);
        Ok((programs, concepts))
    }

    /// Snapshot the current contents of two in-memory stores
    pub fn snapshot(
        programs: &InMemoryProgramStore,
        concepts: &InMemoryConceptStore,
    ) -> StoreResult<Self> {
        Ok(Self {
            concepts: concepts.all()?,
            programs: programs.all()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ConceptId, ProgramId};
    use crate::store::ConceptStore;

    const FIXTURE: &str = r#"{
        "concepts": [{"concept_id": 3, "name": "COUGH SYRUP"}],
        "programs": [
            {"program_id": 1, "name": "HIV PROGRAM", "concept": 3},
            {"program_id": 2, "name": "MDR-TB PROGRAM", "concept": 3}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let dataset = Dataset::from_json(FIXTURE).unwrap();
        assert_eq!(dataset.concepts.len(), 1);
        assert_eq!(dataset.programs.len(), 2);
    }

    #[test]
    fn test_into_memory_stores() {
        let (programs, concepts) = Dataset::from_json(FIXTURE).unwrap().into_memory_stores().unwrap();
        let mdr = programs.find_by_id(ProgramId(2)).unwrap().unwrap();
        assert_eq!(mdr.name.as_deref(), Some("MDR-TB PROGRAM"));
        assert!(concepts.find_by_id(ConceptId(3)).unwrap().is_some());
    }

    #[test]
    fn test_snapshot_round_trips_through_stores() {
        let original = Dataset::from_json(FIXTURE).unwrap();
        let (programs, concepts) = original.clone().into_memory_stores().unwrap();
        let snapshot = Dataset::snapshot(&programs, &concepts).unwrap();
        assert_eq!(snapshot, original);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = Dataset::from_json("{not json").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
