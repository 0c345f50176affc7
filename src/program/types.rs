//! Program and concept value types
//!
//! A `Program` references its concept by identity only. Concepts are owned
//! by the concept dictionary and never embedded in a program.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned program identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub u64);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Concept dictionary identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(pub u64);

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A coded concept from the concept dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub concept_id: ConceptId,
    pub name: String,
    #[serde(default)]
    pub retired: bool,
}

impl Concept {
    pub fn new(concept_id: ConceptId, name: impl Into<String>) -> Self {
        Self {
            concept_id,
            name: name.into(),
            retired: false,
        }
    }
}

/// A care program, e.g. "HIV PROGRAM" or "MDR-TB PROGRAM".
///
/// Fields are public and optional so that partially filled programs can be
/// handed to the validator exactly as they arrive from a form or a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Absent until the program is first saved
    #[serde(default)]
    pub program_id: Option<ProgramId>,

    /// Stable identity, used to tell "the same program" apart from a namesake
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Reference to the concept that names this program
    #[serde(default)]
    pub concept: Option<ConceptId>,

    #[serde(default)]
    pub retired: bool,

    #[serde(default)]
    pub retire_reason: Option<String>,

    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,

    #[serde(default)]
    pub date_changed: Option<DateTime<Utc>>,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// Create an empty, unsaved program with a fresh uuid
    pub fn new() -> Self {
        Self {
            program_id: None,
            uuid: Uuid::new_v4(),
            name: None,
            description: None,
            concept: None,
            retired: false,
            retire_reason: None,
            date_created: None,
            date_changed: None,
        }
    }

    /// Create an unsaved program with a name and concept
    pub fn named(name: impl Into<String>, concept: ConceptId) -> Self {
        Self {
            name: Some(name.into()),
            concept: Some(concept),
            ..Self::new()
        }
    }

    pub fn set_name(&mut self, name: Option<&str>) {
        self.name = name.map(str::to_string);
    }

    pub fn set_description(&mut self, description: Option<&str>) {
        self.description = description.map(str::to_string);
    }

    /// Point this program at a concept (or clear the reference)
    pub fn set_concept(&mut self, concept: Option<&Concept>) {
        self.concept = concept.map(|c| c.concept_id);
    }

    /// Whether this program has been persisted
    pub fn is_saved(&self) -> bool {
        self.program_id.is_some()
    }

    /// Whether `other` denotes the same program (by uuid)
    pub fn is_same_program(&self, other: &Program) -> bool {
        self.uuid == other.uuid
    }
}

/// Whether a text value is absent, empty or whitespace only
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
