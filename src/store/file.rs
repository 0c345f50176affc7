//! File-backed store
//!
//! The whole dataset lives in `<data_dir>/programs.json`:
//!
//! ```text
//! {"checksum": <crc32 of dataset bytes>, "dataset": {"concepts": [...], "programs": [...]}}
//! ```
//!
//! - Every open verifies the checksum; a mismatch is `Corrupted`
//! - Every save rewrites the file through a temp file, fsync, then rename
//! - Reads are served from memory

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::dataset::Dataset;
use super::errors::{StoreError, StoreResult};
use super::memory::{InMemoryConceptStore, InMemoryProgramStore};
use super::{ConceptStore, ProgramStore};
use crate::observability::{log_event_with_fields, Event};
use crate::program::{Concept, ConceptId, Program, ProgramId};

/// Store file name inside the data directory
pub const STORE_FILE_NAME: &str = "programs.json";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    checksum: u32,
    dataset: Dataset,
}

fn dataset_checksum(dataset: &Dataset) -> StoreResult<u32> {
    let bytes = serde_json::to_vec(dataset)?;
    Ok(crc32fast::hash(&bytes))
}

/// Programs and concepts persisted to a single checksummed JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    programs: InMemoryProgramStore,
    concepts: InMemoryConceptStore,
}

impl FileStore {
    /// Create a new store file seeded with `dataset`.
    ///
    /// Fails if the store file already exists.
    pub fn create(data_dir: &Path, dataset: Dataset) -> StoreResult<Self> {
        let path = data_dir.join(STORE_FILE_NAME);
        if path.exists() {
            return Err(StoreError::Unavailable(format!(
                "Store file already exists: {}",
                path.display()
            )));
        }

        fs::create_dir_all(data_dir)
            .map_err(|e| StoreError::io_at_path("Failed to create data directory", data_dir, e))?;

        let (programs, concepts) = dataset.into_memory_stores()?;
        let store = Self {
            path,
            programs,
            concepts,
        };
        store.write_dataset(&Dataset::snapshot(&store.programs, &store.concepts)?)?;
        Ok(store)
    }

    /// Open an existing store file, verifying its checksum
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let path = data_dir.join(STORE_FILE_NAME);
        if !path.exists() {
            return Err(StoreError::Unavailable(format!(
                "Store file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| StoreError::io_at_path("Failed to read store file", &path, e))?;

        let envelope: Envelope = serde_json::from_str(&content).map_err(|e| {
            StoreError::Corrupted(format!("{}: {}", path.display(), e))
        })?;

        let actual = dataset_checksum(&envelope.dataset)?;
        if actual != envelope.checksum {
            return Err(StoreError::Corrupted(format!(
                "{}: checksum mismatch (expected {:08x}, got {:08x})",
                path.display(),
                envelope.checksum,
                actual
            )));
        }

        let program_count = envelope.dataset.programs.len().to_string();
        let (programs, concepts) = envelope.dataset.into_memory_stores()?;

        log_event_with_fields(
            Event::StoreOpened,
            &[("path", &path.display().to_string()), ("programs", &program_count)],
        );

        Ok(Self {
            path,
            programs,
            concepts,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `dataset` to disk atomically
    fn write_dataset(&self, dataset: &Dataset) -> StoreResult<()> {
        let envelope = Envelope {
            checksum: dataset_checksum(dataset)?,
            dataset: dataset.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|e| StoreError::io_at_path("Failed to create temp file", &tmp_path, e))?;

        file.write_all(&bytes)
            .map_err(|e| StoreError::io_at_path("Failed to write temp file", &tmp_path, e))?;

        // fsync is mandatory before rename
        file.sync_all()
            .map_err(|e| StoreError::io_at_path("Failed to fsync temp file", &tmp_path, e))?;

        fs::rename(&tmp_path, &self.path)
            .map_err(|e| StoreError::io_at_path("Failed to replace store file", &self.path, e))?;

        if let Some(dir) = self.path.parent() {
            // Best effort
            if let Ok(dir) = File::open(dir) {
                let _ = dir.sync_all();
            }
        }

        log_event_with_fields(
            Event::StoreFlushed,
            &[("path", &self.path.display().to_string()), ("bytes", &bytes.len().to_string())],
        );

        Ok(())
    }
}

impl ProgramStore for FileStore {
    fn find_by_id(&self, id: ProgramId) -> StoreResult<Option<Program>> {
        self.programs.find_by_id(id)
    }

    fn find_by_name(&self, name: &str) -> StoreResult<Option<Program>> {
        self.programs.find_by_name(name)
    }

    fn all(&self) -> StoreResult<Vec<Program>> {
        self.programs.all()
    }

    /// Memory is only updated after the file write succeeds
    fn save(&self, program: Program) -> StoreResult<Program> {
        self.programs.save_with(program, |programs| {
            let dataset = Dataset {
                concepts: self.concepts.all()?,
                programs,
            };
            self.write_dataset(&dataset)
        })
    }
}

impl ConceptStore for FileStore {
    fn find_by_id(&self, id: ConceptId) -> StoreResult<Option<Concept>> {
        self.concepts.find_by_id(id)
    }
}
