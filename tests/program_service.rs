//! Program Service Tests
//!
//! Validate-then-persist workflow over a file-backed store:
//! - Invalid programs are never written
//! - Edits survive a reopen of the store file
//! - Retirement requires a reason

use std::path::PathBuf;

use careprog::program::{ConceptId, Program, ProgramId};
use careprog::service::{ProgramService, ServiceError};
use careprog::store::{Dataset, FileStore, ProgramStore, StoreError};
use careprog::validation::FieldLimits;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("standard_dataset.json")
}

fn create_store(tmp: &TempDir) -> FileStore {
    let dataset = Dataset::load(&fixture_path()).unwrap();
    FileStore::create(tmp.path(), dataset).unwrap()
}

fn service(store: &FileStore) -> ProgramService<'_> {
    ProgramService::new(store, store, FieldLimits::default())
}

// =============================================================================
// Save Tests
// =============================================================================

#[test]
fn test_save_new_program_assigns_next_id() {
    let tmp = TempDir::new().unwrap();
    let store = create_store(&tmp);

    let saved = service(&store)
        .save_program(Program::named("Hypochondriasis program", ConceptId(3)))
        .unwrap();

    assert_eq!(saved.program_id, Some(ProgramId(4)));
    assert!(saved.date_created.is_some());
    assert!(saved.date_changed.is_none());
}

#[test]
fn test_invalid_program_is_not_written() {
    let tmp = TempDir::new().unwrap();
    let store = create_store(&tmp);

    let err = service(&store)
        .save_program(Program::named("MDR-TB PROGRAM", ConceptId(3)))
        .unwrap_err();

    assert_eq!(err.code(), "PROG_INVALID");
    assert!(err.field_errors().unwrap().has_field_errors("name"));

    let reopened = FileStore::open(tmp.path()).unwrap();
    assert_eq!(reopened.all().unwrap().len(), 3);
}

#[test]
fn test_unknown_concept_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let store = create_store(&tmp);

    let err = service(&store)
        .save_program(Program::named("Malaria program", ConceptId(9999)))
        .unwrap_err();

    assert!(matches!(err, ServiceError::UnknownConcept(ConceptId(9999))));
}

// =============================================================================
// Edit Tests
// =============================================================================

/// Editing a stored program validates cleanly, saves, and survives reopen.
#[test]
fn test_edit_program_persists_across_reopen() {
    let tmp = TempDir::new().unwrap();
    {
        let store = create_store(&tmp);
        let service = service(&store);

        let mut program = service.get_program(ProgramId(3)).unwrap();
        program.set_description(Some("Edited description"));

        let errors = service.validate(&program).unwrap();
        assert!(!errors.has_errors());

        service.save_program(program).unwrap();
    }

    let store = FileStore::open(tmp.path()).unwrap();
    let program = service(&store).get_program(ProgramId(3)).unwrap();
    assert_eq!(program.description.as_deref(), Some("Edited description"));
    assert_eq!(program.name.as_deref(), Some("TB PROGRAM"));

    let errors = service(&store).validate(&program).unwrap();
    assert!(!errors.has_errors());
}

#[test]
fn test_second_save_stamps_date_changed() {
    let tmp = TempDir::new().unwrap();
    let store = create_store(&tmp);
    let service = service(&store);

    let first = service
        .save_program(Program::named("Hypochondriasis program", ConceptId(3)))
        .unwrap();
    let created = first.date_created;

    let second = service.save_program(first).unwrap();
    assert_eq!(second.date_created, created);
    assert!(second.date_changed.is_some());
}

#[test]
fn test_lookup_by_name_ignores_case() {
    let tmp = TempDir::new().unwrap();
    let store = create_store(&tmp);

    let found = service(&store).get_program_by_name("hiv program").unwrap();
    assert_eq!(found.unwrap().program_id, Some(ProgramId(1)));
}

// =============================================================================
// Identity Tests
// =============================================================================

/// An id and a uuid from two different programs cannot be combined.
#[test]
fn test_id_with_another_programs_uuid_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let store = create_store(&tmp);
    let service = service(&store);

    let mdr_tb = service.get_program(ProgramId(2)).unwrap();
    let mut program = service.get_program(ProgramId(1)).unwrap();
    program.uuid = mdr_tb.uuid;
    program.set_name(Some("MDR-TB PROGRAM"));

    let err = service.save_program(program).unwrap_err();
    assert!(matches!(err, ServiceError::IdentityMismatch(ProgramId(1))));

    let reopened = FileStore::open(tmp.path()).unwrap();
    let hiv = reopened.find_by_id(ProgramId(1)).unwrap().unwrap();
    assert_eq!(hiv.name.as_deref(), Some("HIV PROGRAM"));
}

/// A new program cannot take over a stored program's uuid.
#[test]
fn test_new_program_with_existing_uuid_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let store = create_store(&tmp);
    let service = service(&store);

    let mut program = service.get_program(ProgramId(2)).unwrap();
    program.program_id = None;

    let err = service.save_program(program).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::IdentityConflict(_))
    ));
    assert_eq!(service.get_all_programs(true).unwrap().len(), 3);
}

// =============================================================================
// Retirement Tests
// =============================================================================

#[test]
fn test_retire_and_unretire() {
    let tmp = TempDir::new().unwrap();
    let store = create_store(&tmp);
    let service = service(&store);

    let retired = service.retire_program(ProgramId(1), "Merged into TB").unwrap();
    assert!(retired.retired);
    assert_eq!(retired.retire_reason.as_deref(), Some("Merged into TB"));

    assert_eq!(service.get_all_programs(false).unwrap().len(), 2);
    assert_eq!(service.get_all_programs(true).unwrap().len(), 3);

    let active = service.unretire_program(ProgramId(1)).unwrap();
    assert!(!active.retired);
    assert!(active.retire_reason.is_none());
    assert_eq!(service.get_all_programs(false).unwrap().len(), 3);
}

#[test]
fn test_retire_without_reason_fails() {
    let tmp = TempDir::new().unwrap();
    let store = create_store(&tmp);

    let err = service(&store).retire_program(ProgramId(1), "  ").unwrap_err();
    assert!(err.field_errors().unwrap().has_field_errors("retire_reason"));

    let reopened = FileStore::open(tmp.path()).unwrap();
    assert!(!reopened.find_by_id(ProgramId(1)).unwrap().unwrap().retired);
}

#[test]
fn test_retire_missing_program_fails() {
    let tmp = TempDir::new().unwrap();
    let store = create_store(&tmp);

    let err = service(&store).retire_program(ProgramId(42), "gone").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(ProgramId(42))));
}
