//! Program validator
//!
//! Rules (all run, none short-circuits another):
//! - name is required (absent, empty, whitespace-only fail)
//! - a non-blank name must not belong to a different program
//! - trimmed name, description and retire reason respect `FieldLimits`
//! - concept reference is required
//! - a retired program needs a retire reason
//!
//! Validation never mutates the program. Store failures during the
//! uniqueness lookup propagate unchanged.

use serde_json::Value;

use super::errors::{Errors, FieldErrorKind, ValidationError, ValidationResult};
use super::limits::FieldLimits;
use crate::observability::{log_event_with_fields, Event};
use crate::program::{is_blank, Program};
use crate::store::ProgramStore;

/// Field names as reported in the error sink
pub mod fields {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const CONCEPT: &str = "concept";
    pub const RETIRE_REASON: &str = "retire_reason";
}

/// Validates programs against field rules and a program store.
pub struct ProgramValidator<'a> {
    programs: &'a dyn ProgramStore,
    limits: FieldLimits,
}

impl<'a> ProgramValidator<'a> {
    /// Creates a validator with default field limits.
    pub fn new(programs: &'a dyn ProgramStore) -> Self {
        Self::with_limits(programs, FieldLimits::default())
    }

    /// Creates a validator with explicit field limits.
    pub fn with_limits(programs: &'a dyn ProgramStore, limits: FieldLimits) -> Self {
        Self { programs, limits }
    }

    pub fn limits(&self) -> &FieldLimits {
        &self.limits
    }

    /// Validates a program, appending one error per violated rule to `errors`.
    ///
    /// Returns `Ok(())` whether or not field errors were recorded; inspect
    /// `errors` for the outcome. Validating twice into the same sink records
    /// every error twice.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Store` if the uniqueness lookup fails.
    pub fn validate(&self, program: &Program, errors: &mut Errors) -> ValidationResult<()> {
        let before = errors.error_count();

        self.validate_name(program, errors)?;
        self.validate_description(program, errors);
        self.validate_concept(program, errors);
        self.validate_retire_reason(program, errors);

        let recorded = (errors.error_count() - before).to_string();
        log_event_with_fields(
            Event::ProgramValidated,
            &[("errors", &recorded), ("uuid", &program.uuid.to_string())],
        );

        Ok(())
    }

    /// Validates a program arriving as JSON and returns it parsed.
    ///
    /// # Errors
    ///
    /// - `MissingRecord` if `value` is `null`
    /// - `Malformed` if `value` is not a program object
    /// - `Store` if the uniqueness lookup fails
    pub fn validate_value(&self, value: &Value, errors: &mut Errors) -> ValidationResult<Program> {
        let program = parse_program(value)?;
        self.validate(&program, errors)?;
        Ok(program)
    }

    fn validate_name(&self, program: &Program, errors: &mut Errors) -> ValidationResult<()> {
        let name = match program.name.as_deref() {
            Some(name) if !is_blank(Some(name)) => name,
            _ => {
                errors.add_field_error(fields::NAME, FieldErrorKind::RequiredField);
                return Ok(());
            }
        };

        if let Some(existing) = self.programs.find_by_name(name)? {
            if !existing.is_same_program(program) {
                errors.add_field_error(fields::NAME, FieldErrorKind::DuplicateValue);
            }
        }

        check_length(fields::NAME, Some(name), self.limits.name_max_length, errors);
        Ok(())
    }

    fn validate_description(&self, program: &Program, errors: &mut Errors) {
        check_length(
            fields::DESCRIPTION,
            program.description.as_deref(),
            self.limits.description_max_length,
            errors,
        );
    }

    fn validate_concept(&self, program: &Program, errors: &mut Errors) {
        if program.concept.is_none() {
            errors.add_field_error(fields::CONCEPT, FieldErrorKind::RequiredField);
        }
    }

    fn validate_retire_reason(&self, program: &Program, errors: &mut Errors) {
        let reason = program.retire_reason.as_deref();
        if program.retired && is_blank(reason) {
            errors.add_field_error(fields::RETIRE_REASON, FieldErrorKind::RequiredField);
        }
        check_length(
            fields::RETIRE_REASON,
            reason,
            self.limits.retire_reason_max_length,
            errors,
        );
    }
}

/// Parse a program from JSON; `null` is `MissingRecord`.
///
/// A stored program is addressed by `program_id` and `uuid` together, so a
/// payload carrying an id must carry the uuid too.
pub fn parse_program(value: &Value) -> ValidationResult<Program> {
    if value.is_null() {
        return Err(ValidationError::MissingRecord);
    }
    let has = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
    if has("program_id") && !has("uuid") {
        return Err(ValidationError::Malformed(
            "uuid is required when program_id is set".to_string(),
        ));
    }
    serde_json::from_value(value.clone()).map_err(|e| ValidationError::Malformed(e.to_string()))
}

/// Record `LengthExceeded` when the trimmed value is longer than `max` chars
fn check_length(field: &str, value: Option<&str>, max: usize, errors: &mut Errors) {
    let Some(value) = value else {
        return;
    };
    let actual = value.trim().chars().count();
    if actual > max {
        errors.add_field_error(field, FieldErrorKind::LengthExceeded { max, actual });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ConceptId, ProgramId};
    use crate::store::InMemoryProgramStore;
    use serde_json::json;

    fn store() -> InMemoryProgramStore {
        InMemoryProgramStore::with_programs(vec![Program {
            program_id: Some(ProgramId(2)),
            ..Program::named("MDR-TB PROGRAM", ConceptId(3))
        }])
        .unwrap()
    }

    #[test]
    fn test_parse_program_requires_uuid_with_id() {
        let result = parse_program(&json!({"program_id": 2, "name": "MDR-TB PROGRAM", "concept": 3}));
        assert!(matches!(result, Err(ValidationError::Malformed(msg)) if msg.contains("uuid")));

        let program = parse_program(&json!({"name": "Oncology", "concept": 3})).unwrap();
        assert!(program.program_id.is_none());
    }

    #[test]
    fn test_check_length_counts_chars_not_bytes() {
        let mut errors = Errors::new();
        check_length("name", Some("ééééé"), 5, &mut errors);
        assert!(!errors.has_errors());

        check_length("name", Some("éééééé"), 5, &mut errors);
        assert_eq!(
            errors.field_errors("name")[0].kind(),
            FieldErrorKind::LengthExceeded { max: 5, actual: 6 }
        );
    }

    #[test]
    fn test_check_length_trims() {
        let mut errors = Errors::new();
        check_length("description", Some("   abc   "), 3, &mut errors);
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_blank_name_skips_uniqueness_and_length() {
        let store = store();
        let validator = ProgramValidator::new(&store);
        let mut errors = Errors::new();

        let mut program = Program::named(" ", ConceptId(3));
        program.name = Some(" ".repeat(80));
        validator.validate(&program, &mut errors).unwrap();

        assert_eq!(errors.field_errors("name").len(), 1);
        assert_eq!(errors.field_errors("name")[0].kind(), FieldErrorKind::RequiredField);
    }

    #[test]
    fn test_duplicate_and_too_long_both_reported() {
        let long_name = "X".repeat(60);
        let store = InMemoryProgramStore::with_programs(vec![Program::named(long_name.clone(), ConceptId(3))]).unwrap();
        let validator = ProgramValidator::new(&store);
        let mut errors = Errors::new();

        validator
            .validate(&Program::named(long_name, ConceptId(3)), &mut errors)
            .unwrap();

        let kinds: Vec<_> = errors.field_errors("name").iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                FieldErrorKind::DuplicateValue,
                FieldErrorKind::LengthExceeded { max: 50, actual: 60 }
            ]
        );
    }

    #[test]
    fn test_retired_without_reason() {
        let store = store();
        let validator = ProgramValidator::new(&store);
        let mut errors = Errors::new();

        let mut program = Program::named("TB PROGRAM", ConceptId(3));
        program.retired = true;
        validator.validate(&program, &mut errors).unwrap();
        assert!(errors.has_field_errors("retire_reason"));

        let mut errors = Errors::new();
        program.retire_reason = Some("Merged into MDR-TB".to_string());
        validator.validate(&program, &mut errors).unwrap();
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_custom_limits() {
        let store = store();
        let limits = FieldLimits {
            name_max_length: 5,
            ..FieldLimits::default()
        };
        let validator = ProgramValidator::with_limits(&store, limits);
        let mut errors = Errors::new();

        validator
            .validate(&Program::named("ONCOLOGY", ConceptId(3)), &mut errors)
            .unwrap();
        assert!(errors.has_field_errors("name"));
        assert_eq!(validator.limits().name_max_length, 5);
    }

    #[test]
    fn test_validate_value_null_fails_fast() {
        let store = store();
        let validator = ProgramValidator::new(&store);
        let mut errors = Errors::new();

        let result = validator.validate_value(&Value::Null, &mut errors);
        assert!(matches!(result, Err(ValidationError::MissingRecord)));
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_validate_value_malformed() {
        let store = store();
        let validator = ProgramValidator::new(&store);
        let mut errors = Errors::new();

        let result = validator.validate_value(&json!({"name": 42}), &mut errors);
        assert!(matches!(result, Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn test_validate_value_parses_and_validates() {
        let store = store();
        let validator = ProgramValidator::new(&store);
        let mut errors = Errors::new();

        let program = validator
            .validate_value(&json!({"name": "Hypochondriasis program"}), &mut errors)
            .unwrap();
        assert_eq!(program.name.as_deref(), Some("Hypochondriasis program"));
        assert!(errors.has_field_errors("concept"));
        assert!(!errors.has_field_errors("name"));
    }
}
