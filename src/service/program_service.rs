//! Program service
//!
//! Validate-then-persist workflow on top of the stores:
//! - Saves are refused while any field error remains
//! - The referenced concept must exist in the concept dictionary
//! - `date_created` is stamped on first save, `date_changed` afterwards
//!
//! No transaction spans validation and save. Callers that may race on the
//! same name must serialize their saves.

use chrono::Utc;

use super::errors::{ServiceError, ServiceResult};
use crate::observability::{log_event_with_fields, Event};
use crate::program::{Program, ProgramId};
use crate::store::{ConceptStore, ProgramStore, StoreError};
use crate::validation::{Errors, FieldLimits, ProgramValidator, ValidationError};

/// Program workflow service
pub struct ProgramService<'a> {
    programs: &'a dyn ProgramStore,
    concepts: &'a dyn ConceptStore,
    validator: ProgramValidator<'a>,
}

impl<'a> ProgramService<'a> {
    pub fn new(
        programs: &'a dyn ProgramStore,
        concepts: &'a dyn ConceptStore,
        limits: FieldLimits,
    ) -> Self {
        Self {
            programs,
            concepts,
            validator: ProgramValidator::with_limits(programs, limits),
        }
    }

    pub fn validator(&self) -> &ProgramValidator<'a> {
        &self.validator
    }

    /// Validate a program into a fresh error sink
    pub fn validate(&self, program: &Program) -> ServiceResult<Errors> {
        let mut errors = Errors::new();
        self.validator
            .validate(program, &mut errors)
            .map_err(|e| {
                if let ValidationError::Store(store_err) = &e {
                    log_store_failure(store_err);
                }
                e
            })?;
        Ok(errors)
    }

    /// Validate and persist a program.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `program_id` names no stored program
    /// - `IdentityMismatch` if the stored program has a different uuid
    /// - `Invalid` with every field error if validation fails
    /// - `UnknownConcept` if the concept is not in the dictionary
    /// - `Validation`/`Store` on store failures
    pub fn save_program(&self, mut program: Program) -> ServiceResult<Program> {
        if let Some(id) = program.program_id {
            let stored = self.get_program(id)?;
            if !stored.is_same_program(&program) {
                log_event_with_fields(
                    Event::ProgramRejected,
                    &[("program_id", &id.to_string()), ("uuid", &program.uuid.to_string())],
                );
                return Err(ServiceError::IdentityMismatch(id));
            }
        }

        let errors = self.validate(&program)?;
        if errors.has_errors() {
            log_event_with_fields(
                Event::ProgramRejected,
                &[
                    ("errors", &errors.error_count().to_string()),
                    ("fields", &errors.fields().collect::<Vec<_>>().join(",")),
                ],
            );
            return Err(ServiceError::Invalid(errors));
        }

        if let Some(concept_id) = program.concept {
            if self.concepts.find_by_id(concept_id).map_err(store_failure)?.is_none() {
                return Err(ServiceError::UnknownConcept(concept_id));
            }
        }

        let now = Utc::now();
        if program.date_created.is_none() {
            program.date_created = Some(now);
        } else {
            program.date_changed = Some(now);
        }

        let saved = self.programs.save(program).map_err(store_failure)?;

        let id = saved.program_id.map(|id| id.to_string()).unwrap_or_default();
        log_event_with_fields(
            Event::ProgramSaved,
            &[("program_id", &id), ("name", saved.name.as_deref().unwrap_or(""))],
        );

        Ok(saved)
    }

    /// Get a program by id
    pub fn get_program(&self, id: ProgramId) -> ServiceResult<Program> {
        self.programs
            .find_by_id(id)
            .map_err(store_failure)?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Get a program by name (case-insensitive)
    pub fn get_program_by_name(&self, name: &str) -> ServiceResult<Option<Program>> {
        Ok(self.programs.find_by_name(name).map_err(store_failure)?)
    }

    /// All programs ordered by id, optionally including retired ones
    pub fn get_all_programs(&self, include_retired: bool) -> ServiceResult<Vec<Program>> {
        let programs = self.programs.all().map_err(store_failure)?;
        Ok(programs
            .into_iter()
            .filter(|p| include_retired || !p.retired)
            .collect())
    }

    /// Retire a program; the reason is required
    pub fn retire_program(&self, id: ProgramId, reason: &str) -> ServiceResult<Program> {
        let mut program = self.get_program(id)?;
        program.retired = true;
        program.retire_reason = Some(reason.to_string());

        let saved = self.save_program(program)?;
        log_event_with_fields(Event::ProgramRetired, &[("program_id", &id.to_string())]);
        Ok(saved)
    }

    /// Return a retired program to service
    pub fn unretire_program(&self, id: ProgramId) -> ServiceResult<Program> {
        let mut program = self.get_program(id)?;
        program.retired = false;
        program.retire_reason = None;

        let saved = self.save_program(program)?;
        log_event_with_fields(Event::ProgramUnretired, &[("program_id", &id.to_string())]);
        Ok(saved)
    }
}

fn log_store_failure(err: &StoreError) {
    log_event_with_fields(
        Event::StoreFailure,
        &[("code", err.code()), ("message", &err.to_string())],
    );
}

fn store_failure(err: StoreError) -> StoreError {
    log_store_failure(&err);
    err
}
