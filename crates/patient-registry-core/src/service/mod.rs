//! Patient record service.
//!
//! Owns validation-before-persist: every create and update validates its input
//! and writes inside a single transaction, so a rejected request never leaves a
//! partial write behind. Uniqueness of CPF and email is left to the database;
//! violations come back as field errors.

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{age_on, AgeCategory, Patient, PatientInput, PatientView};
use crate::validation::{self, messages, CpfValidator, IdentifierValidator, ValidationErrors};

/// Service errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(DbError),
}

impl ServiceError {
    /// HTTP-equivalent status for the page-rendering layer.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 422,
            ServiceError::NotFound(_) => 404,
            ServiceError::Database(_) => 500,
        }
    }

    /// Field-level messages, if this is a validation failure.
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ServiceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Duplicate(column) => {
                let message = match column.as_str() {
                    "cpf" => messages::CPF_TAKEN,
                    "email" => messages::EMAIL_TAKEN,
                    _ => "This value is already in use",
                };
                ServiceError::Validation(ValidationErrors::single(&column, message))
            }
            other => ServiceError::Database(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Create/read/update/delete for patients.
pub struct PatientService<'a, V: IdentifierValidator = CpfValidator> {
    db: &'a Database,
    validator: V,
}

impl<'a> PatientService<'a, CpfValidator> {
    /// Service backed by the standard CPF validator.
    pub fn with_cpf_validator(db: &'a Database) -> Self {
        Self::new(db, CpfValidator::new())
    }
}

impl<'a, V: IdentifierValidator> PatientService<'a, V> {
    /// Create a new service.
    pub fn new(db: &'a Database, validator: V) -> Self {
        Self { db, validator }
    }

    /// Validate and store a new patient.
    pub fn create(&self, input: &PatientInput) -> ServiceResult<Patient> {
        self.db.with_transaction(|db| {
            let fields = validation::validate_new(input, &self.validator)?;
            let patient = Patient::new(fields);

            db.insert_patient(&patient).map_err(rejected_write)?;

            tracing::info!(
                id = %patient.id,
                name = %patient.name,
                created_at = %patient.created_at,
                "Patient created"
            );
            Ok(patient)
        })
    }

    /// Apply the fields present in `input` to an existing patient.
    ///
    /// Submitted fields are validated before the record is loaded, so a bad
    /// payload is rejected even when `id` does not exist. The CPF checksum runs
    /// only when a CPF is submitted.
    pub fn update(&self, id: &str, input: &PatientInput) -> ServiceResult<Patient> {
        self.db.with_transaction(|db| {
            let changes = validation::validate_changes(input, &self.validator)?;

            let mut patient = db
                .get_patient(id)?
                .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
            patient.apply(changes);

            if !db.update_patient(&patient).map_err(rejected_write)? {
                return Err(ServiceError::NotFound(id.to_string()));
            }

            tracing::info!(
                id = %patient.id,
                name = %patient.name,
                updated_at = %patient.updated_at,
                "Patient updated"
            );
            Ok(patient)
        })
    }

    /// Fetch a patient by ID.
    pub fn get(&self, id: &str) -> ServiceResult<Patient> {
        self.db
            .get_patient(id)?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// All patients, newest first.
    pub fn list(&self) -> ServiceResult<Vec<Patient>> {
        Ok(self.db.list_patients()?)
    }

    /// Patients whose name or surname starts with `query`.
    pub fn search(&self, query: &str, limit: usize) -> ServiceResult<Vec<Patient>> {
        Ok(self.db.search_patients(query, limit)?)
    }

    /// Permanently remove a patient.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        if !self.db.delete_patient(id)? {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        tracing::info!(id = %id, "Patient deleted");
        Ok(())
    }

    /// Shape a patient for the presentation layer, aged as of today (UTC).
    pub fn format_for_response(&self, patient: &Patient) -> PatientView {
        self.format_for_response_on(patient, chrono::Utc::now().date_naive())
    }

    /// Shape a patient for the presentation layer, aged as of `today`.
    pub fn format_for_response_on(&self, patient: &Patient, today: NaiveDate) -> PatientView {
        let age = age_on(patient.birthdate, today);
        PatientView {
            id: patient.id.clone(),
            name: patient.name.clone(),
            display_name: patient.full_name().trim().to_string(),
            email: patient.email.clone(),
            formatted_cpf: self.validator.format(&patient.cpf),
            age,
            category: AgeCategory::from_age(age),
        }
    }
}

fn rejected_write(e: DbError) -> ServiceError {
    if let DbError::Duplicate(column) = &e {
        tracing::warn!(column = %column, "Write rejected by unique constraint");
    }
    e.into()
}
