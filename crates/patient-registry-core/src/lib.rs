//! Patient Registry Core Library
//!
//! Record keeping for patients identified by CPF (Brazilian taxpayer ID).
//!
//! # Architecture
//!
//! ```text
//!   Form input (PatientInput)
//!            │
//!            ▼
//!   ┌──────────────────────────── transaction ────────────────────────────┐
//!   │  Field validation ──► CPF checksum ──► INSERT/UPDATE patients       │
//!   │        │                    │                   │                   │
//!   │        └── field errors ◄───┘     UNIQUE(cpf), UNIQUE(email)        │
//!   └─────────────────────────────────────────────────────────────────────┘
//!            │
//!            ▼
//!   format_for_response ──► PatientView (display name, formatted CPF, age)
//!            │
//!            ▼
//!   Page-rendering host (via UniFFI)
//! ```
//!
//! # Core Principle
//!
//! **Validation happens before any write.** A rejected request leaves the
//! database untouched; the unique constraints on CPF and email are the final
//! arbiter of duplicates.
//!
//! # Modules
//!
//! - [`validation`]: CPF checksum/formatting and field rules
//! - [`models`]: Domain types (Patient, PatientInput, PatientView)
//! - [`db`]: SQLite database layer
//! - [`service`]: Transactional record service
//! - [`diagram`]: PlantUML class diagrams from type descriptors
//! - [`config`]: Configuration loading

pub mod config;
pub mod db;
pub mod diagram;
pub mod models;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use config::RegistryConfig;
pub use db::Database;
pub use diagram::{Describe, TypeDescriptor};
pub use models::{AgeCategory, Patient, PatientInput, PatientView};
pub use service::{PatientService, ServiceError};
pub use validation::{CpfValidator, IdentifierValidator, ValidationErrors};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PatientRegistryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {message}")]
    ValidationError {
        message: String,
        fields: HashMap<String, String>,
    },

    #[error("Diagram error: {0}")]
    DiagramError(String),
}

impl From<db::DbError> for PatientRegistryError {
    fn from(e: db::DbError) -> Self {
        ServiceError::from(e).into()
    }
}

impl From<ServiceError> for PatientRegistryError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(errors) => PatientRegistryError::ValidationError {
                message: errors.to_string(),
                fields: errors.into_fields().into_iter().collect(),
            },
            ServiceError::NotFound(id) => PatientRegistryError::NotFound(id),
            ServiceError::Database(e) => PatientRegistryError::DatabaseError(e.to_string()),
        }
    }
}

impl From<diagram::DiagramError> for PatientRegistryError {
    fn from(e: diagram::DiagramError) -> Self {
        PatientRegistryError::DiagramError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PatientRegistryError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PatientRegistryError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a registry database at the given path.
#[uniffi::export]
pub fn open_registry(path: String) -> Result<Arc<PatientRegistry>, PatientRegistryError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(PatientRegistry {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory registry (for testing).
#[uniffi::export]
pub fn open_registry_in_memory() -> Result<Arc<PatientRegistry>, PatientRegistryError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(PatientRegistry {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Check a CPF's length and check digits.
#[uniffi::export]
pub fn is_valid_cpf(cpf: String) -> bool {
    CpfValidator::new().is_valid(&cpf)
}

/// Format a CPF as `XXX.XXX.XXX-XX` (digits only if it has the wrong length).
#[uniffi::export]
pub fn format_cpf(cpf: String) -> String {
    CpfValidator::new().format(&cpf)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe registry handle for FFI.
#[derive(uniffi::Object)]
pub struct PatientRegistry {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl PatientRegistry {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Validate and store a new patient.
    pub fn create_patient(
        &self,
        input: FfiPatientInput,
    ) -> Result<FfiPatientView, PatientRegistryError> {
        let db = self.db.lock()?;
        let service = PatientService::with_cpf_validator(&db);
        let patient = service.create(&input.into())?;
        Ok(service.format_for_response(&patient).into())
    }

    /// Update the submitted fields of an existing patient.
    pub fn update_patient(
        &self,
        id: String,
        input: FfiPatientInput,
    ) -> Result<FfiPatientView, PatientRegistryError> {
        let db = self.db.lock()?;
        let service = PatientService::with_cpf_validator(&db);
        let patient = service.update(&id, &input.into())?;
        Ok(service.format_for_response(&patient).into())
    }

    /// Get the raw record (for edit forms).
    pub fn get_patient(&self, id: String) -> Result<FfiPatient, PatientRegistryError> {
        let db = self.db.lock()?;
        let service = PatientService::with_cpf_validator(&db);
        Ok(service.get(&id)?.into())
    }

    /// Get the display shape of a patient.
    pub fn show_patient(&self, id: String) -> Result<FfiPatientView, PatientRegistryError> {
        let db = self.db.lock()?;
        let service = PatientService::with_cpf_validator(&db);
        let patient = service.get(&id)?;
        Ok(service.format_for_response(&patient).into())
    }

    /// All patients, newest first, in display shape.
    pub fn list_patients(&self) -> Result<Vec<FfiPatientView>, PatientRegistryError> {
        let db = self.db.lock()?;
        let service = PatientService::with_cpf_validator(&db);
        let patients = service.list()?;
        Ok(patients
            .iter()
            .map(|p| service.format_for_response(p).into())
            .collect())
    }

    /// Search patients by name or surname prefix.
    pub fn search_patients(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiPatientView>, PatientRegistryError> {
        let db = self.db.lock()?;
        let service = PatientService::with_cpf_validator(&db);
        let patients = service.search(&query, limit as usize)?;
        Ok(patients
            .iter()
            .map(|p| service.format_for_response(p).into())
            .collect())
    }

    /// Permanently delete a patient.
    pub fn delete_patient(&self, id: String) -> Result<(), PatientRegistryError> {
        let db = self.db.lock()?;
        let service = PatientService::with_cpf_validator(&db);
        service.delete(&id)?;
        Ok(())
    }

    // =========================================================================
    // Diagram Operations
    // =========================================================================

    /// Write the domain class diagram; returns the file path.
    pub fn generate_diagram(&self, output_dir: String) -> Result<String, PatientRegistryError> {
        let path = diagram::write_diagram(&diagram::domain_models(), Path::new(&output_dir))?;
        Ok(path.display().to_string())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe form input.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientInput {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub birthdate: Option<String>,
    pub cpf: Option<String>,
    pub role: Option<String>,
    pub education: Option<String>,
    pub mother_name: Option<String>,
    pub email: Option<String>,
}

impl From<FfiPatientInput> for PatientInput {
    fn from(input: FfiPatientInput) -> Self {
        PatientInput {
            name: input.name,
            surname: input.surname,
            birthdate: input.birthdate,
            cpf: input.cpf,
            role: input.role,
            education: input.education,
            mother_name: input.mother_name,
            email: input.email,
        }
    }
}

/// FFI-safe patient record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub birthdate: String,
    pub cpf: String,
    pub role: Option<String>,
    pub education: Option<String>,
    pub mother_name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            surname: patient.surname,
            birthdate: patient.birthdate.format("%Y-%m-%d").to_string(),
            cpf: patient.cpf,
            role: patient.role,
            education: patient.education,
            mother_name: patient.mother_name,
            email: patient.email,
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }
}

/// FFI-safe display shape.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientView {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub email: String,
    pub formatted_cpf: String,
    pub age: u32,
    pub category: String,
}

impl From<PatientView> for FfiPatientView {
    fn from(view: PatientView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            display_name: view.display_name,
            email: view.email,
            formatted_cpf: view.formatted_cpf,
            age: view.age,
            category: view.category.to_string(),
        }
    }
}
