//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A patient record as stored in the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// UUID, generated on create
    pub id: String,
    /// Given name
    pub name: String,
    /// Family name
    pub surname: String,
    /// Date of birth
    pub birthdate: NaiveDate,
    /// CPF, digits only
    pub cpf: String,
    /// Occupation
    pub role: Option<String>,
    /// Education level (e.g., "Superior")
    pub education: Option<String>,
    /// Mother's full name
    pub mother_name: String,
    /// Contact email, unique across the registry
    pub email: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

/// Validated field set for a new patient.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientFields {
    pub name: String,
    pub surname: String,
    pub birthdate: NaiveDate,
    pub cpf: String,
    pub role: Option<String>,
    pub education: Option<String>,
    pub mother_name: String,
    pub email: String,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub cpf: Option<String>,
    /// `Some(None)` clears the role
    pub role: Option<Option<String>>,
    /// `Some(None)` clears the education level
    pub education: Option<Option<String>>,
    pub mother_name: Option<String>,
    pub email: Option<String>,
}

impl Patient {
    /// Create a new patient from validated fields.
    pub fn new(fields: PatientFields) -> Self {
        let now = timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name,
            surname: fields.surname,
            birthdate: fields.birthdate,
            cpf: fields.cpf,
            role: fields.role,
            education: fields.education,
            mother_name: fields.mother_name,
            email: fields.email,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Name followed by surname.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Merge a partial update into this record.
    pub fn apply(&mut self, changes: PatientChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(surname) = changes.surname {
            self.surname = surname;
        }
        if let Some(birthdate) = changes.birthdate {
            self.birthdate = birthdate;
        }
        if let Some(cpf) = changes.cpf {
            self.cpf = cpf;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(education) = changes.education {
            self.education = education;
        }
        if let Some(mother_name) = changes.mother_name {
            self.mother_name = mother_name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        self.updated_at = timestamp();
    }
}

/// Current UTC time as fixed-width RFC 3339, so stored timestamps sort lexically.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
pub(crate) fn sample_fields() -> PatientFields {
    PatientFields {
        name: "João".into(),
        surname: "Silva".into(),
        birthdate: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        cpf: "11144477735".into(),
        role: Some("Patient".into()),
        education: Some("Superior".into()),
        mother_name: "Maria Silva".into(),
        email: "joao@example.com".into(),
    }
}
