//! Input validation for patient records.
//!
//! Rules:
//! - `name`, `surname`, `birthdate`, `cpf`, `mother_name`, `email` are required on create
//! - text fields are at most 255 characters
//! - `email` must look like an address
//! - `cpf` must sanitize to 11 digits and pass the checksum
//!
//! Every failure is collected per field so a form can show all of them at once.

mod cpf;

pub use cpf::*;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{PatientChanges, PatientFields, PatientInput};

/// Maximum length of any text field.
pub const MAX_FIELD_LENGTH: usize = 255;

const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Field-keyed validation messages.
///
/// Only the first message per field is kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors for a single field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message for `field` unless one is already present.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Message for a field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// All failures, ordered by field name.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }

    /// `Ok(value)` when nothing failed.
    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Messages shown to the user, keyed by field and rule.
pub mod messages {
    pub const NAME_REQUIRED: &str = "Name is required";
    pub const SURNAME_REQUIRED: &str = "Surname is required";
    pub const BIRTHDATE_REQUIRED: &str = "Birthdate is required";
    pub const BIRTHDATE_INVALID: &str = "Birthdate must be a valid date (YYYY-MM-DD)";
    pub const CPF_REQUIRED: &str = "CPF is required";
    pub const CPF_SIZE: &str = "CPF must have exactly 11 digits";
    pub const CPF_INVALID: &str = "Invalid CPF";
    pub const CPF_TAKEN: &str = "This CPF is already registered";
    pub const MOTHER_NAME_REQUIRED: &str = "Mother's name is required";
    pub const EMAIL_REQUIRED: &str = "Email is required";
    pub const EMAIL_INVALID: &str = "Email must be a valid address";
    pub const EMAIL_TAKEN: &str = "This email is already in use";
}

/// Validate form input for a new patient.
///
/// The CPF is returned sanitized (digits only).
pub fn validate_new<V: IdentifierValidator + ?Sized>(
    input: &PatientInput,
    validator: &V,
) -> Result<PatientFields, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required_text(&mut errors, "name", &input.name, messages::NAME_REQUIRED);
    let surname = required_text(&mut errors, "surname", &input.surname, messages::SURNAME_REQUIRED);
    let mother_name = required_text(
        &mut errors,
        "mother_name",
        &input.mother_name,
        messages::MOTHER_NAME_REQUIRED,
    );
    let role = optional_text(&mut errors, "role", &input.role).flatten();
    let education = optional_text(&mut errors, "education", &input.education).flatten();

    let birthdate = match present(&input.birthdate) {
        Some(raw) => birthdate(&mut errors, raw),
        None => {
            errors.add("birthdate", messages::BIRTHDATE_REQUIRED);
            None
        }
    };

    let email = match present(&input.email) {
        Some(raw) => email(&mut errors, raw),
        None => {
            errors.add("email", messages::EMAIL_REQUIRED);
            None
        }
    };

    let cpf = match present(&input.cpf) {
        Some(raw) => cpf(&mut errors, raw, validator),
        None => {
            errors.add("cpf", messages::CPF_REQUIRED);
            None
        }
    };

    match (name, surname, birthdate, cpf, mother_name, email) {
        (Some(name), Some(surname), Some(birthdate), Some(cpf), Some(mother_name), Some(email)) => {
            errors.into_result(PatientFields {
                name,
                surname,
                birthdate,
                cpf,
                role,
                education,
                mother_name,
                email,
            })
        }
        _ => Err(errors),
    }
}

/// Validate a partial update.
///
/// Only fields present in `input` are checked. A submitted CPF always runs
/// the size and checksum rules, even if it matches the stored one.
pub fn validate_changes<V: IdentifierValidator + ?Sized>(
    input: &PatientInput,
    validator: &V,
) -> Result<PatientChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = input
        .name
        .as_ref()
        .and_then(|_| required_text(&mut errors, "name", &input.name, messages::NAME_REQUIRED));
    let surname = input.surname.as_ref().and_then(|_| {
        required_text(&mut errors, "surname", &input.surname, messages::SURNAME_REQUIRED)
    });
    let mother_name = input.mother_name.as_ref().and_then(|_| {
        required_text(
            &mut errors,
            "mother_name",
            &input.mother_name,
            messages::MOTHER_NAME_REQUIRED,
        )
    });
    let role = optional_text(&mut errors, "role", &input.role);
    let education = optional_text(&mut errors, "education", &input.education);

    let birthdate = input.birthdate.as_deref().and_then(|raw| {
        if raw.trim().is_empty() {
            errors.add("birthdate", messages::BIRTHDATE_REQUIRED);
            None
        } else {
            self::birthdate(&mut errors, raw)
        }
    });

    let email = input.email.as_deref().and_then(|raw| {
        if raw.trim().is_empty() {
            errors.add("email", messages::EMAIL_REQUIRED);
            None
        } else {
            self::email(&mut errors, raw)
        }
    });

    let cpf = match input.cpf.as_deref() {
        None => None,
        Some(raw) if raw.trim().is_empty() => {
            errors.add("cpf", messages::CPF_REQUIRED);
            None
        }
        Some(raw) => self::cpf(&mut errors, raw, validator),
    };

    errors.into_result(PatientChanges {
        name,
        surname,
        birthdate,
        cpf,
        role,
        education,
        mother_name,
        email,
    })
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: &Option<String>,
    required_message: &str,
) -> Option<String> {
    match present(value) {
        Some(v) => bounded(errors, field, v),
        None => {
            errors.add(field, required_message);
            None
        }
    }
}

/// `None` when the field was not submitted, `Some(None)` when it was submitted
/// blank.
fn optional_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: &Option<String>,
) -> Option<Option<String>> {
    let raw = value.as_deref()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    bounded(errors, field, trimmed).map(Some)
}

fn bounded(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    if value.chars().count() > MAX_FIELD_LENGTH {
        errors.add(
            field,
            format!("{} may not be longer than {} characters", field, MAX_FIELD_LENGTH),
        );
        return None;
    }
    Some(value.to_string())
}

fn birthdate(errors: &mut ValidationErrors, raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add("birthdate", messages::BIRTHDATE_INVALID);
            None
        }
    }
}

fn email(errors: &mut ValidationErrors, raw: &str) -> Option<String> {
    let email = bounded(errors, "email", raw.trim())?;
    if !EMAIL_RE.is_match(&email) {
        errors.add("email", messages::EMAIL_INVALID);
        return None;
    }
    Some(email)
}

fn cpf<V: IdentifierValidator + ?Sized>(
    errors: &mut ValidationErrors,
    raw: &str,
    validator: &V,
) -> Option<String> {
    let digits = validator.sanitize(raw);
    if digits.len() != CPF_LENGTH {
        errors.add("cpf", messages::CPF_SIZE);
        return None;
    }
    if !validator.is_valid(&digits) {
        tracing::debug!("CPF failed checksum");
        errors.add("cpf", messages::CPF_INVALID);
        return None;
    }
    Some(digits)
}
