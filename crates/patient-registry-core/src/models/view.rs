//! Presentation-facing patient shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Age at which a patient is classified as senior.
pub const SENIOR_AGE_THRESHOLD: u32 = 65;

/// Patients younger than this are minors.
pub const MINOR_AGE_THRESHOLD: u32 = 18;

/// Age bracket shown alongside a patient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    Minor,
    Adult,
    Senior,
}

impl AgeCategory {
    /// Classify an age in whole years.
    pub fn from_age(age: u32) -> Self {
        if age >= SENIOR_AGE_THRESHOLD {
            AgeCategory::Senior
        } else if age < MINOR_AGE_THRESHOLD {
            AgeCategory::Minor
        } else {
            AgeCategory::Adult
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeCategory::Minor => "minor",
            AgeCategory::Adult => "adult",
            AgeCategory::Senior => "senior",
        }
    }
}

impl std::fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole years elapsed between `birthdate` and `today`.
///
/// A birthdate in the future counts as age zero.
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(birthdate).unwrap_or(0)
}

/// Data transfer object handed to the page-rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientView {
    pub id: String,
    pub name: String,
    /// Name and surname, trimmed
    pub display_name: String,
    pub email: String,
    /// CPF as `XXX.XXX.XXX-XX`
    pub formatted_cpf: String,
    /// Age in whole years
    pub age: u32,
    pub category: AgeCategory,
}

impl PatientView {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
