//! Unvalidated form input for creating and updating patients.

use serde::{Deserialize, Serialize};

/// Raw patient form data as submitted by a client.
///
/// Every field is optional so the same shape serves both create (where the
/// validator enforces required fields) and update (where an absent field
/// leaves the stored value untouched).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientInput {
    pub name: Option<String>,
    pub surname: Option<String>,
    /// ISO date, `YYYY-MM-DD`
    pub birthdate: Option<String>,
    pub cpf: Option<String>,
    /// Empty string clears the stored value on update
    pub role: Option<String>,
    /// Empty string clears the stored value on update
    pub education: Option<String>,
    pub mother_name: Option<String>,
    pub email: Option<String>,
}
