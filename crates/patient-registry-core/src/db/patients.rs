//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::Patient;

const PATIENT_COLUMNS: &str = "id, name, surname, birthdate, cpf, role, education, \
                               mother_name, email, created_at, updated_at";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        surname: row.get(2)?,
        birthdate: row.get(3)?,
        cpf: row.get(4)?,
        role: row.get(5)?,
        education: row.get(6)?,
        mother_name: row.get(7)?,
        email: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl Database {
    /// Insert a new patient.
    ///
    /// Fails with [`DbError::Duplicate`](super::DbError::Duplicate) when the
    /// CPF or email is already registered.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, name, surname, birthdate, cpf, role, education,
                mother_name, email, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                patient.id,
                patient.name,
                patient.surname,
                patient.birthdate,
                patient.cpf,
                patient.role,
                patient.education,
                patient.mother_name,
                patient.email,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing patient. Returns false if no row matched.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?2,
                surname = ?3,
                birthdate = ?4,
                cpf = ?5,
                role = ?6,
                education = ?7,
                mother_name = ?8,
                email = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.name,
                patient.surname,
                patient.birthdate,
                patient.cpf,
                patient.role,
                patient.education,
                patient.mother_name,
                patient.email,
                patient.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all patients, newest first.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY created_at DESC, rowid DESC",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Search patients by name or surname (prefix match).
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let pattern = format!("{}%", query);
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM patients
            WHERE name LIKE ?1 OR surname LIKE ?1
            ORDER BY name, surname
            LIMIT ?2
            "#,
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![pattern, limit as i64], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Number of stored patients.
    pub fn count_patients(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Delete a patient. Returns false if no row matched.
    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use crate::models::{sample_fields, PatientFields};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn patient(name: &str, cpf: &str, email: &str) -> Patient {
        Patient::new(PatientFields {
            name: name.into(),
            cpf: cpf.into(),
            email: email.into(),
            ..sample_fields()
        })
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let patient = Patient::new(sample_fields());
        db.insert_patient(&patient).unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved, patient);
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert!(db.get_patient("missing").unwrap().is_none());
    }

    #[test]
    fn test_update_patient() {
        let db = setup_db();

        let mut patient = Patient::new(sample_fields());
        db.insert_patient(&patient).unwrap();

        patient.role = None;
        patient.mother_name = "Ana Silva".into();
        assert!(db.update_patient(&patient).unwrap());

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved.role, None);
        assert_eq!(retrieved.mother_name, "Ana Silva");
    }

    #[test]
    fn test_update_missing_returns_false() {
        let db = setup_db();
        let patient = Patient::new(sample_fields());
        assert!(!db.update_patient(&patient).unwrap());
    }

    #[test]
    fn test_duplicate_email() {
        let db = setup_db();
        db.insert_patient(&patient("Ana", "11144477735", "same@example.com"))
            .unwrap();

        let err = db
            .insert_patient(&patient("Bia", "52998224725", "same@example.com"))
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(ref column) if column == "email"));
        assert_eq!(db.count_patients().unwrap(), 1);
    }

    #[test]
    fn test_search_patients() {
        let db = setup_db();
        db.insert_patient(&patient("Max", "11144477735", "max@example.com"))
            .unwrap();
        db.insert_patient(&patient("Maxine", "52998224725", "maxine@example.com"))
            .unwrap();
        db.insert_patient(&patient("Luna", "39053344705", "luna@example.com"))
            .unwrap();

        let results = db.search_patients("Max", 10).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|p| p.name == "Max"));
        assert!(results.iter().any(|p| p.name == "Maxine"));
    }

    #[test]
    fn test_list_newest_first() {
        let db = setup_db();
        let first = patient("Ana", "11144477735", "ana@example.com");
        let second = patient("Bia", "52998224725", "bia@example.com");
        db.insert_patient(&first).unwrap();
        db.insert_patient(&second).unwrap();

        let names: Vec<_> = db
            .list_patients()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Bia", "Ana"]);
    }

    #[test]
    fn test_delete_patient() {
        let db = setup_db();
        let patient = Patient::new(sample_fields());
        db.insert_patient(&patient).unwrap();

        assert!(db.delete_patient(&patient.id).unwrap());
        assert!(!db.delete_patient(&patient.id).unwrap());
        assert_eq!(db.count_patients().unwrap(), 0);
    }
}
