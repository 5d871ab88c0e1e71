//! Database layer for the patient registry.

mod patients;
mod schema;

pub use schema::*;

use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Duplicate value for unique column: {0}")]
    Duplicate(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// SQLite reports unique violations as `UNIQUE constraint failed: <table>.<column>`.
const UNIQUE_PREFIX: &str = "UNIQUE constraint failed: ";

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(failure, Some(message))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                match message.strip_prefix(UNIQUE_PREFIX) {
                    Some(target) => {
                        let column = target.rsplit('.').next().unwrap_or(target);
                        DbError::Duplicate(column.to_string())
                    }
                    None => DbError::Constraint(message.clone()),
                }
            }
            _ => DbError::Sqlite(e),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok`; any error (or a panic unwinding through
    /// `f`) rolls back every write made inside it.
    pub fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Database) -> Result<T, E>,
        E: From<DbError>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| E::from(DbError::from(e)))?;
        let value = f(self)?;
        tx.commit().map_err(|e| E::from(DbError::from(e)))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_fields, Patient};
    use std::panic::AssertUnwindSafe;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"patients".to_string()));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.db");

        let db = Database::open(&path).unwrap();
        db.insert_patient(&Patient::new(sample_fields())).unwrap();
        drop(db);

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.count_patients().unwrap(), 1);
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new(sample_fields());

        let result: DbResult<()> = db.with_transaction(|db| db.insert_patient(&patient));
        assert!(result.is_ok());
        assert_eq!(db.count_patients().unwrap(), 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_err() {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new(sample_fields());

        let mut twin = Patient::new(sample_fields());
        twin.email = "twin@example.com".into();

        let result: DbResult<()> = db.with_transaction(|db| {
            db.insert_patient(&patient)?;
            db.insert_patient(&twin)
        });

        assert!(matches!(result, Err(DbError::Duplicate(ref column)) if column == "cpf"));
        assert_eq!(db.count_patients().unwrap(), 0);
    }

    #[test]
    fn test_transaction_rolls_back_on_panic() {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new(sample_fields());

        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let _: DbResult<()> = db.with_transaction(|db| {
                db.insert_patient(&patient)?;
                panic!("interrupted mid-transaction");
            });
        }));

        assert!(outcome.is_err());
        assert_eq!(db.count_patients().unwrap(), 0);

        // Connection stays usable afterwards
        let result: DbResult<()> = db.with_transaction(|db| db.insert_patient(&patient));
        assert!(result.is_ok());
        assert_eq!(db.count_patients().unwrap(), 1);
    }

    #[test]
    fn test_unique_violation_names_column() {
        let db = Database::open_in_memory().unwrap();
        let first = Patient::new(sample_fields());
        db.insert_patient(&first).unwrap();

        let mut second = Patient::new(sample_fields());
        second.email = "other@example.com".into();

        match db.insert_patient(&second) {
            Err(DbError::Duplicate(column)) => assert_eq!(column, "cpf"),
            other => panic!("expected duplicate cpf, got {:?}", other),
        }
    }
}
