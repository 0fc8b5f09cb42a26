//! SQLite adapter: Implementation of `AssessmentRepository`.
//!
//! Provides local persistence for assessments. Input groups, factors and
//! lab analysis are stored as JSON columns; tier and score are stored as
//! text.
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`. A poisoned mutex surfaces as
//! `StorageError::Lock` rather than a panic.
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;

use super::StorageError;
use crate::domain::{Assessment, PredictionResult, RiskLevel};
use crate::ports::{AssessmentPage, AssessmentRepository};

const SELECT_COLUMNS: &str = r"
    SELECT id, personal_info, medical_history, symptoms, lab_results,
           risk_score, risk_level, factors, lab_analysis, created_at
    FROM assessments
";

/// SQLite storage adapter.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) a database file.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory SQLite database.
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Lock)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;

        // `seq` preserves insertion order independent of clock resolution.
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS assessments (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                personal_info TEXT NOT NULL,
                medical_history TEXT NOT NULL,
                symptoms TEXT NOT NULL,
                lab_results TEXT NOT NULL,
                risk_score TEXT NOT NULL,
                risk_level TEXT NOT NULL,
                factors TEXT NOT NULL,
                lab_analysis TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    fn row_to_assessment(row: &Row<'_>) -> rusqlite::Result<Assessment> {
        let score_text: String = row.get(5)?;
        let score = score_text
            .parse::<u8>()
            .map_err(|e| conversion_error(5, e))?;
        let level_text: String = row.get(6)?;
        let tier = level_text
            .parse::<RiskLevel>()
            .map_err(|e| conversion_error(6, e))?;

        let created_at_text: String = row.get(9)?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_text)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| conversion_error(9, e))?;

        Ok(Assessment {
            id: row.get(0)?,
            personal_info: json_column(row, 1)?,
            medical_history: json_column(row, 2)?,
            symptoms: json_column(row, 3)?,
            lab_results: json_column(row, 4)?,
            prediction: PredictionResult {
                score,
                tier,
                factors: json_column(row, 7)?,
                lab_analysis: json_column(row, 8)?,
            },
            created_at,
        })
    }
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| conversion_error(idx, e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

impl AssessmentRepository for SqliteRepository {
    type Error = StorageError;

    fn create(&self, assessment: &Assessment) -> Result<(), Self::Error> {
        let prediction = &assessment.prediction;
        let values = [
            to_json(&assessment.personal_info)?,
            to_json(&assessment.medical_history)?,
            to_json(&assessment.symptoms)?,
            to_json(&assessment.lab_results)?,
            to_json(&prediction.factors)?,
            to_json(&prediction.lab_analysis)?,
        ];

        let conn = self.lock()?;
        let inserted = conn.execute(
            r"
            INSERT INTO assessments (
                id, personal_info, medical_history, symptoms, lab_results,
                risk_score, risk_level, factors, lab_analysis, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
            params![
                assessment.id,
                values[0],
                values[1],
                values[2],
                values[3],
                prediction.score.to_string(),
                prediction.tier.as_str(),
                values[4],
                values[5],
                assessment.created_at.to_rfc3339(),
            ],
        );
        match inserted {
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                return Err(StorageError::Duplicate(assessment.id.clone()));
            }
            other => other?,
        };

        tracing::debug!("Saved assessment {} to storage", assessment.id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Assessment>, Self::Error> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY seq DESC"))?;
        let assessments = stmt
            .query_map([], Self::row_to_assessment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assessments)
    }

    fn list_paginated(&self, offset: usize, limit: usize) -> Result<AssessmentPage, Self::Error> {
        let conn = self.lock()?;

        let total_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM assessments", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} ORDER BY seq DESC LIMIT ?1 OFFSET ?2"
        ))?;
        let items = stmt
            .query_map(params![limit as i64, offset as i64], Self::row_to_assessment)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssessmentPage::new(items, total_count as usize, offset, limit))
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Assessment>, Self::Error> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
        let assessment = stmt
            .query_row(params![id], Self::row_to_assessment)
            .optional()?;
        Ok(assessment)
    }

    fn count(&self) -> Result<usize, Self::Error> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM assessments", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn delete(&self, id: &str) -> Result<bool, Self::Error> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM assessments WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn clear_all(&self) -> Result<(), Self::Error> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM assessments", [])?;
        tracing::warn!("Cleared all assessments from storage");
        Ok(())
    }
}
