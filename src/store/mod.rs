//! SQLite-backed factor table.
//!
//! One flat table keyed by category code. The job only ever inserts or
//! overwrites `kg_co2_per_meal` and `source`; labels belong to operators once a
//! row exists.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::domain::EmissionFactor;
use crate::error::AppError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS food_emission_factors (
    code TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    kg_co2_per_meal REAL NOT NULL,
    source TEXT NOT NULL
)";

/// Result of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

pub struct FactorStore {
    conn: Connection,
}

impl FactorStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let conn = Connection::open(path)
            .map_err(|e| AppError::usage(format!("Failed to open database '{}': {e}", path.display())))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::usage(format!("Failed to open in-memory database: {e}")))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::storage(format!("Failed to create factor table: {e}")))?;
        Ok(Self { conn })
    }

    pub fn get(&self, code: &str) -> Result<Option<EmissionFactor>, AppError> {
        self.conn
            .query_row(
                "SELECT code, label, kg_co2_per_meal, source FROM food_emission_factors WHERE code = ?1",
                params![code],
                row_to_factor,
            )
            .optional()
            .map_err(|e| AppError::storage(format!("Failed to read factor '{code}': {e}")))
    }

    /// Insert `code` with `default_label`, or overwrite value and source of the
    /// existing row. The label of an existing row is left untouched.
    pub fn upsert(
        &mut self,
        code: &str,
        default_label: &str,
        kg_co2_per_meal: f64,
        source: &str,
    ) -> Result<UpsertOutcome, AppError> {
        let storage_err = |e: rusqlite::Error| AppError::storage(format!("Failed to upsert factor '{code}': {e}"));

        let tx = self.conn.transaction().map_err(storage_err)?;
        let exists = tx
            .query_row(
                "SELECT 1 FROM food_emission_factors WHERE code = ?1",
                params![code],
                |_| Ok(()),
            )
            .optional()
            .map_err(storage_err)?
            .is_some();

        tx.execute(
            "INSERT INTO food_emission_factors (code, label, kg_co2_per_meal, source)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(code) DO UPDATE SET
                kg_co2_per_meal = excluded.kg_co2_per_meal,
                source = excluded.source",
            params![code, default_label, kg_co2_per_meal, source],
        )
        .map_err(storage_err)?;
        tx.commit().map_err(storage_err)?;

        Ok(if exists {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }

    /// Manually set a label. Returns `false` when `code` does not exist.
    pub fn set_label(&self, code: &str, label: &str) -> Result<bool, AppError> {
        let changed = self
            .conn
            .execute(
                "UPDATE food_emission_factors SET label = ?2 WHERE code = ?1",
                params![code, label],
            )
            .map_err(|e| AppError::storage(format!("Failed to update label of '{code}': {e}")))?;
        Ok(changed > 0)
    }

    /// All factors ordered by code.
    pub fn list(&self) -> Result<Vec<EmissionFactor>, AppError> {
        let storage_err = |e: rusqlite::Error| AppError::storage(format!("Failed to list factors: {e}"));
        let mut stmt = self
            .conn
            .prepare("SELECT code, label, kg_co2_per_meal, source FROM food_emission_factors ORDER BY code")
            .map_err(storage_err)?;
        let rows = stmt.query_map([], row_to_factor).map_err(storage_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(storage_err)
    }

    pub fn count(&self) -> Result<usize, AppError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM food_emission_factors", [], |row| row.get(0))
            .map_err(|e| AppError::storage(format!("Failed to count factors: {e}")))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }
}

fn row_to_factor(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmissionFactor> {
    Ok(EmissionFactor {
        code: row.get(0)?,
        label: row.get(1)?,
        kg_co2_per_meal: row.get(2)?,
        source: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_creates_then_updates_without_touching_label() {
        let mut store = FactorStore::open_in_memory().unwrap();

        let first = store.upsert("beef", "Beef (Auto)", 4.5, "Moyenne Agribalyse Auto (2 produits)").unwrap();
        assert_eq!(first, UpsertOutcome::Created);

        assert!(store.set_label("beef", "Bœuf").unwrap());

        let second = store.upsert("beef", "Beef (Auto)", 3.2, "Moyenne Agribalyse Auto (5 produits)").unwrap();
        assert_eq!(second, UpsertOutcome::Updated);

        let beef = store.get("beef").unwrap().unwrap();
        assert_eq!(beef.label, "Bœuf");
        assert_eq!(beef.kg_co2_per_meal, 3.2);
        assert_eq!(beef.source, "Moyenne Agribalyse Auto (5 produits)");
    }

    #[test]
    fn set_label_on_unknown_code_reports_false() {
        let store = FactorStore::open_in_memory().unwrap();
        assert!(!store.set_label("lamb", "Agneau").unwrap());
    }

    #[test]
    fn list_is_ordered_and_count_matches() {
        let mut store = FactorStore::open_in_memory().unwrap();
        store.upsert("pork", "Pork (Auto)", 1.0, "x").unwrap();
        store.upsert("beef", "Beef (Auto)", 2.0, "x").unwrap();

        let codes: Vec<_> = store.list().unwrap().into_iter().map(|f| f.code).collect();
        assert_eq!(codes, vec!["beef", "pork"]);
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.get("vegetarian").unwrap().is_none());
    }

    #[test]
    fn reopening_a_file_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factors.sqlite3");
        {
            let mut store = FactorStore::open(&path).unwrap();
            store.upsert("vegetarian", "Vegetarian (Auto)", 0.9, "x").unwrap();
        }
        let store = FactorStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
