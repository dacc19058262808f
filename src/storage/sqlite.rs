//! SQLite entity repository
//!
//! One implementation for every entity kind; the kind supplies the table,
//! columns and enriched select. Mutations never return `Err` and reads never
//! fail loudly: failures become outcomes or empty results plus a log line.

use std::path::Path;

use rusqlite::params_from_iter;
use rusqlite::types::{Value as SqlValue, ValueRef};
use serde::Serialize;
use serde_json::{Number, Value};

use super::connection::Database;
use super::outcome::{BatchOutcome, InsertOutcome};
use crate::entity::EntityKind;
use crate::ingest;
use crate::model::{validate_record, Limits, NewEntity, Record};
use crate::{Error, Result};

/// Repository over the club tables
#[derive(Debug, Clone)]
pub struct ClubStore {
    db: Database,
    limits: Limits,
}

impl ClubStore {
    pub fn new(db: Database, limits: Limits) -> Self {
        Self { db, limits }
    }

    /// Open a database file with default limits
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open(path)?, Limits::default()))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?, Limits::default()))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    // ========== Inserts ==========

    /// Validate and insert one record, returning the generated id
    pub fn insert_one(&self, kind: EntityKind, record: &Record) -> InsertOutcome {
        match self.try_insert_one(kind, record) {
            Ok(id) => {
                tracing::info!(kind = %kind, id, "Inserted record");
                InsertOutcome::inserted(kind, id)
            }
            Err(err) => {
                tracing::warn!(kind = %kind, error = %err, "Insert rejected");
                InsertOutcome::failed(&err)
            }
        }
    }

    /// Insert a typed creation request
    pub fn create<E: NewEntity>(&self, entity: &E) -> InsertOutcome {
        self.insert_one(E::KIND, &entity.to_record())
    }

    fn try_insert_one(&self, kind: EntityKind, record: &Record) -> Result<i64> {
        let row = validate_record(kind, record, &self.limits)?;
        let sql = kind.insert_sql();
        tracing::debug!(sql = %sql, "Executing insert");

        self.db.with_connection(|conn| {
            let tx = conn.transaction()?;
            tx.execute(&sql, params_from_iter(row_params(&row)))?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(id)
        })
    }

    /// Insert every row or none of them.
    ///
    /// All rows are validated before storage is touched; row numbers in
    /// messages count data rows from 1.
    pub fn insert_many(&self, kind: EntityKind, rows: &[Record]) -> BatchOutcome {
        self.insert_batch(kind, rows.iter().enumerate().map(|(i, row)| (i + 1, row)))
    }

    /// Load a spreadsheet and insert its rows as one batch.
    ///
    /// Row numbers in messages are sheet rows, with the header as row 1.
    pub fn import_sheet(&self, kind: EntityKind, path: &Path, sheet: Option<&str>) -> BatchOutcome {
        match ingest::read_rows(kind, path, sheet) {
            Ok(rows) => {
                tracing::info!(kind = %kind, rows = rows.len(), path = %path.display(), "Read spreadsheet");
                self.insert_batch(kind, rows.iter().map(|r| (r.row, &r.record)))
            }
            Err(err) => {
                tracing::error!(kind = %kind, error = %err, path = %path.display(), "Spreadsheet rejected");
                BatchOutcome::failed(&err)
            }
        }
    }

    fn insert_batch<'r>(
        &self,
        kind: EntityKind,
        rows: impl Iterator<Item = (usize, &'r Record)>,
    ) -> BatchOutcome {
        match self.try_insert_batch(kind, rows) {
            Ok(count) => {
                tracing::info!(kind = %kind, count, "Inserted batch");
                BatchOutcome::inserted(kind, count)
            }
            Err(err) => {
                tracing::error!(kind = %kind, error = %err, "Batch rolled back");
                BatchOutcome::failed(&err)
            }
        }
    }

    fn try_insert_batch<'r>(
        &self,
        kind: EntityKind,
        rows: impl Iterator<Item = (usize, &'r Record)>,
    ) -> Result<usize> {
        let validated = rows
            .map(|(number, row)| {
                validate_record(kind, row, &self.limits)
                    .map(|row| (number, row))
                    .map_err(|e| e.at_row(number))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if validated.is_empty() {
            return Ok(0);
        }

        let sql = kind.insert_sql();
        self.db.with_connection(|conn| {
            // Dropping an uncommitted transaction rolls it back
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&sql)?;
                for (number, row) in &validated {
                    stmt.execute(params_from_iter(row_params(row)))
                        .map_err(|e| at_row(e.into(), *number))?;
                }
            }
            tx.commit()?;
            Ok(validated.len())
        })
    }

    // ========== Reads ==========

    /// All rows of a kind with related names, ordered by id
    pub fn get_all(&self, kind: EntityKind) -> Vec<Record> {
        fetch_records(&self.db, &kind.select_all_sql(), &[]).unwrap_or_else(|err| {
            tracing::error!(kind = %kind, error = %err, "Failed to list records");
            Vec::new()
        })
    }

    /// One row by id; absent is a normal outcome
    pub fn get_by_id(&self, kind: EntityKind, id: i64) -> Option<Record> {
        match fetch_records(&self.db, &kind.select_by_id_sql(), &[SqlValue::Integer(id)]) {
            Ok(rows) => rows.into_iter().next(),
            Err(err) => {
                tracing::error!(kind = %kind, id, error = %err, "Failed to fetch record");
                None
            }
        }
    }

    /// Count rows of a kind
    pub fn count(&self, kind: EntityKind) -> Option<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let result = self.db.with_connection(|conn| {
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count as usize)
        });
        match result {
            Ok(count) => Some(count),
            Err(err) => {
                tracing::error!(kind = %kind, error = %err, "Failed to count records");
                None
            }
        }
    }

    /// Get database statistics
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            tables: EntityKind::all()
                .iter()
                .map(|kind| TableCount { entity: *kind, rows: self.count(*kind) })
                .collect(),
        }
    }
}

/// Run a select and return rows as ordered mappings
pub(crate) fn fetch_records(db: &Database, sql: &str, params: &[SqlValue]) -> Result<Vec<Record>> {
    tracing::debug!(sql = %sql, "Executing query");
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| row_to_record(row, &names))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    })
}

fn row_to_record(row: &rusqlite::Row, names: &[String]) -> rusqlite::Result<Record> {
    let mut record = Record::new();
    for (i, name) in names.iter().enumerate() {
        let value = match row.get_ref(i)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::from(n),
            ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
        };
        record.insert(name.clone(), value);
    }
    Ok(record)
}

/// Bind values in column order
fn row_params(row: &Record) -> Vec<SqlValue> {
    row.values().map(json_to_sql).collect()
}

fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn at_row(err: Error, row: usize) -> Error {
    match err {
        Error::Constraint(msg) => Error::Constraint(format!("row {}: {}", row, msg)),
        other => other,
    }
}

/// Row count for one table
#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub entity: EntityKind,
    pub rows: Option<usize>,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub tables: Vec<TableCount>,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for table in &self.tables {
            match table.rows {
                Some(rows) => writeln!(f, "  {}: {}", table.entity.label(), rows)?,
                None => writeln!(f, "  {}: unavailable", table.entity.label())?,
            }
        }
        Ok(())
    }
}
