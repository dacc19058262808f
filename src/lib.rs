//! # Clubstore - Football club records
//!
//! Teams, players, coaches, positions, contracts, matches and season
//! statistics kept in SQLite.
//!
//! Clubstore provides:
//! - One parameterized entity repository selected by [`EntityKind`]
//! - Atomic bulk ingestion from spreadsheets
//! - A fixed catalog of aggregate and join reports
//! - A thin CLI and HTTP API on top of the repository

pub mod entity;
pub mod model;
pub mod storage;
pub mod query;
pub mod ingest;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use entity::EntityKind;
pub use model::{Limits, Record, ValidationError};
pub use storage::{BatchOutcome, ClubStore, Database, InsertOutcome};
pub use query::{QueryCatalog, Report};

use serde::Serialize;

/// Result type alias for Clubstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Clubstore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Database unreachable: {0}")]
    Connectivity(String),

    #[error("Database error: {0}")]
    Storage(rusqlite::Error),

    #[error("Missing required column '{column}' for {kind}")]
    MissingColumn { kind: EntityKind, column: &'static str },

    #[error("Ingest error: {0}")]
    Ingest(String),

    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] calamine::Error),

    #[error("Unknown entity kind: {0}")]
    UnknownEntity(String),

    #[error("Unknown report: {0}")]
    UnknownReport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Error::Constraint(err.to_string()),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::NotADatabase,
            ) => Error::Connectivity(err.to_string()),
            _ => Error::Storage(err),
        }
    }
}

/// Category of a failed repository operation, reported alongside the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Constraint,
    Connectivity,
    Storage,
}

impl Error {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::Validation(_) | Error::MissingColumn { .. } | Error::UnknownEntity(_) => {
                FailureKind::Validation
            }
            Error::Constraint(_) => FailureKind::Constraint,
            Error::Connectivity(_) => FailureKind::Connectivity,
            _ => FailureKind::Storage,
        }
    }

    /// Whether a fresh connection might succeed where this one failed
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Connectivity(_))
    }
}
