//! Outcomes reported across the repository boundary

use serde::Serialize;

use crate::entity::EntityKind;
use crate::{Error, FailureKind};

/// Result of a single insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertOutcome {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl InsertOutcome {
    pub fn inserted(kind: EntityKind, id: i64) -> Self {
        Self {
            ok: true,
            message: format!("{} successfully added", kind.label()),
            id: Some(id),
            failure: None,
        }
    }

    pub fn failed(err: &Error) -> Self {
        Self {
            ok: false,
            message: err.to_string(),
            id: None,
            failure: Some(err.failure_kind()),
        }
    }
}

/// Result of an atomic batch insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub ok: bool,
    pub message: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl BatchOutcome {
    pub fn inserted(kind: EntityKind, count: usize) -> Self {
        Self {
            ok: true,
            message: format!("{} {} successfully added", count, kind.plural()),
            count,
            failure: None,
        }
    }

    /// Nothing from the batch was persisted
    pub fn failed(err: &Error) -> Self {
        Self {
            ok: false,
            message: format!("{} (no rows were written)", err),
            count: 0,
            failure: Some(err.failure_kind()),
        }
    }
}
