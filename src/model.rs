//! Typed creation requests and the validation that runs before storage
//!
//! Loose field mappings (JSON bodies, spreadsheet rows, CLI arguments) are
//! turned into one of the `New*` structs, checked against [`Limits`], and
//! written back out as an insert row in column order.

use crate::entity::EntityKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row as an ordered field-name to value mapping
pub type Record = Map<String, Value>;

/// Field-level rejection raised before anything reaches storage
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} must be {expected}")]
    InvalidType { field: &'static str, expected: &'static str },

    #[error("{field} must be a date (YYYY-MM-DD), got '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange { field: &'static str, min: i64, max: i64, value: i64 },

    #[error("{field} cannot be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("end_date {end} is before start_date {start}")]
    DateOrder { start: NaiveDate, end: NaiveDate },

    #[error("home_team_id and away_team_id must differ (both are {team_id})")]
    SameTeam { team_id: i64 },

    #[error("row {row}: {error}")]
    Row { row: usize, error: Box<ValidationError> },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::Empty { field }
            | Self::InvalidType { field, .. }
            | Self::InvalidDate { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::Negative { field, .. } => field,
            Self::DateOrder { .. } => "end_date",
            Self::SameTeam { .. } => "away_team_id",
            Self::Row { error, .. } => error.field(),
        }
    }

    pub fn at_row(self, row: usize) -> Self {
        Self::Row { row, error: Box::new(self) }
    }
}

/// Inclusive age bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: i64,
    pub max: i64,
}

impl AgeRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    fn check(&self, field: &'static str, value: i64) -> Result<(), ValidationError> {
        if value < self.min || value > self.max {
            return Err(ValidationError::OutOfRange { field, min: self.min, max: self.max, value });
        }
        Ok(())
    }
}

/// Plausibility bounds applied by the schema layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub player_age: AgeRange,
    pub coach_age: AgeRange,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            player_age: AgeRange::new(16, 45),
            coach_age: AgeRange::new(30, 80),
        }
    }
}

/// A typed creation request for one entity kind
pub trait NewEntity: Sized + Serialize {
    const KIND: EntityKind;

    /// Extract the kind's fields from a loose mapping, ignoring extras
    fn from_record(record: &Record) -> Result<Self, ValidationError>;

    /// Check invariants that the type alone does not guarantee
    fn validate(&self, limits: &Limits) -> Result<(), ValidationError>;

    /// Insert row in the kind's column order
    fn to_record(&self) -> Record {
        let fields = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self::KIND
            .columns()
            .iter()
            .map(|c| (c.name.to_string(), fields.get(c.name).cloned().unwrap_or(Value::Null)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTeam {
    pub team_name: String,
    pub city: String,
    pub stadium_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub player_name: String,
    pub age: i64,
    pub position_id: i64,
    #[serde(default)]
    pub team_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCoach {
    pub coach_name: String,
    pub age: i64,
    #[serde(default)]
    pub team_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPosition {
    pub position_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContract {
    pub player_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub player_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMatch {
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub match_date: NaiveDate,
    pub score_home_team: i64,
    pub score_away_team: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSeasonStat {
    pub player_id: i64,
    pub goals: i64,
    pub assists: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub minutes_played: i64,
}

impl NewEntity for NewTeam {
    const KIND: EntityKind = EntityKind::Team;

    fn from_record(record: &Record) -> Result<Self, ValidationError> {
        Ok(Self {
            team_name: text(record, "team_name")?,
            city: text(record, "city")?,
            stadium_name: text(record, "stadium_name")?,
        })
    }

    fn validate(&self, _limits: &Limits) -> Result<(), ValidationError> {
        non_empty("team_name", &self.team_name)?;
        non_empty("city", &self.city)?;
        non_empty("stadium_name", &self.stadium_name)
    }
}

impl NewEntity for NewPlayer {
    const KIND: EntityKind = EntityKind::Player;

    fn from_record(record: &Record) -> Result<Self, ValidationError> {
        Ok(Self {
            player_name: text(record, "player_name")?,
            age: int(record, "age")?,
            position_id: int(record, "position_id")?,
            team_id: optional_int(record, "team_id")?,
        })
    }

    fn validate(&self, limits: &Limits) -> Result<(), ValidationError> {
        non_empty("player_name", &self.player_name)?;
        limits.player_age.check("age", self.age)
    }
}

impl NewEntity for NewCoach {
    const KIND: EntityKind = EntityKind::Coach;

    fn from_record(record: &Record) -> Result<Self, ValidationError> {
        Ok(Self {
            coach_name: text(record, "coach_name")?,
            age: int(record, "age")?,
            team_id: optional_int(record, "team_id")?,
        })
    }

    fn validate(&self, limits: &Limits) -> Result<(), ValidationError> {
        non_empty("coach_name", &self.coach_name)?;
        limits.coach_age.check("age", self.age)
    }
}

impl NewEntity for NewPosition {
    const KIND: EntityKind = EntityKind::Position;

    fn from_record(record: &Record) -> Result<Self, ValidationError> {
        Ok(Self { position_name: text(record, "position_name")? })
    }

    fn validate(&self, _limits: &Limits) -> Result<(), ValidationError> {
        non_empty("position_name", &self.position_name)
    }
}

impl NewEntity for NewContract {
    const KIND: EntityKind = EntityKind::Contract;

    fn from_record(record: &Record) -> Result<Self, ValidationError> {
        Ok(Self {
            player_id: int(record, "player_id")?,
            start_date: date(record, "start_date")?,
            end_date: date(record, "end_date")?,
            player_value: real(record, "player_value")?,
        })
    }

    fn validate(&self, _limits: &Limits) -> Result<(), ValidationError> {
        if self.end_date < self.start_date {
            return Err(ValidationError::DateOrder { start: self.start_date, end: self.end_date });
        }
        if !self.player_value.is_finite() {
            return Err(ValidationError::InvalidType { field: "player_value", expected: "a finite number" });
        }
        non_negative("player_value", self.player_value)
    }
}

impl NewEntity for NewMatch {
    const KIND: EntityKind = EntityKind::Match;

    fn from_record(record: &Record) -> Result<Self, ValidationError> {
        Ok(Self {
            home_team_id: int(record, "home_team_id")?,
            away_team_id: int(record, "away_team_id")?,
            match_date: date(record, "match_date")?,
            score_home_team: int(record, "score_home_team")?,
            score_away_team: int(record, "score_away_team")?,
        })
    }

    fn validate(&self, _limits: &Limits) -> Result<(), ValidationError> {
        if self.home_team_id == self.away_team_id {
            return Err(ValidationError::SameTeam { team_id: self.home_team_id });
        }
        non_negative("score_home_team", self.score_home_team as f64)?;
        non_negative("score_away_team", self.score_away_team as f64)
    }
}

impl NewEntity for NewSeasonStat {
    const KIND: EntityKind = EntityKind::SeasonStat;

    fn from_record(record: &Record) -> Result<Self, ValidationError> {
        Ok(Self {
            player_id: int(record, "player_id")?,
            goals: int(record, "goals")?,
            assists: int(record, "assists")?,
            yellow_cards: int(record, "yellow_cards")?,
            red_cards: int(record, "red_cards")?,
            minutes_played: int(record, "minutes_played")?,
        })
    }

    fn validate(&self, _limits: &Limits) -> Result<(), ValidationError> {
        non_negative("goals", self.goals as f64)?;
        non_negative("assists", self.assists as f64)?;
        non_negative("yellow_cards", self.yellow_cards as f64)?;
        non_negative("red_cards", self.red_cards as f64)?;
        non_negative("minutes_played", self.minutes_played as f64)
    }
}

/// Validate a loose mapping for `kind` and return the normalized insert row
pub fn validate_record(kind: EntityKind, record: &Record, limits: &Limits) -> Result<Record, ValidationError> {
    match kind {
        EntityKind::Team => checked::<NewTeam>(record, limits),
        EntityKind::Player => checked::<NewPlayer>(record, limits),
        EntityKind::Coach => checked::<NewCoach>(record, limits),
        EntityKind::Position => checked::<NewPosition>(record, limits),
        EntityKind::Contract => checked::<NewContract>(record, limits),
        EntityKind::Match => checked::<NewMatch>(record, limits),
        EntityKind::SeasonStat => checked::<NewSeasonStat>(record, limits),
    }
}

fn checked<E: NewEntity>(record: &Record, limits: &Limits) -> Result<Record, ValidationError> {
    let entity = E::from_record(record)?;
    entity.validate(limits)?;
    Ok(entity.to_record())
}

// ========== Field extraction ==========

fn present<'a>(record: &'a Record, field: &'static str) -> Option<&'a Value> {
    match record.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

fn text(record: &Record, field: &'static str) -> Result<String, ValidationError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing { field }),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(ValidationError::InvalidType { field, expected: "text" }),
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

fn int(record: &Record, field: &'static str) -> Result<i64, ValidationError> {
    optional_int(record, field)?.ok_or(ValidationError::Missing { field })
}

fn optional_int(record: &Record, field: &'static str) -> Result<Option<i64>, ValidationError> {
    let Some(value) = present(record, field) else {
        return Ok(None);
    };
    let invalid = ValidationError::InvalidType { field, expected: "an integer" };
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i))
            } else {
                // Spreadsheets hand whole numbers over as floats
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                    _ => Err(invalid),
                }
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid),
        _ => Err(invalid),
    }
}

fn real(record: &Record, field: &'static str) -> Result<f64, ValidationError> {
    let value = present(record, field).ok_or(ValidationError::Missing { field })?;
    let invalid = ValidationError::InvalidType { field, expected: "a number" };
    match value {
        Value::Number(n) => n.as_f64().ok_or(invalid),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid),
        _ => Err(invalid),
    }
}

fn date(record: &Record, field: &'static str) -> Result<NaiveDate, ValidationError> {
    let value = present(record, field).ok_or(ValidationError::Missing { field })?;
    let Value::String(raw) = value else {
        return Err(ValidationError::InvalidDate { field, value: value.to_string() });
    };
    let raw = raw.trim();
    let invalid = || ValidationError::InvalidDate { field, value: raw.to_string() };
    // Accept a trailing time component ("2024-01-01T00:00:00", "2024-01-01 00:00:00")
    let day = match raw.as_bytes().get(10) {
        None => raw,
        Some(b'T' | b' ') => raw.get(..10).ok_or_else(invalid)?,
        Some(_) => return Err(invalid()),
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| invalid())
}
