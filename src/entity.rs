//! Entity kinds - the capability tag every repository operation is keyed on
//!
//! Seven kinds of records live in the store:
//! - `Team`, `Player`, `Coach`, `Position`: the club roster
//! - `Contract`, `Match`, `SeasonStat`: records added by the API variant
//!
//! Each kind knows its table, id column, insertable columns and the
//! enriched select used when reading rows back.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A storable record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Team,
    Player,
    Coach,
    Position,
    Contract,
    Match,
    SeasonStat,
}

/// An insertable column and whether a value is required for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub required: bool,
}

const fn required(name: &'static str) -> Column {
    Column { name, required: true }
}

const fn optional(name: &'static str) -> Column {
    Column { name, required: false }
}

const TEAM_COLUMNS: &[Column] = &[
    required("team_name"),
    required("city"),
    required("stadium_name"),
];

const PLAYER_COLUMNS: &[Column] = &[
    required("player_name"),
    required("age"),
    required("position_id"),
    optional("team_id"),
];

const COACH_COLUMNS: &[Column] = &[
    required("coach_name"),
    required("age"),
    optional("team_id"),
];

const POSITION_COLUMNS: &[Column] = &[required("position_name")];

const CONTRACT_COLUMNS: &[Column] = &[
    required("player_id"),
    required("start_date"),
    required("end_date"),
    required("player_value"),
];

const MATCH_COLUMNS: &[Column] = &[
    required("home_team_id"),
    required("away_team_id"),
    required("match_date"),
    required("score_home_team"),
    required("score_away_team"),
];

const SEASON_STAT_COLUMNS: &[Column] = &[
    required("player_id"),
    required("goals"),
    required("assists"),
    required("yellow_cards"),
    required("red_cards"),
    required("minutes_played"),
];

impl EntityKind {
    /// Get the string representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Team => "team",
            EntityKind::Player => "player",
            EntityKind::Coach => "coach",
            EntityKind::Position => "position",
            EntityKind::Contract => "contract",
            EntityKind::Match => "match",
            EntityKind::SeasonStat => "season-stat",
        }
    }

    /// Get all entity kinds, parents before children
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Team,
            EntityKind::Position,
            EntityKind::Player,
            EntityKind::Coach,
            EntityKind::Contract,
            EntityKind::Match,
            EntityKind::SeasonStat,
        ]
    }

    /// Human label used in outcome messages ("Team successfully added")
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Team => "Team",
            EntityKind::Player => "Player",
            EntityKind::Coach => "Coach",
            EntityKind::Position => "Position",
            EntityKind::Contract => "Contract",
            EntityKind::Match => "Match",
            EntityKind::SeasonStat => "Season stat",
        }
    }

    /// Plural label for batch messages
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Team => "teams",
            EntityKind::Player => "players",
            EntityKind::Coach => "coaches",
            EntityKind::Position => "positions",
            EntityKind::Contract => "contracts",
            EntityKind::Match => "matches",
            EntityKind::SeasonStat => "season stats",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Team => "teams",
            EntityKind::Player => "players",
            EntityKind::Coach => "coaches",
            EntityKind::Position => "positions",
            EntityKind::Contract => "contracts",
            EntityKind::Match => "matches",
            EntityKind::SeasonStat => "season_stats",
        }
    }

    /// Primary key column, assigned by storage
    pub fn id_column(&self) -> &'static str {
        match self {
            EntityKind::Team => "team_id",
            EntityKind::Player => "player_id",
            EntityKind::Coach => "coach_id",
            EntityKind::Position => "position_id",
            EntityKind::Contract => "contract_id",
            EntityKind::Match => "match_id",
            EntityKind::SeasonStat => "stat_id",
        }
    }

    /// Columns written by an insert, in statement order.
    ///
    /// These are also the spreadsheet headers accepted by bulk ingestion.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            EntityKind::Team => TEAM_COLUMNS,
            EntityKind::Player => PLAYER_COLUMNS,
            EntityKind::Coach => COACH_COLUMNS,
            EntityKind::Position => POSITION_COLUMNS,
            EntityKind::Contract => CONTRACT_COLUMNS,
            EntityKind::Match => MATCH_COLUMNS,
            EntityKind::SeasonStat => SEASON_STAT_COLUMNS,
        }
    }

    /// Parameterized insert statement for this kind
    pub fn insert_sql(&self) -> String {
        let columns = self.columns();
        let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table(),
            names.join(", "),
            placeholders.join(", ")
        )
    }

    /// Select with denormalized fields from related tables.
    ///
    /// The alias of the kind's own table is always `e` so callers can add
    /// `WHERE e.<id> = ?1` and `ORDER BY e.<id>`.
    pub fn enriched_select(&self) -> &'static str {
        match self {
            EntityKind::Team => "SELECT e.* FROM teams e",
            EntityKind::Position => "SELECT e.* FROM positions e",
            EntityKind::Player => {
                "SELECT e.*, t.team_name, pos.position_name
                 FROM players e
                 LEFT JOIN teams t ON e.team_id = t.team_id
                 LEFT JOIN positions pos ON e.position_id = pos.position_id"
            }
            EntityKind::Coach => {
                "SELECT e.*, t.team_name
                 FROM coaches e
                 LEFT JOIN teams t ON e.team_id = t.team_id"
            }
            EntityKind::Contract => {
                "SELECT e.*, p.player_name
                 FROM contracts e
                 LEFT JOIN players p ON e.player_id = p.player_id"
            }
            EntityKind::Match => {
                "SELECT e.*, home.team_name AS home_team_name, away.team_name AS away_team_name
                 FROM matches e
                 LEFT JOIN teams home ON e.home_team_id = home.team_id
                 LEFT JOIN teams away ON e.away_team_id = away.team_id"
            }
            EntityKind::SeasonStat => {
                "SELECT e.*, p.player_name
                 FROM season_stats e
                 LEFT JOIN players p ON e.player_id = p.player_id"
            }
        }
    }

    pub fn select_all_sql(&self) -> String {
        format!("{} ORDER BY e.{} ASC", self.enriched_select(), self.id_column())
    }

    pub fn select_by_id_sql(&self) -> String {
        format!("{} WHERE e.{} = ?1", self.enriched_select(), self.id_column())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "team" | "teams" => Ok(EntityKind::Team),
            "player" | "players" => Ok(EntityKind::Player),
            "coach" | "coaches" => Ok(EntityKind::Coach),
            "position" | "positions" => Ok(EntityKind::Position),
            "contract" | "contracts" => Ok(EntityKind::Contract),
            "match" | "matches" => Ok(EntityKind::Match),
            "season-stat" | "season-stats" => Ok(EntityKind::SeasonStat),
            _ => Err(Error::UnknownEntity(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_route_and_table_names() {
        assert_eq!("teams".parse::<EntityKind>().unwrap(), EntityKind::Team);
        assert_eq!("season_stats".parse::<EntityKind>().unwrap(), EntityKind::SeasonStat);
        assert_eq!("Season-Stat".parse::<EntityKind>().unwrap(), EntityKind::SeasonStat);
        assert_eq!("matches".parse::<EntityKind>().unwrap(), EntityKind::Match);
        assert!("referees".parse::<EntityKind>().is_err());
    }

    #[test]
    fn insert_sql_is_parameterized() {
        assert_eq!(
            EntityKind::Coach.insert_sql(),
            "INSERT INTO coaches (coach_name, age, team_id) VALUES (?1, ?2, ?3)"
        );
    }

    #[test]
    fn columns_cover_every_kind() {
        assert_eq!(EntityKind::Team.columns().len(), 3);
        assert_eq!(EntityKind::SeasonStat.columns()[5].name, "minutes_played");
        assert!(!EntityKind::Player.columns()[3].required);
        for kind in EntityKind::all() {
            assert!(!kind.columns().is_empty());
        }
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for kind in EntityKind::all() {
            assert_eq!(kind.to_string().parse::<EntityKind>().unwrap(), *kind);
        }
    }
}
