//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - teams(team_id, team_name, city, stadium_name)
//! - positions(position_id, position_name)
//! - players(player_id, player_name, age, position_id, team_id)
//! - coaches(coach_id, coach_name, age, team_id)
//! - contracts(contract_id, player_id, start_date, end_date, player_value)
//! - matches(match_id, home_team_id, away_team_id, match_date, score_home_team, score_away_team)
//! - season_stats(stat_id, player_id, goals, assists, yellow_cards, red_cards, minutes_played)

pub mod connection;
pub mod outcome;
pub mod schema;
pub mod sqlite;

pub use connection::Database;
pub use outcome::{BatchOutcome, InsertOutcome};
pub use sqlite::{ClubStore, StoreStats, TableCount};

pub(crate) use sqlite::fetch_records;
