//! Query catalog
//!
//! A fixed menu of named, read-only reports:
//! - Age profile per team (average, youngest, oldest)
//! - Join reports (teams without players, players without a team)
//! - Rankings (top teams by roster size, position distribution)
//! - Full per-team statistics
//!
//! Every ordering is total: ties are broken by identifier ascending.

use std::str::FromStr;

use rusqlite::types::Value as SqlValue;
use serde::Serialize;

use crate::model::Record;
use crate::storage::{fetch_records, Database};
use crate::{Error, Result};

/// A named report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Report {
    AverageAge,
    YoungestPlayers,
    OldestPlayers,
    TeamsWithoutPlayers,
    PlayersWithoutTeam,
    TopTeams,
    PositionDistribution,
    TeamStats,
}

impl Report {
    pub fn as_str(&self) -> &'static str {
        match self {
            Report::AverageAge => "average-age",
            Report::YoungestPlayers => "youngest-players",
            Report::OldestPlayers => "oldest-players",
            Report::TeamsWithoutPlayers => "teams-without-players",
            Report::PlayersWithoutTeam => "players-without-team",
            Report::TopTeams => "top-teams",
            Report::PositionDistribution => "position-distribution",
            Report::TeamStats => "team-stats",
        }
    }

    pub fn all() -> &'static [Report] {
        &[
            Report::AverageAge,
            Report::YoungestPlayers,
            Report::OldestPlayers,
            Report::TeamsWithoutPlayers,
            Report::PlayersWithoutTeam,
            Report::TopTeams,
            Report::PositionDistribution,
            Report::TeamStats,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Report::AverageAge => "Average player age per team",
            Report::YoungestPlayers => "Youngest player of each team",
            Report::OldestPlayers => "Oldest player of each team",
            Report::TeamsWithoutPlayers => "Teams with no registered players",
            Report::PlayersWithoutTeam => "Players not assigned to any team",
            Report::TopTeams => "Teams ranked by roster size",
            Report::PositionDistribution => "Number of players per position",
            Report::TeamStats => "Roster, staff and match record per team",
        }
    }

    /// Row limit applied when the caller gives none
    pub fn default_limit(&self) -> Option<usize> {
        match self {
            Report::TopTeams => Some(5),
            _ => None,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Report::AverageAge => {
                "SELECT t.team_id, t.team_name,
                        ROUND(AVG(p.age), 2) AS average_age,
                        COUNT(p.player_id) AS player_count
                 FROM teams t
                 JOIN players p ON p.team_id = t.team_id
                 GROUP BY t.team_id, t.team_name
                 ORDER BY t.team_id ASC
                 LIMIT ?1"
            }
            Report::YoungestPlayers => {
                "SELECT team_id, team_name, player_id, player_name, age
                 FROM (
                     SELECT t.team_id, t.team_name, p.player_id, p.player_name, p.age,
                            ROW_NUMBER() OVER (
                                PARTITION BY t.team_id ORDER BY p.age ASC, p.player_id ASC
                            ) AS age_rank
                     FROM teams t
                     JOIN players p ON p.team_id = t.team_id
                 )
                 WHERE age_rank = 1
                 ORDER BY team_id ASC
                 LIMIT ?1"
            }
            Report::OldestPlayers => {
                "SELECT team_id, team_name, player_id, player_name, age
                 FROM (
                     SELECT t.team_id, t.team_name, p.player_id, p.player_name, p.age,
                            ROW_NUMBER() OVER (
                                PARTITION BY t.team_id ORDER BY p.age DESC, p.player_id ASC
                            ) AS age_rank
                     FROM teams t
                     JOIN players p ON p.team_id = t.team_id
                 )
                 WHERE age_rank = 1
                 ORDER BY team_id ASC
                 LIMIT ?1"
            }
            Report::TeamsWithoutPlayers => {
                "SELECT t.team_id, t.team_name, t.city, t.stadium_name
                 FROM teams t
                 LEFT JOIN players p ON p.team_id = t.team_id
                 WHERE p.player_id IS NULL
                 ORDER BY t.team_id ASC
                 LIMIT ?1"
            }
            Report::PlayersWithoutTeam => {
                "SELECT p.player_id, p.player_name, p.age, pos.position_name
                 FROM teams t
                 RIGHT JOIN players p ON p.team_id = t.team_id
                 LEFT JOIN positions pos ON pos.position_id = p.position_id
                 WHERE t.team_id IS NULL
                 ORDER BY p.player_id ASC
                 LIMIT ?1"
            }
            Report::TopTeams => {
                "SELECT t.team_id, t.team_name, COUNT(p.player_id) AS player_count
                 FROM teams t
                 LEFT JOIN players p ON p.team_id = t.team_id
                 GROUP BY t.team_id, t.team_name
                 ORDER BY player_count DESC, t.team_id ASC
                 LIMIT ?1"
            }
            Report::PositionDistribution => {
                "SELECT pos.position_id, pos.position_name, COUNT(p.player_id) AS player_count
                 FROM positions pos
                 LEFT JOIN players p ON p.position_id = pos.position_id
                 GROUP BY pos.position_id, pos.position_name
                 ORDER BY player_count DESC, pos.position_id ASC
                 LIMIT ?1"
            }
            Report::TeamStats => {
                "SELECT t.team_id, t.team_name, t.city, t.stadium_name,
                        (SELECT COUNT(*) FROM players p WHERE p.team_id = t.team_id) AS players,
                        (SELECT COUNT(*) FROM coaches c WHERE c.team_id = t.team_id) AS coaches,
                        (SELECT ROUND(AVG(p.age), 2) FROM players p WHERE p.team_id = t.team_id) AS average_age,
                        (SELECT COUNT(*) FROM matches m
                         WHERE t.team_id IN (m.home_team_id, m.away_team_id)) AS matches_played,
                        (SELECT COUNT(*) FROM matches m
                         WHERE (m.home_team_id = t.team_id AND m.score_home_team > m.score_away_team)
                            OR (m.away_team_id = t.team_id AND m.score_away_team > m.score_home_team)) AS wins,
                        (SELECT COUNT(*) FROM matches m
                         WHERE t.team_id IN (m.home_team_id, m.away_team_id)
                           AND m.score_home_team = m.score_away_team) AS draws,
                        (SELECT COUNT(*) FROM matches m
                         WHERE (m.home_team_id = t.team_id AND m.score_home_team < m.score_away_team)
                            OR (m.away_team_id = t.team_id AND m.score_away_team < m.score_home_team)) AS losses,
                        (SELECT COALESCE(SUM(CASE WHEN m.home_team_id = t.team_id
                                                  THEN m.score_home_team ELSE m.score_away_team END), 0)
                         FROM matches m
                         WHERE t.team_id IN (m.home_team_id, m.away_team_id)) AS goals_for,
                        (SELECT COALESCE(SUM(CASE WHEN m.home_team_id = t.team_id
                                                  THEN m.score_away_team ELSE m.score_home_team END), 0)
                         FROM matches m
                         WHERE t.team_id IN (m.home_team_id, m.away_team_id)) AS goals_against,
                        (SELECT COALESCE(SUM(s.goals), 0)
                         FROM season_stats s
                         JOIN players p ON p.player_id = s.player_id
                         WHERE p.team_id = t.team_id) AS player_goals
                 FROM teams t
                 ORDER BY t.team_id ASC
                 LIMIT ?1"
            }
        }
    }
}

impl FromStr for Report {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Report::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| Error::UnknownReport(s.to_string()))
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Season totals for one player joined with the latest contract
const PLAYER_SUMMARY_SQL: &str = "
    SELECT p.player_id, p.player_name, t.team_name,
           COUNT(s.stat_id) AS seasons,
           COALESCE(SUM(s.goals), 0) AS goals,
           COALESCE(SUM(s.assists), 0) AS assists,
           COALESCE(SUM(s.yellow_cards), 0) AS yellow_cards,
           COALESCE(SUM(s.red_cards), 0) AS red_cards,
           COALESCE(SUM(s.minutes_played), 0) AS minutes_played,
           c.player_value, c.start_date, c.end_date
    FROM players p
    LEFT JOIN teams t ON t.team_id = p.team_id
    LEFT JOIN season_stats s ON s.player_id = p.player_id
    LEFT JOIN contracts c ON c.contract_id = (
        SELECT c2.contract_id FROM contracts c2
        WHERE c2.player_id = p.player_id
        ORDER BY c2.end_date DESC, c2.contract_id DESC
        LIMIT 1
    )
    WHERE p.player_id = ?1
    GROUP BY p.player_id";

/// Runs catalog reports against a database
pub struct QueryCatalog<'a> {
    db: &'a Database,
}

impl<'a> QueryCatalog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Run a report. Failures are logged and yield no rows.
    pub fn run(&self, report: Report, limit: Option<usize>) -> Vec<Record> {
        let limit = limit
            .or(report.default_limit())
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
            .unwrap_or(-1);

        fetch_records(self.db, report.sql(), &[SqlValue::Integer(limit)]).unwrap_or_else(|err| {
            tracing::error!(report = %report, error = %err, "Report failed");
            Vec::new()
        })
    }

    /// Run a report by name
    pub fn run_named(&self, name: &str, limit: Option<usize>) -> Result<Vec<Record>> {
        let report = name.parse::<Report>()?;
        Ok(self.run(report, limit))
    }

    /// Season totals and latest contract for one player; absent if no such player
    pub fn player_summary(&self, player_id: i64) -> Option<Record> {
        match fetch_records(self.db, PLAYER_SUMMARY_SQL, &[SqlValue::Integer(player_id)]) {
            Ok(rows) => rows.into_iter().next(),
            Err(err) => {
                tracing::error!(player_id, error = %err, "Player summary failed");
                None
            }
        }
    }
}
