//! Database schema definitions

/// SQL to create the teams table
pub const CREATE_TEAMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    team_id INTEGER PRIMARY KEY AUTOINCREMENT,
    team_name TEXT NOT NULL CHECK (length(trim(team_name)) > 0),
    city TEXT NOT NULL,
    stadium_name TEXT NOT NULL
)
"#;

/// SQL to create the positions table
pub const CREATE_POSITIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS positions (
    position_id INTEGER PRIMARY KEY AUTOINCREMENT,
    position_name TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the players table
/// Team assignment is optional
pub const CREATE_PLAYERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    player_id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_name TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age > 0),
    position_id INTEGER NOT NULL REFERENCES positions(position_id),
    team_id INTEGER REFERENCES teams(team_id)
)
"#;

/// SQL to create the coaches table
pub const CREATE_COACHES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS coaches (
    coach_id INTEGER PRIMARY KEY AUTOINCREMENT,
    coach_name TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age > 0),
    team_id INTEGER REFERENCES teams(team_id)
)
"#;

/// SQL to create the contracts table
/// Dates are ISO-8601 text so lexical order is chronological order
pub const CREATE_CONTRACTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contracts (
    contract_id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id INTEGER NOT NULL REFERENCES players(player_id),
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    player_value REAL NOT NULL CHECK (player_value >= 0),
    CHECK (end_date >= start_date)
)
"#;

/// SQL to create the matches table
pub const CREATE_MATCHES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    match_id INTEGER PRIMARY KEY AUTOINCREMENT,
    home_team_id INTEGER NOT NULL REFERENCES teams(team_id),
    away_team_id INTEGER NOT NULL REFERENCES teams(team_id),
    match_date TEXT NOT NULL,
    score_home_team INTEGER NOT NULL CHECK (score_home_team >= 0),
    score_away_team INTEGER NOT NULL CHECK (score_away_team >= 0),
    CHECK (home_team_id <> away_team_id)
)
"#;

/// SQL to create the season_stats table
pub const CREATE_SEASON_STATS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS season_stats (
    stat_id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id INTEGER NOT NULL REFERENCES players(player_id),
    goals INTEGER NOT NULL DEFAULT 0 CHECK (goals >= 0),
    assists INTEGER NOT NULL DEFAULT 0 CHECK (assists >= 0),
    yellow_cards INTEGER NOT NULL DEFAULT 0 CHECK (yellow_cards >= 0),
    red_cards INTEGER NOT NULL DEFAULT 0 CHECK (red_cards >= 0),
    minutes_played INTEGER NOT NULL DEFAULT 0 CHECK (minutes_played >= 0)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id)",
    "CREATE INDEX IF NOT EXISTS idx_players_position ON players(position_id)",
    "CREATE INDEX IF NOT EXISTS idx_coaches_team ON coaches(team_id)",
    "CREATE INDEX IF NOT EXISTS idx_contracts_player ON contracts(player_id)",
    "CREATE INDEX IF NOT EXISTS idx_matches_home ON matches(home_team_id)",
    "CREATE INDEX IF NOT EXISTS idx_matches_away ON matches(away_team_id)",
    "CREATE INDEX IF NOT EXISTS idx_season_stats_player ON season_stats(player_id)",
];

/// Per-connection settings; foreign keys are off by default in SQLite
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// All schema creation statements, parents before children
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_TEAMS_TABLE,
        CREATE_POSITIONS_TABLE,
        CREATE_PLAYERS_TABLE,
        CREATE_COACHES_TABLE,
        CREATE_CONTRACTS_TABLE,
        CREATE_MATCHES_TABLE,
        CREATE_SEASON_STATS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
