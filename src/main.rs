//! Clubstore CLI - football club records from the command line

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clubstore::config::{self, ClubConfig};
use clubstore::model::{
    NewCoach, NewContract, NewMatch, NewPlayer, NewPosition, NewSeasonStat, NewTeam, Record,
};
use clubstore::ui::{self, Icons};
use clubstore::{ClubStore, Database, EntityKind, QueryCatalog, Report};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "clubstore")]
#[command(version)]
#[command(about = "Football club records: teams, players, coaches, contracts, matches and season stats")]
#[command(long_about = r#"
Clubstore keeps a relational record of football clubs and answers
a fixed catalog of reports over it.

Example usage:
  clubstore init
  clubstore add team --name "Real Madrid" --city Madrid --stadium "Santiago Bernabéu"
  clubstore import players --file players.xlsx
  clubstore report top-teams --limit 3
  clubstore serve --port 8080
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database schema
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Add a single record
    Add {
        #[command(subcommand)]
        entity: AddCommand,
    },

    /// Import a spreadsheet of records in one transaction
    Import {
        /// Entity kind (teams, players, coaches, positions, contracts, matches, season-stats)
        entity: String,

        /// Path to the spreadsheet (xlsx, xls, ods)
        #[arg(long)]
        file: PathBuf,

        /// Sheet name (defaults to the first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// List every record of a kind
    List {
        entity: String,
    },

    /// Show one record by id
    Show {
        entity: String,
        id: i64,
    },

    /// Run a catalog report
    Report {
        name: String,

        /// Maximum number of rows
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List available reports
    Reports,

    /// Season totals and latest contract for a player
    PlayerStats {
        id: i64,
    },

    /// Show row counts per table
    Stats,

    /// Start the HTTP API
    Serve {
        /// Port to listen on (defaults to the config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum AddCommand {
    Team {
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        stadium: String,
    },
    Player {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: i64,
        #[arg(long)]
        position: i64,
        #[arg(long)]
        team: Option<i64>,
    },
    Coach {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: i64,
        #[arg(long)]
        team: Option<i64>,
    },
    Position {
        #[arg(long)]
        name: String,
    },
    Contract {
        #[arg(long)]
        player: i64,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        value: f64,
    },
    Match {
        #[arg(long)]
        home: i64,
        #[arg(long)]
        away: i64,
        /// Match date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        home_score: i64,
        #[arg(long)]
        away_score: i64,
    },
    SeasonStat {
        #[arg(long)]
        player: i64,
        #[arg(long)]
        goals: i64,
        #[arg(long)]
        assists: i64,
        #[arg(long)]
        yellow_cards: i64,
        #[arg(long)]
        red_cards: i64,
        #[arg(long)]
        minutes: i64,
    },
}

impl AddCommand {
    fn run(self, store: &ClubStore) -> clubstore::InsertOutcome {
        match self {
            AddCommand::Team { name, city, stadium } => store.create(&NewTeam {
                team_name: name,
                city,
                stadium_name: stadium,
            }),
            AddCommand::Player { name, age, position, team } => store.create(&NewPlayer {
                player_name: name,
                age,
                position_id: position,
                team_id: team,
            }),
            AddCommand::Coach { name, age, team } => store.create(&NewCoach {
                coach_name: name,
                age,
                team_id: team,
            }),
            AddCommand::Position { name } => store.create(&NewPosition { position_name: name }),
            AddCommand::Contract { player, start, end, value } => store.create(&NewContract {
                player_id: player,
                start_date: start,
                end_date: end,
                player_value: value,
            }),
            AddCommand::Match { home, away, date, home_score, away_score } => {
                store.create(&NewMatch {
                    home_team_id: home,
                    away_team_id: away,
                    match_date: date,
                    score_home_team: home_score,
                    score_away_team: away_score,
                })
            }
            AddCommand::SeasonStat { player, goals, assists, yellow_cards, red_cards, minutes } => {
                store.create(&NewSeasonStat {
                    player_id: player,
                    goals,
                    assists,
                    yellow_cards,
                    red_cards,
                    minutes_played: minutes,
                })
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    if let Some(database) = &cli.database {
        config.database = Some(database.display().to_string());
    }
    let format = cli.format;

    match cli.command {
        Commands::Init { force } => {
            let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
            config::write_config(&config_path, &config, force)?;
            open_store(&config)?;

            ui::success(&format!("Wrote config to {}", config_path.display()));
            ui::info("Database", &config.database_path().display().to_string());
        }

        Commands::Add { entity } => {
            let store = open_store(&config)?;
            let outcome = entity.run(&store);
            finish(format, &outcome, outcome.ok, &outcome.message)?;
        }

        Commands::Import { entity, file, sheet } => {
            let kind: EntityKind = entity.parse()?;
            let store = open_store(&config)?;
            if format == OutputFormat::Table {
                println!("{} Importing {} from {}", Icons::UPLOAD, kind.plural(), file.display());
            }
            let outcome = store.import_sheet(kind, &file, sheet.as_deref());
            finish(format, &outcome, outcome.ok, &outcome.message)?;
        }

        Commands::List { entity } => {
            let kind: EntityKind = entity.parse()?;
            let rows = open_store(&config)?.get_all(kind);
            print_rows(format, &rows, &format!("No {} found.", kind.plural()))?;
        }

        Commands::Show { entity, id } => {
            let kind: EntityKind = entity.parse()?;
            match open_store(&config)?.get_by_id(kind, id) {
                Some(record) => print_record(format, &record)?,
                None => anyhow::bail!("{} {} not found", kind.label(), id),
            }
        }

        Commands::Report { name, limit } => {
            let store = open_store(&config)?;
            let rows = QueryCatalog::new(store.database()).run_named(&name, limit)?;
            if format == OutputFormat::Table {
                ui::header(&format!("{} {}", Icons::TROPHY, name));
            }
            print_rows(format, &rows, "No rows.")?;
        }

        Commands::Reports => {
            let rows: Vec<Record> = Report::all()
                .iter()
                .map(|report| {
                    let mut row = Record::new();
                    row.insert("name".into(), Value::from(report.as_str()));
                    row.insert("description".into(), Value::from(report.description()));
                    row
                })
                .collect();
            print_rows(format, &rows, "No reports.")?;
        }

        Commands::PlayerStats { id } => {
            let store = open_store(&config)?;
            match QueryCatalog::new(store.database()).player_summary(id) {
                Some(summary) => print_record(format, &summary)?,
                None => anyhow::bail!("Player {} not found", id),
            }
        }

        Commands::Stats => {
            let stats = open_store(&config)?.stats();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Table => {
                    ui::section(&format!("{} Stats", Icons::STATS));
                    print!("{}", stats);
                }
            }
        }

        Commands::Serve { port } => {
            let store = open_store(&config)?;
            let port = port.unwrap_or(config.server.port);
            let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
            runtime.block_on(clubstore::server::start_server(port, store))?;
        }
    }

    Ok(())
}

fn open_store(config: &ClubConfig) -> anyhow::Result<ClubStore> {
    let path = config.database_path();
    tracing::debug!("Opening database {}", path.display());
    let db = Database::open(&path)?.with_busy_timeout(config.busy_timeout());
    Ok(ClubStore::new(db, config.limits))
}

/// Print an insert outcome; a failed outcome becomes the command's error
fn finish<T: Serialize>(format: OutputFormat, outcome: &T, ok: bool, message: &str) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    }
    if !ok {
        anyhow::bail!("{}", message);
    }
    if format == OutputFormat::Table {
        ui::success(message);
    }
    Ok(())
}

fn print_rows(format: OutputFormat, rows: &[Record], empty: &str) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Table if rows.is_empty() => println!("{} {}", Icons::EMPTY, empty),
        OutputFormat::Table => println!("{}", ui::records_table(rows)),
    }
    Ok(())
}

fn print_record(format: OutputFormat, record: &Record) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Table => println!("{}", ui::kv_table(record.iter().map(|(k, v)| (k.as_str(), v)))),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubstore::InsertOutcome;

    #[test]
    fn failed_outcome_is_an_error() {
        let outcome = InsertOutcome::failed(&clubstore::Error::Constraint("UNIQUE".into()));
        let err = finish(OutputFormat::Json, &outcome, outcome.ok, &outcome.message).unwrap_err();
        assert!(err.to_string().contains("UNIQUE"));
    }

    #[test]
    fn successful_outcome_is_ok() {
        let outcome = InsertOutcome::inserted(EntityKind::Team, 1);
        assert!(finish(OutputFormat::Table, &outcome, outcome.ok, &outcome.message).is_ok());
    }
}
