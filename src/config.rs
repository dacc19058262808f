use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::Limits;
use crate::storage::connection::DEFAULT_BUSY_TIMEOUT;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClubConfig {
    pub database: Option<String>,
    pub busy_timeout_ms: Option<u64>,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl ClubConfig {
    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_BUSY_TIMEOUT)
    }

    /// Database path from the config, or the default next to the config
    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("clubstore.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("clubstore.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ClubConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ClubConfig = toml::from_str(&contents)?;
    validate_limits(&config.limits)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ClubConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

fn validate_limits(limits: &Limits) -> anyhow::Result<()> {
    for (name, range) in [("player_age", limits.player_age), ("coach_age", limits.coach_age)] {
        if range.min > range.max {
            anyhow::bail!("limits.{}: min {} is greater than max {}", name, range.min, range.max);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AgeRange;

    #[test]
    fn missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("clubstore.toml"))).unwrap().is_none());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clubstore.toml");
        std::fs::write(
            &path,
            "database = \"data/club.db\"\n\n[limits.player_age]\nmin = 15\nmax = 50\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.database_path(), PathBuf::from("data/club.db"));
        assert_eq!(config.limits.player_age, AgeRange::new(15, 50));
        assert_eq!(config.limits.coach_age, Limits::default().coach_age);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.busy_timeout(), DEFAULT_BUSY_TIMEOUT);
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clubstore.toml");
        std::fs::write(&path, "[limits.coach_age]\nmin = 80\nmax = 30\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn write_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clubstore.toml");
        let config = ClubConfig::default();

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let reloaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(reloaded.limits, Limits::default());
    }
}
