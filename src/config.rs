use std::path::PathBuf;

use crate::models::{DEFAULT_TOTAL_ROUNDS, SiteSettings};

const DB_FILE: &str = "pescara_stats.sqlite";
const DEFAULT_TRACKED_TEAM: &str = "pescara";

/// Values the report modules need that are not stored per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonConfig {
    pub db_path: PathBuf,
    /// Rounds in a full season; scales the trajectory x axis.
    pub total_rounds: u32,
    /// Fallback used when no active site settings name a home club.
    pub tracked_team_name: String,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_FILE),
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            tracked_team_name: DEFAULT_TRACKED_TEAM.to_string(),
        }
    }
}

impl SeasonConfig {
    /// Read `PESCARA_DB`, `SEASON_TOTAL_ROUNDS` and `TRACKED_TEAM_NAME`.
    /// Missing or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let db_path = std::env::var("PESCARA_DB")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);
        let total_rounds = std::env::var("SEASON_TOTAL_ROUNDS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.total_rounds);
        let tracked_team_name = std::env::var("TRACKED_TEAM_NAME")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or(defaults.tracked_team_name);
        Self {
            db_path,
            total_rounds,
            tracked_team_name,
        }
    }

    /// Active site settings override the season length.
    pub fn with_site_settings(mut self, settings: Option<&SiteSettings>) -> Self {
        if let Some(s) = settings
            && s.max_rounds > 0
        {
            self.total_rounds = s.max_rounds;
        }
        self
    }
}
