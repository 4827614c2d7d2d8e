//! Bulk admin load of a season from a JSON document.
//!
//! Teams are matched by exact name and created when missing; everything
//! else is inserted. The whole document goes in one transaction, so a
//! constraint failure leaves the store untouched.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::models::{
    DEFAULT_SITE_NAME, DEFAULT_TOTAL_ROUNDS, EntryStats, GameResult, NewGame, NewPlayer,
    NewSiteSettings, PlayerId, TeamId, Theme,
};
use crate::store::Database;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonImport {
    #[serde(default)]
    pub teams: Vec<ImportTeam>,
    #[serde(default)]
    pub players: Vec<NewPlayer>,
    #[serde(default)]
    pub games: Vec<ImportGame>,
    #[serde(default)]
    pub tables: Vec<ImportTable>,
    #[serde(default)]
    pub settings: Option<ImportSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportTeam {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportGame {
    pub round: u32,
    pub date: NaiveDate,
    pub opponent: String,
    pub result: GameResult,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
    #[serde(default)]
    pub appearances: Vec<ImportAppearance>,
}

/// Players are referenced by last name, plus shirt number when two share
/// a surname.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportAppearance {
    pub last_name: String,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub goals: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportTable {
    pub round: u32,
    pub date: NaiveDate,
    #[serde(default)]
    pub entries: Vec<ImportEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportEntry {
    pub team: String,
    #[serde(flatten)]
    pub stats: EntryStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportSettings {
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub league_name: String,
    pub home_club: String,
    #[serde(default)]
    pub max_rounds: Option<u32>,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub teams_created: usize,
    pub players: usize,
    pub games: usize,
    pub appearances: usize,
    pub tables: usize,
    pub entries: usize,
    pub settings: bool,
}

pub fn import_file(db: &Database, path: &Path) -> Result<ImportSummary> {
    let raw = std::fs::read_to_string(path)?;
    import_json(db, &raw)
}

pub fn import_json(db: &Database, raw: &str) -> Result<ImportSummary> {
    let doc: SeasonImport = serde_json::from_str(raw)?;
    import_season(db, &doc)
}

pub fn import_season(db: &Database, doc: &SeasonImport) -> Result<ImportSummary> {
    let tx = db.transaction()?;
    let mut summary = ImportSummary::default();

    let mut teams: HashMap<String, TeamId> = db
        .list_teams(None)?
        .into_iter()
        .map(|t| (t.name, t.id))
        .collect();
    for team in &doc.teams {
        if !teams.contains_key(team.name.trim()) {
            let created = db.create_team(&team.name, team.logo.as_deref())?;
            teams.insert(created.name, created.id);
            summary.teams_created += 1;
        }
    }
    let mut team_id = |name: &str| -> Result<TeamId> {
        let name = name.trim();
        if let Some(id) = teams.get(name) {
            return Ok(*id);
        }
        let created = db.create_team(name, None)?;
        teams.insert(created.name, created.id);
        summary.teams_created += 1;
        Ok(created.id)
    };

    let mut roster: Vec<(String, Option<u32>, PlayerId)> = Vec::new();
    for player in &doc.players {
        let created = db.create_player(player)?;
        roster.push((created.last_name, created.number, created.id));
    }
    let player_id = |app: &ImportAppearance| -> Result<PlayerId> {
        roster
            .iter()
            .find(|(last, number, _)| {
                last.eq_ignore_ascii_case(app.last_name.trim())
                    && (app.number.is_none() || *number == app.number)
            })
            .map(|(_, _, id)| *id)
            .ok_or_else(|| StoreError::MissingReference(format!("player '{}'", app.last_name)))
    };

    let mut games = 0usize;
    let mut appearances = 0usize;
    for game in &doc.games {
        let created = db.create_game(&NewGame {
            round: game.round,
            date: game.date,
            opponent: team_id(&game.opponent)?,
            result: game.result,
            goals_for: game.goals_for,
            goals_against: game.goals_against,
        })?;
        games += 1;
        for app in &game.appearances {
            db.add_appearance(created.id, player_id(app)?, app.goals)?;
            appearances += 1;
        }
    }

    let mut tables = 0usize;
    let mut entries = 0usize;
    for table in &doc.tables {
        let created = db.create_table(table.round, table.date)?;
        tables += 1;
        for entry in &table.entries {
            db.add_entry(created.id, team_id(&entry.team)?, &entry.stats)?;
            entries += 1;
        }
    }

    let mut settings = false;
    if let Some(s) = doc.settings.as_ref() {
        db.create_settings(&NewSiteSettings {
            site_name: s
                .site_name
                .clone()
                .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
            league_name: s.league_name.clone(),
            home_club: team_id(&s.home_club)?,
            is_active: true,
            max_rounds: s.max_rounds.unwrap_or(DEFAULT_TOTAL_ROUNDS),
            theme: s.theme.clone(),
        })?;
        settings = true;
    }

    tx.commit()?;
    summary.players = roster.len();
    summary.games = games;
    summary.appearances = appearances;
    summary.tables = tables;
    summary.entries = entries;
    summary.settings = settings;
    log::info!(
        "imported season: {} teams created, {} games, {} tables",
        summary.teams_created,
        summary.games,
        summary.tables
    );
    Ok(summary)
}
