use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! row_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $label, self.0)
            }
        }
    };
}

row_id!(TeamId, "Team");
row_id!(PlayerId, "Player");
row_id!(GameId, "Game");
row_id!(AppearanceId, "Appearance");
row_id!(TableId, "Table");
row_id!(EntryId, "Entry");
row_id!(SettingsId, "Settings");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub number: Option<u32>,
    pub active: bool,
    pub photo: Option<String>,
}

impl Player {
    /// "F. Last"
    pub fn short_name(&self) -> String {
        match self.first_name.chars().next() {
            Some(initial) => format!("{initial}. {}", self.last_name),
            None => self.last_name.clone(),
        }
    }

    pub fn matches_name(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.first_name.to_lowercase().contains(&needle)
            || self.last_name.to_lowercase().contains(&needle)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "{n} · {}", self.short_name()),
            None => write!(f, "{}", self.short_name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl GameResult {
    pub fn code(self) -> &'static str {
        match self {
            GameResult::Win => "W",
            GameResult::Draw => "D",
            GameResult::Loss => "L",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "W" => Some(GameResult::Win),
            "D" => Some(GameResult::Draw),
            "L" => Some(GameResult::Loss),
            _ => None,
        }
    }

    /// Style class used by the trajectory table chips.
    pub fn css_class(self) -> &'static str {
        match self {
            GameResult::Win => "win",
            GameResult::Draw => "draw",
            GameResult::Loss => "loss",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub round: u32,
    pub date: NaiveDate,
    pub opponent: TeamId,
    pub result: GameResult,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl Game {
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    pub fn score(&self) -> String {
        format!("{}-{}", self.goals_for, self.goals_against)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub id: AppearanceId,
    pub game: GameId,
    pub player: PlayerId,
    pub goals: u32,
}

/// One published standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueTable {
    pub id: TableId,
    pub round: u32,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueTableEntry {
    pub id: EntryId,
    pub table: TableId,
    pub team: TeamId,
    pub position: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: i32,
    pub goal_difference: i32,
}

/// A table together with its entries (ordered by position) and team names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub table: LeagueTable,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub entry: LeagueTableEntry,
    pub team: Team,
}

impl Snapshot {
    pub fn entry_for(&self, team: TeamId) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.entry.team == team)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub id: SettingsId,
    pub site_name: String,
    pub league_name: String,
    pub home_club: TeamId,
    pub is_active: bool,
    pub max_rounds: u32,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub color_primary: Option<String>,
    pub color_accent: Option<String>,
    pub color_win: Option<String>,
    pub color_draw: Option<String>,
    pub color_loss: Option<String>,
}

/// An appearance as seen from a player's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAppearance {
    pub appearance: Appearance,
    pub game: Game,
    pub opponent: Team,
}

/// An appearance as seen from a game's lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAppearance {
    pub appearance: Appearance,
    pub player: Player,
}

// Write-side shapes. Ids are assigned by the store.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGame {
    pub round: u32,
    pub date: NaiveDate,
    pub opponent: TeamId,
    pub result: GameResult,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStats {
    pub position: u32,
    #[serde(default)]
    pub played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub goal_difference: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSiteSettings {
    #[serde(default = "default_site_name")]
    pub site_name: String,
    #[serde(default)]
    pub league_name: String,
    pub home_club: TeamId,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    #[serde(default)]
    pub theme: Theme,
}

pub const DEFAULT_SITE_NAME: &str = "Pescara";
pub const DEFAULT_TOTAL_ROUNDS: u32 = 25;

fn default_true() -> bool {
    true
}

fn default_site_name() -> String {
    DEFAULT_SITE_NAME.to_string()
}

fn default_max_rounds() -> u32 {
    DEFAULT_TOTAL_ROUNDS
}
