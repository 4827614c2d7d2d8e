use chrono::NaiveDate;
use serde::Serialize;

use crate::config::SeasonConfig;
use crate::error::Result;
use crate::models::{Game, LeagueTableEntry, Team};
use crate::store::Database;
use crate::tracked::resolve_tracked_team;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameCard {
    pub game: Game,
    pub opponent: Option<Team>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HomeSummary {
    pub tracked_team: Option<Team>,
    pub last_game: Option<GameCard>,
    pub next_game: Option<GameCard>,
    pub latest_round: Option<u32>,
    pub total_rounds: u32,
    pub team_count: usize,
    pub entry: Option<LeagueTableEntry>,
    pub position: Option<u32>,
    pub points: Option<i32>,
    pub games_played: u32,
    pub max_potential_points: u32,
}

/// Front page figures as of `today`.
pub fn home(db: &Database, cfg: &SeasonConfig, today: NaiveDate) -> Result<HomeSummary> {
    let tracked_team = resolve_tracked_team(db, cfg)?;
    let last_game = match db.last_game_on_or_before(today)? {
        Some(game) => Some(card(db, game)?),
        None => None,
    };
    let next_game = match db.next_game_after(today)? {
        Some(game) => Some(card(db, game)?),
        None => None,
    };

    let mut out = HomeSummary {
        last_game,
        next_game,
        total_rounds: cfg.total_rounds,
        ..HomeSummary::default()
    };

    if let Some(snap) = db.latest_snapshot()? {
        out.latest_round = Some(snap.table.round);
        out.team_count = snap.entries.len();
        if let Some(team) = tracked_team.as_ref()
            && let Some(row) = snap.entry_for(team.id)
        {
            out.position = Some(row.entry.position);
            out.points = Some(row.entry.points);
            out.games_played = row.entry.played;
            out.max_potential_points = row.entry.played.saturating_mul(3);
            out.entry = Some(row.entry.clone());
        }
    }
    out.tracked_team = tracked_team;
    Ok(out)
}

fn card(db: &Database, game: Game) -> Result<GameCard> {
    let opponent = db.get_team(game.opponent)?;
    Ok(GameCard { game, opponent })
}
