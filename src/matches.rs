use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::models::{Game, GameAppearance, GameId, Team, TeamId};
use crate::params::Params;
use crate::store::{Database, GameFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineupRow {
    pub player: String,
    pub number: Option<u32>,
    pub goals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRow {
    pub game: Game,
    pub opponent: Option<Team>,
    pub goal_difference: i64,
    /// Opponent's place in the latest published table.
    pub opponent_position: Option<u32>,
    pub lineup: Vec<LineupRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchList {
    pub games: Vec<MatchRow>,
    /// Echo of the accepted filters, empty when absent or ignored.
    pub result: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchDetail {
    pub game: Game,
    pub opponent: Option<Team>,
    pub appearances: Vec<GameAppearance>,
}

/// `result` (W/D/L), `from` and `to` (YYYY-MM-DD, inclusive). Anything
/// unparseable is ignored.
pub fn filter_from_params(params: &Params) -> GameFilter {
    GameFilter {
        result: params.result("result"),
        from: params.date("from"),
        to: params.date("to"),
    }
}

pub fn match_list(db: &Database, params: &Params) -> Result<MatchList> {
    let filter = filter_from_params(params);
    let games = db.list_games(&filter)?;

    let positions: HashMap<TeamId, u32> = db
        .latest_snapshot()?
        .map(|snap| {
            snap.entries
                .iter()
                .map(|e| (e.entry.team, e.entry.position))
                .collect()
        })
        .unwrap_or_default();
    let teams: HashMap<TeamId, Team> = db
        .list_teams(None)?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let mut rows = Vec::with_capacity(games.len());
    for game in games {
        let lineup = db
            .appearances_for_game(game.id)?
            .into_iter()
            .map(|a| LineupRow {
                player: a.player.short_name(),
                number: a.player.number,
                goals: a.appearance.goals,
            })
            .collect();
        rows.push(MatchRow {
            opponent: teams.get(&game.opponent).cloned(),
            goal_difference: game.goal_difference(),
            opponent_position: positions.get(&game.opponent).copied(),
            lineup,
            game,
        });
    }

    Ok(MatchList {
        games: rows,
        result: filter
            .result
            .map(|r| r.code().to_string())
            .unwrap_or_default(),
        from: filter.from.map(|d| d.to_string()).unwrap_or_default(),
        to: filter.to.map(|d| d.to_string()).unwrap_or_default(),
    })
}

pub fn match_detail(db: &Database, id: GameId) -> Result<Option<MatchDetail>> {
    let Some(game) = db.get_game(id)? else {
        return Ok(None);
    };
    let opponent = db.get_team(game.opponent)?;
    let appearances = db.appearances_for_game(id)?;
    Ok(Some(MatchDetail {
        game,
        opponent,
        appearances,
    }))
}
