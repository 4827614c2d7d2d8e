use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::Result;
use crate::models::{Appearance, GameId, Player, PlayerAppearance, PlayerId};
use crate::params::Params;
use crate::store::Database;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Games,
    Goals,
    Gpm,
    Number,
}

impl SortKey {
    /// Unknown or missing keys sort by games played. Keys are case-sensitive.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("goals") => SortKey::Goals,
            Some("gpm") => SortKey::Gpm,
            Some("number") => SortKey::Number,
            _ => SortKey::Games,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerFilter {
    pub active_only: bool,
    /// Case-insensitive substring of first or last name.
    pub query: Option<String>,
    /// Drop players without a single appearance.
    pub played_only: bool,
}

impl Default for PlayerFilter {
    fn default() -> Self {
        Self {
            active_only: true,
            query: None,
            played_only: false,
        }
    }
}

impl PlayerFilter {
    /// `q`, `all` (include inactive) and `played`.
    pub fn from_params(params: &Params) -> Self {
        Self {
            active_only: !params.flag("all"),
            query: params.get("q").map(str::to_string),
            played_only: params.flag("played"),
        }
    }

    fn admits(&self, player: &Player) -> bool {
        if self.active_only && !player.active {
            return false;
        }
        match self.query.as_deref() {
            Some(q) => player.matches_name(q),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlayerTotals {
    pub games_played: u32,
    pub goals: u32,
    pub goals_per_match: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerLine {
    pub player: Player,
    pub totals: PlayerTotals,
    /// One row per game, oldest first. Display only.
    pub appearances: Vec<PlayerAppearance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardReport {
    pub sort: SortKey,
    pub query: String,
    pub rows: Vec<PlayerLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDetail {
    pub player: Player,
    pub totals: PlayerTotals,
    pub appearances: Vec<PlayerAppearance>,
}

/// Goals per game to two decimals; zero when no games were played.
pub fn goals_per_match(goals: u32, games_played: u32) -> f64 {
    if games_played == 0 {
        return 0.0;
    }
    let raw = f64::from(goals) / f64::from(games_played);
    (raw * 100.0).round_ties_even() / 100.0
}

/// Totals over one player's appearance rows. Games count once however many
/// rows they carry.
pub fn totals_for<'a>(rows: impl IntoIterator<Item = &'a Appearance>) -> PlayerTotals {
    let mut games: HashSet<GameId> = HashSet::new();
    let mut goals = 0u32;
    for row in rows {
        games.insert(row.game);
        goals = goals.saturating_add(row.goals);
    }
    let games_played = games.len() as u32;
    PlayerTotals {
        games_played,
        goals,
        goals_per_match: goals_per_match(goals, games_played),
    }
}

/// One line per player admitted by `filter`, in input order, without
/// appearance history.
pub fn build_lines(
    players: &[Player],
    appearances: &[Appearance],
    filter: &PlayerFilter,
) -> Vec<PlayerLine> {
    let mut by_player: HashMap<PlayerId, Vec<&Appearance>> = HashMap::new();
    for a in appearances {
        by_player.entry(a.player).or_default().push(a);
    }

    players
        .iter()
        .filter(|p| filter.admits(p))
        .map(|p| {
            let rows = by_player.get(&p.id).map(Vec::as_slice).unwrap_or_default();
            PlayerLine {
                player: p.clone(),
                totals: totals_for(rows.iter().copied()),
                appearances: Vec::new(),
            }
        })
        .filter(|line| !filter.played_only || line.totals.games_played > 0)
        .collect()
}

/// Stable sort; equal keys keep their incoming order.
pub fn sort_lines(lines: &mut [PlayerLine], key: SortKey) {
    match key {
        SortKey::Games => lines.sort_by(|a, b| {
            b.totals
                .games_played
                .cmp(&a.totals.games_played)
                .then(b.totals.goals.cmp(&a.totals.goals))
        }),
        SortKey::Goals => lines.sort_by(|a, b| {
            b.totals.goals.cmp(&a.totals.goals).then(
                b.totals
                    .goals_per_match
                    .total_cmp(&a.totals.goals_per_match),
            )
        }),
        SortKey::Gpm => lines.sort_by(|a, b| {
            b.totals
                .goals_per_match
                .total_cmp(&a.totals.goals_per_match)
                .then(b.totals.goals.cmp(&a.totals.goals))
        }),
        SortKey::Number => lines.sort_by(|a, b| {
            cmp_number(a.player.number, b.player.number)
                .then_with(|| a.player.last_name.cmp(&b.player.last_name))
        }),
    }
}

// Unnumbered players go last.
fn cmp_number(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn leaderboard(db: &Database, params: &Params) -> Result<LeaderboardReport> {
    let sort = SortKey::parse(params.get("sort"));
    let filter = PlayerFilter::from_params(params);

    let players = db.list_players(filter.active_only, None)?;
    let appearances = db.list_appearances()?;
    let mut rows = build_lines(&players, &appearances, &filter);
    sort_lines(&mut rows, sort);
    for line in &mut rows {
        line.appearances = db.appearances_for_player(line.player.id)?;
    }
    log::debug!("leaderboard sort={sort:?} rows={}", rows.len());

    Ok(LeaderboardReport {
        sort,
        query: filter.query.unwrap_or_default(),
        rows,
    })
}

pub fn player_detail(db: &Database, id: PlayerId) -> Result<Option<PlayerDetail>> {
    let Some(player) = db.get_player(id)? else {
        return Ok(None);
    };
    let appearances = db.appearances_for_player(id)?;
    let totals = totals_for(appearances.iter().map(|a| &a.appearance));
    Ok(Some(PlayerDetail {
        player,
        totals,
        appearances,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppearanceId;

    fn player(id: i64, last: &str, number: Option<u32>, active: bool) -> Player {
        Player {
            id: PlayerId(id),
            first_name: "Test".to_string(),
            last_name: last.to_string(),
            number,
            active,
            photo: None,
        }
    }

    fn app(id: i64, game: i64, player: i64, goals: u32) -> Appearance {
        Appearance {
            id: AppearanceId(id),
            game: GameId(game),
            player: PlayerId(player),
            goals,
        }
    }

    #[test]
    fn gpm_rounds_to_two_places() {
        assert_eq!(goals_per_match(7, 4), 1.75);
        assert_eq!(goals_per_match(1, 3), 0.33);
        assert_eq!(goals_per_match(2, 3), 0.67);
        assert_eq!(goals_per_match(5, 0), 0.0);
    }

    #[test]
    fn zero_goal_appearances_count_as_games() {
        let totals = totals_for(&[app(1, 1, 1, 0), app(2, 2, 1, 0), app(3, 3, 1, 2)]);
        assert_eq!(totals.games_played, 3);
        assert_eq!(totals.goals, 2);
        assert_eq!(totals.goals_per_match, 0.67);
    }

    #[test]
    fn number_sort_puts_unnumbered_last() {
        let players = vec![
            player(1, "Zeta", None, true),
            player(2, "Beta", Some(9), true),
            player(3, "Alfa", None, true),
            player(4, "Gamma", Some(1), true),
        ];
        let mut lines = build_lines(&players, &[], &PlayerFilter::default());
        sort_lines(&mut lines, SortKey::Number);
        let order: Vec<i64> = lines.iter().map(|l| l.player.id.0).collect();
        assert_eq!(order, vec![4, 2, 3, 1]);
    }

    #[test]
    fn resorting_keeps_every_row() {
        let players = vec![
            player(1, "A", Some(1), true),
            player(2, "B", Some(2), true),
            player(3, "C", Some(3), true),
        ];
        let apps = vec![
            app(1, 1, 1, 2),
            app(2, 2, 1, 0),
            app(3, 1, 2, 1),
            app(4, 1, 3, 3),
            app(5, 2, 3, 0),
            app(6, 3, 3, 0),
        ];
        let mut lines = build_lines(&players, &apps, &PlayerFilter::default());
        sort_lines(&mut lines, SortKey::Goals);
        let ids: Vec<i64> = lines.iter().map(|l| l.player.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        sort_lines(&mut lines, SortKey::Gpm);
        assert_eq!(lines.len(), 3);
        let ids: Vec<i64> = lines.iter().map(|l| l.player.id.0).collect();
        // 1.0 (C), 1.0 (B), 1.0 (A): ties broken by goals.
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn filter_respects_active_and_query() {
        let players = vec![
            player(1, "Rossi", Some(1), true),
            player(2, "Russo", Some(2), false),
            player(3, "Bianchi", Some(3), true),
        ];
        let filter = PlayerFilter {
            query: Some("RO".to_string()),
            ..PlayerFilter::default()
        };
        let lines = build_lines(&players, &[], &filter);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].player.id, PlayerId(1));

        let filter = PlayerFilter {
            active_only: false,
            query: Some("r".to_string()),
            played_only: false,
        };
        // "Test" first names contain no 'r'; last names Rossi, Russo match.
        assert_eq!(build_lines(&players, &[], &filter).len(), 2);
    }

    #[test]
    fn sort_key_falls_back_to_games() {
        assert_eq!(SortKey::parse(Some("gpm")), SortKey::Gpm);
        assert_eq!(SortKey::parse(Some("bogus")), SortKey::Games);
        assert_eq!(SortKey::parse(Some("Goals")), SortKey::Games);
        assert_eq!(SortKey::parse(None), SortKey::Games);
    }
}
