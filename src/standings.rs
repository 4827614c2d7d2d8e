use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Game, GameResult, LeagueTable, Snapshot, Team, TeamId};
use crate::store::{Database, GameFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub position: u32,
    pub team: Team,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: i32,
    pub goal_difference: i32,
    /// Places gained since the preceding table; negative means dropped.
    pub pos_delta: Option<i64>,
    pub pos_delta_abs: Option<u64>,
    /// Our latest result against this club up to the table's date.
    pub played_result: Option<GameResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StandingsReport {
    pub table: Option<LeagueTable>,
    pub previous: Option<LeagueTable>,
    pub rows: Vec<StandingRow>,
}

/// Latest table with movement against the one before it.
pub fn standings(db: &Database) -> Result<StandingsReport> {
    let Some(latest) = db.latest_table()? else {
        return Ok(StandingsReport::default());
    };
    let previous = db.previous_table(&latest)?;
    let latest_snapshot = db.snapshot(&latest)?;
    let previous_snapshot = match previous.as_ref() {
        Some(table) => Some(db.snapshot(table)?),
        None => None,
    };
    let games = db.list_games(&GameFilter {
        to: Some(latest.date),
        ..GameFilter::default()
    })?;

    let rows = diff_snapshots(&latest_snapshot, previous_snapshot.as_ref(), &games);
    log::debug!(
        "standings J{} ({} rows, previous {:?})",
        latest.round,
        rows.len(),
        previous.as_ref().map(|t| t.round)
    );
    Ok(StandingsReport {
        table: Some(latest),
        previous,
        rows,
    })
}

/// Rows of `latest` in position order, each with its delta against
/// `previous` and the last result against that club on or before the
/// latest table's date.
pub fn diff_snapshots(
    latest: &Snapshot,
    previous: Option<&Snapshot>,
    games: &[Game],
) -> Vec<StandingRow> {
    let prev_positions: HashMap<TeamId, u32> = previous
        .map(|snap| {
            snap.entries
                .iter()
                .map(|e| (e.entry.team, e.entry.position))
                .collect()
        })
        .unwrap_or_default();
    let last_vs = last_results_as_of(games, latest.table.date);

    let mut rows: Vec<StandingRow> = latest
        .entries
        .iter()
        .map(|e| {
            let pos_delta = prev_positions
                .get(&e.entry.team)
                .map(|prev| i64::from(*prev) - i64::from(e.entry.position));
            StandingRow {
                position: e.entry.position,
                team: e.team.clone(),
                played: e.entry.played,
                wins: e.entry.wins,
                draws: e.entry.draws,
                losses: e.entry.losses,
                points: e.entry.points,
                goal_difference: e.entry.goal_difference,
                pos_delta,
                pos_delta_abs: pos_delta.map(i64::unsigned_abs),
                played_result: last_vs.get(&e.entry.team).copied(),
            }
        })
        .collect();
    rows.sort_by_key(|r| r.position);
    rows
}

/// Most recent result per opponent among games dated on or before `as_of`.
/// On the same date the higher round is the more recent game.
pub fn last_results_as_of(games: &[Game], as_of: NaiveDate) -> HashMap<TeamId, GameResult> {
    let mut candidates: Vec<&Game> = games.iter().filter(|g| g.date <= as_of).collect();
    candidates.sort_by(|a, b| b.date.cmp(&a.date).then(b.round.cmp(&a.round)));

    let mut out = HashMap::new();
    for g in candidates {
        out.entry(g.opponent).or_insert(g.result);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryId, GameId, LeagueTableEntry, SnapshotEntry, TableId};

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn snapshot(id: i64, round: u32, date: NaiveDate, positions: &[(i64, u32)]) -> Snapshot {
        Snapshot {
            table: LeagueTable {
                id: TableId(id),
                round,
                date,
            },
            entries: positions
                .iter()
                .map(|(team, pos)| SnapshotEntry {
                    entry: LeagueTableEntry {
                        id: EntryId(id * 100 + team),
                        table: TableId(id),
                        team: TeamId(*team),
                        position: *pos,
                        played: round,
                        wins: 0,
                        draws: 0,
                        losses: 0,
                        points: 0,
                        goal_difference: 0,
                    },
                    team: Team {
                        id: TeamId(*team),
                        name: format!("Team {team}"),
                        logo: None,
                    },
                })
                .collect(),
        }
    }

    fn game(id: i64, round: u32, date: NaiveDate, opp: i64, result: GameResult) -> Game {
        Game {
            id: GameId(id),
            round,
            date,
            opponent: TeamId(opp),
            result,
            goals_for: 0,
            goals_against: 0,
        }
    }

    #[test]
    fn delta_is_previous_minus_current() {
        let prev = snapshot(1, 3, day(9, 14), &[(1, 4), (2, 1), (3, 2)]);
        let latest = snapshot(2, 4, day(9, 21), &[(1, 2), (2, 3), (4, 1)]);
        let rows = diff_snapshots(&latest, Some(&prev), &[]);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].team.id, TeamId(4));
        assert_eq!(rows[0].pos_delta, None);
        assert_eq!(rows[1].team.id, TeamId(1));
        assert_eq!(rows[1].pos_delta, Some(2));
        assert_eq!(rows[1].pos_delta_abs, Some(2));
        assert_eq!(rows[2].pos_delta, Some(-2));
        assert_eq!(rows[2].pos_delta_abs, Some(2));
    }

    #[test]
    fn no_previous_means_no_deltas() {
        let latest = snapshot(1, 1, day(8, 31), &[(1, 1), (2, 2)]);
        let rows = diff_snapshots(&latest, None, &[]);
        assert!(rows.iter().all(|r| r.pos_delta.is_none()));
    }

    #[test]
    fn same_day_head_to_head_prefers_higher_round() {
        let games = vec![
            game(1, 2, day(9, 7), 7, GameResult::Loss),
            game(2, 5, day(9, 28), 7, GameResult::Draw),
            game(3, 6, day(9, 28), 7, GameResult::Win),
            game(4, 9, day(10, 19), 7, GameResult::Loss),
        ];
        let out = last_results_as_of(&games, day(9, 28));
        assert_eq!(out.get(&TeamId(7)), Some(&GameResult::Win));

        let out = last_results_as_of(&games, day(9, 1));
        assert!(out.is_empty());
    }
}
