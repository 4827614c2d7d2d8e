//! Season position trend for the tracked club: per-round rows plus the
//! pixel coordinates a sparkline template needs.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::SeasonConfig;
use crate::error::Result;
use crate::models::{Game, GameResult, Snapshot, Team, TeamId};
use crate::store::{Database, GameFilter};
use crate::tracked::resolve_tracked_team;

/// Colour of first place.
pub const BEST_RGB: (u8, u8, u8) = (34, 197, 94);
/// Colour of the lowest position seen.
pub const WORST_RGB: (u8, u8, u8) = (107, 114, 128);

pub const Y_TICKS: [u32; 6] = [1, 5, 10, 15, 20, 25];

/// Canvas geometry. The y axis is fixed to positions `y_min..=y_max`
/// whatever the data holds; the x axis spans rounds `1..=total_rounds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartLayout {
    pub width: u32,
    pub height: u32,
    pub pad_left: u32,
    pub pad_right: u32,
    pub pad_top: u32,
    pub pad_bottom: u32,
    pub y_min: u32,
    pub y_max: u32,
    pub total_rounds: u32,
}

impl ChartLayout {
    pub fn new(total_rounds: u32) -> Self {
        Self {
            width: 920,
            height: 260,
            pad_left: 36,
            pad_right: 18,
            pad_top: 12,
            pad_bottom: 24,
            y_min: 1,
            y_max: 25,
            total_rounds,
        }
    }

    pub fn inner_width(&self) -> f64 {
        f64::from(self.width) - f64::from(self.pad_left) - f64::from(self.pad_right)
    }

    pub fn inner_height(&self) -> f64 {
        f64::from(self.height) - f64::from(self.pad_top) - f64::from(self.pad_bottom)
    }

    pub fn x_for_round(&self, round: u32) -> f64 {
        let total = self.total_rounds.max(1);
        let round = round.clamp(1, total);
        let span = f64::from(total.saturating_sub(1).max(1));
        let t = f64::from(round - 1) / span;
        f64::from(self.pad_left) + t * self.inner_width()
    }

    pub fn y_for_position(&self, position: u32) -> f64 {
        let position = position.clamp(self.y_min, self.y_max);
        let span = f64::from((self.y_max - self.y_min).max(1));
        let t = f64::from(position - self.y_min) / span;
        f64::from(self.pad_top) + t * self.inner_height()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrajectoryRow {
    pub round: u32,
    pub position: u32,
    pub points: i32,
    pub color: String,
    pub result: Option<GameResult>,
    /// `win`, `draw`, `loss`, or empty when no game is on record.
    pub res_class: String,
    pub score: String,
    pub opp_name: String,
    pub opp_logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartDot {
    pub cx: i64,
    pub cy: i64,
    pub label: String,
    pub pos: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisLabel {
    pub at: i64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Trajectory {
    pub rows: Vec<TrajectoryRow>,
    /// Worst position reached; scales the colour gradient.
    pub max_pos_seen: u32,
    pub max_pos: u32,
    pub width: u32,
    pub height: u32,
    /// `"x,y x,y ..."` for a polyline.
    pub spark_points: String,
    pub dots: Vec<ChartDot>,
    pub x_labels: Vec<AxisLabel>,
    pub y_labels: Vec<AxisLabel>,
    pub first_round: Option<u32>,
    pub last_round: Option<u32>,
    pub total_rounds: u32,
    pub span_label: String,
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
    v.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Hex colour for `position` on a best-to-worst gradient over
/// `1..=max_position`.
pub fn gradient_color(position: u32, max_position: u32) -> String {
    let max_position = max_position.max(1);
    let position = position.clamp(1, max_position);
    let t = f64::from(position - 1) / f64::from((max_position - 1).max(1));
    let (r, g, b) = (
        lerp(BEST_RGB.0, WORST_RGB.0, t),
        lerp(BEST_RGB.1, WORST_RGB.1, t),
        lerp(BEST_RGB.2, WORST_RGB.2, t),
    );
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn px(v: f64) -> i64 {
    v.round_ties_even() as i64
}

/// Build the trend for `tracked` from `snapshots` (oldest first).
///
/// Snapshots without an entry for the club are skipped. Games are matched to
/// rows by round number; when a round holds several games the latest-dated
/// one is used. `teams` resolves opponent names and logos.
pub fn build_trajectory(
    snapshots: &[Snapshot],
    tracked: Option<TeamId>,
    games: &[Game],
    teams: &[Team],
    layout: &ChartLayout,
) -> Trajectory {
    let Some(tracked) = tracked else {
        return Trajectory::default();
    };

    let mut ordered: Vec<&Game> = games.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then(a.round.cmp(&b.round)));
    let games_by_round: HashMap<u32, &Game> = ordered.into_iter().map(|g| (g.round, g)).collect();
    let teams_by_id: HashMap<TeamId, &Team> = teams.iter().map(|t| (t.id, t)).collect();

    let mut rows = Vec::new();
    let mut max_pos_seen = 0u32;
    for snap in snapshots {
        let Some(entry) = snap.entry_for(tracked) else {
            continue;
        };
        let position = entry.entry.position;
        max_pos_seen = max_pos_seen.max(position);

        let round = snap.table.round;
        let game = games_by_round.get(&round).copied();
        let opponent = game.and_then(|g| teams_by_id.get(&g.opponent).copied());
        rows.push(TrajectoryRow {
            round,
            position,
            points: entry.entry.points,
            color: String::new(),
            result: game.map(|g| g.result),
            res_class: game
                .map(|g| g.result.css_class().to_string())
                .unwrap_or_default(),
            score: game.map(Game::score).unwrap_or_default(),
            opp_name: opponent.map(|t| t.name.clone()).unwrap_or_default(),
            opp_logo: opponent.and_then(|t| t.logo.clone()),
        });
    }

    let color_max = max_pos_seen.max(1);
    for row in &mut rows {
        row.color = gradient_color(row.position, color_max);
    }

    let dots: Vec<ChartDot> = rows
        .iter()
        .map(|r| ChartDot {
            cx: px(layout.x_for_round(r.round)),
            cy: px(layout.y_for_position(r.position)),
            label: format!("J{}", r.round),
            pos: r.position,
        })
        .collect();
    let spark_points = dots
        .iter()
        .map(|d| format!("{},{}", d.cx, d.cy))
        .collect::<Vec<_>>()
        .join(" ");

    let total = layout.total_rounds.max(1);
    let x_step = layout.inner_width() / f64::from(total.saturating_sub(1).max(1));
    let x_labels = (0..total)
        .map(|i| AxisLabel {
            at: px(f64::from(layout.pad_left) + f64::from(i) * x_step),
            text: format!("J{}", i + 1),
        })
        .collect();
    let y_labels = Y_TICKS
        .iter()
        .map(|tick| AxisLabel {
            at: px(layout.y_for_position(*tick)),
            text: tick.to_string(),
        })
        .collect();

    let first_round = rows.first().map(|r| r.round);
    let last_round = rows.last().map(|r| r.round);
    let span_label = match (first_round, last_round) {
        (Some(a), Some(b)) => format!("J{a}–J{b}"),
        _ => String::new(),
    };

    Trajectory {
        rows,
        max_pos_seen,
        max_pos: layout.y_max,
        width: layout.width,
        height: layout.height,
        spark_points,
        dots,
        x_labels,
        y_labels,
        first_round,
        last_round,
        total_rounds: layout.total_rounds,
        span_label,
    }
}

pub fn trajectory(db: &Database, cfg: &SeasonConfig) -> Result<Trajectory> {
    let Some(team) = resolve_tracked_team(db, cfg)? else {
        return Ok(Trajectory::default());
    };
    let snapshots = db.snapshots()?;
    let games = db.list_games(&GameFilter::default())?;
    let teams = db.list_teams(None)?;
    let layout = ChartLayout::new(cfg.total_rounds);
    let out = build_trajectory(&snapshots, Some(team.id), &games, &teams, &layout);
    log::debug!(
        "trajectory for '{}': {} of {} tables",
        team.name,
        out.rows.len(),
        snapshots.len()
    );
    Ok(out)
}
