//! SQLite-backed entity store and admin CRUD.
//!
//! Every report module reads through [`Database`]; nothing outside this file
//! issues SQL.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params, params_from_iter};

use crate::error::{Result, StoreError, Violation, on_delete, on_write, violation};
use crate::models::{
    Appearance, AppearanceId, EntryId, EntryStats, Game, GameAppearance, GameId, GameResult,
    LeagueTable, LeagueTableEntry, NewGame, NewPlayer, NewSiteSettings, Player, PlayerAppearance,
    PlayerId, SettingsId, SiteSettings, Snapshot, SnapshotEntry, TableId, Team, TeamId, Theme,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

const TEAM_COLS: &str = "t.id, t.name, t.logo";
const PLAYER_COLS: &str = "p.id, p.first_name, p.last_name, p.number, p.active, p.photo";
const GAME_COLS: &str =
    "g.id, g.round, g.date, g.opponent_id, g.result, g.goals_for, g.goals_against";
const APPEARANCE_COLS: &str = "a.id, a.game_id, a.player_id, a.goals";
const TABLE_COLS: &str = "lt.id, lt.round, lt.date";
const ENTRY_COLS: &str = "e.id, e.table_id, e.team_id, e.position, e.played, e.wins, e.draws, \
                          e.losses, e.points, e.goal_difference";
const SETTINGS_COLS: &str = "s.id, s.site_name, s.league_name, s.home_club_id, s.is_active, \
                             s.max_rounds, s.color_primary, s.color_accent, s.color_win, \
                             s.color_draw, s.color_loss";

/// Optional restrictions for [`Database::list_games`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    pub result: Option<GameResult>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        log::debug!("opened season database at {}", path.display());
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS teams (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                logo TEXT NULL
            );

            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                number INTEGER NULL,
                active INTEGER NOT NULL DEFAULT 1,
                photo TEXT NULL
            );
            -- NULL numbers compare equal here, unlike a plain UNIQUE.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_players_identity
                ON players(first_name, last_name, IFNULL(number, -1));

            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                round INTEGER NOT NULL CHECK (round > 0),
                date TEXT NOT NULL,
                opponent_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE RESTRICT,
                result TEXT NOT NULL CHECK (result IN ('W', 'D', 'L')),
                goals_for INTEGER NOT NULL DEFAULT 0,
                goals_against INTEGER NOT NULL DEFAULT 0,
                UNIQUE(round, opponent_id)
            );
            CREATE INDEX IF NOT EXISTS idx_games_round ON games(round);
            CREATE INDEX IF NOT EXISTS idx_games_date ON games(date);

            CREATE TABLE IF NOT EXISTS appearances (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
                player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                goals INTEGER NOT NULL DEFAULT 0,
                UNIQUE(game_id, player_id)
            );

            CREATE TABLE IF NOT EXISTS league_tables (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                round INTEGER NOT NULL CHECK (round > 0),
                date TEXT NOT NULL,
                UNIQUE(round, date)
            );

            CREATE TABLE IF NOT EXISTS league_table_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                table_id INTEGER NOT NULL REFERENCES league_tables(id) ON DELETE CASCADE,
                team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE RESTRICT,
                position INTEGER NOT NULL CHECK (position > 0),
                played INTEGER NOT NULL DEFAULT 0,
                wins INTEGER NOT NULL DEFAULT 0,
                draws INTEGER NOT NULL DEFAULT 0,
                losses INTEGER NOT NULL DEFAULT 0,
                points INTEGER NOT NULL DEFAULT 0,
                goal_difference INTEGER NOT NULL DEFAULT 0,
                UNIQUE(table_id, team_id)
            );

            CREATE TABLE IF NOT EXISTS site_settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                site_name TEXT NOT NULL DEFAULT 'Pescara',
                league_name TEXT NOT NULL DEFAULT '',
                home_club_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE RESTRICT,
                is_active INTEGER NOT NULL DEFAULT 1,
                max_rounds INTEGER NOT NULL DEFAULT 25,
                color_primary TEXT NULL,
                color_accent TEXT NULL,
                color_win TEXT NULL,
                color_draw TEXT NULL,
                color_loss TEXT NULL
            );
            -- At most one active row.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_site_settings_single_active
                ON site_settings(is_active) WHERE is_active = 1;
            "#,
        )?;
        Ok(())
    }

    /// Begin a transaction on the shared connection. Store methods called
    /// while it is open take part in it.
    pub fn transaction(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    // ==================== Teams ====================

    pub fn create_team(&self, name: &str, logo: Option<&str>) -> Result<Team> {
        let name = name.trim();
        self.conn
            .execute(
                "INSERT INTO teams (name, logo) VALUES (?1, ?2)",
                params![name, logo],
            )
            .map_err(|e| on_write(e, &format!("team '{name}'")))?;
        let id = TeamId(self.conn.last_insert_rowid());
        log::info!("created {id} '{name}'");
        Ok(Team {
            id,
            name: name.to_string(),
            logo: logo.map(str::to_string),
        })
    }

    pub fn update_team(&self, team: &Team) -> Result<()> {
        self.conn
            .execute(
                "UPDATE teams SET name = ?1, logo = ?2 WHERE id = ?3",
                params![team.name, team.logo, team.id.0],
            )
            .map_err(|e| on_write(e, &format!("team '{}'", team.name)))?;
        Ok(())
    }

    pub fn delete_team(&self, id: TeamId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM teams WHERE id = ?1", params![id.0])
            .map_err(|e| on_delete(e, &id.to_string()))?;
        Ok(n > 0)
    }

    pub fn get_team(&self, id: TeamId) -> Result<Option<Team>> {
        let sql = format!("SELECT {TEAM_COLS} FROM teams t WHERE t.id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id.0], |row| team_at(row, 0))
            .optional()?)
    }

    /// Teams ordered by name, optionally narrowed by a case-insensitive
    /// substring.
    pub fn list_teams(&self, search: Option<&str>) -> Result<Vec<Team>> {
        let sql = format!("SELECT {TEAM_COLS} FROM teams t ORDER BY t.name, t.id");
        let mut stmt = self.conn.prepare(&sql)?;
        let teams = stmt
            .query_map([], |row| team_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(match search_needle(search) {
            Some(needle) => teams
                .into_iter()
                .filter(|t| t.name.to_lowercase().contains(&needle))
                .collect(),
            None => teams,
        })
    }

    pub fn find_team_containing(&self, needle: &str) -> Result<Option<Team>> {
        if needle.trim().is_empty() {
            return Ok(None);
        }
        Ok(self.list_teams(Some(needle))?.into_iter().next())
    }

    // ==================== Players ====================

    pub fn create_player(&self, player: &NewPlayer) -> Result<Player> {
        self.conn
            .execute(
                "INSERT INTO players (first_name, last_name, number, active, photo)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    player.first_name,
                    player.last_name,
                    player.number,
                    player.active,
                    player.photo
                ],
            )
            .map_err(|e| {
                on_write(
                    e,
                    &format!("player {} {}", player.first_name, player.last_name),
                )
            })?;
        let id = PlayerId(self.conn.last_insert_rowid());
        log::info!("created {id} {} {}", player.first_name, player.last_name);
        Ok(Player {
            id,
            first_name: player.first_name.clone(),
            last_name: player.last_name.clone(),
            number: player.number,
            active: player.active,
            photo: player.photo.clone(),
        })
    }

    pub fn update_player(&self, player: &Player) -> Result<()> {
        self.conn
            .execute(
                "UPDATE players SET first_name = ?1, last_name = ?2, number = ?3, active = ?4,
                 photo = ?5 WHERE id = ?6",
                params![
                    player.first_name,
                    player.last_name,
                    player.number,
                    player.active,
                    player.photo,
                    player.id.0
                ],
            )
            .map_err(|e| on_write(e, &player.id.to_string()))?;
        Ok(())
    }

    /// Deleting a player drops their appearances with them.
    pub fn delete_player(&self, id: PlayerId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM players WHERE id = ?1", params![id.0])
            .map_err(|e| on_delete(e, &id.to_string()))?;
        Ok(n > 0)
    }

    pub fn get_player(&self, id: PlayerId) -> Result<Option<Player>> {
        let sql = format!("SELECT {PLAYER_COLS} FROM players p WHERE p.id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id.0], |row| player_at(row, 0))
            .optional()?)
    }

    /// Players ordered by shirt number (unnumbered last).
    pub fn list_players(&self, active_only: bool, search: Option<&str>) -> Result<Vec<Player>> {
        let sql = format!(
            "SELECT {PLAYER_COLS} FROM players p
             WHERE (?1 = 0 OR p.active = 1)
             ORDER BY p.number IS NULL, p.number, p.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let players = stmt
            .query_map(params![active_only], |row| player_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(match search_needle(search) {
            Some(needle) => players
                .into_iter()
                .filter(|p| p.matches_name(&needle))
                .collect(),
            None => players,
        })
    }

    // ==================== Games ====================

    pub fn create_game(&self, game: &NewGame) -> Result<Game> {
        self.conn
            .execute(
                "INSERT INTO games (round, date, opponent_id, result, goals_for, goals_against)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    game.round,
                    date_text(game.date),
                    game.opponent.0,
                    game.result.code(),
                    game.goals_for,
                    game.goals_against
                ],
            )
            .map_err(|e| {
                on_write(
                    e,
                    &format!("game in round {} against {}", game.round, game.opponent),
                )
            })?;
        let id = GameId(self.conn.last_insert_rowid());
        log::info!("created {id} J{} {} {}", game.round, game.date, game.result.code());
        Ok(Game {
            id,
            round: game.round,
            date: game.date,
            opponent: game.opponent,
            result: game.result,
            goals_for: game.goals_for,
            goals_against: game.goals_against,
        })
    }

    pub fn update_game(&self, game: &Game) -> Result<()> {
        self.conn
            .execute(
                "UPDATE games SET round = ?1, date = ?2, opponent_id = ?3, result = ?4,
                 goals_for = ?5, goals_against = ?6 WHERE id = ?7",
                params![
                    game.round,
                    date_text(game.date),
                    game.opponent.0,
                    game.result.code(),
                    game.goals_for,
                    game.goals_against,
                    game.id.0
                ],
            )
            .map_err(|e| on_write(e, &game.id.to_string()))?;
        Ok(())
    }

    /// Deleting a game drops its appearances with it.
    pub fn delete_game(&self, id: GameId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM games WHERE id = ?1", params![id.0])
            .map_err(|e| on_delete(e, &id.to_string()))?;
        Ok(n > 0)
    }

    pub fn get_game(&self, id: GameId) -> Result<Option<Game>> {
        let sql = format!("SELECT {GAME_COLS} FROM games g WHERE g.id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id.0], |row| game_at(row, 0))
            .optional()?)
    }

    /// Games ordered by (date, round), narrowed by `filter`.
    pub fn list_games(&self, filter: &GameFilter) -> Result<Vec<Game>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<String> = Vec::new();
        if let Some(result) = filter.result {
            args.push(result.code().to_string());
            clauses.push("g.result = ?");
        }
        if let Some(from) = filter.from {
            args.push(date_text(from));
            clauses.push("g.date >= ?");
        }
        if let Some(to) = filter.to {
            args.push(date_text(to));
            clauses.push("g.date <= ?");
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql =
            format!("SELECT {GAME_COLS} FROM games g {where_sql} ORDER BY g.date, g.round, g.id");
        log::debug!("list_games: {sql} {args:?}");
        let mut stmt = self.conn.prepare(&sql)?;
        let games = stmt
            .query_map(params_from_iter(args.iter()), |row| game_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(games)
    }

    /// Most recent game played on or before `day`, later rounds winning ties.
    pub fn last_game_on_or_before(&self, day: NaiveDate) -> Result<Option<Game>> {
        let sql = format!(
            "SELECT {GAME_COLS} FROM games g WHERE g.date <= ?1
             ORDER BY g.date DESC, g.round DESC LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![date_text(day)], |row| game_at(row, 0))
            .optional()?)
    }

    /// Earliest game scheduled strictly after `day`.
    pub fn next_game_after(&self, day: NaiveDate) -> Result<Option<Game>> {
        let sql = format!(
            "SELECT {GAME_COLS} FROM games g WHERE g.date > ?1
             ORDER BY g.date, g.round LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![date_text(day)], |row| game_at(row, 0))
            .optional()?)
    }

    // ==================== Appearances ====================

    pub fn add_appearance(&self, game: GameId, player: PlayerId, goals: u32) -> Result<Appearance> {
        self.conn
            .execute(
                "INSERT INTO appearances (game_id, player_id, goals) VALUES (?1, ?2, ?3)",
                params![game.0, player.0, goals],
            )
            .map_err(|e| on_write(e, &format!("appearance of {player} in {game}")))?;
        Ok(Appearance {
            id: AppearanceId(self.conn.last_insert_rowid()),
            game,
            player,
            goals,
        })
    }

    pub fn update_appearance_goals(&self, id: AppearanceId, goals: u32) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE appearances SET goals = ?1 WHERE id = ?2",
            params![goals, id.0],
        )?;
        Ok(n > 0)
    }

    pub fn delete_appearance(&self, id: AppearanceId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM appearances WHERE id = ?1", params![id.0])?;
        Ok(n > 0)
    }

    pub fn list_appearances(&self) -> Result<Vec<Appearance>> {
        let sql = format!("SELECT {APPEARANCE_COLS} FROM appearances a ORDER BY a.id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| appearance_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// A player's appearances with game and opponent, by game date.
    pub fn appearances_for_player(&self, player: PlayerId) -> Result<Vec<PlayerAppearance>> {
        let sql = format!(
            "SELECT {APPEARANCE_COLS}, {GAME_COLS}, {TEAM_COLS}
             FROM appearances a
             JOIN games g ON g.id = a.game_id
             JOIN teams t ON t.id = g.opponent_id
             WHERE a.player_id = ?1
             ORDER BY g.date, g.round, a.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![player.0], |row| {
                Ok(PlayerAppearance {
                    appearance: appearance_at(row, 0)?,
                    game: game_at(row, 4)?,
                    opponent: team_at(row, 11)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// A game's lineup with players, by shirt number.
    pub fn appearances_for_game(&self, game: GameId) -> Result<Vec<GameAppearance>> {
        let sql = format!(
            "SELECT {APPEARANCE_COLS}, {PLAYER_COLS}
             FROM appearances a
             JOIN players p ON p.id = a.player_id
             WHERE a.game_id = ?1
             ORDER BY p.number IS NULL, p.number, p.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![game.0], |row| {
                Ok(GameAppearance {
                    appearance: appearance_at(row, 0)?,
                    player: player_at(row, 4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ==================== League tables ====================

    pub fn create_table(&self, round: u32, date: NaiveDate) -> Result<LeagueTable> {
        self.conn
            .execute(
                "INSERT INTO league_tables (round, date) VALUES (?1, ?2)",
                params![round, date_text(date)],
            )
            .map_err(|e| on_write(e, &format!("table J{round} {date}")))?;
        let id = TableId(self.conn.last_insert_rowid());
        log::info!("created {id} J{round} {date}");
        Ok(LeagueTable { id, round, date })
    }

    /// Deleting a table drops its entries with it.
    pub fn delete_table(&self, id: TableId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM league_tables WHERE id = ?1", params![id.0])
            .map_err(|e| on_delete(e, &id.to_string()))?;
        Ok(n > 0)
    }

    pub fn add_entry(
        &self,
        table: TableId,
        team: TeamId,
        stats: &EntryStats,
    ) -> Result<LeagueTableEntry> {
        self.conn
            .execute(
                "INSERT INTO league_table_entries
                 (table_id, team_id, position, played, wins, draws, losses, points, goal_difference)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    table.0,
                    team.0,
                    stats.position,
                    stats.played,
                    stats.wins,
                    stats.draws,
                    stats.losses,
                    stats.points,
                    stats.goal_difference
                ],
            )
            .map_err(|e| on_write(e, &format!("entry for {team} in {table}")))?;
        Ok(LeagueTableEntry {
            id: EntryId(self.conn.last_insert_rowid()),
            table,
            team,
            position: stats.position,
            played: stats.played,
            wins: stats.wins,
            draws: stats.draws,
            losses: stats.losses,
            points: stats.points,
            goal_difference: stats.goal_difference,
        })
    }

    pub fn update_entry(&self, id: EntryId, stats: &EntryStats) -> Result<bool> {
        let n = self
            .conn
            .execute(
                "UPDATE league_table_entries SET position = ?1, played = ?2, wins = ?3,
                 draws = ?4, losses = ?5, points = ?6, goal_difference = ?7 WHERE id = ?8",
                params![
                    stats.position,
                    stats.played,
                    stats.wins,
                    stats.draws,
                    stats.losses,
                    stats.points,
                    stats.goal_difference,
                    id.0
                ],
            )
            .map_err(|e| on_write(e, &id.to_string()))?;
        Ok(n > 0)
    }

    pub fn delete_entry(&self, id: EntryId) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM league_table_entries WHERE id = ?1",
            params![id.0],
        )?;
        Ok(n > 0)
    }

    /// Tables ordered oldest first by (date, round).
    pub fn list_tables(&self) -> Result<Vec<LeagueTable>> {
        let sql = format!("SELECT {TABLE_COLS} FROM league_tables lt ORDER BY lt.date, lt.round");
        let mut stmt = self.conn.prepare(&sql)?;
        let tables = stmt
            .query_map([], |row| table_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    pub fn latest_table(&self) -> Result<Option<LeagueTable>> {
        let sql = format!(
            "SELECT {TABLE_COLS} FROM league_tables lt ORDER BY lt.date DESC, lt.round DESC LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, [], |row| table_at(row, 0))
            .optional()?)
    }

    /// The table with the greatest (date, round) strictly below `table`'s.
    pub fn previous_table(&self, table: &LeagueTable) -> Result<Option<LeagueTable>> {
        let sql = format!(
            "SELECT {TABLE_COLS} FROM league_tables lt
             WHERE lt.date < ?1 OR (lt.date = ?1 AND lt.round < ?2)
             ORDER BY lt.date DESC, lt.round DESC LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![date_text(table.date), table.round], |row| {
                table_at(row, 0)
            })
            .optional()?)
    }

    pub fn snapshot(&self, table: &LeagueTable) -> Result<Snapshot> {
        let sql = format!(
            "SELECT {ENTRY_COLS}, {TEAM_COLS}
             FROM league_table_entries e
             JOIN teams t ON t.id = e.team_id
             WHERE e.table_id = ?1
             ORDER BY e.position, e.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![table.id.0], |row| {
                Ok(SnapshotEntry {
                    entry: entry_at(row, 0)?,
                    team: team_at(row, 10)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Snapshot {
            table: table.clone(),
            entries,
        })
    }

    pub fn latest_snapshot(&self) -> Result<Option<Snapshot>> {
        match self.latest_table()? {
            Some(table) => Ok(Some(self.snapshot(&table)?)),
            None => Ok(None),
        }
    }

    /// Every snapshot, oldest first.
    pub fn snapshots(&self) -> Result<Vec<Snapshot>> {
        self.list_tables()?
            .iter()
            .map(|table| self.snapshot(table))
            .collect()
    }

    // ==================== Site settings ====================

    pub fn create_settings(&self, settings: &NewSiteSettings) -> Result<SiteSettings> {
        self.conn
            .execute(
                "INSERT INTO site_settings
                 (site_name, league_name, home_club_id, is_active, max_rounds,
                  color_primary, color_accent, color_win, color_draw, color_loss)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    settings.site_name,
                    settings.league_name,
                    settings.home_club.0,
                    settings.is_active,
                    settings.max_rounds,
                    settings.theme.color_primary,
                    settings.theme.color_accent,
                    settings.theme.color_win,
                    settings.theme.color_draw,
                    settings.theme.color_loss
                ],
            )
            .map_err(|e| on_settings_write(e, &settings.site_name))?;
        let id = SettingsId(self.conn.last_insert_rowid());
        log::info!("created {id} '{}'", settings.site_name);
        Ok(SiteSettings {
            id,
            site_name: settings.site_name.clone(),
            league_name: settings.league_name.clone(),
            home_club: settings.home_club,
            is_active: settings.is_active,
            max_rounds: settings.max_rounds,
            theme: settings.theme.clone(),
        })
    }

    pub fn update_settings(&self, settings: &SiteSettings) -> Result<()> {
        self.conn
            .execute(
                "UPDATE site_settings SET site_name = ?1, league_name = ?2, home_club_id = ?3,
                 is_active = ?4, max_rounds = ?5, color_primary = ?6, color_accent = ?7,
                 color_win = ?8, color_draw = ?9, color_loss = ?10 WHERE id = ?11",
                params![
                    settings.site_name,
                    settings.league_name,
                    settings.home_club.0,
                    settings.is_active,
                    settings.max_rounds,
                    settings.theme.color_primary,
                    settings.theme.color_accent,
                    settings.theme.color_win,
                    settings.theme.color_draw,
                    settings.theme.color_loss,
                    settings.id.0
                ],
            )
            .map_err(|e| on_settings_write(e, &settings.site_name))?;
        Ok(())
    }

    pub fn set_settings_active(&self, id: SettingsId, active: bool) -> Result<bool> {
        let n = self
            .conn
            .execute(
                "UPDATE site_settings SET is_active = ?1 WHERE id = ?2",
                params![active, id.0],
            )
            .map_err(|e| on_settings_write(e, &id.to_string()))?;
        Ok(n > 0)
    }

    pub fn delete_settings(&self, id: SettingsId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM site_settings WHERE id = ?1", params![id.0])?;
        Ok(n > 0)
    }

    pub fn active_settings(&self) -> Result<Option<SiteSettings>> {
        let sql = format!(
            "SELECT {SETTINGS_COLS} FROM site_settings s WHERE s.is_active = 1 LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, [], |row| settings_at(row, 0))
            .optional()?)
    }
}

fn on_settings_write(err: rusqlite::Error, what: &str) -> StoreError {
    match violation(&err) {
        Some(Violation::Unique) => StoreError::ActiveSettingsConflict,
        _ => on_write(err, &format!("site settings '{what}'")),
    }
}

// SQLite's LOWER only folds ASCII, so name matching happens here instead.
fn search_needle(search: Option<&str>) -> Option<String> {
    search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

fn date_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn result_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<GameResult> {
    let raw: String = row.get(idx)?;
    GameResult::from_code(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown game result '{raw}'").into(),
        )
    })
}

fn team_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Team> {
    Ok(Team {
        id: TeamId(row.get(base)?),
        name: row.get(base + 1)?,
        logo: row.get(base + 2)?,
    })
}

fn player_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Player> {
    Ok(Player {
        id: PlayerId(row.get(base)?),
        first_name: row.get(base + 1)?,
        last_name: row.get(base + 2)?,
        number: row.get(base + 3)?,
        active: row.get(base + 4)?,
        photo: row.get(base + 5)?,
    })
}

fn game_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Game> {
    Ok(Game {
        id: GameId(row.get(base)?),
        round: row.get(base + 1)?,
        date: date_at(row, base + 2)?,
        opponent: TeamId(row.get(base + 3)?),
        result: result_at(row, base + 4)?,
        goals_for: row.get(base + 5)?,
        goals_against: row.get(base + 6)?,
    })
}

fn appearance_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Appearance> {
    Ok(Appearance {
        id: AppearanceId(row.get(base)?),
        game: GameId(row.get(base + 1)?),
        player: PlayerId(row.get(base + 2)?),
        goals: row.get(base + 3)?,
    })
}

fn table_at(row: &Row<'_>, base: usize) -> rusqlite::Result<LeagueTable> {
    Ok(LeagueTable {
        id: TableId(row.get(base)?),
        round: row.get(base + 1)?,
        date: date_at(row, base + 2)?,
    })
}

fn entry_at(row: &Row<'_>, base: usize) -> rusqlite::Result<LeagueTableEntry> {
    Ok(LeagueTableEntry {
        id: EntryId(row.get(base)?),
        table: TableId(row.get(base + 1)?),
        team: TeamId(row.get(base + 2)?),
        position: row.get(base + 3)?,
        played: row.get(base + 4)?,
        wins: row.get(base + 5)?,
        draws: row.get(base + 6)?,
        losses: row.get(base + 7)?,
        points: row.get(base + 8)?,
        goal_difference: row.get(base + 9)?,
    })
}

fn settings_at(row: &Row<'_>, base: usize) -> rusqlite::Result<SiteSettings> {
    Ok(SiteSettings {
        id: SettingsId(row.get(base)?),
        site_name: row.get(base + 1)?,
        league_name: row.get(base + 2)?,
        home_club: TeamId(row.get(base + 3)?),
        is_active: row.get(base + 4)?,
        max_rounds: row.get(base + 5)?,
        theme: Theme {
            color_primary: row.get(base + 6)?,
            color_accent: row.get(base + 7)?,
            color_win: row.get(base + 8)?,
            color_draw: row.get(base + 9)?,
            color_loss: row.get(base + 10)?,
        },
    })
}
