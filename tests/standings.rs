use chrono::NaiveDate;

use pescara_stats::Database;
use pescara_stats::models::{EntryStats, GameResult, NewGame, TableId, TeamId};
use pescara_stats::standings::standings;

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).expect("valid date")
}

fn add_table(db: &Database, round: u32, date: NaiveDate, rows: &[(TeamId, u32)]) -> TableId {
    let table = db.create_table(round, date).expect("table");
    for (team, position) in rows {
        db.add_entry(
            table.id,
            *team,
            &EntryStats {
                position: *position,
                played: round,
                ..EntryStats::default()
            },
        )
        .expect("entry");
    }
    table.id
}

fn add_game(db: &Database, round: u32, date: NaiveDate, opp: TeamId, result: GameResult) {
    db.create_game(&NewGame {
        round,
        date,
        opponent: opp,
        result,
        goals_for: 0,
        goals_against: 0,
    })
    .expect("game");
}

#[test]
fn empty_store_gives_empty_report() {
    let db = Database::in_memory().expect("db");
    let report = standings(&db).expect("report");
    assert!(report.table.is_none());
    assert!(report.rows.is_empty());
}

#[test]
fn single_table_has_no_deltas() {
    let db = Database::in_memory().expect("db");
    let a = db.create_team("Pescara", None).expect("team").id;
    let b = db.create_team("Ternana", None).expect("team").id;
    add_table(&db, 1, day(8, 25), &[(a, 1), (b, 2)]);

    let report = standings(&db).expect("report");
    assert!(report.previous.is_none());
    assert_eq!(report.rows.len(), 2);
    assert!(report.rows.iter().all(|r| r.pos_delta.is_none()));
}

#[test]
fn pescara_moves_up_two_places() {
    let db = Database::in_memory().expect("db");
    let pescara = db.create_team("Pescara", None).expect("team").id;
    let ternana = db.create_team("Ternana", None).expect("team").id;
    let arezzo = db.create_team("Arezzo", None).expect("team").id;
    let rimini = db.create_team("Rimini", None).expect("team").id;

    add_table(
        &db,
        3,
        day(9, 14),
        &[(ternana, 1), (arezzo, 2), (rimini, 3), (pescara, 4)],
    );
    let latest = add_table(
        &db,
        4,
        day(9, 21),
        &[(ternana, 1), (pescara, 2), (rimini, 3), (arezzo, 4)],
    );

    let report = standings(&db).expect("report");
    assert_eq!(report.table.as_ref().map(|t| t.id), Some(latest));
    assert_eq!(report.previous.as_ref().map(|t| t.round), Some(3));

    let row = report
        .rows
        .iter()
        .find(|r| r.team.id == pescara)
        .expect("pescara row");
    assert_eq!(row.position, 2);
    assert_eq!(row.pos_delta, Some(2));

    let arezzo_row = report.rows.iter().find(|r| r.team.id == arezzo).expect("row");
    assert_eq!(arezzo_row.pos_delta, Some(-2));
    assert_eq!(arezzo_row.pos_delta_abs, Some(2));

    let positions: Vec<u32> = report.rows.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4]);
}

#[test]
fn previous_table_compares_date_before_round() {
    let db = Database::in_memory().expect("db");
    let a = db.create_team("Ascoli", None).expect("team").id;
    // Same date, lower round: this is the preceding one.
    add_table(&db, 5, day(10, 5), &[(a, 6)]);
    // Higher round but an earlier date.
    add_table(&db, 7, day(9, 28), &[(a, 9)]);
    add_table(&db, 6, day(10, 5), &[(a, 4)]);

    let report = standings(&db).expect("report");
    assert_eq!(report.table.as_ref().map(|t| t.round), Some(6));
    assert_eq!(report.previous.as_ref().map(|t| t.round), Some(5));
    assert_eq!(report.rows[0].pos_delta, Some(2));
}

#[test]
fn team_new_to_the_table_has_no_delta() {
    let db = Database::in_memory().expect("db");
    let a = db.create_team("Ascoli", None).expect("team").id;
    let b = db.create_team("Gubbio", None).expect("team").id;
    add_table(&db, 1, day(8, 25), &[(a, 1)]);
    add_table(&db, 2, day(9, 1), &[(b, 1), (a, 2)]);

    let report = standings(&db).expect("report");
    assert_eq!(report.rows[0].team.id, b);
    assert_eq!(report.rows[0].pos_delta, None);
    assert_eq!(report.rows[1].pos_delta, Some(-1));
}

#[test]
fn last_result_ignores_games_after_the_table() {
    let db = Database::in_memory().expect("db");
    let pescara = db.create_team("Pescara", None).expect("team").id;
    let opp = db.create_team("Perugia", None).expect("team").id;
    let other = db.create_team("Pineto", None).expect("team").id;

    add_game(&db, 2, day(8, 31), opp, GameResult::Loss);
    add_game(&db, 12, day(11, 9), opp, GameResult::Win);
    add_table(&db, 3, day(9, 14), &[(pescara, 1), (opp, 2), (other, 3)]);

    let report = standings(&db).expect("report");
    let opp_row = report.rows.iter().find(|r| r.team.id == opp).expect("row");
    assert_eq!(opp_row.played_result, Some(GameResult::Loss));
    let other_row = report.rows.iter().find(|r| r.team.id == other).expect("row");
    assert_eq!(other_row.played_result, None);
}

#[test]
fn game_on_table_date_counts() {
    let db = Database::in_memory().expect("db");
    let opp = db.create_team("Campobasso", None).expect("team").id;
    add_game(&db, 4, day(9, 21), opp, GameResult::Draw);
    add_table(&db, 4, day(9, 21), &[(opp, 5)]);

    let report = standings(&db).expect("report");
    assert_eq!(report.rows[0].played_result, Some(GameResult::Draw));
}
