use chrono::NaiveDate;

use pescara_stats::models::{EntryStats, GameResult, NewGame, NewSiteSettings, TeamId, Theme};
use pescara_stats::trajectory::{ChartLayout, trajectory};
use pescara_stats::{Database, SeasonConfig};

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).expect("valid date")
}

fn add_table(db: &Database, round: u32, date: NaiveDate, rows: &[(TeamId, u32, i32)]) {
    let table = db.create_table(round, date).expect("table");
    for (team, position, points) in rows {
        db.add_entry(
            table.id,
            *team,
            &EntryStats {
                position: *position,
                points: *points,
                ..EntryStats::default()
            },
        )
        .expect("entry");
    }
}

#[test]
fn unknown_team_gives_empty_trajectory() {
    let db = Database::in_memory().expect("db");
    let other = db.create_team("Ternana", None).expect("team").id;
    add_table(&db, 1, day(8, 25), &[(other, 1, 3)]);

    let out = trajectory(&db, &SeasonConfig::default()).expect("trajectory");
    assert!(out.rows.is_empty());
    assert!(out.spark_points.is_empty());
    assert!(out.span_label.is_empty());
    assert_eq!(out.first_round, None);
}

#[test]
fn tables_without_the_team_are_skipped() {
    let db = Database::in_memory().expect("db");
    let pescara = db.create_team("Pescara", None).expect("team").id;
    let other = db.create_team("Ternana", None).expect("team").id;

    add_table(&db, 1, day(8, 25), &[(pescara, 6, 1), (other, 1, 3)]);
    add_table(&db, 2, day(9, 1), &[(other, 1, 6)]);
    add_table(&db, 3, day(9, 15), &[(pescara, 4, 4), (other, 2, 6)]);
    add_table(&db, 4, day(9, 22), &[(pescara, 2, 7), (other, 3, 6)]);
    add_table(&db, 5, day(9, 29), &[(pescara, 3, 7), (other, 1, 9)]);

    let out = trajectory(&db, &SeasonConfig::default()).expect("trajectory");
    assert_eq!(out.rows.len(), 4);
    let rounds: Vec<u32> = out.rows.iter().map(|r| r.round).collect();
    assert_eq!(rounds, vec![1, 3, 4, 5]);
    assert_eq!(out.dots.len(), 4);
    assert_eq!(out.spark_points.split(' ').count(), 4);
    assert_eq!(out.max_pos_seen, 6);
    assert_eq!(out.span_label, "J1–J5");

    let worst = out.rows.iter().find(|r| r.position == 6).expect("row");
    assert_eq!(worst.color, "#6b7280");
}

#[test]
fn moving_up_draws_higher_on_the_chart() {
    let db = Database::in_memory().expect("db");
    let pescara = db.create_team("Pescara", None).expect("team").id;
    add_table(&db, 3, day(9, 14), &[(pescara, 4, 5)]);
    add_table(&db, 4, day(9, 21), &[(pescara, 2, 8)]);

    let out = trajectory(&db, &SeasonConfig::default()).expect("trajectory");
    assert_eq!(out.rows.len(), 2);
    let r3 = &out.dots[0];
    let r4 = &out.dots[1];
    assert_eq!(r3.label, "J3");
    assert_eq!(r4.label, "J4");
    assert!(r4.cy < r3.cy);
    assert!(r4.cx > r3.cx);
    assert_eq!(out.rows[1].points, 8);
    assert_eq!(out.rows[1].color, "#22c55e");
}

#[test]
fn coordinates_follow_the_fixed_layout() {
    let db = Database::in_memory().expect("db");
    let pescara = db.create_team("Pescara", None).expect("team").id;
    add_table(&db, 1, day(8, 25), &[(pescara, 1, 3)]);
    let spring = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date");
    add_table(&db, 25, spring, &[(pescara, 30, 40)]);

    let out = trajectory(&db, &SeasonConfig::default()).expect("trajectory");
    assert_eq!(out.spark_points, "36,12 902,236");
    assert_eq!(out.x_labels.len(), 25);
    assert_eq!(out.x_labels[0].text, "J1");
    assert_eq!(out.x_labels[0].at, 36);
    assert_eq!(out.x_labels[24].at, 902);
    let ticks: Vec<&str> = out.y_labels.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(ticks, vec!["1", "5", "10", "15", "20", "25"]);
    assert_eq!(out.y_labels[0].at, 12);
    assert_eq!(out.y_labels[5].at, 236);
    assert_eq!(out.max_pos, 25);
}

#[test]
fn rounds_join_game_results() {
    let db = Database::in_memory().expect("db");
    let pescara = db.create_team("Pescara", None).expect("team").id;
    let opp = db
        .create_team("Arezzo", Some("team_logos/arezzo.png"))
        .expect("team")
        .id;
    db.create_game(&NewGame {
        round: 2,
        date: day(8, 31),
        opponent: opp,
        result: GameResult::Win,
        goals_for: 5,
        goals_against: 4,
    })
    .expect("game");
    add_table(&db, 1, day(8, 25), &[(pescara, 8, 0)]);
    add_table(&db, 2, day(9, 1), &[(pescara, 5, 3)]);

    let out = trajectory(&db, &SeasonConfig::default()).expect("trajectory");
    assert_eq!(out.rows[0].res_class, "");
    assert_eq!(out.rows[0].result, None);
    assert_eq!(out.rows[1].res_class, "win");
    assert_eq!(out.rows[1].score, "5-4");
    assert_eq!(out.rows[1].opp_name, "Arezzo");
    assert_eq!(out.rows[1].opp_logo.as_deref(), Some("team_logos/arezzo.png"));
}

#[test]
fn settings_pick_the_tracked_club_and_season_length() {
    let db = Database::in_memory().expect("db");
    let pescara = db.create_team("Pescara", None).expect("team").id;
    let home = db.create_team("Ternana", None).expect("team").id;
    db.create_settings(&NewSiteSettings {
        site_name: "Fere".to_string(),
        league_name: String::new(),
        home_club: home,
        is_active: true,
        max_rounds: 38,
        theme: Theme::default(),
    })
    .expect("settings");
    add_table(&db, 1, day(8, 25), &[(pescara, 2, 3), (home, 1, 3)]);

    let settings = db.active_settings().expect("query");
    let cfg = SeasonConfig::default().with_site_settings(settings.as_ref());
    let out = trajectory(&db, &cfg).expect("trajectory");
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].position, 1);
    assert_eq!(out.total_rounds, 38);
    assert_eq!(out.x_labels.len(), 38);
    assert_eq!(ChartLayout::new(38).x_for_round(38), 902.0);
}
