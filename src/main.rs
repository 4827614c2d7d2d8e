use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use serde::Serialize;

use pescara_stats::models::{GameId, PlayerId};
use pescara_stats::params::Params;
use pescara_stats::{Database, SeasonConfig, home, import, leaderboard, matches, standings, trajectory};

const USAGE: &str = "usage: pescara_stats [--db PATH] <command> [key=value ...]

commands:
  home                    last/next game and current position
  standings               latest table with movement and last result
  matches                 games (result=W|D|L from=YYYY-MM-DD to=YYYY-MM-DD)
  match <id>              one game with its lineup
  players                 leaderboard (sort=games|goals|gpm|number q=NAME all=1 played=1)
  player <id>             one player's appearances and totals
  trajectory              position trend and chart coordinates
  import <file.json>      load a season document";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let (db_arg, rest) = split_db_path_arg(&args);

    let mut cfg = SeasonConfig::from_env();
    if let Some(path) = db_arg {
        cfg.db_path = path;
    }

    let Some((command, tail)) = rest.split_first() else {
        eprintln!("{USAGE}");
        return Err(anyhow!("no command given"));
    };

    let db = Database::open(&cfg.db_path)
        .with_context(|| format!("open season db {}", cfg.db_path.display()))?;
    let settings = db.active_settings().context("load site settings")?;
    let cfg = cfg.with_site_settings(settings.as_ref());

    match command.as_str() {
        "home" => {
            let today = Local::now().date_naive();
            print_json(&home::home(&db, &cfg, today)?)
        }
        "standings" => print_json(&standings::standings(&db)?),
        "matches" => print_json(&matches::match_list(&db, &Params::from_pairs(tail))?),
        "match" => {
            let id = parse_id(tail.first()).context("match needs a numeric id")?;
            print_json(&matches::match_detail(&db, GameId(id))?)
        }
        "players" => print_json(&leaderboard::leaderboard(&db, &Params::from_pairs(tail))?),
        "player" => {
            let id = parse_id(tail.first()).context("player needs a numeric id")?;
            print_json(&leaderboard::player_detail(&db, PlayerId(id))?)
        }
        "trajectory" => print_json(&trajectory::trajectory(&db, &cfg)?),
        "import" => {
            let path = tail
                .first()
                .map(PathBuf::from)
                .context("import needs a file path")?;
            let summary = import::import_file(&db, &path)
                .with_context(|| format!("import {}", path.display()))?;
            print_json(&summary)
        }
        other => {
            eprintln!("{USAGE}");
            Err(anyhow!("unknown command '{other}'"))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize report")?;
    println!("{out}");
    Ok(())
}

fn parse_id(raw: Option<&String>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

/// Pulls `--db PATH` / `--db=PATH` out of the argument list.
fn split_db_path_arg(args: &[String]) -> (Option<PathBuf>, Vec<String>) {
    let mut path = None;
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--db=") {
            if !value.trim().is_empty() {
                path = Some(PathBuf::from(value.trim()));
            }
            continue;
        }
        if arg == "--db" {
            if let Some(next) = iter.next()
                && !next.trim().is_empty()
            {
                path = Some(PathBuf::from(next));
            }
            continue;
        }
        rest.push(arg.clone());
    }
    (path, rest)
}
