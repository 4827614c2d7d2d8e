//! Season tracker for a single club: roster, results, appearances and
//! weekly league tables, with the read-only reports built on top of them.

pub mod config;
pub mod error;
pub mod home;
pub mod import;
pub mod leaderboard;
pub mod matches;
pub mod models;
pub mod params;
pub mod standings;
pub mod store;
pub mod tracked;
pub mod trajectory;

pub use config::SeasonConfig;
pub use error::{Result, StoreError};
pub use store::Database;
