use crate::config::SeasonConfig;
use crate::error::Result;
use crate::models::Team;
use crate::store::Database;

/// The club every report is written from the point of view of.
///
/// The active site settings' home club wins; otherwise the first team whose
/// name contains `cfg.tracked_team_name`, ignoring case.
pub fn resolve_tracked_team(db: &Database, cfg: &SeasonConfig) -> Result<Option<Team>> {
    if let Some(settings) = db.active_settings()?
        && let Some(team) = db.get_team(settings.home_club)?
    {
        return Ok(Some(team));
    }
    let team = db.find_team_containing(&cfg.tracked_team_name)?;
    if team.is_none() {
        log::debug!("no team matches '{}'", cfg.tracked_team_name);
    }
    Ok(team)
}
