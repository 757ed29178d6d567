use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::http_client::fetch_body;

/// Canary team for season detection: a long-running powerhouse whose rating
/// shows up as soon as a season has published usable numbers.
const REFERENCE_TEAM: u32 = 254;

#[derive(Debug, Deserialize)]
pub struct TeamYear {
    #[serde(default)]
    pub epa: Option<EpaBlock>,
}

#[derive(Debug, Deserialize)]
pub struct EpaBlock {
    #[serde(default)]
    pub breakdown: Option<EpaBreakdown>,
}

#[derive(Debug, Deserialize)]
pub struct EpaBreakdown {
    #[serde(default)]
    pub auto_points: Option<f64>,
}

/// One resolved auto-period rating. `season` is the year the value actually
/// came from, which may be one behind the year that was asked for.
#[derive(Debug, Clone, Copy)]
pub struct AutoRating {
    pub team: u32,
    pub season: i32,
    pub value: f64,
}

pub fn parse_team_year_json(raw: &str) -> Result<TeamYear> {
    serde_json::from_str(raw).context("parse team_year response")
}

fn fetch_auto_points(cfg: &ApiConfig, team: u32, season: i32) -> Result<Option<f64>> {
    let url = format!("{}/team_year/{team}/{season}", cfg.statbotics_base);
    let body = fetch_body(&url, &[])?;
    let data = parse_team_year_json(&body)?;
    Ok(data
        .epa
        .and_then(|e| e.breakdown)
        .and_then(|b| b.auto_points))
}

/// Ratings for a new year only appear once the season has stabilized. Probe
/// the reference team's current-year rating and fall back one year when the
/// auto field is still missing (or the probe fails outright).
pub fn best_season(cfg: &ApiConfig) -> i32 {
    let year = Utc::now().year();
    match fetch_auto_points(cfg, REFERENCE_TEAM, year) {
        Ok(Some(_)) => year,
        Ok(None) => year - 1,
        Err(err) => {
            tracing::debug!(year, "season probe failed: {err:#}");
            year - 1
        }
    }
}

/// Look up the team's auto rating for `season`, then `season - 1`. A failure
/// of any kind just moves on to the next candidate year.
pub fn auto_rating(cfg: &ApiConfig, team: u32, season: i32) -> Option<AutoRating> {
    for year in [season, season - 1] {
        match fetch_auto_points(cfg, team, year) {
            Ok(Some(value)) => {
                return Some(AutoRating {
                    team,
                    season: year,
                    value,
                });
            }
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(team, year, "rating fetch failed: {err:#}");
            }
        }
    }
    None
}
