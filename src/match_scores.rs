use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Score-breakdown field holding whole-alliance auto points. The name has
/// drifted across seasons, so candidates are probed in priority order.
const AUTO_POINTS_FIELDS: [&str; 2] = ["autoPoints", "auto_points"];

const ROBOTS_PER_ALLIANCE: f64 = 3.0;

#[derive(Debug, Deserialize)]
pub struct MatchRecord {
    #[serde(default)]
    pub alliances: Option<MatchAlliances>,
    /// Season-specific shape; kept raw and probed by field name.
    #[serde(default)]
    pub score_breakdown: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MatchAlliances {
    #[serde(default)]
    pub red: AllianceSide,
    #[serde(default)]
    pub blue: AllianceSide,
}

#[derive(Debug, Default, Deserialize)]
pub struct AllianceSide {
    #[serde(default)]
    pub team_keys: Vec<String>,
}

pub fn parse_matches_json(raw: &str) -> Result<Vec<MatchRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("parse match list response")
}

/// Per-robot auto contribution for every match the team played, in input
/// order. Whole-alliance auto points are split evenly across three robots.
/// Matches without a score breakdown are skipped outright.
pub fn extract_auto_scores(matches: &[MatchRecord], team: u32) -> Vec<f64> {
    let team_key = format!("frc{team}");
    let mut scores = Vec::new();
    for m in matches {
        let Some(breakdown) = m.score_breakdown.as_ref() else {
            continue;
        };
        let Some(alliances) = m.alliances.as_ref() else {
            continue;
        };
        for (color, side) in [("red", &alliances.red), ("blue", &alliances.blue)] {
            if !side.team_keys.iter().any(|k| k == &team_key) {
                continue;
            }
            if let Some(points) = auto_points_for_color(breakdown, color) {
                scores.push(points / ROBOTS_PER_ALLIANCE);
            }
            break;
        }
    }
    scores
}

fn auto_points_for_color(breakdown: &Value, color: &str) -> Option<f64> {
    let side = breakdown.get(color)?;
    AUTO_POINTS_FIELDS
        .iter()
        .find_map(|field| side.get(field).and_then(Value::as_f64))
}
