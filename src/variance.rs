use crate::config::ApiConfig;
use crate::http_client::fetch_body;
use crate::match_scores::{MatchRecord, extract_auto_scores, parse_matches_json};
use crate::prob_model::{ModelConfig, sample_std_dev};

/// A team's auto-score SD plus where it came from. `notes` collects the
/// progress lines produced while estimating, so the orchestrator can fan
/// lookups out in parallel and still replay the log in team order.
#[derive(Debug, Clone)]
pub struct VarianceEstimate {
    pub sd: Option<f64>,
    pub source: String,
    pub notes: Vec<String>,
}

impl VarianceEstimate {
    fn none(notes: Vec<String>) -> Self {
        Self {
            sd: None,
            source: "no data".to_string(),
            notes,
        }
    }
}

/// Cascading SD estimate: the supplied event's matches first, the team's own
/// season matches second, absence last. Every fetch failure is downgraded to
/// zero scores for its tier.
pub fn auto_std_dev(
    cfg: &ApiConfig,
    model: &ModelConfig,
    team: u32,
    event_key: Option<&str>,
    season: i32,
) -> VarianceEstimate {
    let mut notes = Vec::new();

    if let Some(event_key) = event_key {
        match fetch_matches(cfg, &format!("event/{event_key}/matches")) {
            Ok(matches) => {
                let scores = extract_auto_scores(&matches, team);
                notes.push(format!(
                    "Team {team} event matches found: {}",
                    scores.len()
                ));
                if let Some((sd, source)) = event_estimate(&scores, model) {
                    return VarianceEstimate {
                        sd: Some(sd),
                        source,
                        notes,
                    };
                }
            }
            Err(err) => notes.push(format!("Team {team} event fetch error: {err:#}")),
        }
    }

    for year in [season, season - 1] {
        let matches = match fetch_matches(cfg, &format!("team/frc{team}/matches/{year}")) {
            Ok(matches) => matches,
            Err(err) => {
                tracing::debug!(team, year, "season match fetch failed: {err:#}");
                continue;
            }
        };
        let scores = extract_auto_scores(&matches, team);
        if let Some((sd, source)) = season_estimate(&scores, year) {
            return VarianceEstimate {
                sd: Some(sd),
                source,
                notes,
            };
        }
    }

    VarianceEstimate::none(notes)
}

/// Event tier: three scores support a real sample SD; exactly two get the
/// low-confidence proxy; fewer fall through to the season tier.
fn event_estimate(scores: &[f64], model: &ModelConfig) -> Option<(f64, String)> {
    match scores.len() {
        n if n >= 3 => Some((sample_std_dev(scores), format!("event ({n} matches)"))),
        2 => Some((
            scores[0] * model.two_sample_proxy,
            "event (2 matches)".to_string(),
        )),
        _ => None,
    }
}

fn season_estimate(scores: &[f64], year: i32) -> Option<(f64, String)> {
    if scores.len() >= 3 {
        Some((
            sample_std_dev(scores),
            format!("{year} season ({} matches)", scores.len()),
        ))
    } else {
        None
    }
}

fn fetch_matches(cfg: &ApiConfig, path: &str) -> anyhow::Result<Vec<MatchRecord>> {
    let url = format!("{}/{}", cfg.tba_base, path);
    let body = fetch_body(&url, &cfg.tba_headers())?;
    parse_matches_json(&body)
}
