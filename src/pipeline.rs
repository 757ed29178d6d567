use rayon::prelude::*;

use crate::config::ApiConfig;
use crate::prob_model::{DiffSd, ModelConfig, WinProbability, pooled_diff_sd, win_probability};
use crate::rating::{AutoRating, auto_rating, best_season};
use crate::variance::{VarianceEstimate, auto_std_dev};

pub const ALLIANCE_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllianceColor {
    Red,
    Blue,
}

impl AllianceColor {
    pub fn label(self) -> &'static str {
        match self {
            AllianceColor::Red => "Red",
            AllianceColor::Blue => "Blue",
        }
    }
}

/// One side of a hypothetical match, fixed at three teams.
#[derive(Debug, Clone, Copy)]
pub struct Alliance {
    pub color: AllianceColor,
    pub teams: [u32; ALLIANCE_SIZE],
}

impl Alliance {
    pub fn red(teams: [u32; ALLIANCE_SIZE]) -> Self {
        Self {
            color: AllianceColor::Red,
            teams,
        }
    }

    pub fn blue(teams: [u32; ALLIANCE_SIZE]) -> Self {
        Self {
            color: AllianceColor::Blue,
            teams,
        }
    }
}

/// Runs the whole estimation pipeline for one match-up: season selection,
/// per-team ratings, alliance totals, per-team variance, pooled differential
/// SD, win probability. Returns `None` only when an alliance has zero teams
/// with a resolvable rating; every lesser data gap degrades instead.
///
/// The per-team lookups are independent, so each round is fanned out in
/// parallel and the progress lines are replayed in team order afterwards to
/// keep the log deterministic.
pub fn compute_win_probability(
    cfg: &ApiConfig,
    model: &ModelConfig,
    red: Alliance,
    blue: Alliance,
    event_key: Option<&str>,
    on_log: &mut dyn FnMut(&str),
) -> Option<WinProbability> {
    let season = best_season(cfg);
    on_log(&format!("Using {season} EPA data"));

    let teams: Vec<u32> = red
        .teams
        .iter()
        .chain(blue.teams.iter())
        .copied()
        .collect();

    let ratings: Vec<Option<AutoRating>> = teams
        .par_iter()
        .map(|&team| auto_rating(cfg, team, season))
        .collect();

    let mut red_ratings = Vec::new();
    let mut blue_ratings = Vec::new();
    for (idx, (team, rating)) in teams.iter().zip(&ratings).enumerate() {
        match rating {
            Some(r) => {
                let origin = if r.season != season {
                    format!(" (from {})", r.season)
                } else {
                    String::new()
                };
                on_log(&format!("Team {team} auto EPA: {:.2}{origin}", r.value));
                if idx < ALLIANCE_SIZE {
                    red_ratings.push(r.value);
                } else {
                    blue_ratings.push(r.value);
                }
            }
            None => on_log(&format!("Team {team}: no EPA found")),
        }
    }

    // The single abort condition: a side with no data at all.
    if red_ratings.is_empty() || blue_ratings.is_empty() {
        return None;
    }

    let red_total: f64 = red_ratings.iter().sum();
    let blue_total: f64 = blue_ratings.iter().sum();
    on_log(&format!(
        "{} alliance auto EPA: {red_total:.2}",
        red.color.label()
    ));
    on_log(&format!(
        "{} alliance auto EPA: {blue_total:.2}",
        blue.color.label()
    ));

    let estimates: Vec<VarianceEstimate> = teams
        .par_iter()
        .map(|&team| auto_std_dev(cfg, model, team, event_key, season))
        .collect();

    let mut team_sds = Vec::new();
    for (team, est) in teams.iter().zip(&estimates) {
        for note in &est.notes {
            on_log(note);
        }
        match est.sd {
            Some(sd) => {
                team_sds.push(sd);
                on_log(&format!("Team {team} auto sd: {sd:.2} [{}]", est.source));
            }
            None => on_log(&format!("Team {team}: no match variance data")),
        }
    }

    let diff_sd = pooled_diff_sd(&team_sds, model);
    match diff_sd {
        DiffSd::Pooled(sd) => on_log(&format!("Match auto diff sd: {sd:.2}")),
        DiffSd::Fallback(sd) => on_log(&format!("Using fallback sd = {sd}")),
    }

    Some(win_probability(red_total, blue_total, diff_sd.value()))
}
