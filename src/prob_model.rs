/// Tunable model constants. The two-sample proxy and the fallback
/// differential SD are empirical values tied to the game's scoring scale;
/// leave them alone unless fresh calibration data says otherwise.
#[derive(Debug, Clone, Copy)]
pub struct ModelConfig {
    /// SD stand-in applied to the first score when an event yields exactly
    /// two (too few for a sample SD).
    pub two_sample_proxy: f64,
    /// Match-differential SD used when too few teams have variance data.
    pub fallback_diff_sd: f64,
    /// Per-team SD estimates required before pooling replaces the fallback.
    pub min_pooled_samples: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            two_sample_proxy: 0.3,
            fallback_diff_sd: 10.0,
            min_pooled_samples: 3,
        }
    }
}

/// Bessel-corrected sample standard deviation. Callers guarantee n >= 2.
pub fn sample_std_dev(scores: &[f64]) -> f64 {
    debug_assert!(scores.len() >= 2);
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let sq_dev: f64 = scores.iter().map(|s| (s - mean).powi(2)).sum();
    (sq_dev / (scores.len() - 1) as f64).sqrt()
}

/// Abramowitz & Stegun 26.2.17 rational approximation of the standard normal
/// CDF, good to about 1e-7. Symmetry covers negative z, so no erf primitive
/// and no second constant set are needed.
pub fn norm_cdf(z: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.2315419 * z.abs());
    let d = 0.3989422804 * (-0.5 * z * z).exp();
    let poly = t
        * (0.319381530
            + t * (-0.356563782
                + t * (1.781477937 + t * (-1.821255978 + t * 1.330274429))));
    let p = 1.0 - d * poly;
    if z >= 0.0 { p } else { 1.0 - p }
}

/// How the match-differential SD was arrived at, for the progress log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiffSd {
    Pooled(f64),
    Fallback(f64),
}

impl DiffSd {
    pub fn value(self) -> f64 {
        match self {
            DiffSd::Pooled(v) | DiffSd::Fallback(v) => v,
        }
    }
}

/// Pool per-team SDs into the SD of the alliance-score difference. Each robot
/// is treated as an independent contribution: a three-robot sum scales the SD
/// by sqrt(3), the difference of two such sums by a further sqrt(2).
pub fn pooled_diff_sd(team_sds: &[f64], cfg: &ModelConfig) -> DiffSd {
    if team_sds.len() >= cfg.min_pooled_samples {
        let mean = team_sds.iter().sum::<f64>() / team_sds.len() as f64;
        DiffSd::Pooled(mean * 3.0_f64.sqrt() * 2.0_f64.sqrt())
    } else {
        DiffSd::Fallback(cfg.fallback_diff_sd)
    }
}

/// Final result handed back to the caller. The two probabilities sum to 1.
#[derive(Debug, Clone, Copy)]
pub struct WinProbability {
    pub p_red: f64,
    pub p_blue: f64,
    pub red_total: f64,
    pub blue_total: f64,
}

pub fn win_probability(red_total: f64, blue_total: f64, diff_sd: f64) -> WinProbability {
    let z = (red_total - blue_total) / diff_sd;
    let p_red = norm_cdf(z);
    WinProbability {
        p_red,
        p_blue: 1.0 - p_red,
        red_total,
        blue_total,
    }
}
