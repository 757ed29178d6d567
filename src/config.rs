use std::env;

use anyhow::{Context, Result};

const DEFAULT_STATBOTICS_BASE: &str = "https://api.statbotics.io/v3";
const DEFAULT_TBA_BASE: &str = "https://www.thebluealliance.com/api/v3";

/// Service endpoints and credentials, injected from the environment so a
/// deployment can rotate the TBA key or point at a mirror without a rebuild.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub statbotics_base: String,
    pub tba_base: String,
    pub tba_auth_key: String,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let statbotics_base = env_base("STATBOTICS_BASE_URL", DEFAULT_STATBOTICS_BASE);
        let tba_base = env_base("TBA_BASE_URL", DEFAULT_TBA_BASE);
        let tba_auth_key = env::var("TBA_AUTH_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .context("TBA_AUTH_KEY is not set")?;
        Ok(Self {
            statbotics_base,
            tba_base,
            tba_auth_key,
        })
    }

    pub fn tba_headers(&self) -> [(&str, &str); 1] {
        [("X-TBA-Auth-Key", self.tba_auth_key.as_str())]
    }
}

fn env_base(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}
