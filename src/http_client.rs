use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use thiserror::Error;

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Non-success HTTP status from one of the statistics services.
#[derive(Debug, Error)]
#[error("http {status}")]
pub struct RequestError {
    pub status: StatusCode,
}

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// One GET, no retries, no caching. Returns the raw body so each caller can
/// run its own parse function (and test it against fixtures).
pub fn fetch_body(url: &str, headers: &[(&str, &str)]) -> Result<String> {
    let client = http_client()?;
    let mut req = client.get(url);
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        tracing::debug!(%status, url, "non-success response");
        return Err(RequestError { status }.into());
    }
    Ok(body)
}
