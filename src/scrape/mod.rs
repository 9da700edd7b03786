//! Scraping pipeline: fetch the homepage, extract headline links,
//! pull article bodies, and assemble the corpus string.

pub mod article;
pub mod corpus;
pub mod links;

use std::time::Duration;

use crate::config::ScrapeConfig;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("http status {0}")]
    Status(reqwest::StatusCode),
}

/// Fetch a page body as text.
///
/// Sends a GET with the configured User-Agent and timeout. Any transport
/// failure or non-success status becomes a typed [`FetchError`]; this
/// function never panics on remote behavior.
pub fn fetch_page(url: &str, config: &ScrapeConfig) -> Result<String, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    log::debug!("{url}: requesting");

    let resp = client.get(url).send()?;

    let status = resp.status();
    if !status.is_success() {
        log::debug!("{url}: {}", status);
        return Err(FetchError::Status(status));
    }

    let bytes = resp.bytes()?;
    Ok(String::from_utf8_lossy(&bytes).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unroutable_url_is_network_error() {
        let config = ScrapeConfig {
            timeout_secs: 1,
            ..Default::default()
        };

        let result = fetch_page("http://127.0.0.1:1/", &config);
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
