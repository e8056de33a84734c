//! Plain HTTP fetch engine
//!
//! One GET per page. reqwest handles gzip/deflate/brotli and decodes the body
//! using the charset from `Content-Type` (UTF-8 when absent).

use crate::config::ScraperConfig;
use crate::fetcher::PageContent;
use crate::{Result, ScrapeError};
use reqwest::Client;
use std::time::Duration;

/// Builds the shared HTTP client
///
/// # Arguments
///
/// * `config` - Fetch engine configuration (User-Agent, connect timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use scrapedown::config::ScraperConfig;
/// use scrapedown::fetcher::build_http_client;
///
/// let client = build_http_client(&ScraperConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ScraperConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .build()
}

/// Fetches a page and converts it
///
/// The timeout covers the whole exchange, body included.
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Non-2xx status | `HttpStatus` (`HTTP 404 for <url>`) |
/// | Deadline exceeded | `Timeout` (`Request timeout for <url> (<ms>ms)`) |
/// | Anything else | `Transport` (`Failed to fetch <url>: <cause>`) |
pub async fn fetch_page(client: &Client, url: &str, timeout: Duration) -> Result<PageContent> {
    tracing::debug!("Fetching {} (timeout {}ms)", url, timeout.as_millis());

    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| classify_error(url, timeout, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    // Resolve relative URLs against where the redirects actually landed
    let final_url = response.url().to_string();

    let body = response
        .text()
        .await
        .map_err(|e| classify_error(url, timeout, e))?;

    tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());

    Ok(PageContent::from_raw_html(&body, &final_url))
}

fn classify_error(url: &str, timeout: Duration, error: reqwest::Error) -> ScrapeError {
    if error.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        ScrapeError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
