use crate::config::{BrowserConfig, Config};
use crate::fetcher::{build_http_client, fetch_page, render_page, BrowserPool, PageContent};
use crate::types::{PageResult, ScrapeRequest};
use crate::Result;
use reqwest::Client;
use std::sync::Arc;

/// Page scraper
///
/// Dispatches each request to the browser engine (`render_js`) or the plain
/// HTTP engine and reports the outcome as a [`PageResult`].
pub struct Scraper {
    client: Client,
    pool: Arc<BrowserPool>,
    browser: BrowserConfig,
}

impl Scraper {
    /// Creates a scraper sharing the given browser pool
    ///
    /// Constructing the pool does not start any browser; the first
    /// `render_js` request does.
    pub fn new(config: &Config, pool: Arc<BrowserPool>) -> Result<Self> {
        let client = build_http_client(&config.scraper)?;
        Ok(Self {
            client,
            pool,
            browser: config.browser.clone(),
        })
    }

    /// Scrapes one page
    ///
    /// Never fails: invalid requests and every engine error come back as
    /// `success: false` with the error message.
    pub async fn scrape(&self, request: &ScrapeRequest) -> PageResult {
        match self.try_scrape(request).await {
            Ok(content) => {
                tracing::debug!(
                    "Scraped {} ({} chars of markdown)",
                    request.url,
                    content.markdown.len()
                );
                PageResult::success(&request.url, content.html, content.markdown)
            }
            Err(e) => {
                tracing::warn!("Scrape failed for {}: {}", request.url, e);
                PageResult::failure(&request.url, e.to_string())
            }
        }
    }

    async fn try_scrape(&self, request: &ScrapeRequest) -> Result<PageContent> {
        request.validate()?;

        if request.render_js {
            render_page(
                &self.pool,
                &self.browser,
                &request.url,
                request.timeout_duration(),
                request.auto_click_tabs,
            )
            .await
        } else {
            fetch_page(&self.client, &request.url, request.timeout_duration()).await
        }
    }
}
