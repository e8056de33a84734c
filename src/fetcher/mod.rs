//! Page acquisition
//!
//! Two engines produce page HTML: a plain HTTP GET ([`http`]) and a pooled
//! headless browser ([`render`]). Both feed the same normalize-then-convert
//! pipeline. [`Scraper`] picks the engine per request and turns every failure
//! into a [`PageResult`](crate::types::PageResult).

mod browser;
mod http;
mod pool;
mod render;
mod scrape;

pub use browser::{ChromeInstance, ChromeLauncher};
pub use http::{build_http_client, fetch_page};
pub use pool::{BrowserPool, Launcher, PoolToken, ResourcePool};
pub use render::{click_inactive_tabs, render_page, TAB_SELECTORS};
pub use scrape::Scraper;

use crate::html::normalize_html;
use crate::markdown::to_markdown;

/// Normalized HTML plus its Markdown rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub html: String,
    pub markdown: String,
}

impl PageContent {
    /// Runs raw page HTML through the normalizer (main-content mode) and the converter
    pub fn from_raw_html(raw_html: &str, page_url: &str) -> Self {
        let html = normalize_html(raw_html, page_url, true);
        let markdown = to_markdown(html.as_str());
        Self { html, markdown }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_html() {
        let content = PageContent::from_raw_html(
            "<html><body><nav>Menu</nav><h1>Title</h1><a href=\"/next\">Next</a></body></html>",
            "https://example.com/start",
        );

        assert!(content.html.contains("https://example.com/next"));
        assert!(!content.html.contains("Menu"));
        assert!(content.markdown.contains("# Title"));
        assert!(content.markdown.contains("[Next](https://example.com/next)"));
    }
}
