//! Request and result types shared by the scraper, the crawler and callers
//!
//! Every type serializes with camelCase keys and omits absent optional fields,
//! so results can be framed as JSON directly.

use crate::url::parse_http_url;
use crate::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_DEPTH: u32 = 3;
pub const DEFAULT_MAX_PAGES: usize = 50;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

/// A single-page scrape request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: String,

    /// Load the page in a headless browser instead of a plain GET
    #[serde(default, rename = "renderJS")]
    pub render_js: bool,

    /// Deadline in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Click inactive tab controls before capturing (browser mode only)
    #[serde(default)]
    pub auto_click_tabs: bool,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            render_js: false,
            timeout: DEFAULT_TIMEOUT_MS,
            auto_click_tabs: false,
        }
    }

    pub fn with_render_js(mut self, render_js: bool) -> Self {
        self.render_js = render_js;
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = timeout_ms;
        self
    }

    pub fn with_auto_click_tabs(mut self, auto_click_tabs: bool) -> Self {
        self.auto_click_tabs = auto_click_tabs;
        self
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Checks the request before any network activity
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.url)?;
        validate_positive("timeout", self.timeout)?;
        Ok(())
    }
}

/// A same-site crawl request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub url: String,

    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default, rename = "renderJS")]
    pub render_js: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Only follow discovered links whose path starts with this prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            render_js: false,
            timeout: DEFAULT_TIMEOUT_MS,
            path_prefix: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_render_js(mut self, render_js: bool) -> Self {
        self.render_js = render_js;
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = timeout_ms;
        self
    }

    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_url(&self.url)?;
        validate_positive("timeout", self.timeout)?;
        validate_positive("maxDepth", u64::from(self.max_depth))?;
        validate_positive("maxPages", self.max_pages as u64)?;
        Ok(())
    }
}

fn validate_url(url: &str) -> Result<()> {
    parse_http_url(url)
        .map(|_| ())
        .map_err(|e| ScrapeError::InvalidRequest(format!("url '{}': {}", url, e)))
}

fn validate_positive(field: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(ScrapeError::InvalidRequest(format!(
            "{} must be positive",
            field
        )));
    }
    Ok(())
}

/// Outcome of scraping one page
///
/// On success `markdown` and `html` are present and `error` is absent; on
/// failure only `error` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub url: String,
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,

    /// Normalized HTML the markdown was produced from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    pub fn success(url: impl Into<String>, html: String, markdown: String) -> Self {
        Self {
            url: url.into(),
            success: true,
            markdown: Some(markdown),
            html: Some(html),
            error: None,
        }
    }

    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            markdown: None,
            html: None,
            error: Some(error.into()),
        }
    }
}

/// Outcome of a crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    pub success: bool,

    /// Seed URL the crawl started from
    pub base_url: String,

    /// Every page scraped, in visit order, failures included
    pub pages: Vec<PageResult>,

    pub total_pages: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrawlResult {
    pub fn completed(base_url: impl Into<String>, pages: Vec<PageResult>) -> Self {
        Self {
            success: true,
            base_url: base_url.into(),
            total_pages: pages.len(),
            pages,
            error: None,
        }
    }

    pub fn failed(
        base_url: impl Into<String>,
        pages: Vec<PageResult>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            base_url: base_url.into(),
            total_pages: pages.len(),
            pages,
            error: Some(error.into()),
        }
    }

    /// Number of pages that converted successfully
    pub fn succeeded(&self) -> usize {
        self.pages.iter().filter(|p| p.success).count()
    }
}

/// Incremental crawl notification
///
/// A crawl emits one `Progress` per recorded page, in visit order, followed by
/// exactly one terminal `Result` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressEvent {
    #[serde(rename_all = "camelCase")]
    Progress {
        current_url: String,
        completed: usize,
        total: usize,
    },
    Result {
        data: CrawlResult,
    },
    Error {
        error: String,
    },
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scrape_request_defaults_from_json() {
        let request: ScrapeRequest =
            serde_json::from_value(json!({ "url": "https://example.com" })).unwrap();

        assert_eq!(request, ScrapeRequest::new("https://example.com"));
        assert_eq!(request.timeout_duration(), Duration::from_secs(30));
    }

    #[test]
    fn test_scrape_request_camel_case() {
        let request: ScrapeRequest = serde_json::from_value(json!({
            "url": "https://example.com",
            "renderJS": true,
            "timeout": 5000,
            "autoClickTabs": true
        }))
        .unwrap();

        assert!(request.render_js);
        assert!(request.auto_click_tabs);
        assert_eq!(request.timeout, 5000);
    }

    #[test]
    fn test_crawl_request_defaults() {
        let request: CrawlRequest =
            serde_json::from_value(json!({ "url": "https://example.com", "maxPages": 5 }))
                .unwrap();

        assert_eq!(request.max_depth, 3);
        assert_eq!(request.max_pages, 5);
        assert_eq!(request.timeout, 30_000);
        assert!(request.path_prefix.is_none());
    }

    #[test]
    fn test_validation() {
        assert!(ScrapeRequest::new("https://example.com").validate().is_ok());
        assert!(ScrapeRequest::new("example.com").validate().is_err());
        assert!(ScrapeRequest::new("ftp://example.com").validate().is_err());
        assert!(ScrapeRequest::new("https://example.com")
            .with_timeout(0)
            .validate()
            .is_err());

        assert!(CrawlRequest::new("https://example.com").validate().is_ok());
        assert!(CrawlRequest::new("https://example.com")
            .with_max_pages(0)
            .validate()
            .is_err());
        assert!(CrawlRequest::new("https://example.com")
            .with_max_depth(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_any_path_prefix_is_accepted() {
        // A prefix without a leading slash is legal; it just matches no path
        for prefix in ["docs/", "", "/docs/"] {
            assert!(CrawlRequest::new("https://example.com")
                .with_path_prefix(prefix)
                .validate()
                .is_ok());
        }
    }

    #[test]
    fn test_page_result_omits_absent_fields() {
        let value = serde_json::to_value(PageResult::failure("https://x.com", "boom")).unwrap();
        assert_eq!(
            value,
            json!({ "url": "https://x.com", "success": false, "error": "boom" })
        );

        let value = serde_json::to_value(PageResult::success(
            "https://x.com",
            "<p>a</p>".to_string(),
            "a".to_string(),
        ))
        .unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["markdown"], "a");
    }

    #[test]
    fn test_progress_event_wire_format() {
        let event = ProgressEvent::Progress {
            current_url: "https://x.com/a".to_string(),
            completed: 1,
            total: 50,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "progress", "currentUrl": "https://x.com/a", "completed": 1, "total": 50 })
        );
        assert!(!event.is_terminal());

        let event = ProgressEvent::Result {
            data: CrawlResult::completed("https://x.com", vec![]),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "result");
        assert_eq!(value["data"]["baseUrl"], "https://x.com");
        assert_eq!(value["data"]["totalPages"], 0);
        assert!(event.is_terminal());

        let event = ProgressEvent::Error {
            error: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "error", "error": "boom" })
        );
    }
}
