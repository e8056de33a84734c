//! Scrapedown: web pages in, clean Markdown out
//!
//! This crate fetches a page either with a plain HTTP request or through a
//! pooled headless browser, strips it down to its content, and converts it to
//! Markdown. The crawler drives the same pipeline across a same-site section,
//! bounded by depth and page budgets.

pub mod config;
pub mod crawler;
pub mod fetcher;
pub mod html;
pub mod markdown;
pub mod state;
pub mod types;
pub mod url;

use thiserror::Error;

/// Main error type for scrape and crawl operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url} ({timeout_ms}ms)")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Browser rendering failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("Browser pool is closed")]
    PoolClosed,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl ScrapeError {
    /// Returns true when the failure was a deadline expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for scrape and crawl operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Crawler;
pub use fetcher::{BrowserPool, Scraper};
pub use html::normalize_html;
pub use markdown::to_markdown;
pub use types::{CrawlRequest, CrawlResult, PageResult, ProgressEvent, ScrapeRequest};
