use serde::Deserialize;

/// Default User-Agent sent by the fetch engine
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; FirecrawlLite/1.0)";

/// Main configuration structure for Scrapedown
///
/// Every section and field has a default, so an empty file (or no file at
/// all) yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub browser: BrowserConfig,
    pub crawl: CrawlDefaults,
}

/// Fetch engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// User-Agent header sent with plain HTTP fetches
    pub user_agent: String,

    /// Default per-request deadline (milliseconds)
    pub timeout_ms: u64,

    /// TCP connect deadline for the shared HTTP client (milliseconds)
    pub connect_timeout_ms: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
        }
    }
}

/// Headless browser and pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    /// Maximum number of simultaneously live browser instances
    pub max_browsers: usize,

    /// Grace period after navigation before content is captured (milliseconds)
    pub settle_ms: u64,

    /// Pause after each tab click (milliseconds)
    pub tab_click_pause_ms: u64,

    /// Deadline for each CDP command sent to the browser (milliseconds)
    pub cdp_timeout_ms: u64,

    /// Explicit Chrome/Chromium binary; falls back to CHROME_PATH / CHROMIUM_PATH
    pub chrome_executable: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            max_browsers: 5,
            settle_ms: 1_000,
            tab_click_pause_ms: 500,
            cdp_timeout_ms: 30_000,
            chrome_executable: None,
        }
    }
}

/// Crawl budgets used when a request does not specify its own
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlDefaults {
    pub max_depth: u32,
    pub max_pages: usize,
}

impl Default for CrawlDefaults {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages: 50,
        }
    }
}
