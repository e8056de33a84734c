use crate::config::types::{BrowserConfig, Config, CrawlDefaults, ScraperConfig};
use crate::ConfigError;

/// Upper bound for the browser pool size
const MAX_POOL_SIZE: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_browser_config(&config.browser)?;
    validate_crawl_defaults(&config.crawl)?;
    Ok(())
}

fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-ms must be >= 1, got {}",
            config.timeout_ms
        )));
    }

    if config.connect_timeout_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-ms must be >= 1, got {}",
            config.connect_timeout_ms
        )));
    }

    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.max_browsers < 1 || config.max_browsers > MAX_POOL_SIZE {
        return Err(ConfigError::Validation(format!(
            "max-browsers must be between 1 and {}, got {}",
            MAX_POOL_SIZE, config.max_browsers
        )));
    }

    if config.cdp_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "cdp-timeout-ms must be at least 1".to_string(),
        ));
    }

    if let Some(path) = &config.chrome_executable {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "chrome-executable cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_crawl_defaults(config: &CrawlDefaults) -> Result<(), ConfigError> {
    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max-depth must be >= 1, got {}",
            config.max_depth
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}
