use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use std::path::Path;

/// Environment variable overriding `browser.max-browsers`
pub const MAX_BROWSERS_ENV: &str = "MAX_BROWSERS";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use scrapedown::config::load_config;
///
/// let config = load_config(Path::new("scrapedown.toml")).unwrap();
/// println!("Max depth: {}", config.crawl.max_depth);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Applies the `MAX_BROWSERS` environment override, then re-validates
///
/// # Arguments
///
/// * `config` - Configuration to update in place
/// * `value` - Raw value of the environment variable, if set
pub fn apply_env_overrides(config: &mut Config, value: Option<&str>) -> ConfigResult<()> {
    if let Some(raw) = value {
        let parsed = raw.trim().parse::<usize>().map_err(|_| {
            ConfigError::Validation(format!(
                "{} must be a positive integer, got '{}'",
                MAX_BROWSERS_ENV, raw
            ))
        })?;
        config.browser.max_browsers = parsed;
    }

    validate(config)
}
