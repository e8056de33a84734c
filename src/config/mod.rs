//! Configuration module for Scrapedown
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, plus the environment override for the browser pool size.
//!
//! # Example
//!
//! ```no_run
//! use scrapedown::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scrapedown.toml")).unwrap();
//! println!("Pool size: {}", config.browser.max_browsers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, Config, CrawlDefaults, ScraperConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{apply_env_overrides, load_config, parse_config, MAX_BROWSERS_ENV};

pub use validation::validate;
