//! URL handling module for Scrapedown
//!
//! This module provides request URL validation, the dedup identity used by the
//! crawler's visited set, same-host checks, and path-prefix scoping.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, same_host};
pub use matcher::{derive_path_prefix, matches_path_prefix};
pub use normalize::{dedup_key, parse_http_url, strip_fragment};
