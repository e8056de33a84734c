//! Crawler module for same-site traversal
//!
//! This module contains the crawl logic, including:
//! - Depth-first orchestration with depth and page budgets
//! - Link extraction scoped to the seed's host and an optional path prefix
//! - The progress channel a caller can drain while the crawl runs

mod coordinator;
mod parser;
mod progress;

pub use coordinator::Crawler;
pub use parser::{extract_links, LinkScope};
pub use progress::ProgressSink;
