//! State module for tracking crawl traversal
//!
//! # Components
//!
//! - `VisitedSet`: Dedup identities of every URL the crawl has committed to scraping
//! - `VisitState`: Outcome of offering a URL to the traversal
//! - `SkipReason`: Why a URL was not scraped

mod visit_state;
mod visited;

// Re-export main types
pub use visit_state::{SkipReason, VisitState};
pub use visited::{CrawlLimits, VisitedSet};
