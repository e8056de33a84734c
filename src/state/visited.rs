use crate::state::{SkipReason, VisitState};
use crate::url::dedup_key;
use std::collections::HashSet;
use url::Url;

/// Depth and page budgets for one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub max_depth: u32,
    pub max_pages: usize,
}

/// Set of dedup identities the crawl has committed to
///
/// Identities come from [`dedup_key`], so `/page#a` and `/page?x=1` collapse
/// onto `/page`. The scrape itself still uses the URL as discovered.
#[derive(Debug, Default)]
pub struct VisitedSet {
    keys: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a URL at the given depth to the traversal
    ///
    /// Checks run in a fixed order: depth first, then the page budget, then
    /// dedup. Only an admitted URL is recorded, so the set never grows past
    /// `limits.max_pages`.
    ///
    /// # Arguments
    ///
    /// * `url` - Candidate URL
    /// * `depth` - 1-based depth of the candidate (the seed is depth 1)
    /// * `limits` - Crawl budgets
    pub fn admit(&mut self, url: &Url, depth: u32, limits: CrawlLimits) -> VisitState {
        if depth > limits.max_depth {
            return VisitState::Skipped(SkipReason::DepthExceeded);
        }

        if self.keys.len() >= limits.max_pages {
            return VisitState::Skipped(SkipReason::PageLimitReached);
        }

        if !self.keys.insert(dedup_key(url)) {
            return VisitState::Skipped(SkipReason::AlreadyVisited);
        }

        VisitState::Admitted
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.keys.contains(&dedup_key(url))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
