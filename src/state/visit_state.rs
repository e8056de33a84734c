/// Visit outcomes for URLs offered to the crawl traversal
use std::fmt;

/// Why the traversal declined to scrape a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The URL sits deeper than `max_depth`
    DepthExceeded,

    /// `max_pages` URLs have already been admitted
    PageLimitReached,

    /// The URL's dedup identity was admitted before
    AlreadyVisited,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepthExceeded => "depth_exceeded",
            Self::PageLimitReached => "page_limit_reached",
            Self::AlreadyVisited => "already_visited",
        }
    }

    /// Returns true if no URL offered after this one can be admitted either
    pub fn ends_traversal(&self) -> bool {
        matches!(self, Self::PageLimitReached)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of offering a URL to the traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitState {
    /// The URL was recorded as visited and must be scraped
    Admitted,

    /// The URL was not recorded
    Skipped(SkipReason),
}

impl VisitState {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admitted => write!(f, "admitted"),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
        }
    }
}
