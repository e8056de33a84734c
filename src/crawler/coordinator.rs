//! Crawl orchestration
//!
//! A crawl is a depth-first walk over same-host links, one page at a time.
//! The walk uses an explicit stack instead of recursion; children are pushed
//! in reverse so they are visited in document order, and the budget checks
//! run when a URL is popped, which yields the same visit order as the
//! recursive formulation.

use crate::crawler::parser::{extract_links, LinkScope};
use crate::crawler::ProgressSink;
use crate::fetcher::Scraper;
use crate::state::{CrawlLimits, VisitState, VisitedSet};
use crate::types::{CrawlRequest, CrawlResult, PageResult, ProgressEvent, ScrapeRequest};
use crate::url::{parse_http_url, strip_fragment};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

/// Drives the scraper across a site section
pub struct Crawler {
    scraper: Arc<Scraper>,
}

impl Crawler {
    pub fn new(scraper: Arc<Scraper>) -> Self {
        Self { scraper }
    }

    /// Crawls from the request's seed URL
    ///
    /// Page failures are recorded in the result and never stop the crawl.
    /// When `progress` is given, one `Progress` event is sent per recorded
    /// page followed by exactly one terminal `Result` or `Error` event.
    ///
    /// # Arguments
    ///
    /// * `request` - Seed URL, budgets and engine choice
    /// * `progress` - Optional channel for progress events
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The crawl ran; `success` is false only if the
    ///   orchestration itself failed, and collected pages are kept either way
    /// * `Err(ScrapeError::InvalidRequest)` - The request failed validation;
    ///   nothing was scraped and no event was sent
    pub async fn crawl(
        &self,
        request: &CrawlRequest,
        progress: Option<UnboundedSender<ProgressEvent>>,
    ) -> Result<CrawlResult> {
        request.validate()?;

        let sink = ProgressSink::new(progress);
        let start = Instant::now();
        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {}, render_js {})",
            request.url,
            request.max_depth,
            request.max_pages,
            request.render_js
        );

        let mut pages = Vec::new();
        let result = match self.traverse(request, &sink, &mut pages).await {
            Ok(()) => CrawlResult::completed(&request.url, pages),
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", request.url, e);
                CrawlResult::failed(&request.url, pages, e.to_string())
            }
        };

        match &result.error {
            Some(error) => sink.emit(ProgressEvent::Error {
                error: error.clone(),
            }),
            None => sink.emit(ProgressEvent::Result {
                data: result.clone(),
            }),
        }

        tracing::info!(
            "Crawl of {} finished: {} page(s), {} succeeded, in {:.1}s",
            request.url,
            result.total_pages,
            result.succeeded(),
            start.elapsed().as_secs_f64()
        );

        Ok(result)
    }

    async fn traverse(
        &self,
        request: &CrawlRequest,
        sink: &ProgressSink,
        pages: &mut Vec<PageResult>,
    ) -> Result<()> {
        let seed = parse_http_url(&request.url)?;
        let scope = LinkScope::new(
            &seed,
            request.path_prefix.as_deref().filter(|p| !p.is_empty()),
        );
        let limits = CrawlLimits {
            max_depth: request.max_depth,
            max_pages: request.max_pages,
        };

        let mut visited = VisitedSet::new();
        let mut stack: Vec<(Url, u32)> = vec![(strip_fragment(&seed), 1)];

        while let Some((url, depth)) = stack.pop() {
            match visited.admit(&url, depth, limits) {
                VisitState::Admitted => {}
                VisitState::Skipped(reason) if reason.ends_traversal() => {
                    tracing::debug!("Stopping crawl at {}: {}", url, reason);
                    break;
                }
                VisitState::Skipped(reason) => {
                    tracing::trace!("Skipping {} at depth {}: {}", url, depth, reason);
                    continue;
                }
            }

            let page = self.scrape(request, &url).await;
            let children = if depth < limits.max_depth {
                follow_links(&page, &url, scope)
            } else {
                Vec::new()
            };

            pages.push(page);
            sink.emit(ProgressEvent::Progress {
                current_url: url.to_string(),
                completed: pages.len(),
                total: request.max_pages,
            });

            tracing::debug!(
                "Visited {} at depth {} ({} new link(s))",
                url,
                depth,
                children.len()
            );

            for child in children.into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        Ok(())
    }

    async fn scrape(&self, request: &CrawlRequest, url: &Url) -> PageResult {
        let scrape_request = ScrapeRequest::new(url.as_str())
            .with_render_js(request.render_js)
            .with_timeout(request.timeout)
            .with_auto_click_tabs(true);

        self.scraper.scrape(&scrape_request).await
    }
}

/// Links to descend into; a failed page or one without HTML has none
fn follow_links(page: &PageResult, url: &Url, scope: LinkScope<'_>) -> Vec<Url> {
    match (&page.html, page.success) {
        (Some(html), true) => extract_links(html, url, scope),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_failed_page_has_no_children() {
        let url = seed();
        let page = PageResult::failure(url.as_str(), "HTTP 500 for https://example.com/");
        assert!(follow_links(&page, &url, LinkScope::new(&url, None)).is_empty());
    }

    #[test]
    fn test_successful_page_children() {
        let url = seed();
        let html = r#"<a href="https://example.com/a">A</a><a href="https://example.com/b">B</a>"#;
        let page = PageResult::success(url.as_str(), html.to_string(), String::new());

        let children = follow_links(&page, &url, LinkScope::new(&url, None));
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].path(), "/a");
    }
}
