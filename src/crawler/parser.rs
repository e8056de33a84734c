//! Link extraction for the crawler
//!
//! Works on the normalized HTML a scrape returns, so `<head>` (and with it any
//! canonical link) is already gone and most hrefs are absolute.

use crate::url::{matches_path_prefix, same_host, strip_fragment};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Which discovered links a crawl may follow
#[derive(Debug, Clone, Copy)]
pub struct LinkScope<'a> {
    /// Seed URL; links must share its hostname
    pub seed: &'a Url,

    /// Optional path prefix links must start with
    pub path_prefix: Option<&'a str>,
}

impl<'a> LinkScope<'a> {
    pub fn new(seed: &'a Url, path_prefix: Option<&'a str>) -> Self {
        Self { seed, path_prefix }
    }

    /// Returns true if the crawl may follow `url`
    pub fn allows(&self, url: &Url) -> bool {
        same_host(self.seed, url)
            && self
                .path_prefix
                .map_or(true, |prefix| matches_path_prefix(url, prefix))
    }
}

/// Extracts the followable links of a page, in document order
///
/// # Link Rules
///
/// **Include:**
/// - `<a href="...">` resolved against `page_url`, http(s) only
/// - links whose hostname equals the seed's and whose path matches the scope's
///   prefix, if any
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - fragment-only links (same page anchors)
/// - `<a href="..." download>`
///
/// Fragments are stripped and each URL appears once, at its first position.
///
/// # Example
///
/// ```
/// use scrapedown::crawler::{extract_links, LinkScope};
/// use url::Url;
///
/// let seed = Url::parse("https://example.com/docs/").unwrap();
/// let html = r#"<a href="/docs/a#top">A</a><a href="https://other.com/">B</a>"#;
/// let links = extract_links(html, &seed, LinkScope::new(&seed, None));
/// assert_eq!(links, vec![Url::parse("https://example.com/docs/a").unwrap()]);
/// ```
pub fn extract_links(html: &str, page_url: &Url, scope: LinkScope<'_>) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, page_url))
        else {
            continue;
        };

        if scope.allows(&url) && seen.insert(url.as_str().to_string()) {
            links.push(url);
        }
    }

    links
}

/// Resolves an href to an absolute http(s) URL without its fragment
///
/// Returns None for excluded schemes, fragment-only hrefs and anything that
/// does not parse.
fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute = page_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(strip_fragment(&absolute)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/docs/page").unwrap()
    }

    fn links(html: &str) -> Vec<String> {
        let page = page_url();
        let seed = Url::parse("https://example.com/").unwrap();
        extract_links(html, &page, LinkScope::new(&seed, None))
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_extract_relative_links() {
        let html = r#"<a href="/other">A</a><a href="sibling">B</a>"#;
        assert_eq!(
            links(html),
            vec!["https://example.com/other", "https://example.com/docs/sibling"]
        );
    }

    #[test]
    fn test_skip_other_host() {
        let html = r#"<a href="https://other.com/page">A</a><a href="https://sub.example.com/">B</a>"#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_port_does_not_matter() {
        let html = r#"<a href="https://example.com:8443/x">A</a>"#;
        assert_eq!(links(html), vec!["https://example.com:8443/x"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <a href="javascript:void(0)">js</a>
            <a href="JavaScript:alert(1)">js</a>
            <a href="mailto:test@example.com">mail</a>
            <a href="tel:+1234567890">tel</a>
            <a href="data:text/html,hi">data</a>
            <a href="ftp://example.com/file">ftp</a>
        "#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_skip_fragment_only_and_download() {
        let html = r##"<a href="#section">Jump</a><a href="/file.pdf" download>Get</a>"##;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_fragment_stripped_and_deduplicated() {
        let html = r##"
            <a href="/a#one">A</a>
            <a href="/b">B</a>
            <a href="/a#two">A again</a>
        "##;
        assert_eq!(
            links(html),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_query_is_kept() {
        let html = r#"<a href="/search?q=rust">A</a>"#;
        assert_eq!(links(html), vec!["https://example.com/search?q=rust"]);
    }

    #[test]
    fn test_path_prefix_scope() {
        let page = page_url();
        let seed = Url::parse("https://example.com/docs/").unwrap();
        let html = r#"
            <a href="/docs/intro">in</a>
            <a href="/blog/post">out</a>
            <a href="/docs">parent</a>
        "#;

        let found = extract_links(html, &page, LinkScope::new(&seed, Some("/docs/")));
        assert_eq!(found, vec![Url::parse("https://example.com/docs/intro").unwrap()]);
    }

    #[test]
    fn test_no_links() {
        assert!(links("<p>nothing here</p>").is_empty());
    }
}
