use url::Url;

/// Checks if a URL's path falls under a crawl path prefix
///
/// An empty prefix (or `/`) matches everything.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrapedown::url::matches_path_prefix;
///
/// let url = Url::parse("https://example.com/docs/api/chat").unwrap();
/// assert!(matches_path_prefix(&url, "/docs/"));
/// assert!(!matches_path_prefix(&url, "/blog/"));
/// ```
pub fn matches_path_prefix(url: &Url, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    url.path().starts_with(prefix)
}

/// Computes a default crawl path prefix from a seed URL
///
/// # Rules
///
/// 1. A last segment ending in `.html`, `.htm`, `.php` or `.asp` names a
///    document: its directory is the prefix
/// 2. A path ending in `/` is already a directory and is used as-is
/// 3. Otherwise the last segment is treated as a page and its parent
///    directory is the prefix
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrapedown::url::derive_path_prefix;
///
/// let url = Url::parse("https://example.com/docs/api/chat").unwrap();
/// assert_eq!(derive_path_prefix(&url), "/docs/api/");
///
/// let url = Url::parse("https://example.com/guide/index.html").unwrap();
/// assert_eq!(derive_path_prefix(&url), "/guide/");
///
/// let url = Url::parse("https://example.com/docs/").unwrap();
/// assert_eq!(derive_path_prefix(&url), "/docs/");
/// ```
pub fn derive_path_prefix(url: &Url) -> String {
    let path = url.path();

    if path.ends_with('/') {
        return path.to_string();
    }

    // Rules 1 and 3 both cut back to the enclosing directory
    match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    }
}
