use url::Url;

/// Extracts the host from a URL
///
/// The URL parser already lowercases hosts for special schemes; the explicit
/// lowercase keeps the result stable for anything else.
///
/// # Arguments
///
/// * `url` - The URL to extract the host from
///
/// # Returns
///
/// * `Some(String)` - The lowercase host
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrapedown::url::extract_host;
///
/// let url = Url::parse("https://Docs.Example.com:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("docs.example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs have the same hostname
///
/// Ports and schemes are not compared, so `http://site/a` and
/// `https://site:8443/b` count as the same site.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrapedown::url::same_host;
///
/// let seed = Url::parse("https://example.com/docs").unwrap();
/// assert!(same_host(&seed, &Url::parse("https://example.com/blog").unwrap()));
/// assert!(!same_host(&seed, &Url::parse("https://cdn.example.com/x").unwrap()));
/// ```
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_host() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_ip_host() {
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(extract_host(&url), Some("127.0.0.1".to_string()));
    }

    #[test]
    fn test_same_host_ignores_port_and_scheme() {
        let a = Url::parse("http://example.com/a").unwrap();
        let b = Url::parse("https://example.com:8443/b").unwrap();
        assert!(same_host(&a, &b));
    }

    #[test]
    fn test_subdomain_is_different_host() {
        let a = Url::parse("https://example.com/").unwrap();
        let b = Url::parse("https://www.example.com/").unwrap();
        assert!(!same_host(&a, &b));
    }

    #[test]
    fn test_hostless_url_never_matches() {
        let a = Url::parse("data:text/plain,hello").unwrap();
        let b = Url::parse("https://example.com/").unwrap();
        assert!(!same_host(&a, &b));
    }
}
