use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a request URL and checks it is something the fetch engine can load
///
/// # Arguments
///
/// * `url_str` - The URL string supplied by the caller
///
/// # Returns
///
/// * `Ok(Url)` - Parsed absolute http(s) URL with a host
/// * `Err(UrlError)` - Malformed URL, unsupported scheme, or missing host
///
/// # Examples
///
/// ```
/// use scrapedown::url::parse_http_url;
///
/// assert!(parse_http_url("https://example.com/docs").is_ok());
/// assert!(parse_http_url("ftp://example.com/").is_err());
/// assert!(parse_http_url("not a url").is_err());
/// ```
pub fn parse_http_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns the identity the crawler deduplicates on
///
/// Fragment and query are dropped; scheme, host, port and path are kept as
/// the URL parser normalized them.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrapedown::url::dedup_key;
///
/// let a = Url::parse("https://example.com/page?a=1#intro").unwrap();
/// let b = Url::parse("https://example.com/page").unwrap();
/// assert_eq!(dedup_key(&a), dedup_key(&b));
/// ```
pub fn dedup_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.set_query(None);
    key.into()
}

/// Returns a copy of the URL without its fragment
pub fn strip_fragment(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped
}
