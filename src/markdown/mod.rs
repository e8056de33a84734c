//! Markdown converter
//!
//! Converts normalized HTML to GitHub-flavored Markdown with htmd, using the
//! handlers in [`handlers`] for the elements whose default rendering loses
//! information, then applies the string-level fixes in [`postprocess`].

mod handlers;
mod postprocess;

pub use postprocess::{escape_multiline_link_text, remove_skip_links};

use kuchiki::traits::TendrilSink;
use std::borrow::Cow;

/// Selects tab controls whose labels would otherwise run together
const TAB_CONTROLS: &str = "[role=\"tab\"], [class*=\"tab\"], [class*=\"tab\"] > button";

/// Elements never treated as tab controls even when a class matches ("table", "tabular")
const NOT_TAB_CONTROLS: &[&str] = &[
    "table", "caption", "thead", "tbody", "tfoot", "tr", "td", "th", "pre", "code",
];

/// Converts HTML to Markdown
///
/// Returns an empty string for missing or empty input. Conversion failures
/// are logged and also yield an empty string.
///
/// # Example
///
/// ```
/// use scrapedown::to_markdown;
///
/// assert_eq!(to_markdown(None), "");
/// assert!(to_markdown("<h1>Test Page</h1>").contains("# Test Page"));
/// ```
pub fn to_markdown<'a>(html: impl Into<Option<&'a str>>) -> String {
    let html = match html.into() {
        Some(html) if !html.trim().is_empty() => html,
        _ => return String::new(),
    };

    let prepared = separate_tab_labels(html);
    let converter = handlers::build_converter();

    match converter.convert(&prepared) {
        Ok(markdown) => postprocess::finish(&markdown),
        Err(e) => {
            tracing::error!("Error converting HTML to Markdown: {}", e);
            String::new()
        }
    }
}

/// Appends a space to every tab control so "python" + "curl" stays two words
fn separate_tab_labels(html: &str) -> Cow<'_, str> {
    let document = kuchiki::parse_html().one(html);

    let controls: Vec<_> = match document.select(TAB_CONTROLS) {
        Ok(matches) => matches
            .filter(|element| !NOT_TAB_CONTROLS.contains(&&*element.name.local))
            .collect(),
        Err(()) => return Cow::Borrowed(html),
    };

    if controls.is_empty() {
        return Cow::Borrowed(html);
    }

    for control in &controls {
        control.as_node().append(kuchiki::NodeRef::new_text(" "));
    }

    let mut output = Vec::new();
    match document.serialize(&mut output) {
        Ok(()) => Cow::Owned(String::from_utf8_lossy(&output).into_owned()),
        Err(e) => {
            tracing::warn!("Failed to serialize tab-separated HTML: {}", e);
            Cow::Borrowed(html)
        }
    }
}
