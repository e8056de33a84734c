//! Content normalizer
//!
//! Turns raw page HTML into a cleaner document the Markdown converter can
//! handle: scripts and page chrome removed, code blocks flattened, lazy and
//! responsive images collapsed to one absolute `src`, links made absolute.

mod selectors;
mod srcset;

pub use srcset::pick_srcset_candidate;

use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef};
use selectors::{
    ALWAYS_REMOVED, LAZY_SRC_ATTRS, MAIN_CONTENT, NON_MAIN_CONTENT, PREVIEW_IMAGE_ALT,
    PREVIEW_IMAGE_META,
};
use url::Url;

/// Normalizes a page's HTML
///
/// # Arguments
///
/// * `html` - Raw HTML as fetched or rendered
/// * `base_url` - URL the page was loaded from; relative URLs resolve against
///   it, or against the document's `<base href>` when present
/// * `only_main_content` - Also strip headers, footers, navigation, sidebars
///   and similar chrome
///
/// # Returns
///
/// The serialized document. This never fails: URLs that cannot be resolved
/// are left as they were, and an unparseable `base_url` disables resolution
/// altogether.
///
/// # Example
///
/// ```
/// use scrapedown::normalize_html;
///
/// let html = r#"<nav>Menu</nav><main><a href="/about">About</a></main>"#;
/// let cleaned = normalize_html(html, "https://example.com/page", true);
///
/// assert!(!cleaned.contains("Menu"));
/// assert!(cleaned.contains("https://example.com/about"));
/// ```
pub fn normalize_html(html: &str, base_url: &str, only_main_content: bool) -> String {
    let document = kuchiki::parse_html().one(html);

    // Head content must be read before the head is dropped
    let base = resolve_base(&document, base_url);
    let preview_images = collect_preview_images(&document);

    for selector in ALWAYS_REMOVED {
        for node in select_all(&document, selector) {
            node.as_node().detach();
        }
    }

    flatten_code_blocks(&document);

    if only_main_content {
        remove_page_chrome(&document);
    }

    promote_lazy_sources(&document);
    collapse_srcsets(&document);
    absolutize(&document, "img[src]", "src", base.as_ref());
    absolutize(&document, "a[href]", "href", base.as_ref());

    if document.select_first("img").is_err() {
        insert_preview_images(&document, &preview_images, base.as_ref());
    }

    let mut output = Vec::new();
    if let Err(e) = document.serialize(&mut output) {
        tracing::warn!("Failed to serialize normalized HTML: {}", e);
        return html.to_string();
    }

    String::from_utf8_lossy(&output).into_owned()
}

fn select_all(root: &NodeRef, selector: &str) -> Vec<NodeDataRef<ElementData>> {
    match root.select(selector) {
        Ok(matches) => matches.collect(),
        Err(()) => {
            tracing::warn!("Invalid selector: {}", selector);
            Vec::new()
        }
    }
}

fn attr(element: &NodeDataRef<ElementData>, name: &str) -> Option<String> {
    element.attributes.borrow().get(name).map(str::to_string)
}

fn resolve_base(document: &NodeRef, page_url: &str) -> Option<Url> {
    let page = match Url::parse(page_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Not resolving URLs, bad page URL {}: {}", page_url, e);
            return None;
        }
    };

    let declared = document
        .select_first("base[href]")
        .ok()
        .and_then(|base| attr(&base, "href"));

    match declared {
        Some(href) => Some(page.join(&href).unwrap_or(page)),
        None => Some(page),
    }
}

fn collect_preview_images(document: &NodeRef) -> Vec<String> {
    PREVIEW_IMAGE_META
        .iter()
        .filter_map(|selector| document.select_first(selector).ok())
        .filter_map(|meta| attr(&meta, "content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .collect()
}

/// Replaces highlighter markup inside `pre code` with its plain text and
/// records the language on the enclosing `pre`
fn flatten_code_blocks(document: &NodeRef) {
    for code in select_all(document, "pre code") {
        let node = code.as_node();
        let text = node.text_contents();

        let children: Vec<NodeRef> = node.children().collect();
        for child in children {
            child.detach();
        }
        node.append(NodeRef::new_text(text));

        let language = attr(&code, "class").and_then(|class| code_language(&class));
        if let Some(language) = language {
            let pre = node
                .ancestors()
                .filter_map(|ancestor| ancestor.into_element_ref())
                .find(|element| &*element.name.local == "pre");

            if let Some(pre) = pre {
                pre.attributes
                    .borrow_mut()
                    .insert("data-language", language);
            }
        }
    }
}

/// Extracts `js` from `language-js` or `lang-js` class tokens
fn code_language(class: &str) -> Option<String> {
    class.split_whitespace().find_map(|token| {
        let rest = token
            .strip_prefix("language-")
            .or_else(|| token.strip_prefix("lang-"))?;
        let language: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        (!language.is_empty()).then_some(language)
    })
}

fn remove_page_chrome(document: &NodeRef) {
    for selector in NON_MAIN_CONTENT {
        for element in select_all(document, selector) {
            let name = &*element.name.local;
            if name == "html" || name == "body" {
                continue;
            }

            let node = element.as_node();
            if node.select_first(MAIN_CONTENT).is_ok() {
                tracing::trace!("Keeping {} match that wraps main content", selector);
                continue;
            }

            node.detach();
        }
    }
}

fn promote_lazy_sources(document: &NodeRef) {
    for img in select_all(document, "img") {
        let has_src = attr(&img, "src").map_or(false, |src| !src.trim().is_empty());
        if has_src {
            continue;
        }

        let lazy = LAZY_SRC_ATTRS
            .iter()
            .filter_map(|name| attr(&img, name))
            .find(|value| !value.trim().is_empty());

        if let Some(lazy) = lazy {
            img.attributes.borrow_mut().insert("src", lazy);
        }
    }
}

fn collapse_srcsets(document: &NodeRef) {
    for img in select_all(document, "img[srcset]") {
        let srcset = attr(&img, "srcset").unwrap_or_default();
        let src = attr(&img, "src");

        if let Some(best) = pick_srcset_candidate(&srcset, src.as_deref()) {
            let mut attributes = img.attributes.borrow_mut();
            attributes.insert("src", best);
            attributes.remove("srcset");
        }
    }
}

fn absolutize(document: &NodeRef, selector: &str, name: &str, base: Option<&Url>) {
    let base = match base {
        Some(base) => base,
        None => return,
    };

    for element in select_all(document, selector) {
        let value = match attr(&element, name) {
            Some(value) => value,
            None => continue,
        };

        match base.join(&value) {
            Ok(resolved) => {
                element
                    .attributes
                    .borrow_mut()
                    .insert(name, resolved.to_string());
            }
            Err(e) => tracing::trace!("Leaving {}=\"{}\" as is: {}", name, value, e),
        }
    }
}

fn insert_preview_images(document: &NodeRef, images: &[String], base: Option<&Url>) {
    let body = match document.select_first("body") {
        Ok(body) => body,
        Err(()) => return,
    };

    // Prepending in reverse keeps og:image ahead of twitter:image
    for image in images.iter().rev() {
        let src = match base {
            Some(base) => match base.join(image) {
                Ok(resolved) => resolved.to_string(),
                Err(_) => continue,
            },
            None => image.clone(),
        };

        let fragment = kuchiki::parse_html().one(format!("<img alt=\"{}\">", PREVIEW_IMAGE_ALT));
        if let Ok(img) = fragment.select_first("img") {
            img.attributes.borrow_mut().insert("src", src);
            let node = img.as_node().clone();
            node.detach();
            body.as_node().prepend(node);
        }
    }
}
