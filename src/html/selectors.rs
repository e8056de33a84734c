//! Selector lists used by the normalizer

/// Elements always removed, regardless of mode
pub const ALWAYS_REMOVED: &[&str] = &["script", "style", "noscript", "meta", "head"];

/// Page chrome removed in main-content mode
///
/// Matches by tag and by common class/id conventions. Elements that wrap the
/// main content are never removed (see [`MAIN_CONTENT`]).
pub const NON_MAIN_CONTENT: &[&str] = &[
    "header",
    "footer",
    "nav",
    "aside",
    ".header",
    ".top",
    ".navbar",
    "#header",
    ".footer",
    ".bottom",
    "#footer",
    ".sidebar",
    ".side",
    ".aside",
    "#sidebar",
    ".modal",
    ".popup",
    "#modal",
    ".overlay",
    ".ad",
    ".ads",
    ".advert",
    "#ad",
    ".lang-selector",
    ".language",
    "#language-selector",
    ".social",
    ".social-media",
    ".social-links",
    "#social",
    ".menu",
    ".navigation",
    "#nav",
    ".breadcrumbs",
    "#breadcrumbs",
    ".cookie",
    "#cookie",
];

/// Anything matching this is main content; a chrome match that contains it survives
pub const MAIN_CONTENT: &str = "main, article, [role=\"main\"]";

/// Lazy-load attributes promoted to `src`, in priority order
pub const LAZY_SRC_ATTRS: &[&str] = &["data-src", "data-lazy-src", "data-original"];

/// Social preview images used when a page carries no `<img>` of its own
pub const PREVIEW_IMAGE_META: &[&str] = &[
    "meta[property=\"og:image\"]",
    "meta[name=\"twitter:image\"]",
];

/// Alt text given to synthesized preview images
pub const PREVIEW_IMAGE_ALT: &str = "Featured image";
