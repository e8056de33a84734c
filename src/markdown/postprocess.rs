use once_cell::sync::Lazy;
use regex::Regex;

static SKIP_TO_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[Skip to Content\]\([^)#\s]*#[^)]*\)").expect("skip-link pattern is valid")
});

/// Applies every Markdown post-processing pass, in order
pub fn finish(markdown: &str) -> String {
    let escaped = escape_multiline_link_text(markdown);
    remove_skip_links(&escaped)
}

/// Escapes newlines that fall inside an open `[...]` span
///
/// Brackets are counted character by character; a stray `]` never drives the
/// count below zero.
pub fn escape_multiline_link_text(markdown: &str) -> String {
    let mut output = String::with_capacity(markdown.len());
    let mut open_brackets: usize = 0;

    for c in markdown.chars() {
        match c {
            '[' => open_brackets += 1,
            ']' => open_brackets = open_brackets.saturating_sub(1),
            _ => {}
        }

        if c == '\n' && open_brackets > 0 {
            output.push('\\');
        }
        output.push(c);
    }

    output
}

/// Drops `[Skip to Content](#...)` accessibility links
///
/// Normalization has usually made the target absolute, so any URL ending in a
/// fragment counts.
pub fn remove_skip_links(markdown: &str) -> String {
    SKIP_TO_CONTENT.replace_all(markdown, "").into_owned()
}
