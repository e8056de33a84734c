//! Element handlers layered over htmd's defaults
//!
//! Headings, code blocks, links, lists, tables and the GFM inline extensions
//! are rendered here; everything else falls through to htmd.

use htmd::{
    element_handler::{HandlerResult, Handlers},
    Element, HtmlToMarkdown,
};
use markup5ever_rcdom::{Node, NodeData};
use std::rc::Rc;

/// Builds a converter with every custom handler registered
pub fn build_converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript", "head"])
        .add_handler(vec!["h1", "h2", "h3", "h4", "h5", "h6"], heading_handler)
        .add_handler(vec!["pre"], pre_handler)
        .add_handler(vec!["a"], link_handler)
        .add_handler(vec!["ul", "ol"], list_handler)
        .add_handler(vec!["table"], table_handler)
        .add_handler(vec!["del", "s", "strike"], strikethrough_handler)
        .add_handler(vec!["mark"], highlight_handler)
        .add_handler(vec!["input"], checkbox_handler)
        .build()
}

fn heading_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let level = tag_name(element.node)
        .and_then(|tag| tag.strip_prefix('h').and_then(|n| n.parse::<usize>().ok()))
        .unwrap_or(1)
        .clamp(1, 6);

    let content = collapse_whitespace(&handlers.walk_children(element.node).content);
    if content.is_empty() {
        return Some(HandlerResult::from(String::new()));
    }

    Some(HandlerResult::from(format!(
        "\n\n{} {}\n\n",
        "#".repeat(level),
        content
    )))
}

/// Fenced block from the raw text of `<pre><code>`, language from `data-language`
fn pre_handler(_handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let language = get_attr(element.attrs, "data-language").unwrap_or_default();

    let code = match first_child_element(element.node) {
        Some(child) if tag_name(&child).as_deref() == Some("code") => raw_text(&child),
        _ => raw_text(element.node),
    };
    let code = code.strip_suffix('\n').unwrap_or(&code);

    let fence = fence_for(code);
    Some(HandlerResult::from(format!(
        "\n\n{}{}\n{}\n{}\n\n",
        fence, language, code, fence
    )))
}

fn link_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;

    let href = match get_attr(element.attrs, "href") {
        Some(href) => href.trim().to_string(),
        None => return Some(HandlerResult::from(content)),
    };

    let title = get_attr(element.attrs, "title")
        .map(|title| format!(" \"{}\"", title))
        .unwrap_or_default();

    Some(HandlerResult::from(format!(
        "[{}]({}{})\n",
        content.trim(),
        href,
        title
    )))
}

fn list_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let ordered = tag_name(element.node).as_deref() == Some("ol");
    let start = get_attr(element.attrs, "start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1);

    let mut lines = Vec::new();
    let items = element
        .node
        .children
        .borrow()
        .iter()
        .filter(|child| tag_name(child).as_deref() == Some("li"))
        .cloned()
        .collect::<Vec<_>>();

    for (index, item) in items.iter().enumerate() {
        let marker = if ordered {
            format!("{}. ", start + index)
        } else {
            "- ".to_string()
        };

        let content = list_item_content(&handlers.walk_children(item).content);
        let mut item_lines = content.lines();

        lines.push(format!("{}{}", marker, item_lines.next().unwrap_or_default()));
        for line in item_lines {
            if line.trim().is_empty() {
                lines.push(String::new());
            } else {
                // Two spaces per nesting level
                lines.push(format!("  {}", line));
            }
        }
    }

    if lines.is_empty() {
        return Some(HandlerResult::from(String::new()));
    }

    Some(HandlerResult::from(format!("\n\n{}\n\n", lines.join("\n"))))
}

/// Tidies an `<li>` body: nested lists hug their parent line and a task
/// marker is followed by exactly one space
fn list_item_content(raw: &str) -> String {
    let trimmed = raw.trim();
    let lines: Vec<&str> = trimmed.lines().collect();

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let blank = line.trim().is_empty();
        let next_is_list = lines
            .get(i + 1)
            .map_or(false, |next| is_list_line(next));
        let prev_blank = kept.last().map_or(false, |prev| prev.trim().is_empty());

        if blank && (next_is_list || prev_blank) {
            continue;
        }
        kept.push(line);
    }

    let joined = kept.join("\n");
    for marker in ["[x]", "[ ]"] {
        if let Some(rest) = joined.strip_prefix(marker) {
            return format!("{} {}", marker, rest.trim_start());
        }
    }
    joined
}

fn is_list_line(line: &str) -> bool {
    let line = line.trim_start();
    if line.starts_with("- ") || line.starts_with("* ") {
        return true;
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && line[digits..].starts_with(". ")
}

fn table_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let mut rows = Vec::new();
    collect_rows(element.node, &mut rows);

    let mut matrix: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.children
                .borrow()
                .iter()
                .filter(|cell| matches!(tag_name(cell).as_deref(), Some("td") | Some("th")))
                .map(|cell| table_cell(handlers, cell))
                .collect()
        })
        .collect();

    let width = matrix.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Some(HandlerResult::from(String::new()));
    }

    for row in &mut matrix {
        row.resize(width, String::new());
    }

    let mut lines = Vec::with_capacity(matrix.len() + 1);
    for (index, row) in matrix.iter().enumerate() {
        lines.push(format!("| {} |", row.join(" | ")));
        if index == 0 {
            lines.push(format!("|{}", " --- |".repeat(width)));
        }
    }

    Some(HandlerResult::from(format!("\n\n{}\n\n", lines.join("\n"))))
}

fn collect_rows(node: &Rc<Node>, rows: &mut Vec<Rc<Node>>) {
    for child in node.children.borrow().iter() {
        match tag_name(child).as_deref() {
            Some("tr") => rows.push(child.clone()),
            Some("thead") | Some("tbody") | Some("tfoot") => collect_rows(child, rows),
            _ => {}
        }
    }
}

fn table_cell(handlers: &dyn Handlers, cell: &Rc<Node>) -> String {
    collapse_whitespace(&handlers.walk_children(cell).content).replace('|', "\\|")
}

fn strikethrough_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    wrap_inline(handlers, element, "~~")
}

fn highlight_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    wrap_inline(handlers, element, "==")
}

fn wrap_inline(handlers: &dyn Handlers, element: Element, delimiter: &str) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Some(HandlerResult::from(content));
    }

    Some(HandlerResult::from(format!(
        "{}{}{}",
        delimiter, trimmed, delimiter
    )))
}

fn checkbox_handler(_handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let is_checkbox = get_attr(element.attrs, "type")
        .map_or(false, |t| t.eq_ignore_ascii_case("checkbox"));
    if !is_checkbox {
        return Some(HandlerResult::from(String::new()));
    }

    let checked = element
        .attrs
        .iter()
        .any(|a| &*a.name.local == "checked");
    let marker = if checked { "[x] " } else { "[ ] " };
    Some(HandlerResult::from(marker.to_string()))
}

// === Helpers ===

fn get_attr(attrs: &[html5ever::Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| a.value.to_string())
        .filter(|v| !v.trim().is_empty())
}

fn tag_name(node: &Rc<Node>) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

/// First child that is not whitespace-only text
fn first_child_element(node: &Rc<Node>) -> Option<Rc<Node>> {
    let children = node.children.borrow();
    let first = children.iter().find(|child| match &child.data {
        NodeData::Text { contents } => !contents.borrow().trim().is_empty(),
        NodeData::Comment { .. } => false,
        _ => true,
    })?;

    match first.data {
        NodeData::Element { .. } => Some(first.clone()),
        _ => None,
    }
}

/// Text content of a subtree, byte for byte
fn raw_text(node: &Rc<Node>) -> String {
    let mut text = String::new();
    push_text(node, &mut text);
    text
}

fn push_text(node: &Rc<Node>, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { .. } | NodeData::Document => {
            for child in node.children.borrow().iter() {
                push_text(child, out);
            }
        }
        _ => {}
    }
}

/// Shortest backtick fence longer than any backtick run in the code
fn fence_for(code: &str) -> String {
    let longest_run = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest_run.max(2) + 1)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
