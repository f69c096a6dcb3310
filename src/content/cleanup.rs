//! HTML to text cleanup
//!
//! Turns a parsed page into a title plus readable text: page chrome
//! (navigation, footers, scripts, sidebars) is dropped, block elements become
//! line breaks and whitespace is collapsed the way a browser would render it.

use scraper::{node::Element, ElementRef, Html, Node, Selector};

/// Elements whose whole subtree never carries page content
const IGNORED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "footer", "aside", "meta", "noscript", "svg", "symbol", "header",
    "template", "iframe",
];

const IGNORED_CLASSES: &[&str] = &["sidebar", "footer"];

/// Extra chrome stripped in clean mode (documentation-site layouts)
const CLEAN_MODE_IGNORED_CLASSES: &[&str] = &[
    "hidden",
    "sticky",
    "toc",
    "breadcrumb",
    "breadcrumbs",
    "pagination",
];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "details", "div", "dl", "dt", "figcaption",
    "figure", "form", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre",
    "section", "summary", "table", "tr", "ul",
];

const ZERO_WIDTH: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

/// Title and readable text of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHtml {
    pub title: Option<String>,
    pub cleaned_text: String,
}

/// Extracts the title and cleaned body text from a parsed page
///
/// `clean_mode` additionally strips hidden, sticky and navigation helper
/// elements that documentation generators render around the content.
pub fn web_html_cleanup(document: &Html, clean_mode: bool) -> ParsedHtml {
    let title = extract_title(document);

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    collect_text(body, clean_mode, false, &mut raw);

    ParsedHtml {
        title,
        cleaned_text: tidy_text(&raw),
    }
}

/// Extracts the page title from the `<title>` element
pub fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn is_ignored(element: &Element, clean_mode: bool) -> bool {
    if IGNORED_ELEMENTS.contains(&element.name()) {
        return true;
    }

    element.classes().any(|class| {
        IGNORED_CLASSES.contains(&class) || (clean_mode && CLEAN_MODE_IGNORED_CLASSES.contains(&class))
    }) || (clean_mode && element.attr("hidden").is_some())
}

fn collect_text(element: ElementRef<'_>, clean_mode: bool, in_pre: bool, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if in_pre {
                    out.push_str(text);
                } else {
                    push_collapsed(text, out);
                }
            }
            Node::Element(el) => {
                if is_ignored(el, clean_mode) {
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };

                let name = el.name();
                let is_block = BLOCK_ELEMENTS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                collect_text(child_ref, clean_mode, in_pre || name == "pre", out);
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Appends text with whitespace runs collapsed to a single space
fn push_collapsed(text: &str, out: &mut String) {
    let at_line_start = out.is_empty() || out.ends_with(|c: char| c == ' ' || c == '\n');

    let mut words = text.split_whitespace().peekable();
    if words.peek().is_none() {
        if !text.is_empty() && !at_line_start {
            out.push(' ');
        }
        return;
    }

    if text.starts_with(char::is_whitespace) && !at_line_start {
        out.push(' ');
    }

    let mut first = true;
    for word in words {
        if !first {
            out.push(' ');
        }
        out.push_str(word);
        first = false;
    }

    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

/// Strips zero-width characters, trailing spaces and repeated blank lines
fn tidy_text(raw: &str) -> String {
    let without_zero_width: String = raw.chars().filter(|c| !ZERO_WIDTH.contains(c)).collect();

    let mut lines: Vec<&str> = Vec::new();
    for line in without_zero_width.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            if lines.last().map_or(false, |last| !last.is_empty()) {
                lines.push("");
            }
        } else {
            lines.push(line);
        }
    }

    lines.join("\n").trim().to_string()
}
