//! Visible-text extraction from HTML.

use crate::utils::truncate_chars;
use scraper::{ElementRef, Html, Node};

/// Elements whose content is never rendered as page text.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "object", "canvas",
];

/// Returns the visible text of an HTML document with whitespace collapsed.
///
/// Text nodes are joined with single spaces, so adjacent inline elements
/// never glue words together.
#[must_use]
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces: Vec<&str> = Vec::new();
    collect_text(document.root_element(), &mut pieces);

    pieces
        .iter()
        .flat_map(|piece| piece.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts visible text and truncates it to `max_chars` characters.
#[must_use]
pub fn clean_text(html: &str, max_chars: usize) -> String {
    let text = visible_text(html);
    truncate_chars(&text, max_chars).to_string()
}

fn collect_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    if is_hidden(element) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    let value = element.value();

    if SKIPPED_ELEMENTS.contains(&value.name()) {
        return true;
    }
    if value.attr("hidden").is_some() {
        return true;
    }
    if value
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }

    value.attr("style").is_some_and(|style| {
        let style: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        style.contains("display:none") || style.contains("visibility:hidden")
    })
}
