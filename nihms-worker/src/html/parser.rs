//! HTML parsing for structured notification bodies.

use scraper::{Html, Selector};
use tracing::{debug, warn};

/// Capability to select elements by tag and read their text.
pub trait DocumentParser {
    /// Normalized text of every `tag` element in `markup`, in document order.
    ///
    /// Text is whitespace-collapsed and trimmed. Nested matches are reported
    /// individually, so an outer element also carries its children's text.
    fn element_texts(&self, markup: &str, tag: &str) -> Vec<String>;
}

/// [`DocumentParser`] backed by scraper's HTML5 parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl DocumentParser for HtmlParser {
    fn element_texts(&self, markup: &str, tag: &str) -> Vec<String> {
        let selector = match Selector::parse(tag) {
            Ok(selector) => selector,
            Err(e) => {
                warn!(tag = tag, error = %e, "html_invalid_selector");
                return Vec::new();
            }
        };

        let document = Html::parse_document(markup);
        let texts: Vec<String> = document
            .select(&selector)
            .map(|element| normalize_whitespace(&element.text().collect::<String>()))
            .collect();

        debug!(tag = tag, count = texts.len(), html_length = markup.len(), "html_elements_selected");
        texts
    }
}

/// Undo entity escaping of markup the vendor embeds pre-escaped.
///
/// Only `&gt;`, `&lt;` and `&quot;` are repaired, in that order.
pub fn repair_escaped_markup(html: &str) -> String {
    html.replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&quot;", "\"")
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
