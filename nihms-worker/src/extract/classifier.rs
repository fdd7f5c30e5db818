//! Chooses how a notification body is parsed.

use tracing::{debug, warn};

use crate::html::repair_escaped_markup;
use crate::mail::MessageContent;

/// A body ready for segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Repaired HTML taken from a multipart container.
    Structured(String),
    /// Free-form text scanned line by line.
    Plain(String),
}

impl Body {
    pub fn mode(&self) -> &'static str {
        match self {
            Body::Structured(_) => "structured",
            Body::Plain(_) => "plain",
        }
    }
}

/// Classify message content.
///
/// A multipart container with a `text/html` part is structured, using the
/// first such part with escaped markup repaired. A multipart container
/// without one falls back to its first part as plain text. Returns `None` for
/// an empty container.
pub fn classify(content: MessageContent) -> Option<Body> {
    let mut parts = match content {
        MessageContent::PlainText(text) => return Some(Body::Plain(text)),
        MessageContent::MultiPart(parts) => parts,
    };

    if let Some(index) = parts
        .iter()
        .position(|part| part.content_type.to_ascii_lowercase().contains("text/html"))
    {
        debug!(part_index = index, parts_count = parts.len(), "body_html_part_found");
        let html = parts.swap_remove(index).content;
        return Some(Body::Structured(repair_escaped_markup(&html)));
    }

    if parts.is_empty() {
        warn!("body_multipart_empty");
        return None;
    }

    debug!(parts_count = parts.len(), "body_multipart_without_html");
    Some(Body::Plain(parts.swap_remove(0).content))
}
