//! Message model consumed by the outcome extractor.
//!
//! The extractor never talks to a mail store. It only needs a message that
//! can report its subject, sent date, headers and body content, which is what
//! the [`MailMessage`] capability describes. Two implementations exist:
//!
//! - [`RawMessage`]: already materialized in memory (infallible)
//! - [`MimeMessage`]: raw RFC 5322 bytes decoded on demand with mailparse

pub mod email_parser;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use email_parser::MimeMessage;

/// Errors raised while reading a message's headers or body.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The raw bytes could not be parsed as an RFC 5322 message.
    #[error("failed to parse message: {0}")]
    Parse(#[from] mailparse::MailParseError),
    /// A single-part body could not be transfer-decoded into text.
    #[error("failed to decode message body: {0}")]
    Body(#[source] mailparse::MailParseError),
}

/// Body content of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Single-part message body, already decoded to text.
    PlainText(String),
    /// Leaf parts of a (possibly nested) multipart container, in document order.
    MultiPart(Vec<BodyPart>),
}

/// One typed part of a multipart container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPart {
    /// Declared content type, e.g. `text/html; charset=UTF-8`
    pub content_type: String,
    /// Decoded part body
    pub content: String,
}

impl BodyPart {
    pub fn new(content_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            content: content.into(),
        }
    }
}

/// What the extractor requires of a message.
pub trait MailMessage {
    /// Decoded subject line, `None` when the message has none.
    fn subject(&self) -> Option<String>;

    /// When the message was sent, `None` when missing or unparsable.
    fn sent_date(&self) -> Option<DateTime<Utc>>;

    /// All headers as `(name, value)` pairs in message order.
    fn headers(&self) -> Result<Vec<(String, String)>, ReadError>;

    /// The message body.
    fn content(&self) -> Result<MessageContent, ReadError>;
}

/// A message whose parts are already in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub subject: String,
    pub sent_date: Option<DateTime<Utc>>,
    pub headers: Vec<(String, String)>,
    pub content: MessageContent,
}

impl MailMessage for RawMessage {
    fn subject(&self) -> Option<String> {
        Some(self.subject.clone())
    }

    fn sent_date(&self) -> Option<DateTime<Utc>> {
        self.sent_date
    }

    fn headers(&self) -> Result<Vec<(String, String)>, ReadError> {
        Ok(self.headers.clone())
    }

    fn content(&self) -> Result<MessageContent, ReadError> {
        Ok(self.content.clone())
    }
}

/// Look up a single header value by name.
///
/// Names compare ASCII-case-insensitively and the first match wins. The value
/// is returned verbatim, so a `Message-ID` keeps its angle brackets.
pub fn header_value(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.clone())
}
