//! RFC 5322 message reader using mailparse.
//!
//! [`MimeMessage`] keeps the raw bytes and decodes headers and body on
//! demand, so a message with a broken body still reports its subject and
//! headers.

use chrono::{DateTime, Utc};
use mailparse::{parse_headers, parse_mail, MailHeaderMap, MailParseError, ParsedMail};
use tracing::{debug, warn};

use super::{BodyPart, MailMessage, MessageContent, ReadError};

/// A message backed by raw RFC 5322 bytes.
#[derive(Debug, Clone)]
pub struct MimeMessage {
    raw: Vec<u8>,
}

impl MimeMessage {
    pub fn from_bytes(raw: impl Into<Vec<u8>>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw message bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    fn header(&self, name: &str) -> Option<String> {
        match parse_headers(&self.raw) {
            Ok((headers, _)) => headers.get_first_value(name),
            Err(e) => {
                warn!(header = name, error = %e, "email_header_parse_failed");
                None
            }
        }
    }
}

impl MailMessage for MimeMessage {
    fn subject(&self) -> Option<String> {
        self.header("Subject")
    }

    fn sent_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.header("Date")?;
        let parsed = parse_sent_date(&raw);
        if parsed.is_none() {
            warn!(date = %raw, "email_date_parse_failed");
        }
        parsed
    }

    fn headers(&self) -> Result<Vec<(String, String)>, ReadError> {
        let (headers, _) = parse_headers(&self.raw)?;
        Ok(headers
            .iter()
            .map(|header| (header.get_key(), header.get_value()))
            .collect())
    }

    fn content(&self) -> Result<MessageContent, ReadError> {
        let mail = parse_mail(&self.raw)?;
        let mimetype = mail.ctype.mimetype.as_str();

        debug!(
            content_type = mimetype,
            subparts_count = mail.subparts.len(),
            "email_content_read"
        );

        if mimetype.starts_with("multipart/") {
            let mut parts = Vec::new();
            collect_leaf_parts(&mail, &mut parts);
            return Ok(MessageContent::MultiPart(parts));
        }

        let body = mail.get_body().map_err(ReadError::Body)?;
        Ok(MessageContent::PlainText(body))
    }
}

/// Parse an RFC 2822 `Date` value, tolerating a trailing zone comment such as `(EDT)`.
fn parse_sent_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let without_comment = match raw.rfind('(') {
        Some(start) if raw.ends_with(')') => raw[..start].trim_end(),
        _ => raw,
    };

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(without_comment))
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Walk nested multipart containers, collecting leaf parts in document order.
///
/// A leaf whose body cannot be decoded is logged and skipped so its siblings
/// stay readable.
fn collect_leaf_parts(container: &ParsedMail, parts: &mut Vec<BodyPart>) {
    for part in &container.subparts {
        if part.ctype.mimetype.starts_with("multipart/") {
            collect_leaf_parts(part, parts);
            continue;
        }

        match read_part(part) {
            Ok(body_part) => parts.push(body_part),
            Err(e) => {
                warn!(
                    content_type = %part.ctype.mimetype,
                    part_index = parts.len(),
                    error = %e,
                    "email_part_decode_failed"
                );
            }
        }
    }
}

fn read_part(part: &ParsedMail) -> Result<BodyPart, MailParseError> {
    let content_type = part
        .headers
        .get_first_value("Content-Type")
        .unwrap_or_else(|| part.ctype.mimetype.clone());
    let content = part.get_body()?;

    Ok(BodyPart {
        content_type,
        content,
    })
}
