//! Submission outcome extraction.
//!
//! Turns one notification email into zero or more [`SubmissionOutcome`]
//! records.
//!
//! ## Processing Flow
//!
//! ```text
//! MailMessage → classify() → segment() → extract_fields() per chunk → Vec<SubmissionOutcome>
//! ```
//!
//! Extraction never fails: unreadable content yields no records and a
//! missing header yields `None` fields.

pub mod classifier;
pub mod fields;
pub mod segmenter;
pub mod types;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::html::{DocumentParser, HtmlParser};
use crate::mail::{header_value, MailMessage};

pub use classifier::{classify, Body};
pub use fields::{extract_fields, MessageMeta};
pub use segmenter::{segment, segment_cells, segment_lines};
pub use types::{
    SubmissionOutcome, FALLBACK_TRIGGER, NIHMS_ID_TOKEN, SUCCESS_SUBJECT, TASK_ID_MARKER,
};

/// Outcome extractor parameterized over the HTML document parser.
#[derive(Debug, Clone)]
pub struct Extractor<P = HtmlParser> {
    parser: P,
}

impl Extractor<HtmlParser> {
    pub fn new() -> Self {
        Self { parser: HtmlParser }
    }
}

impl Default for Extractor<HtmlParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: DocumentParser> Extractor<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    /// Extract every outcome reported by `message`, stamped with the current time.
    pub fn extract<M: MailMessage + ?Sized>(&self, message: &M) -> Vec<SubmissionOutcome> {
        self.extract_at(message, Utc::now())
    }

    /// Extract every outcome reported by `message`, stamped with `read_at`.
    pub fn extract_at<M: MailMessage + ?Sized>(
        &self,
        message: &M,
        read_at: DateTime<Utc>,
    ) -> Vec<SubmissionOutcome> {
        let meta = message_meta(message);

        info!(
            message_id = ?meta.message_id,
            subject = %meta.subject,
            submitted = meta.submitted(),
            "outcome_extract_start"
        );

        let content = match message.content() {
            Ok(content) => content,
            Err(e) => {
                error!(message_id = ?meta.message_id, error = %e, "outcome_content_unreadable");
                return Vec::new();
            }
        };

        let Some(body) = classify(content) else {
            info!(message_id = ?meta.message_id, record_count = 0, "outcome_extract_complete");
            return Vec::new();
        };

        let outcomes: Vec<SubmissionOutcome> = segment(&body, &self.parser)
            .iter()
            .map(|chunk| {
                debug!(chunk = %chunk, "outcome_chunk_found");
                extract_fields(chunk, &meta, read_at)
            })
            .collect();

        info!(
            message_id = ?meta.message_id,
            mode = body.mode(),
            record_count = outcomes.len(),
            "outcome_extract_complete"
        );

        outcomes
    }
}

/// Extract outcomes with the default HTML parser.
pub fn extract_outcomes<M: MailMessage + ?Sized>(message: &M) -> Vec<SubmissionOutcome> {
    Extractor::new().extract(message)
}

fn message_meta<M: MailMessage + ?Sized>(message: &M) -> MessageMeta {
    let subject = message.subject().unwrap_or_else(|| {
        warn!("outcome_subject_missing");
        String::new()
    });

    let message_id = match message.headers() {
        Ok(headers) => header_value(&headers, "Message-ID"),
        Err(e) => {
            warn!(error = %e, "outcome_headers_unreadable");
            None
        }
    };

    MessageMeta {
        subject,
        sent_date: message.sent_date(),
        message_id,
    }
}
