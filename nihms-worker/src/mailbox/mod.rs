//! Mailbox gateway interface.
//!
//! The extractor does not own any transport. A [`MailboxGateway`] supplies
//! unseen notification messages and records which ones were processed.
//!
//! ## Drain Flow
//!
//! ```text
//! search_unseen_by_subject() → Extractor per message → deliver → mark_seen()
//! ```

pub mod spool;

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::extract::{Extractor, SubmissionOutcome};
use crate::mail::MailMessage;

pub use spool::{SpoolMailbox, SpoolMessage};

/// Errors raised by a mailbox gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("mailbox i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("message {0} is not in the unseen folder")]
    NotFound(String),
}

/// Source of notification messages.
pub trait MailboxGateway {
    type Message: MailMessage;

    /// Unseen messages whose subject contains `subject`.
    fn search_unseen_by_subject(&mut self, subject: &str) -> Result<Vec<Self::Message>, GatewayError>;

    /// Flag a message as processed so later searches skip it.
    fn mark_seen(&mut self, message: &Self::Message) -> Result<(), GatewayError>;
}

/// Counts from one pass over the mailbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Unseen messages matching the subject filter
    pub message_count: usize,
    /// Messages whose records were delivered and which were marked seen
    pub delivered_count: usize,
    /// Records extracted across all matching messages
    pub record_count: usize,
}

/// Extract outcomes from every unseen matching message and hand each
/// message's records to `deliver`.
///
/// A message is marked seen only after `deliver` accepts its records, so a
/// failed delivery leaves it unseen for the next drain. A message with no
/// records is still delivered (as an empty slice) and marked seen. A failed
/// `mark_seen` is logged. Only a failed search is an error.
pub fn drain_mailbox<G, F, E>(
    gateway: &mut G,
    subject_filter: &str,
    mut deliver: F,
) -> Result<DrainSummary, GatewayError>
where
    G: MailboxGateway,
    F: FnMut(&[SubmissionOutcome]) -> Result<(), E>,
    E: fmt::Display,
{
    let messages = gateway.search_unseen_by_subject(subject_filter)?;

    info!(
        subject_filter = subject_filter,
        message_count = messages.len(),
        "mailbox_drain_start"
    );

    let extractor = Extractor::new();
    let mut summary = DrainSummary {
        message_count: messages.len(),
        ..Default::default()
    };

    for (index, message) in messages.iter().enumerate() {
        let outcomes = extractor.extract(message);
        summary.record_count += outcomes.len();

        if let Err(e) = deliver(&outcomes) {
            warn!(
                message_index = index,
                record_count = outcomes.len(),
                error = %e,
                "mailbox_delivery_failed"
            );
            continue;
        }

        match gateway.mark_seen(message) {
            Ok(()) => summary.delivered_count += 1,
            Err(e) => warn!(message_index = index, error = %e, "mailbox_mark_seen_failed"),
        }
    }

    info!(
        message_count = summary.message_count,
        delivered_count = summary.delivered_count,
        record_count = summary.record_count,
        "mailbox_drain_complete"
    );

    Ok(summary)
}
