//! NIHMS notification processing.
//!
//! Extracts structured bulk-submission outcomes from the notification emails
//! sent by the NIHMS manuscript deposit system. The binary `nihms-poller`
//! drains a spool mailbox and publishes every outcome to RabbitMQ.
//!
//! ## Architecture
//!
//! ```text
//! MailboxGateway → MailMessage → Extractor → SubmissionOutcome → Publisher
//! ```

pub mod config;
pub mod extract;
pub mod html;
pub mod mail;
pub mod mailbox;
pub mod queue;

// Re-export commonly used types
pub use config::Config;
pub use extract::{extract_outcomes, Extractor, SubmissionOutcome};
pub use mail::{BodyPart, MailMessage, MessageContent, MimeMessage, RawMessage, ReadError};
pub use mailbox::{drain_mailbox, DrainSummary, GatewayError, MailboxGateway, SpoolMailbox};
pub use queue::{Publisher, OUTCOME_QUEUE};
