//! Queue module for publishing extracted outcomes to RabbitMQ.
//!
//! ## Architecture
//!
//! ```text
//! Spool → nihms-poller → outcome queue → downstream consumers
//! ```

pub mod publisher;

pub use publisher::Publisher;

/// Default queue name for submission outcome records.
pub const OUTCOME_QUEUE: &str = "nihms_submission_outcomes";
