//! Outcome record produced for each submission reported in an email.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Literal that introduces a task identifier.
pub const TASK_ID_MARKER: &str = "Job TaskId=";

/// Subject suffix of a successful bulk submission email.
pub const SUCCESS_SUBJECT: &str = "Bulk submission submitted";

/// Trigger for the free-form failure report that carries no task marker.
///
/// The leading space keeps it from matching inside a longer word.
pub const FALLBACK_TRIGGER: &str = " MSREFID";

/// Token that introduces the NIHMS manuscript identifier.
pub const NIHMS_ID_TOKEN: &str = "ID=";

/// Result of one bulk submission, as reported by the deposit system.
///
/// `submitted`, `sent_date` and `message_id` describe the whole email and are
/// shared by every record derived from it. `nihms_id` is only ever set when
/// `submitted` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// Human-readable explanation of the success or failure
    pub outcome_description: String,
    /// Whether the email subject reports a successful submission
    pub submitted: bool,
    /// When the notification was sent
    pub sent_date: Option<DateTime<Utc>>,
    /// When the notification was read by the extractor
    pub latest_read_date: DateTime<Utc>,
    /// Message-ID header of the notification
    pub message_id: Option<String>,
    /// Bulk submission job identifier
    pub task_id: Option<String>,
    /// Manuscript identifier assigned by NIHMS
    pub nihms_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let outcome = SubmissionOutcome {
            outcome_description: "abc123 for Manuscript ID=969594 was submitted successfully."
                .to_string(),
            submitted: true,
            sent_date: DateTime::from_timestamp(1_529_948_802, 0),
            latest_read_date: DateTime::from_timestamp(1_540_477_798, 0).unwrap(),
            message_id: Some("<20180625174642.E2F101A0002@mail2.ncbi.nlm.nih.gov>".to_string()),
            task_id: Some("abc123".to_string()),
            nihms_id: Some("969594".to_string()),
        };

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"task_id\":\"abc123\""));
        assert!(json.contains("\"sent_date\":\"2018-06-25T17:46:42Z\""));

        let parsed: SubmissionOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcome);
    }

    #[test]
    fn test_missing_fields_serialize_as_null() {
        let outcome = SubmissionOutcome {
            outcome_description: "File cannot be extracted.".to_string(),
            submitted: false,
            sent_date: None,
            latest_read_date: DateTime::from_timestamp(0, 0).unwrap(),
            message_id: None,
            task_id: None,
            nihms_id: None,
        };

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"nihms_id\":null"));
        assert!(json.contains("\"message_id\":null"));
    }
}
