//! Field extraction from a single submission chunk.
//!
//! Chunks come in three shapes:
//!
//! - `Job TaskId=<id> <description>` (success, marker is a prefix)
//! - `<description> Job TaskId=<id> ...` (well-formed error)
//! - `<description>` (free-form error, no marker)

use chrono::{DateTime, Utc};

use super::types::{SubmissionOutcome, NIHMS_ID_TOKEN, SUCCESS_SUBJECT, TASK_ID_MARKER};

/// Email-level facts shared by every record derived from one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMeta {
    pub subject: String,
    pub sent_date: Option<DateTime<Utc>>,
    pub message_id: Option<String>,
}

impl MessageMeta {
    /// Whether the subject reports a successful submission.
    pub fn submitted(&self) -> bool {
        self.subject.ends_with(SUCCESS_SUBJECT)
    }
}

/// Build the outcome record for one chunk.
pub fn extract_fields(chunk: &str, meta: &MessageMeta, read_at: DateTime<Utc>) -> SubmissionOutcome {
    let submitted = meta.submitted();

    SubmissionOutcome {
        outcome_description: outcome_description(chunk),
        submitted,
        sent_date: meta.sent_date,
        latest_read_date: read_at,
        message_id: meta.message_id.clone(),
        task_id: task_id(chunk),
        nihms_id: if submitted { nihms_id(chunk) } else { None },
    }
}

/// Token immediately following the first marker, up to whitespace.
pub fn task_id(chunk: &str) -> Option<String> {
    let (_, after) = chunk.split_once(TASK_ID_MARKER)?;
    after
        .split(char::is_whitespace)
        .next()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// A whitespace-only prefix counts as no prefix.
pub fn outcome_description(chunk: &str) -> String {
    match chunk.split_once(TASK_ID_MARKER) {
        Some((before, after)) if before.trim().is_empty() && !after.is_empty() => after.to_string(),
        Some((before, _)) if !before.trim().is_empty() => before.to_string(),
        _ => chunk.to_string(),
    }
}

/// Value of the first `ID=` token in the chunk.
pub fn nihms_id(chunk: &str) -> Option<String> {
    chunk
        .split_whitespace()
        .filter_map(|token| token.strip_prefix(NIHMS_ID_TOKEN))
        .filter_map(|value| value.split('=').next())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(subject: &str) -> MessageMeta {
        MessageMeta {
            subject: subject.to_string(),
            sent_date: DateTime::from_timestamp(1_529_948_802, 0),
            message_id: Some("<20180625174642.E2F101A0002@mail2.ncbi.nlm.nih.gov>".to_string()),
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_540_477_798, 0).unwrap()
    }

    #[test]
    fn test_success_shape() {
        let chunk = "Job TaskId=abc123 for Manuscript ID=969594 was submitted successfully.";
        let outcome = extract_fields(chunk, &meta("NIHMS Bulk submission submitted"), now());

        assert!(outcome.submitted);
        assert_eq!(outcome.task_id.as_deref(), Some("abc123"));
        assert_eq!(
            outcome.outcome_description,
            "abc123 for Manuscript ID=969594 was submitted successfully."
        );
        assert_eq!(outcome.nihms_id.as_deref(), Some("969594"));
        assert_eq!(outcome.latest_read_date, now());
        assert_eq!(outcome.sent_date, DateTime::from_timestamp(1_529_948_802, 0));
    }

    #[test]
    fn test_well_formed_error_shape() {
        let chunk = "Error: bad file. Job TaskId=xyz789 more text";
        let outcome = extract_fields(chunk, &meta("NIHMS Bulk submission errors"), now());

        assert!(!outcome.submitted);
        assert_eq!(outcome.task_id.as_deref(), Some("xyz789"));
        assert_eq!(outcome.outcome_description, "Error: bad file. ");
        assert!(outcome.nihms_id.is_none());
    }

    #[test]
    fn test_free_form_error_shape() {
        let chunk = " MSREFID1861125 failed File cannot be extracted.";
        let outcome = extract_fields(chunk, &meta("NIHMS Bulk submission errors"), now());

        assert!(outcome.task_id.is_none());
        assert_eq!(outcome.outcome_description, chunk);
        assert!(outcome.nihms_id.is_none());
    }

    #[test]
    fn test_error_ignores_id_token() {
        let chunk = "Manuscript ID=123 rejected. Job TaskId=t1";
        let outcome = extract_fields(chunk, &meta("Bulk submission failed"), now());

        assert!(outcome.nihms_id.is_none());
    }

    #[test]
    fn test_success_subject_must_be_suffix() {
        assert!(!meta("Bulk submission submitted (partially)").submitted());
        assert!(!meta("bulk submission submitted").submitted());
        assert!(meta("Bulk submission submitted").submitted());
    }

    #[test]
    fn test_task_id_missing_token() {
        assert_eq!(task_id("Job TaskId="), None);
        assert_eq!(task_id("Job TaskId= abc"), None);
        assert_eq!(task_id("no marker"), None);
    }

    #[test]
    fn test_task_id_uses_first_marker() {
        assert_eq!(
            task_id("Job TaskId=one then Job TaskId=two").as_deref(),
            Some("one")
        );
    }

    #[test]
    fn test_task_id_stops_at_tab() {
        assert_eq!(task_id("Job TaskId=abc\tdone").as_deref(), Some("abc"));
    }

    #[test]
    fn test_bare_marker_description_falls_back_to_chunk() {
        assert_eq!(outcome_description("Job TaskId="), "Job TaskId=");
    }

    #[test]
    fn test_indented_marker_is_a_prefix() {
        let chunk = "  Job TaskId=abc123 for Manuscript ID=969594 was submitted successfully.";
        let outcome = extract_fields(chunk, &meta("NIHMS Bulk submission submitted"), now());

        assert_eq!(
            outcome.outcome_description,
            "abc123 for Manuscript ID=969594 was submitted successfully."
        );
        assert_eq!(outcome.task_id.as_deref(), Some("abc123"));
        assert_eq!(outcome_description("\tJob TaskId="), "\tJob TaskId=");
    }

    #[test]
    fn test_nihms_id_variants() {
        assert_eq!(nihms_id("Manuscript ID=969594 ok").as_deref(), Some("969594"));
        assert_eq!(nihms_id("ID=1=2").as_deref(), Some("1"));
        assert_eq!(nihms_id("Job TaskId=abc only"), None);
        assert_eq!(nihms_id("ID= empty"), None);
        assert_eq!(nihms_id("MSREFID=5"), None);
    }

    #[test]
    fn test_missing_message_id_is_none() {
        let meta = MessageMeta {
            subject: "Bulk submission submitted".to_string(),
            sent_date: None,
            message_id: None,
        };

        let outcome = extract_fields("Job TaskId=a ID=1", &meta, now());
        assert!(outcome.message_id.is_none());
        assert!(outcome.sent_date.is_none());
        assert_eq!(outcome.nihms_id.as_deref(), Some("1"));
    }
}
