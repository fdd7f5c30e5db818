//! Splits a notification body into one chunk per reported submission.
//!
//! Structured bodies yield every table cell whose text carries the task
//! marker. Plain bodies are scanned line by line:
//!
//! ```text
//! Scanning ──" MSREFID" line──▶ AwaitingContinuation(trigger)
//!    ▲                                 │ blank line: stay
//!    └──── next non-empty line: emit "trigger line" ◀┘
//! ```
//!
//! A marker line is always a chunk of its own. A pending trigger with no
//! continuation (end of body, a marker line, or another trigger) is emitted
//! alone.

use tracing::{debug, warn};

use super::classifier::Body;
use super::types::{FALLBACK_TRIGGER, TASK_ID_MARKER};
use crate::html::DocumentParser;

/// Segment a classified body into chunks, in document order.
pub fn segment<P: DocumentParser + ?Sized>(body: &Body, parser: &P) -> Vec<String> {
    match body {
        Body::Structured(html) => segment_cells(html, parser),
        Body::Plain(text) => segment_lines(text),
    }
}

/// One chunk per table cell containing the task marker.
pub fn segment_cells<P: DocumentParser + ?Sized>(html: &str, parser: &P) -> Vec<String> {
    let chunks: Vec<String> = parser
        .element_texts(html, "td")
        .into_iter()
        .filter(|text| text.contains(TASK_ID_MARKER))
        .collect();

    debug!(chunk_count = chunks.len(), "segment_cells_complete");
    chunks
}

#[derive(Debug)]
enum ScanState<'a> {
    Scanning,
    AwaitingContinuation(&'a str),
}

/// One chunk per marker line, plus one per fallback trigger with its detail line.
pub fn segment_lines(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut state = ScanState::Scanning;

    for line in text.lines() {
        state = match state {
            ScanState::AwaitingContinuation(trigger) if line.trim().is_empty() => {
                ScanState::AwaitingContinuation(trigger)
            }
            ScanState::AwaitingContinuation(trigger)
                if !line.contains(TASK_ID_MARKER) && !line.contains(FALLBACK_TRIGGER) =>
            {
                chunks.push(format!("{} {}", trigger, line));
                ScanState::Scanning
            }
            ScanState::AwaitingContinuation(trigger) => {
                flush_trigger(&mut chunks, trigger);
                scan_line(&mut chunks, line)
            }
            ScanState::Scanning => scan_line(&mut chunks, line),
        };
    }

    if let ScanState::AwaitingContinuation(trigger) = state {
        flush_trigger(&mut chunks, trigger);
    }

    debug!(chunk_count = chunks.len(), "segment_lines_complete");
    chunks
}

fn scan_line<'a>(chunks: &mut Vec<String>, line: &'a str) -> ScanState<'a> {
    if line.contains(TASK_ID_MARKER) {
        chunks.push(line.to_string());
        ScanState::Scanning
    } else if line.contains(FALLBACK_TRIGGER) {
        ScanState::AwaitingContinuation(line)
    } else {
        ScanState::Scanning
    }
}

fn flush_trigger(chunks: &mut Vec<String>, trigger: &str) {
    warn!(trigger = trigger, "segment_trigger_without_continuation");
    chunks.push(trigger.to_string());
}
