//! Filesystem mailbox in the style of a Maildir.
//!
//! Unseen messages are RFC 5322 files in `<root>/new`. Marking a message seen
//! moves it to `<root>/cur`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{GatewayError, MailboxGateway};
use crate::mail::{MailMessage, MessageContent, MimeMessage, ReadError};

const UNSEEN_DIR: &str = "new";
const SEEN_DIR: &str = "cur";

/// A message file read from the spool.
#[derive(Debug, Clone)]
pub struct SpoolMessage {
    file_name: String,
    message: MimeMessage,
}

impl SpoolMessage {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl MailMessage for SpoolMessage {
    fn subject(&self) -> Option<String> {
        self.message.subject()
    }

    fn sent_date(&self) -> Option<DateTime<Utc>> {
        self.message.sent_date()
    }

    fn headers(&self) -> Result<Vec<(String, String)>, ReadError> {
        self.message.headers()
    }

    fn content(&self) -> Result<MessageContent, ReadError> {
        self.message.content()
    }
}

/// Spool directory gateway.
#[derive(Debug, Clone)]
pub struct SpoolMailbox {
    root: PathBuf,
}

impl SpoolMailbox {
    /// Open a spool, creating its folders when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, GatewayError> {
        let root = root.into();
        fs::create_dir_all(root.join(UNSEEN_DIR))?;
        fs::create_dir_all(root.join(SEEN_DIR))?;

        info!(root = %root.display(), "spool_opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn unseen_files(&self) -> Result<Vec<(String, PathBuf)>, GatewayError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(self.root.join(UNSEEN_DIR))? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            files.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
        files.sort();
        Ok(files)
    }
}

impl MailboxGateway for SpoolMailbox {
    type Message = SpoolMessage;

    fn search_unseen_by_subject(&mut self, subject: &str) -> Result<Vec<SpoolMessage>, GatewayError> {
        let mut matches = Vec::new();

        for (file_name, path) in self.unseen_files()? {
            let raw = match fs::read(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(file = %file_name, error = %e, "spool_read_failed");
                    continue;
                }
            };

            let message = MimeMessage::from_bytes(raw);
            let matched = message
                .subject()
                .is_some_and(|message_subject| message_subject.contains(subject));

            debug!(file = %file_name, matched = matched, "spool_message_examined");

            if matched {
                matches.push(SpoolMessage { file_name, message });
            }
        }

        info!(subject = subject, match_count = matches.len(), "spool_search_complete");
        Ok(matches)
    }

    fn mark_seen(&mut self, message: &SpoolMessage) -> Result<(), GatewayError> {
        let from = self.root.join(UNSEEN_DIR).join(&message.file_name);
        if !from.is_file() {
            return Err(GatewayError::NotFound(message.file_name.clone()));
        }

        fs::rename(&from, self.root.join(SEEN_DIR).join(&message.file_name))?;
        debug!(file = %message.file_name, "spool_message_marked_seen");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_message(dir: &TempDir, name: &str, subject: &str) {
        let raw = format!(
            "Message-ID: <{name}@mail.example.com>\r\nSubject: {subject}\r\nContent-Type: text/plain\r\n\r\nJob TaskId={name} for Manuscript ID=1 ok\r\n"
        );
        fs::write(dir.path().join(UNSEEN_DIR).join(name), raw).unwrap();
    }

    #[test]
    fn test_open_creates_folders() {
        let dir = TempDir::new().unwrap();
        let spool = SpoolMailbox::open(dir.path().join("spool")).unwrap();

        assert!(spool.root().join(UNSEEN_DIR).is_dir());
        assert!(spool.root().join(SEEN_DIR).is_dir());
    }

    #[test]
    fn test_search_filters_by_subject_in_name_order() {
        let dir = TempDir::new().unwrap();
        let mut spool = SpoolMailbox::open(dir.path()).unwrap();
        write_message(&dir, "b.eml", "Bulk submission submitted");
        write_message(&dir, "a.eml", "Bulk submission failed");
        write_message(&dir, "c.eml", "Unrelated");

        let found = spool.search_unseen_by_subject("Bulk submission").unwrap();

        let names: Vec<&str> = found.iter().map(|m| m.file_name()).collect();
        assert_eq!(names, vec!["a.eml", "b.eml"]);
        assert_eq!(found[0].subject().as_deref(), Some("Bulk submission failed"));
    }

    #[test]
    fn test_mark_seen_moves_file() {
        let dir = TempDir::new().unwrap();
        let mut spool = SpoolMailbox::open(dir.path()).unwrap();
        write_message(&dir, "a.eml", "Bulk submission submitted");

        let found = spool.search_unseen_by_subject("Bulk submission").unwrap();
        spool.mark_seen(&found[0]).unwrap();

        assert!(!dir.path().join(UNSEEN_DIR).join("a.eml").exists());
        assert!(dir.path().join(SEEN_DIR).join("a.eml").exists());
        assert!(spool.search_unseen_by_subject("Bulk submission").unwrap().is_empty());

        let err = spool.mark_seen(&found[0]).unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[test]
    fn test_drain_spool() {
        let dir = TempDir::new().unwrap();
        let mut spool = SpoolMailbox::open(dir.path()).unwrap();
        write_message(&dir, "a.eml", "Bulk submission submitted");

        let mut outcomes = Vec::new();
        crate::mailbox::drain_mailbox(&mut spool, "Bulk submission", |records| {
            outcomes.extend_from_slice(records);
            Ok::<(), String>(())
        })
        .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].task_id.as_deref(), Some("a.eml"));
        assert_eq!(outcomes[0].message_id.as_deref(), Some("<a.eml@mail.example.com>"));
        assert!(dir.path().join(SEEN_DIR).join("a.eml").exists());
    }

    #[test]
    fn test_failed_delivery_keeps_file_unseen() {
        let dir = TempDir::new().unwrap();
        let mut spool = SpoolMailbox::open(dir.path()).unwrap();
        write_message(&dir, "a.eml", "Bulk submission submitted");

        let summary = crate::mailbox::drain_mailbox(&mut spool, "Bulk submission", |_| {
            Err("Failed to connect to RabbitMQ")
        })
        .unwrap();

        assert_eq!(summary.delivered_count, 0);
        assert!(dir.path().join(UNSEEN_DIR).join("a.eml").exists());
        assert!(!dir.path().join(SEEN_DIR).join("a.eml").exists());
        assert_eq!(spool.search_unseen_by_subject("Bulk submission").unwrap().len(), 1);
    }
}
