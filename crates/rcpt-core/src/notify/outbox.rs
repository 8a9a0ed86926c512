//! Outbox mail transport.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{EmailMessage, MailTransport};
use crate::clock::Clock;
use crate::error::NotifyError;

/// Writes each message as a JSON file into a directory, for pickup by a
/// separate mailer.
#[derive(Clone)]
pub struct OutboxTransport {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl OutboxTransport {
    /// File names are prefixed with the clock's current time.
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }
}

#[async_trait]
impl MailTransport for OutboxTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| NotifyError::Transport(format!("{}: {}", self.dir.display(), e)))?;

        let name = format!(
            "{}-{}.json",
            self.clock.now().format("%Y%m%dT%H%M%S%.3fZ"),
            Uuid::new_v4().simple()
        );
        let path = self.dir.join(name);
        let content = serde_json::to_string_pretty(message)
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| NotifyError::Transport(format!("{}: {}", path.display(), e)))?;

        debug!("Queued email in {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()))
    }

    fn message() -> EmailMessage {
        EmailMessage {
            from: "from@example.com".to_string(),
            to: vec!["to@example.com".to_string()],
            subject: "Receipt Processed: Shop - $1.00".to_string(),
            html_body: "<html></html>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_writes_message_file() {
        let dir = tempfile::tempdir().unwrap();
        let transport = OutboxTransport::new(dir.path().join("outbox"), clock());

        transport.send(&message()).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("outbox"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1);

        let name = entries[0].file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("20240315T000000.000Z-"), "{name}");
        assert!(name.ends_with(".json"));

        let saved: EmailMessage =
            serde_json::from_str(&std::fs::read_to_string(&entries[0]).unwrap()).unwrap();
        assert_eq!(saved, message());
    }

    #[tokio::test]
    async fn test_unwritable_outbox() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("outbox");
        std::fs::write(&blocker, "a file, not a directory").unwrap();

        let transport = OutboxTransport::new(&blocker, clock());
        assert!(transport.send(&message()).await.is_err());
    }
}
