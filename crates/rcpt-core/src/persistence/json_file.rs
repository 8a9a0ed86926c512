//! Receipt table stored as one JSON document per receipt.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{ReceiptRepository, StoredReceipt};
use crate::clock::Clock;
use crate::error::PersistenceError;
use crate::models::receipt::ReceiptRecord;

/// Directory-backed receipt table: `<dir>/<receipt_id>.json`.
#[derive(Clone)]
pub struct JsonFileRepository {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonFileRepository {
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    fn record_path(&self, receipt_id: &str) -> PathBuf {
        self.dir.join(format!("{receipt_id}.json"))
    }

    async fn read_record(path: &Path) -> Result<StoredReceipt, PersistenceError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PersistenceError::Read(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| PersistenceError::Read(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl ReceiptRepository for JsonFileRepository {
    async fn put_receipt(&self, record: &ReceiptRecord) -> Result<StoredReceipt, PersistenceError> {
        let write_error = |reason: String| {
            error!("Error storing receipt {}: {}", record.receipt_id, reason);
            PersistenceError::Write {
                receipt_id: record.receipt_id.clone(),
                reason,
            }
        };

        if Uuid::parse_str(&record.receipt_id).is_err() {
            return Err(write_error("receipt id is not a UUID".to_string()));
        }

        let stored = StoredReceipt::from_record(record, self.clock.now());
        let content =
            serde_json::to_string_pretty(&stored).map_err(|e| write_error(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| write_error(e.to_string()))?;

        // Write then rename so readers never see a partial document.
        let path = self.record_path(&record.receipt_id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| write_error(e.to_string()))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
            return Err(write_error(e.to_string()));
        }

        info!("Receipt stored: {}", record.receipt_id);
        Ok(stored)
    }

    async fn get_receipt(
        &self,
        receipt_id: &str,
    ) -> Result<Option<StoredReceipt>, PersistenceError> {
        if Uuid::parse_str(receipt_id).is_err() {
            return Ok(None);
        }

        let path = self.record_path(receipt_id);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Self::read_record(&path).await.map(Some),
            Ok(false) => Ok(None),
            Err(e) => Err(PersistenceError::Read(e.to_string())),
        }
    }

    async fn query_by_date(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<StoredReceipt>, PersistenceError> {
        if start > end {
            return Err(PersistenceError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        info!("Querying receipts from {} to {}", start, end);

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::Read(e.to_string())),
        };

        let mut matches = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PersistenceError::Read(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let stored = match Self::read_record(&path).await {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Skipping unreadable receipt: {}", e);
                    continue;
                }
            };

            if let Some(date) = stored.parsed_date() {
                if date >= start && date <= end {
                    matches.push((date, stored));
                }
            }
        }

        matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.receipt_id.cmp(&b.1.receipt_id)));
        Ok(matches.into_iter().map(|(_, stored)| stored).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::receipt::{ObjectLocation, ReceiptItem};
    use pretty_assertions::assert_eq;

    fn repository(dir: &Path) -> JsonFileRepository {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        JsonFileRepository::new(dir.join("Receipts"), Arc::new(FixedClock::at_date(date)))
    }

    fn record(date: &str) -> ReceiptRecord {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mut record = ReceiptRecord::new(
            Uuid::new_v4().to_string(),
            today,
            &ObjectLocation::new("bucket", "r.jpg"),
        );
        record.date = date.to_string();
        record
    }

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path());

        let mut receipt = record("2024-01-15");
        receipt.items.push(ReceiptItem::new("Coffee"));

        let stored = repo.put_receipt(&receipt).await.unwrap();
        assert_eq!(stored.items[0].price, "0.00");
        assert_eq!(stored.items[0].quantity, "1");
        assert_eq!(stored.processed_timestamp, "2024-02-01T00:00:00.000000Z");

        let loaded = repo.get_receipt(&receipt.receipt_id).await.unwrap();
        assert_eq!(loaded, Some(stored));
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path());

        assert_eq!(repo.get_receipt(&Uuid::new_v4().to_string()).await.unwrap(), None);
        assert_eq!(repo.get_receipt("../../etc/passwd").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_rejects_non_uuid_id() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path());

        let mut receipt = record("2024-01-15");
        receipt.receipt_id = "../escape".to_string();

        assert!(matches!(
            repo.put_receipt(&receipt).await,
            Err(PersistenceError::Write { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path());
        let receipt = record("2024-01-15");

        // A non-empty directory at the target path makes the rename fail.
        let target = dir
            .path()
            .join("Receipts")
            .join(format!("{}.json", receipt.receipt_id));
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("occupied"), "x").unwrap();

        assert!(matches!(
            repo.put_receipt(&receipt).await,
            Err(PersistenceError::Write { .. })
        ));
        assert!(!target.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_query_by_date_range() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path());

        for date in ["2024-01-10", "2024-01-15", "2024-01-31", "2024-02-01", "Jan 20 2024"] {
            repo.put_receipt(&record(date)).await.unwrap();
        }

        let found = repo
            .query_by_date(day("2024-01-15"), day("2024-01-31"))
            .await
            .unwrap();
        let dates: Vec<&str> = found.iter().map(|r| r.date.as_str()).collect();

        assert_eq!(dates, vec!["2024-01-15", "2024-01-31"]);
    }

    #[tokio::test]
    async fn test_query_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path());

        let found = repo
            .query_by_date(day("2024-01-01"), day("2024-12-31"))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_query_inverted_range() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path());

        assert!(matches!(
            repo.query_by_date(day("2024-02-01"), day("2024-01-01")).await,
            Err(PersistenceError::InvalidRange { .. })
        ));
    }
}
