//! Persistence collaborator: stores receipts keyed by id.

mod json_file;

pub use json_file::JsonFileRepository;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::models::receipt::{DATE_FORMAT, ReceiptItem, ReceiptRecord};

/// Price stored when none was detected.
pub const STORED_DEFAULT_PRICE: &str = "0.00";
/// Quantity stored when none was detected.
pub const STORED_DEFAULT_QUANTITY: &str = "1";

/// A receipt as written to the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReceipt {
    pub receipt_id: String,
    pub date: String,
    pub vendor: String,
    pub total: String,
    pub items: Vec<StoredItem>,
    pub s3_path: String,
    /// RFC 3339 time the receipt was stored.
    pub processed_timestamp: String,
}

/// An item with storage defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub name: String,
    pub price: String,
    pub quantity: String,
}

impl StoredReceipt {
    /// Build the stored form of `record`, stamped with `processed_at`.
    pub fn from_record(record: &ReceiptRecord, processed_at: DateTime<Utc>) -> Self {
        Self {
            receipt_id: record.receipt_id.clone(),
            date: record.date.clone(),
            vendor: record.vendor.clone(),
            total: record.total.clone(),
            items: format_items_for_storage(&record.items),
            s3_path: record.s3_path.clone(),
            processed_timestamp: processed_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    /// Convert back to a record. Stored defaults become explicit values.
    pub fn into_record(self) -> ReceiptRecord {
        ReceiptRecord {
            receipt_id: self.receipt_id,
            date: self.date,
            vendor: self.vendor,
            total: self.total,
            items: self
                .items
                .into_iter()
                .map(|item| ReceiptItem {
                    name: item.name,
                    price: Some(item.price),
                    quantity: Some(item.quantity),
                })
                .collect(),
            s3_path: self.s3_path,
        }
    }

    /// The receipt date, if it is in `YYYY-MM-DD` form.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

/// Apply storage defaults: missing price becomes `"0.00"`, missing quantity `"1"`.
pub fn format_items_for_storage(items: &[ReceiptItem]) -> Vec<StoredItem> {
    items
        .iter()
        .map(|item| StoredItem {
            name: item.name.clone(),
            price: item
                .price
                .clone()
                .unwrap_or_else(|| STORED_DEFAULT_PRICE.to_string()),
            quantity: item
                .quantity
                .clone()
                .unwrap_or_else(|| STORED_DEFAULT_QUANTITY.to_string()),
        })
        .collect()
}

/// Parse a `YYYY-MM-DD` query bound.
pub fn parse_date_bound(value: &str) -> Result<NaiveDate, PersistenceError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| PersistenceError::InvalidDate(value.to_string()))
}

/// Trait for receipt tables.
#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    /// Store `record` under its receipt id and return what was written.
    async fn put_receipt(&self, record: &ReceiptRecord) -> Result<StoredReceipt, PersistenceError>;

    /// Look up a receipt by id.
    async fn get_receipt(&self, receipt_id: &str)
    -> Result<Option<StoredReceipt>, PersistenceError>;

    /// Receipts dated within `start..=end`, ordered by date then id.
    ///
    /// Receipts whose date is not in `YYYY-MM-DD` form are skipped.
    async fn query_by_date(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<StoredReceipt>, PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::ObjectLocation;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_storage_defaults() {
        let items = vec![
            ReceiptItem::new("Bread"),
            ReceiptItem::new("Milk").with_price("1.20").with_quantity("3"),
            ReceiptItem::new(""),
        ];

        assert_eq!(
            format_items_for_storage(&items),
            vec![
                StoredItem {
                    name: "Bread".to_string(),
                    price: "0.00".to_string(),
                    quantity: "1".to_string(),
                },
                StoredItem {
                    name: "Milk".to_string(),
                    price: "1.20".to_string(),
                    quantity: "3".to_string(),
                },
                StoredItem {
                    name: String::new(),
                    price: "0.00".to_string(),
                    quantity: "1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_from_record_timestamp() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let record = ReceiptRecord::new("abc", date, &ObjectLocation::new("b", "k"));
        let at = date.and_hms_opt(10, 30, 0).unwrap().and_utc();

        let stored = StoredReceipt::from_record(&record, at);
        assert_eq!(stored.processed_timestamp, "2024-01-15T10:30:00.000000Z");
        assert_eq!(stored.parsed_date(), Some(date));
    }

    #[test]
    fn test_parse_date_bound() {
        assert!(parse_date_bound("2024-01-31").is_ok());
        assert!(matches!(
            parse_date_bound("31/01/2024"),
            Err(PersistenceError::InvalidDate(_))
        ));
    }
}
