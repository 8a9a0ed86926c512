//! Canonical receipt record produced by the extraction core.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vendor used when no `VENDOR_NAME` was detected.
pub const DEFAULT_VENDOR: &str = "Unknown";

/// Total used when no `TOTAL` was detected.
pub const DEFAULT_TOTAL: &str = "0.00";

/// Format of the processing-date default.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Location of a source object in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    /// Bucket name.
    pub bucket: String,
    /// Object key, already decoded.
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// `s3://{bucket}/{key}`, with no further encoding applied.
    pub fn s3_path(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// A normalized receipt.
///
/// Built once per invocation by the assembler and handed read-only to the
/// persistence and notification collaborators. Values are the detected text,
/// verbatim; nothing is parsed or reformatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Generated identifier, unrelated to the document content.
    pub receipt_id: String,

    /// Detected receipt date, or the processing date when none was found.
    pub date: String,

    /// Detected vendor name.
    pub vendor: String,

    /// Detected total amount.
    pub total: String,

    /// Named line items in document order.
    pub items: Vec<ReceiptItem>,

    /// Source object, as `s3://bucket/key`.
    pub s3_path: String,
}

/// A purchased item.
///
/// Price and quantity stay unset when not detected; each consumer applies its
/// own default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

impl ReceiptItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: None,
            quantity: None,
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }
}

impl ReceiptRecord {
    /// Create a record with every attribute at its default.
    pub fn new(receipt_id: impl Into<String>, date: NaiveDate, location: &ObjectLocation) -> Self {
        Self {
            receipt_id: receipt_id.into(),
            date: date.format(DATE_FORMAT).to_string(),
            vendor: DEFAULT_VENDOR.to_string(),
            total: DEFAULT_TOTAL.to_string(),
            items: Vec::new(),
            s3_path: location.s3_path(),
        }
    }

    /// Report anything that looks off about the extracted values.
    ///
    /// Advisory only: extraction never rejects or rewrites a value.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.vendor == DEFAULT_VENDOR {
            issues.push("Vendor was not detected".to_string());
        }

        let amount = self.total.trim().trim_start_matches('$').replace(',', "");
        if Decimal::from_str(&amount).is_err() {
            issues.push(format!("Total is not a decimal amount: {}", self.total));
        }

        if NaiveDate::parse_from_str(&self.date, DATE_FORMAT).is_err() {
            issues.push(format!("Date is not in YYYY-MM-DD form: {}", self.date));
        }

        if self.items.is_empty() {
            issues.push("No line items".to_string());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn location() -> ObjectLocation {
        ObjectLocation::new("test-bucket", "test-key.jpg")
    }

    #[test]
    fn test_s3_path_is_plain_concatenation() {
        assert_eq!(location().s3_path(), "s3://test-bucket/test-key.jpg");

        let odd = ObjectLocation::new("b", "dir/with space/%41.png");
        assert_eq!(odd.s3_path(), "s3://b/dir/with space/%41.png");
    }

    #[test]
    fn test_new_record_defaults() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let record = ReceiptRecord::new("id-1", date, &location());

        assert_eq!(record.date, "2024-03-09");
        assert_eq!(record.vendor, "Unknown");
        assert_eq!(record.total, "0.00");
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_validate_reports_issues() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let mut record = ReceiptRecord::new("id-1", date, &location());
        record.total = "abc".to_string();
        record.date = "03/09/2024".to_string();

        let issues = record.validate();
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn test_validate_clean_record() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut record = ReceiptRecord::new("id-1", date, &location());
        record.vendor = "Test Store".to_string();
        record.total = "$1,125.50".to_string();
        record.items.push(ReceiptItem::new("Product A"));

        assert!(record.validate().is_empty());
    }

    #[test]
    fn test_item_serialization_omits_missing_fields() {
        let item = ReceiptItem::new("Milk").with_quantity("2");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"name":"Milk","quantity":"2"}"#);
    }
}
