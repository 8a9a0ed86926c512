//! Summary field extraction (vendor, date, total).

use tracing::debug;

use crate::models::expense::AnalyzeExpenseResponse;
use crate::models::receipt::ReceiptRecord;

use super::ExpenseExtractor;

/// Document-level detection types that map onto the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFieldType {
    /// `TOTAL`
    Total,
    /// `INVOICE_RECEIPT_DATE`
    InvoiceReceiptDate,
    /// `VENDOR_NAME`
    VendorName,
}

impl SummaryFieldType {
    /// Parse a type tag. Tags outside the vocabulary yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "TOTAL" => Some(Self::Total),
            "INVOICE_RECEIPT_DATE" => Some(Self::InvoiceReceiptDate),
            "VENDOR_NAME" => Some(Self::VendorName),
            _ => None,
        }
    }

    /// The tag this type is parsed from.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Total => "TOTAL",
            Self::InvoiceReceiptDate => "INVOICE_RECEIPT_DATE",
            Self::VendorName => "VENDOR_NAME",
        }
    }
}

/// Summary values found in a payload. `None` means not detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryUpdate {
    pub vendor: Option<String>,
    pub date: Option<String>,
    pub total: Option<String>,
}

impl SummaryUpdate {
    fn set(&mut self, field: SummaryFieldType, value: &str) {
        let slot = match field {
            SummaryFieldType::Total => &mut self.total,
            SummaryFieldType::InvoiceReceiptDate => &mut self.date,
            SummaryFieldType::VendorName => &mut self.vendor,
        };
        *slot = Some(value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.vendor.is_none() && self.date.is_none() && self.total.is_none()
    }

    /// Overwrite the detected attributes of `record`; others keep their defaults.
    pub fn apply_to(self, record: &mut ReceiptRecord) {
        if let Some(vendor) = self.vendor {
            record.vendor = vendor;
        }
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(total) = self.total {
            record.total = total;
        }
    }
}

/// Extract summary values from the first expense document.
///
/// Values are copied verbatim. When a tag occurs more than once the last
/// detection in response order wins.
pub fn extract_summary(response: &AnalyzeExpenseResponse) -> SummaryUpdate {
    let mut update = SummaryUpdate::default();

    let Some(fields) = response
        .first_document()
        .and_then(|doc| doc.summary_fields.as_ref())
    else {
        return update;
    };

    for field in fields {
        if let Some(field_type) = SummaryFieldType::from_tag(field.type_tag()) {
            debug!("Summary field {} = {:?}", field_type.as_tag(), field.value());
            update.set(field_type, field.value());
        }
    }

    update
}

/// Populates vendor, date and total.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryExtractor;

impl ExpenseExtractor for SummaryExtractor {
    fn extract_into(&self, response: &AnalyzeExpenseResponse, record: &mut ReceiptRecord) {
        extract_summary(response).apply_to(record);
    }
}
