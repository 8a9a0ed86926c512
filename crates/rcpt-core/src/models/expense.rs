//! Raw expense analysis payload as returned by the OCR service.
//!
//! The shape mirrors the AnalyzeExpense response. Every substructure is
//! optional: the service gives no guarantee of presence, ordering, or schema
//! consistency, and a missing piece is never a decoding error.

use serde::{Deserialize, Serialize};

/// Top-level AnalyzeExpense response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalyzeExpenseResponse {
    /// Analyzed documents. Absent and empty are treated alike.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_documents: Option<Vec<ExpenseDocument>>,
}

impl AnalyzeExpenseResponse {
    /// The first expense document, if any.
    ///
    /// Multi-document responses are truncated to their first entry; the
    /// remaining documents are never read.
    pub fn first_document(&self) -> Option<&ExpenseDocument> {
        self.expense_documents.as_deref().and_then(<[_]>::first)
    }

    /// Number of documents in the response.
    pub fn document_count(&self) -> usize {
        self.expense_documents.as_ref().map_or(0, Vec::len)
    }
}

/// One analyzed expense document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpenseDocument {
    /// Document-level detections (total, vendor, date, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_fields: Option<Vec<ExpenseField>>,

    /// Grouped line items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_item_groups: Option<Vec<LineItemGroup>>,
}

/// An ordered group of line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItemGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<LineItemFields>>,
}

/// Detections describing a single purchased item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItemFields {
    #[serde(default)]
    pub line_item_expense_fields: Vec<ExpenseField>,
}

/// A typed key/value detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpenseField {
    /// Normalized type of the detection (e.g. `TOTAL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<Detection>,

    /// Detected value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_detection: Option<Detection>,
}

impl ExpenseField {
    /// Build a detection with the given type tag and value text.
    pub fn new(type_tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            r#type: Some(Detection::new(type_tag)),
            value_detection: Some(Detection::new(text)),
        }
    }

    /// The type tag, or an empty string when the service omitted it.
    pub fn type_tag(&self) -> &str {
        self.r#type.as_ref().map_or("", Detection::text)
    }

    /// The value text, or an empty string when the service omitted it.
    pub fn value(&self) -> &str {
        self.value_detection.as_ref().map_or("", Detection::text)
    }
}

/// A piece of detected text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Detection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Detection {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_partial_payload() {
        let json = r#"{
            "ExpenseDocuments": [{
                "SummaryFields": [
                    {"Type": {"Text": "TOTAL"}, "ValueDetection": {"Text": "12.00", "Confidence": 99.1}},
                    {"Type": {"Text": "VENDOR_NAME"}},
                    {"LabelDetection": {"Text": "Total"}}
                ]
            }],
            "DocumentMetadata": {"Pages": 1}
        }"#;

        let response: AnalyzeExpenseResponse = serde_json::from_str(json).unwrap();
        let doc = response.first_document().unwrap();
        let fields = doc.summary_fields.as_ref().unwrap();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].type_tag(), "TOTAL");
        assert_eq!(fields[0].value(), "12.00");
        assert_eq!(fields[1].value(), "");
        assert_eq!(fields[2].type_tag(), "");
        assert!(doc.line_item_groups.is_none());
    }

    #[test]
    fn test_empty_object_has_no_documents() {
        let response: AnalyzeExpenseResponse = serde_json::from_str("{}").unwrap();
        assert!(response.first_document().is_none());
        assert_eq!(response.document_count(), 0);

        let response: AnalyzeExpenseResponse =
            serde_json::from_str(r#"{"ExpenseDocuments": []}"#).unwrap();
        assert!(response.first_document().is_none());
    }
}
