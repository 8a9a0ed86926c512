//! OCR collaborator: expense analysis of stored documents.

mod http;
mod recorded;

pub use http::HttpExpenseAnalyzer;
pub use recorded::RecordedExpenseAnalyzer;

use async_trait::async_trait;

use crate::error::OcrError;
use crate::models::expense::AnalyzeExpenseResponse;
use crate::models::receipt::ObjectLocation;

/// Trait for services that run expense analysis on a stored document.
#[async_trait]
pub trait ExpenseAnalyzer: Send + Sync {
    /// Analyze the document at `location` and return the raw response.
    async fn analyze_expense(
        &self,
        location: &ObjectLocation,
    ) -> Result<AnalyzeExpenseResponse, OcrError>;

    /// Backend name used in logs.
    fn name(&self) -> &'static str;
}
