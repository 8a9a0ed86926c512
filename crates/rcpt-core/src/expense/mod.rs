//! Expense document field extraction.
//!
//! Turns a raw AnalyzeExpense payload into a [`ReceiptRecord`]. Only the
//! first expense document of a response is read.

mod assembler;
mod fields;
mod line_items;

pub use assembler::ReceiptAssembler;
pub use fields::{SummaryExtractor, SummaryFieldType, SummaryUpdate, extract_summary};
pub use line_items::{LineItemExtractor, LineItemFieldType, extract_items};

use crate::models::expense::AnalyzeExpenseResponse;
use crate::models::receipt::ReceiptRecord;

/// Trait for extractors that populate part of a receipt record.
///
/// Extractors own disjoint attributes of the record, so the order in which
/// they run does not matter.
pub trait ExpenseExtractor {
    /// Populate `record` from `response`. Absent data leaves it unchanged.
    fn extract_into(&self, response: &AnalyzeExpenseResponse, record: &mut ReceiptRecord);
}
