//! Receipt assembly.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::models::expense::AnalyzeExpenseResponse;
use crate::models::receipt::{ObjectLocation, ReceiptRecord};

use super::{ExpenseExtractor, LineItemExtractor, SummaryExtractor};

/// Builds canonical receipt records from raw expense payloads.
#[derive(Clone)]
pub struct ReceiptAssembler {
    clock: Arc<dyn Clock>,
}

impl ReceiptAssembler {
    /// Create an assembler that reads the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an assembler with an explicit time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Assemble one record from `response` for the object at `location`.
    ///
    /// Never fails: a payload without expense documents yields a record with
    /// every attribute at its default and no items.
    pub fn assemble(
        &self,
        response: &AnalyzeExpenseResponse,
        location: &ObjectLocation,
    ) -> ReceiptRecord {
        let receipt_id = Uuid::new_v4().to_string();
        let mut record = ReceiptRecord::new(receipt_id, self.clock.today(), location);

        if response.first_document().is_none() {
            warn!("No expense documents found in OCR response for {}", location);
            return record;
        }

        if response.document_count() > 1 {
            debug!(
                "OCR response has {} expense documents, reading only the first",
                response.document_count()
            );
        }

        SummaryExtractor.extract_into(response, &mut record);
        LineItemExtractor.extract_into(response, &mut record);

        record
    }
}

impl Default for ReceiptAssembler {
    fn default() -> Self {
        Self::new()
    }
}
