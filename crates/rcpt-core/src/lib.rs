//! Core library for receipt processing.
//!
//! This crate provides:
//! - Expense document field extraction and normalization
//! - Collaborators for object storage, OCR, persistence, and email
//! - The event-driven pipeline tying them together

pub mod clock;
pub mod error;
pub mod expense;
pub mod models;
pub mod notify;
pub mod ocr;
pub mod persistence;
pub mod pipeline;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{RcptError, Result};
pub use expense::{ExpenseExtractor, ReceiptAssembler, extract_items, extract_summary};
pub use models::config::RcptConfig;
pub use models::expense::AnalyzeExpenseResponse;
pub use models::receipt::{ObjectLocation, ReceiptItem, ReceiptRecord};
pub use pipeline::{HandlerResponse, ReceiptProcessor, S3Event};
