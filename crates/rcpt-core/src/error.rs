//! Error types for the rcpt-core library.

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// Trigger event could not be interpreted.
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// Object store error (existence check).
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// OCR service error.
    #[error("{0}")]
    Ocr(#[from] OcrError),

    /// Receipt persistence error.
    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    /// Email notification error.
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while reading a trigger event.
#[derive(Error, Debug)]
pub enum EventError {
    /// The event carries no records.
    #[error("event contains no records")]
    NoRecords,

    /// The event is not valid JSON or is missing required fields.
    #[error("malformed event: {0}")]
    Malformed(String),
}

/// Errors from the object store collaborator.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The object could not be reached.
    #[error("Unable to access object {key} in bucket {bucket}: {reason}")]
    Inaccessible {
        bucket: String,
        key: String,
        reason: String,
    },
}

/// Errors from the OCR collaborator.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Transport failure talking to the OCR service.
    #[error("OCR transport error: {0}")]
    Transport(String),

    /// The OCR service answered with an error status.
    #[error("OCR service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// The OCR response body could not be decoded.
    #[error("invalid OCR response: {0}")]
    InvalidResponse(String),

    /// No recorded response exists for the requested object.
    #[error("no recorded OCR response for {0}")]
    NotRecorded(String),
}

/// Errors from the persistence collaborator.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Writing the record failed.
    #[error("failed to store receipt {receipt_id}: {reason}")]
    Write { receipt_id: String, reason: String },

    /// Reading records failed.
    #[error("failed to read receipts: {0}")]
    Read(String),

    /// Query bounds could not be parsed.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Start of the range lies after its end.
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: String, end: String },
}

/// Errors from the notification collaborator.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The mail transport rejected or failed to deliver the message.
    #[error("failed to send email: {0}")]
    Transport(String),
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
