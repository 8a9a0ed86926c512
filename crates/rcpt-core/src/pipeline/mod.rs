//! Event-driven processing pipeline.

mod event;
mod processor;

pub use event::{S3Event, S3EventRecord, unquote_plus};
pub use processor::{HandlerBody, HandlerResponse, ReceiptProcessor, SUCCESS_MESSAGE};
