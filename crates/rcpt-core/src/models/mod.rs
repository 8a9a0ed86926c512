//! Data models: raw OCR payload, canonical receipt, configuration.

pub mod config;
pub mod expense;
pub mod receipt;
