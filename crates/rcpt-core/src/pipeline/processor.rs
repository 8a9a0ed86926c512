//! Receipt processing entry point.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::event::S3Event;
use crate::clock::{Clock, SystemClock};
use crate::error::{RcptError, Result};
use crate::expense::ReceiptAssembler;
use crate::models::config::{OcrBackend, RcptConfig};
use crate::models::receipt::{ObjectLocation, ReceiptRecord};
use crate::notify::{EmailNotifier, OutboxTransport};
use crate::ocr::{ExpenseAnalyzer, HttpExpenseAnalyzer, RecordedExpenseAnalyzer};
use crate::persistence::{JsonFileRepository, ReceiptRepository};
use crate::storage::{LocalObjectStore, ObjectStore};

/// Message returned with every successful response.
pub const SUCCESS_MESSAGE: &str = "Receipt processed successfully";

/// Structured result of handling one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    /// 200 on success, 500 on failure.
    pub status_code: u16,
    pub body: HandlerBody,
}

/// Response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandlerBody {
    Success { message: String, receipt_id: String },
    Failure { error: String },
}

impl HandlerResponse {
    pub fn success(receipt_id: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: HandlerBody::Success {
                message: SUCCESS_MESSAGE.to_string(),
                receipt_id: receipt_id.into(),
            },
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: HandlerBody::Failure {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// The receipt id of a successful response.
    pub fn receipt_id(&self) -> Option<&str> {
        match &self.body {
            HandlerBody::Success { receipt_id, .. } => Some(receipt_id),
            HandlerBody::Failure { .. } => None,
        }
    }
}

/// Runs the verify, analyze, assemble, store, notify sequence for one object.
#[derive(Clone)]
pub struct ReceiptProcessor {
    store: Arc<dyn ObjectStore>,
    analyzer: Arc<dyn ExpenseAnalyzer>,
    repository: Arc<dyn ReceiptRepository>,
    notifier: Option<EmailNotifier>,
    assembler: ReceiptAssembler,
}

impl ReceiptProcessor {
    /// Create a processor without notifications.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        analyzer: Arc<dyn ExpenseAnalyzer>,
        repository: Arc<dyn ReceiptRepository>,
        assembler: ReceiptAssembler,
    ) -> Self {
        Self {
            store,
            analyzer,
            repository,
            notifier: None,
            assembler,
        }
    }

    /// Send a notification after each stored receipt.
    pub fn with_notifier(mut self, notifier: EmailNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build a processor from configuration, using the wall clock.
    pub fn from_config(config: &RcptConfig) -> Result<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Build a processor from configuration with an explicit time source.
    pub fn from_config_with_clock(config: &RcptConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = Arc::new(LocalObjectStore::new(&config.storage.root));

        let analyzer: Arc<dyn ExpenseAnalyzer> = match config.ocr.backend {
            OcrBackend::Recorded => Arc::new(RecordedExpenseAnalyzer::new(&config.ocr.responses_dir)),
            OcrBackend::Http => Arc::new(HttpExpenseAnalyzer::new(
                config.ocr.endpoint.clone(),
                Duration::from_secs(config.ocr.timeout_secs),
            )?),
        };

        let repository = Arc::new(JsonFileRepository::new(
            config.persistence.table_path(),
            clock.clone(),
        ));

        let mut processor = Self::new(
            store,
            analyzer,
            repository,
            ReceiptAssembler::with_clock(clock.clone()),
        );

        if config.notification.enabled {
            let transport = Arc::new(OutboxTransport::new(
                &config.notification.outbox_dir,
                clock,
            ));
            processor = processor.with_notifier(EmailNotifier::new(
                transport,
                config.notification.sender_email.clone(),
                config.notification.recipient_email.clone(),
            ));
        }

        Ok(processor)
    }

    pub fn repository(&self) -> &Arc<dyn ReceiptRepository> {
        &self.repository
    }

    /// Handle a trigger event and report the outcome as a response.
    pub async fn handle(&self, event: &S3Event) -> HandlerResponse {
        respond(self.process_event(event).await)
    }

    /// Handle a raw JSON event.
    pub async fn handle_json(&self, json: &str) -> HandlerResponse {
        match S3Event::from_json(json) {
            Ok(event) => self.handle(&event).await,
            Err(e) => respond(Err(RcptError::from(e))),
        }
    }

    /// Handle an object given directly by location; the key is used as is.
    pub async fn handle_object(&self, location: &ObjectLocation) -> HandlerResponse {
        respond(self.process_object(location).await)
    }

    /// Process the object named by the event's first record.
    pub async fn process_event(&self, event: &S3Event) -> Result<ReceiptRecord> {
        let location = event.location()?;
        self.process_object(&location).await
    }

    /// Process one stored object.
    ///
    /// Storage, OCR and persistence failures are returned unchanged; a failed
    /// notification is logged and does not affect the result.
    pub async fn process_object(&self, location: &ObjectLocation) -> Result<ReceiptRecord> {
        info!("Processing receipt from {}", location);

        self.store.head_object(location).await?;

        info!("Calling {} expense analysis for {}", self.analyzer.name(), location);
        let response = self.analyzer.analyze_expense(location).await.map_err(|e| {
            error!("Expense analysis failed: {}", e);
            e
        })?;

        let record = self.assembler.assemble(&response, location);
        info!(
            "Extracted receipt {}: vendor={} total={} items={}",
            record.receipt_id,
            record.vendor,
            record.total,
            record.items.len()
        );

        self.repository.put_receipt(&record).await?;

        if let Some(notifier) = &self.notifier {
            notifier.send_notification(&record).await;
        }

        info!("Successfully processed receipt: {}", record.receipt_id);
        Ok(record)
    }
}

fn respond(result: Result<ReceiptRecord>) -> HandlerResponse {
    match result {
        Ok(record) => HandlerResponse::success(record.receipt_id),
        Err(e) => {
            error!("Error processing receipt: {}", e);
            HandlerResponse::failure(e.to_string())
        }
    }
}
