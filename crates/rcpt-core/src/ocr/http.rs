//! AnalyzeExpense over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;

use super::ExpenseAnalyzer;
use crate::error::OcrError;
use crate::models::expense::AnalyzeExpenseResponse;
use crate::models::receipt::ObjectLocation;

const TARGET_HEADER: &str = "X-Amz-Target";
const ANALYZE_EXPENSE_TARGET: &str = "Textract.AnalyzeExpense";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AnalyzeExpenseRequest<'a> {
    document: DocumentRef<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DocumentRef<'a> {
    s3_object: S3ObjectRef<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct S3ObjectRef<'a> {
    bucket: &'a str,
    name: &'a str,
}

/// Client for an AnalyzeExpense-compatible JSON endpoint.
///
/// Requests are unsigned, so the endpoint is expected to be a local emulator
/// or a proxy that handles authentication.
pub struct HttpExpenseAnalyzer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpExpenseAnalyzer {
    /// Create a client for `endpoint` with the given request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcrError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ExpenseAnalyzer for HttpExpenseAnalyzer {
    async fn analyze_expense(
        &self,
        location: &ObjectLocation,
    ) -> Result<AnalyzeExpenseResponse, OcrError> {
        let request = AnalyzeExpenseRequest {
            document: DocumentRef {
                s3_object: S3ObjectRef {
                    bucket: &location.bucket,
                    name: &location.key,
                },
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(TARGET_HEADER, ANALYZE_EXPENSE_TARGET)
            .header(CONTENT_TYPE, AMZ_JSON)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OcrError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(OcrError::Service {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("AnalyzeExpense returned {} bytes", body.len());

        serde_json::from_str(&body).map_err(|e| OcrError::InvalidResponse(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
