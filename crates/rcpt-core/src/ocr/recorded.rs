//! Replay of saved AnalyzeExpense responses.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::ExpenseAnalyzer;
use crate::error::OcrError;
use crate::models::expense::AnalyzeExpenseResponse;
use crate::models::receipt::ObjectLocation;
use crate::storage::object_path;

/// Serves responses saved as `<dir>/<bucket>/<key>.json`.
#[derive(Debug, Clone)]
pub struct RecordedExpenseAnalyzer {
    dir: PathBuf,
}

impl RecordedExpenseAnalyzer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn response_path(&self, location: &ObjectLocation) -> Option<PathBuf> {
        let mut path = object_path(&self.dir, location)?.into_os_string();
        path.push(".json");
        Some(PathBuf::from(path))
    }
}

#[async_trait]
impl ExpenseAnalyzer for RecordedExpenseAnalyzer {
    async fn analyze_expense(
        &self,
        location: &ObjectLocation,
    ) -> Result<AnalyzeExpenseResponse, OcrError> {
        let path = self
            .response_path(location)
            .ok_or_else(|| OcrError::NotRecorded(location.to_string()))?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OcrError::NotRecorded(location.to_string()));
            }
            Err(e) => return Err(OcrError::Transport(e.to_string())),
        };

        debug!("Replaying recorded response {}", path.display());

        serde_json::from_str(&content).map_err(|e| OcrError::InvalidResponse(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "recorded"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_saved_response() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bucket/2024")).unwrap();
        std::fs::write(
            dir.path().join("bucket/2024/r.jpg.json"),
            r#"{"ExpenseDocuments":[{}]}"#,
        )
        .unwrap();

        let analyzer = RecordedExpenseAnalyzer::new(dir.path());
        let response = analyzer
            .analyze_expense(&ObjectLocation::new("bucket", "2024/r.jpg"))
            .await
            .unwrap();

        assert_eq!(response.document_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_recording() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = RecordedExpenseAnalyzer::new(dir.path());

        let err = analyzer
            .analyze_expense(&ObjectLocation::new("bucket", "r.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, OcrError::NotRecorded(_)));
    }

    #[tokio::test]
    async fn test_corrupt_recording() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bucket")).unwrap();
        std::fs::write(dir.path().join("bucket/r.jpg.json"), "not json").unwrap();

        let analyzer = RecordedExpenseAnalyzer::new(dir.path());
        let err = analyzer
            .analyze_expense(&ObjectLocation::new("bucket", "r.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, OcrError::InvalidResponse(_)));
    }
}
