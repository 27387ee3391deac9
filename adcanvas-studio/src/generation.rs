//! The seam to the AI generation backend.

use std::path::PathBuf;
use std::time::Duration;

use adcanvas_core::{DesignDocument, RegenerationScope};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// A regeneration request sent to the generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Which parts of the document the caller wants regenerated.
    pub scope: RegenerationScope,
    /// The document as it stood when the request was made.
    pub document: DesignDocument,
    /// Optional creative direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Produces full replacement documents; the studio merges them by scope.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a document for `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`]; retryable errors may be attempted again.
    async fn generate(&self, request: GenerationRequest)
        -> Result<DesignDocument, GenerationError>;
}

/// Serves a design document stored on disk as the generation result.
///
/// Used by the CLI to replay regenerations offline.
#[derive(Debug, Clone)]
pub struct FileGenerationService {
    path: PathBuf,
    latency: Duration,
}

impl FileGenerationService {
    /// Serve the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            latency: Duration::ZERO,
        }
    }

    /// Simulate a slow backend.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl GenerationService for FileGenerationService {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<DesignDocument, GenerationError> {
        tracing::debug!(
            "File generation ({}) from {}",
            request.scope,
            self.path.display()
        );
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| GenerationError::Unavailable(format!("{}: {e}", self.path.display())))?;
        DesignDocument::from_json(&text)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))
    }
}

/// Generation backend used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerationService;

#[async_trait]
impl GenerationService for OfflineGenerationService {
    async fn generate(
        &self,
        _request: GenerationRequest,
    ) -> Result<DesignDocument, GenerationError> {
        Err(GenerationError::Rejected(
            "no generation service configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcanvas_core::CanvasSize;

    fn request() -> GenerationRequest {
        GenerationRequest {
            scope: RegenerationScope::All,
            document: DesignDocument::new(CanvasSize::Square),
            prompt: None,
        }
    }

    #[tokio::test]
    async fn test_file_service_reads_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("result.json");
        let mut doc = DesignDocument::new(CanvasSize::Story);
        doc.background_color = "#abcdef".into();
        std::fs::write(&path, doc.to_json().expect("json")).expect("write");

        let service = FileGenerationService::new(&path);
        let result = service.generate(request()).await.expect("generate");
        assert_eq!(result, doc);
    }

    #[tokio::test]
    async fn test_file_service_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = FileGenerationService::new(dir.path().join("missing.json"));
        let err = missing.generate(request()).await.expect_err("missing");
        assert!(err.is_retryable());

        let path = dir.path().join("garbage.json");
        std::fs::write(&path, "{").expect("write");
        let err = FileGenerationService::new(&path)
            .generate(request())
            .await
            .expect_err("garbage");
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn test_request_serializes_scope() {
        let json = serde_json::to_value(GenerationRequest {
            scope: RegenerationScope::TextOnly,
            ..request()
        })
        .expect("json");
        assert_eq!(json["scope"], "text-only");
        assert!(json.get("prompt").is_none());
    }
}
