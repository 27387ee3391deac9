//! Studio configuration.
//!
//! Loaded from an optional JSON file, then overridden by command-line flags
//! and environment variables (see [`CliArgs`](crate::cli::CliArgs)).

use std::path::Path;
use std::time::Duration;

use adcanvas_core::EditorConfig;
use adcanvas_renderer::RenderConfig;
use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};

/// Default ceiling after which an unresolved regeneration unlocks the canvas.
pub const DEFAULT_PANIC_TIMEOUT_MS: u64 = 45_000;

/// Top-level studio configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Milliseconds before a pending regeneration is abandoned.
    pub panic_timeout_ms: u64,
    /// Editor tunables.
    pub editor: EditorConfig,
    /// Renderer settings used for previews and export.
    pub render: RenderConfig,
    /// Retry policy for transient generation failures.
    pub retry: RetryConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            panic_timeout_ms: DEFAULT_PANIC_TIMEOUT_MS,
            editor: EditorConfig::default(),
            render: RenderConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl StudioConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> StudioResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| StudioError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        tracing::debug!("Loaded studio config from {}", path.display());
        Ok(config)
    }

    /// Reject settings the editor cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Config`] describing the first bad value.
    pub fn validate(&self) -> StudioResult<()> {
        if self.panic_timeout_ms == 0 {
            return Err(StudioError::Config(
                "panic_timeout_ms must be positive".to_string(),
            ));
        }
        if self.editor.history_depth == 0 {
            return Err(StudioError::Config(
                "editor.history_depth must be at least 1".to_string(),
            ));
        }
        if !(self.editor.min_width.is_finite() && self.editor.min_width > 0.0) {
            return Err(StudioError::Config(
                "editor.min_width must be a positive number".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(StudioError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The panic-unlock ceiling.
    #[must_use]
    pub fn panic_timeout(&self) -> Duration {
        Duration::from_millis(self.panic_timeout_ms)
    }
}

/// Configuration for retry with exponential backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Initial delay between retries in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            max_delay_ms: 8_000,
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Calculate delay for a given attempt number (0-indexed).
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64).max(0.0) as u64;
        Duration::from_millis(capped_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StudioConfig::default();
        assert_eq!(config.panic_timeout(), Duration::from_secs(45));
        assert_eq!(config.editor.history_depth, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: StudioConfig =
            serde_json::from_str(r#"{"panic_timeout_ms": 1000, "editor": {"snap_threshold": 3.0}}"#)
                .expect("parse");
        assert_eq!(config.panic_timeout_ms, 1000);
        assert!((config.editor.snap_threshold - 3.0).abs() < f32::EPSILON);
        assert!((config.editor.min_width - 5.0).abs() < f32::EPSILON);
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = StudioConfig {
            panic_timeout_ms: 0,
            ..StudioConfig::default()
        };
        assert!(matches!(config.validate(), Err(StudioError::Config(_))));
    }

    #[test]
    fn test_backoff_is_capped() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(retry.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(retry.delay_for_attempt(10), Duration::from_millis(8000));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("studio.json");
        std::fs::write(&path, r#"{"retry": {"max_attempts": 5}}"#).expect("write");
        let config = StudioConfig::from_file(&path).expect("load");
        assert_eq!(config.retry.max_attempts, 5);

        std::fs::write(&path, "not json").expect("write");
        assert!(matches!(
            StudioConfig::from_file(&path),
            Err(StudioError::Config(_))
        ));
    }
}
