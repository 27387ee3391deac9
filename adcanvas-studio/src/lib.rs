//! # Adcanvas Studio
//!
//! Async host for the canvas editor: talks to the AI generation backend,
//! keeps the canvas locked while a regeneration is pending, and unlocks it
//! after a panic timeout even if the backend never answers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐      ┌─────────────────────────────┐      ┌────────────────────┐
//! │ CLI / script │─────▶│ Studio                      │─────▶│ GenerationService  │
//! │ runner       │      │  Arc<Mutex<DocumentEditor>> │◀─────│ (async, retryable) │
//! └──────────────┘      │  Renderer (preview/export)  │      └────────────────────┘
//!                       └─────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod payload;
pub mod script;
pub mod studio;

pub use config::{RetryConfig, StudioConfig, DEFAULT_PANIC_TIMEOUT_MS};
pub use error::{GenerationError, StudioError, StudioResult};
pub use generation::{
    FileGenerationService, GenerationRequest, GenerationService, OfflineGenerationService,
};
pub use script::{parse_script, ScriptRunner, ScriptStep, StepReport};
pub use studio::Studio;
