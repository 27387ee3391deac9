//! Command-line interface for the `adcanvas` binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adcanvas_core::{CanvasSize, DesignDocument};
use adcanvas_renderer::{ExportConfig, ExportFormat};
use clap::{Parser, ValueEnum};

use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::generation::{FileGenerationService, GenerationService, OfflineGenerationService};
use crate::script::{parse_script, ScriptRunner, StepReport};
use crate::studio::Studio;

/// Canvas aspect ratio for a blank document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SizeArg {
    /// 1080 × 1350 (4:5).
    Portrait,
    /// 1080 × 1920 (9:16).
    Story,
    /// 1080 × 1080 (1:1).
    Square,
}

impl From<SizeArg> for CanvasSize {
    fn from(value: SizeArg) -> Self {
        match value {
            SizeArg::Portrait => Self::Portrait,
            SizeArg::Story => Self::Story,
            SizeArg::Square => Self::Square,
        }
    }
}

/// Replay editing scripts against an ad design and export the result.
#[derive(Debug, Clone, Parser)]
#[command(name = "adcanvas", version, about)]
pub struct CliArgs {
    /// Design document to open (JSON). A blank canvas is created when absent.
    #[arg(short, long, env = "ADCANVAS_DOCUMENT")]
    pub input: Option<PathBuf>,

    /// Canvas size for a blank document.
    #[arg(long, value_enum, default_value_t = SizeArg::Portrait)]
    pub size: SizeArg,

    /// Editing script: a JSON array of steps.
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Write the resulting document here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export the final design; the format follows the extension (svg, png, jpg).
    #[arg(long = "export", value_name = "PATH")]
    pub exports: Vec<PathBuf>,

    /// Scale factor for raster exports.
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// Write the per-step report (JSON) here.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Studio configuration file (JSON).
    #[arg(short, long, env = "ADCANVAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Document returned by every regeneration step.
    #[arg(long, env = "ADCANVAS_GENERATOR")]
    pub generator: Option<PathBuf>,

    /// Override the panic-unlock ceiling, in seconds.
    #[arg(long, env = "ADCANVAS_PANIC_TIMEOUT_SECS")]
    pub panic_timeout_secs: Option<u64>,
}

impl CliArgs {
    /// Build the studio configuration: file first, then flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or a value is invalid.
    pub fn studio_config(&self) -> StudioResult<StudioConfig> {
        let mut config = match &self.config {
            Some(path) => StudioConfig::from_file(path)?,
            None => StudioConfig::default(),
        };
        if let Some(secs) = self.panic_timeout_secs {
            config.panic_timeout_ms = secs.saturating_mul(1000);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Everything a CLI run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The final document.
    pub document: DesignDocument,
    /// One entry per script step.
    pub steps: Vec<StepReport>,
    /// Files written by `--export`.
    pub exported: Vec<PathBuf>,
}

/// Execute a CLI invocation.
///
/// # Errors
///
/// Returns an error if any input cannot be read, a script step fails, or an
/// output cannot be written.
pub async fn run(args: &CliArgs) -> StudioResult<RunSummary> {
    let config = args.studio_config()?;
    let document = match &args.input {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            DesignDocument::from_json(&text)?
        }
        None => DesignDocument::new(args.size.into()),
    };
    document.validate()?;

    let service: Arc<dyn GenerationService> = match &args.generator {
        Some(path) => Arc::new(FileGenerationService::new(path)),
        None => Arc::new(OfflineGenerationService),
    };
    let studio = Studio::new(document, service, config);

    let steps = match &args.script {
        Some(path) => {
            let script = parse_script(&tokio::fs::read_to_string(path).await?)?;
            tracing::info!("Replaying {} steps from {}", script.len(), path.display());
            ScriptRunner::new().run(&studio, &script).await?
        }
        None => Vec::new(),
    };
    studio.settle_late_results().await;

    let events = studio.drain_events();
    tracing::debug!("Script produced {} editor events", events.len());

    let document = studio.document();
    if let Some(path) = &args.output {
        tokio::fs::write(path, document.to_json()?).await?;
        tracing::info!("Wrote document to {}", path.display());
    }
    if let Some(path) = &args.report {
        tokio::fs::write(path, serde_json::to_string_pretty(&steps)?).await?;
    }

    let export = ExportConfig {
        scale: args.scale,
        ..ExportConfig::default()
    };
    let mut exported = Vec::with_capacity(args.exports.len());
    for path in &args.exports {
        let format = export_format(path)?;
        let bytes = studio.export(format, &export)?;
        tokio::fs::write(path, bytes).await?;
        tracing::info!("Exported {:?} to {}", format, path.display());
        exported.push(path.clone());
    }

    Ok(RunSummary {
        document,
        steps,
        exported,
    })
}

fn export_format(path: &Path) -> StudioResult<ExportFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension)
        .ok_or_else(|| {
            StudioError::Config(format!(
                "cannot infer export format from {}",
                path.display()
            ))
        })
}
