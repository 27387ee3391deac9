//! # Adcanvas CLI
//!
//! Opens a design document, replays an editing script against it, and
//! writes the result as JSON plus any requested exports.

use adcanvas_studio::cli::{self, CliArgs};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,adcanvas_core=debug,adcanvas_studio=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,adcanvas_core=debug,adcanvas_studio=debug"));

    // Logs go to stderr; stdout carries the document.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let summary = cli::run(&args).await?;

    let failed = summary.steps.iter().filter(|s| s.error.is_some()).count();
    if failed > 0 {
        tracing::warn!("{failed} regeneration step(s) failed");
    }
    if args.output.is_none() {
        println!("{}", summary.document.to_json()?);
    }
    Ok(())
}
