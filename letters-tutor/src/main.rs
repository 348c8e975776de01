//! # Letters Tutor
//!
//! Command-line host: replays drawings through a lesson, or exports what the
//! classifier would see.

use std::path::Path;

use clap::Parser;
use letters_renderer::{Rasterizer, SnapshotExporter};
use letters_tutor::{replay, Action, CliArgs, DrawingScript, Tutor, TutorConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing, with JSON output when `RUST_LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,letters_tutor=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

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
    let config = TutorConfig::from(&args);

    match args.action {
        Action::Lesson { drawings } => run_lesson(config, &drawings).await,
        Action::Rasterize {
            drawings,
            attempt,
            out,
        } => export_attempt(&config, &drawings, attempt, &out),
    }
}

/// Replay a drawing script through a fresh lesson.
async fn run_lesson(mut config: TutorConfig, drawings: &Path) -> anyhow::Result<()> {
    let script = DrawingScript::load(drawings)?;
    config.canvas = script.canvas;

    tracing::info!(
        model = %config.model.display(),
        curriculum = ?config.lesson.curriculum,
        threshold = config.lesson.confidence_threshold,
        attempts = script.attempts.len(),
        "Starting lesson replay"
    );

    let tutor = Tutor::from_config(&config)?;
    let outcome = replay(tutor, &script).await?;

    for event in &outcome.events {
        tracing::info!(event = event.name(), "{}", event.message());
    }
    tracing::info!(state = ?outcome.state, "Lesson replay finished");
    Ok(())
}

/// Write the classifier's view of one attempt to an image file.
fn export_attempt(
    config: &TutorConfig,
    drawings: &Path,
    attempt: usize,
    out: &Path,
) -> anyhow::Result<()> {
    let script = DrawingScript::load(drawings)?;
    let strokes = script.attempt(attempt)?.strokes(script.canvas)?;

    let buffer = Rasterizer::new(config.raster.clone()).rasterize(&strokes, script.canvas)?;
    SnapshotExporter::default().write_to(&buffer, out)?;

    tracing::info!(
        attempt,
        strokes = strokes.len(),
        width = buffer.width(),
        height = buffer.height(),
        out = %out.display(),
        "Attempt rasterized"
    );
    Ok(())
}
