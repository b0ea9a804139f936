//! Logging setup: compact terminal output, plus rotating text and JSON log
//! files when a log directory is given.
//!
//! `RUST_LOG` controls filtering (default: `info`, with the browser driver
//! held at `warn` because it reports every unknown CDP event).

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_FILTER: &str = "info,chromiumoxide=warn";

/// Keeps the background log writers alive; drop it only at process exit.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the tracing subscriber.
///
/// Without `log_dir` only the terminal layer is installed. With it, two more
/// layers write `catalog_diff.log` (text) and `catalog_diff.json.log` (JSON)
/// into that directory, rotated daily.
///
/// Fails if the directory cannot be created or a subscriber is already set.
pub fn init_logging(log_dir: Option<&Path>) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    let mut guards = Vec::new();

    let writers = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let (text_writer, text_guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "catalog_diff.log"));
            let (json_writer, json_guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "catalog_diff.json.log"));
            guards.push(text_guard);
            guards.push(json_guard);
            Some((text_writer, json_writer))
        }
        None => None,
    };
    let (text_writer, json_writer) = writers.unzip();

    let text_layer = text_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_line_number(true)
            .with_ansi(false)
            .compact()
            .with_filter(env_filter())
    });

    let json_layer = json_writer.map(|writer| {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_line_number(true)
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(env_filter())
    });

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(text_layer)
        .with(json_layer)
        .with(stdout_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        tracing::debug!("Writing logs to {}", dir.display());
    }

    Ok(LoggingGuard { _guards: guards })
}
