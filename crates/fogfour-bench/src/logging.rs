use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{Level, event};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use fogfour_bot::SearchConfig;

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Keeps the background log writer alive; dropping it flushes pending events.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Installs a JSON subscriber writing next to the summary file as `telemetry.jsonl`.
/// The first event records the search settings every decision of the run will use.
///
/// Returns `None` when structured logging is disabled in the config.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
    search: &SearchConfig,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_dir = outputs
        .summary_md
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&telemetry_dir).with_context(|| {
        format!(
            "creating telemetry directory at {}",
            telemetry_dir.display()
        )
    })?;

    let telemetry_path = telemetry_dir.join("telemetry.jsonl");
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // Integration tests may have installed one already.
    let _ = tracing::subscriber::set_global_default(subscriber);

    event!(
        target: "fogfour_bench::run",
        Level::INFO,
        run_id,
        telemetry = %telemetry_path.display(),
        shallow_depth = search.shallow_depth,
        deep_depth = search.deep_depth,
        deep_after = search.deep_after,
        prune_threshold = search.prune_threshold,
        time_cap_ms = search.time_cap_ms,
        "self-play telemetry started"
    );

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_creates_no_telemetry_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let logging = LoggingConfig::default();
        let outputs = ResolvedOutputs {
            jsonl: dir.path().join("games.jsonl"),
            summary_md: dir.path().join("out").join("summary.md"),
        };

        let guard = init_logging(&logging, &outputs, "quiet", &SearchConfig::default())
            .expect("disabled logging never fails");
        assert!(guard.is_none());
        assert!(!dir.path().join("out").exists());
    }
}
