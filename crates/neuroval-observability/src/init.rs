// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always installed. With a log directory configured (and
//! the `file-logging` feature), every run also gets its own folder of JSON
//! log files, one per crate plus a combined one. Old run folders are pruned
//! by age and count.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use neuroval_config::LoggingConfig;
use tracing::{debug, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps file writers alive; logs are flushed when it is dropped
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    run_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Folder of this run's log files, when file logging is active
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }
}

impl std::fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingGuard")
            .field("run_dir", &self.run_dir)
            .finish()
    }
}

/// Install console logging at `level` (trace, debug, info, warn, error)
pub fn init_console_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log level: {}", level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install console logging: {}", e))
}

/// Install logging as described by `config`.
///
/// Crates named in `config.debug_crates` or `debug_flags` log at `debug`,
/// everything else at `config.level`. With `config.log_dir` set, a run folder
/// is created under it:
/// ```text
/// ./logs/
///   └── run_20250101_120000_000/
///       ├── neuroval-measurement.log
///       ├── neuroval-parameters.log
///       └── combined.log
/// ```
pub fn init_logging(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    let mut flags = debug_flags.clone();
    for crate_name in &config.debug_crates {
        flags.enable(crate_name);
    }
    let filter = flags.to_filter_string(&config.level);

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(
            EnvFilter::try_new(&filter)
                .with_context(|| format!("Invalid log filter: {}", filter))?,
        )
        .boxed();
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let (file_guards, run_dir) = match &config.log_dir {
        Some(base) => {
            let (per_file, guards, run_dir) = file_layers(base, config, &flags, &filter)?;
            layers.extend(per_file);
            (guards, Some(run_dir))
        }
        None => (Vec::new(), None),
    };
    #[cfg(not(feature = "file-logging"))]
    let run_dir: Option<PathBuf> = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install the global tracing subscriber")?;

    match (&config.log_dir, &run_dir) {
        (Some(base), Some(run_dir)) => {
            debug!(target: "neuroval-observability", "Logging to {}", run_dir.display());
            let removed = prune_log_runs(base, config.retention_days, config.max_runs)?;
            if !removed.is_empty() {
                debug!(
                    target: "neuroval-observability",
                    "Removed {} old log runs from {}",
                    removed.len(),
                    base.display()
                );
            }
        }
        (Some(base), None) => warn!(
            target: "neuroval-observability",
            "Log directory {} ignored: the 'file-logging' feature is not enabled",
            base.display()
        ),
        _ => {}
    }

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        run_dir,
    })
}

#[cfg(feature = "file-logging")]
fn file_layers(
    base: &Path,
    config: &LoggingConfig,
    flags: &CrateDebugFlags,
    filter: &str,
) -> Result<(
    Vec<BoxedLayer>,
    Vec<tracing_appender::non_blocking::WorkerGuard>,
    PathBuf,
)> {
    use tracing_appender::rolling;
    use tracing_subscriber::filter::filter_fn;

    let run_dir = base.join(run_folder_name(Utc::now()));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create log directory: {}", run_dir.display()))?;

    let default_level: tracing::Level = config
        .level
        .parse()
        .with_context(|| format!("Invalid log level: {}", config.level))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guards = Vec::new();

    // Exact target match: "neuroval" must not also collect the other crates
    for crate_name in crate::KNOWN_CRATES {
        let level = if flags.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            default_level
        };
        let appender = rolling::never(&run_dir, format!("{}.log", crate_name));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(filter_fn(move |metadata| {
                metadata.target() == *crate_name && *metadata.level() <= level
            }))
            .boxed();
        layers.push(layer);
    }

    let appender = rolling::never(&run_dir, "combined.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    guards.push(guard);
    let combined = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_filter(
            EnvFilter::try_new(filter).with_context(|| format!("Invalid log filter: {}", filter))?,
        )
        .boxed();
    layers.push(combined);

    Ok((layers, guards, run_dir))
}

fn run_folder_name(now: DateTime<Utc>) -> String {
    format!(
        "{}{}_{:03}",
        RUN_PREFIX,
        now.format(RUN_TIMESTAMP),
        now.timestamp_subsec_millis()
    )
}

/// Start time of a run folder, from its name
fn run_started(dir_name: &str) -> Option<DateTime<Utc>> {
    let stamp = dir_name.strip_prefix(RUN_PREFIX)?.get(..15)?;
    let naive = NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Remove run folders under `base` older than `retention_days`, then all but
/// the `max_runs` most recent. Returns the removed folders.
pub fn prune_log_runs(base: &Path, retention_days: u64, max_runs: usize) -> Result<Vec<PathBuf>> {
    prune_log_runs_at(base, retention_days, max_runs, Utc::now())
}

fn prune_log_runs_at(
    base: &Path,
    retention_days: u64,
    max_runs: usize,
    now: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    if !base.exists() {
        return Ok(Vec::new());
    }

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base)
        .with_context(|| format!("Failed to read log directory: {}", base.display()))?
    {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let started = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(run_started);
        if let Some(started) = started {
            runs.push((path, started));
        }
    }
    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    let cutoff = now - Duration::days(retention_days as i64);
    let mut removed = Vec::new();
    for (position, (path, started)) in runs.into_iter().enumerate() {
        if started >= cutoff && position < max_runs {
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => removed.push(path),
            Err(e) => warn!(
                target: "neuroval-observability",
                "Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }
    Ok(removed)
}
