//! Log output for the binaries.
//!
//! Everything goes to stdout, filtered by `RUST_LOG` (default `info`). When a
//! log directory is configured, the same events are also written without
//! colours to `{dir}/{binary}_{YYYYMMDD_HHMMSS}.log`.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const DEFAULT_FILTER: &str = "info";

/// Name of the log file for `binary` started at `started`.
pub fn log_file_name(binary: &str, started: OffsetDateTime) -> Result<String> {
    let format = format_description!("[year][month][day]_[hour][minute][second]");
    let timestamp = started.format(format).or_raise(|| ErrorKind::Logging)?;
    Ok(format!("{binary}_{timestamp}.log"))
}

/// Install the global subscriber. Returns the log file path, if any.
pub fn init(binary: &str, dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stdout = fmt::layer().with_target(false).with_filter(filter());

    let (file_layer, path) = match dir {
        Some(dir) => {
            fs::create_dir_all(dir).or_raise(|| ErrorKind::Logging)?;
            let started = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
            let path = dir.join(log_file_name(binary, started)?);
            let file = File::create(&path).or_raise(|| ErrorKind::Logging)?;
            let layer = fmt::layer().with_ansi(false).with_writer(Arc::new(file)).with_filter(filter());
            (Some(layer), Some(path))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout)
        .with(file_layer)
        .try_init()
        .or_raise(|| ErrorKind::Logging)?;
    Ok(path)
}
