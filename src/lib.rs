//! Upload a directory tree of audio tracks to a Telegram channel.
//!
//! The binaries are thin wrappers around the commands in this crate:
//! - `tgtracks`: [`upload`](commands::upload), the resumable upload run,
//! - `tgtracks-metadata`: [`export_metadata`](commands::export_metadata),
//! - `tgtracks-total-time`: [`total_time`](commands::total_time).

pub mod commands;
pub mod error;
pub mod logging;

use std::process::ExitCode;

/// Load the configuration, set up logging, then run `command`.
///
/// Logging is set up even when the configuration can't be loaded, so that
/// the reason gets logged.
pub async fn run<F, Fut>(binary: &str, command: F) -> ExitCode
where
    F: FnOnce(tgtracks_config::Config) -> Fut,
    Fut: Future<Output = error::Result<()>>,
{
    let config = tgtracks_config::load();
    let log_dir = config.as_ref().ok().and_then(|c| c.logging.dir.clone());
    match logging::init(binary, log_dir.as_deref()) {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "Logging to file"),
        Ok(None) => {},
        Err(e) => {
            eprintln!("{e:?}");
            return ExitCode::FAILURE;
        },
    }
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = ?e, "Cannot load configuration");
            return ExitCode::FAILURE;
        },
    };
    match command(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "Exiting with an error");
            ExitCode::FAILURE
        },
    }
}
