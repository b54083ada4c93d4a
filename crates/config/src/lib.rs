//! Configuration loading.
//!
//! Configuration is merged from (in increasing order of precedence):
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, chosen by extension),
//! 3. environment variables prefixed with `TGTRACKS_`, using `__` to separate
//!    nested keys (`TGTRACKS_TELEGRAM__BOT_TOKEN`).
//!
//! The configuration file is the one named by `TGTRACKS_CONFIG`, else
//! `tgtracks.toml` in the working directory, else `tgtracks.toml` in the
//! platform configuration directory. Running without any file is fine as long
//! as the environment provides the required keys.
//!
//! ```toml
//! [telegram]
//! bot_token = "123456:ABC-DEF"
//! chat_id = -1001234567890
//!
//! [tracks]
//! path = "/srv/music"
//! allowed_extensions = [".mp3", ".flac"]
//! performer_strip_dirs = 1
//! ```

pub mod error;
mod model;

pub use crate::model::{Config, DataConfig, LoggingConfig, MetadataConfig, TelegramConfig, TracksConfig};

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "TGTRACKS_CONFIG";
/// Prefix of environment variables overriding configuration values.
pub const ENV_PREFIX: &str = "TGTRACKS_";
/// Configuration file name looked up when [`CONFIG_ENV`] isn't set.
pub const CONFIG_FILE_NAME: &str = "tgtracks.toml";

/// Locate the configuration file and load it.
pub fn load() -> Result<Config> {
    let path = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path));
            }
            Some(path)
        },
        None => discover(),
    };
    load_from(path.as_deref())
}

/// Load configuration from an optional file plus the environment.
pub fn load_from(path: Option<&Path>) -> Result<Config> {
    let mut figment = Figment::new();
    if let Some(path) = path {
        tracing::debug!(path = %path.display(), "Loading configuration file");
        figment = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        };
    }
    let config: Config = figment
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
        .extract()
        .map_err(|e| exn::Exn::from(ErrorKind::Parse(e.to_string())))?;
    config.validate()
}

fn discover() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    ProjectDirs::from("", "", "tgtracks")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}
