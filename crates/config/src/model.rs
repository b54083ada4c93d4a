use crate::error::{ErrorKind, Result};
use serde::Deserialize;
use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;
use tgtracks_telegram::{ChatId, DEFAULT_API_URL};

const MIB: u64 = 1024 * 1024;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub tracks: TracksConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
}

#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Destination channel.
    pub chat_id: ChatId,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

// Keep the token out of logs.
impl Debug for TelegramConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracksConfig {
    /// Root of the directory tree to upload.
    pub path: PathBuf,
    /// File name suffixes to upload, matched case-insensitively.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Thumbnail for files without embedded artwork.
    #[serde(default)]
    pub default_thumbnail_path: Option<PathBuf>,
    /// Leading directories to ignore when the performer is derived from a path.
    #[serde(default)]
    pub performer_strip_dirs: usize,
    #[serde(default = "default_performer_separator")]
    pub performer_separator: String,
    /// Leading directories to ignore in directory marker messages.
    #[serde(default)]
    pub marker_strip_dirs: usize,
    #[serde(default = "default_marker_separator")]
    pub marker_separator: String,
    #[serde(default = "default_true")]
    pub pin_markers: bool,
    /// Seconds to wait after pinning a marker.
    #[serde(default = "default_pin_cooldown_secs")]
    pub pin_cooldown_secs: u64,
    /// Files larger than this halt the run.
    #[serde(default = "default_max_file_size_mib")]
    pub max_file_size_mib: u64,
}

impl TracksConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mib.saturating_mul(MIB)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Directory holding the ledger files.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { dir: default_data_dir() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// When set, logs are also written to a timestamped file in this directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    #[serde(default)]
    pub include_base64_artwork: bool,
    /// Where the metadata export is written.
    #[serde(default = "default_metadata_output")]
    pub output: PathBuf,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            include_base64_artwork: false,
            output: default_metadata_output(),
        }
    }
}

impl Config {
    /// Reject values nothing downstream can work with, and normalize the
    /// extension list to lowercase.
    pub(crate) fn validate(mut self) -> Result<Self> {
        if self.telegram.bot_token.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("telegram.bot_token must not be empty"));
        }
        self.tracks.allowed_extensions = self
            .tracks
            .allowed_extensions
            .iter()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if self.tracks.allowed_extensions.is_empty() {
            exn::bail!(ErrorKind::Invalid("tracks.allowed_extensions must not be empty"));
        }
        if self.tracks.max_file_size_mib == 0 {
            exn::bail!(ErrorKind::Invalid("tracks.max_file_size_mib must be greater than zero"));
        }
        Ok(self)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".mp3".to_string()]
}

fn default_performer_separator() -> String {
    " - ".to_string()
}

fn default_marker_separator() -> String {
    " -> ".to_string()
}

fn default_true() -> bool {
    true
}

fn default_pin_cooldown_secs() -> u64 {
    90
}

fn default_max_file_size_mib() -> u64 {
    2000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_metadata_output() -> PathBuf {
    PathBuf::from("data/files-metadata.json")
}
