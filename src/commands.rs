//! What each binary does once configuration and logging are in place.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tgtracks_config::{Config, TracksConfig};
use tgtracks_extract::{LoftyReader, MetadataBuilder};
use tgtracks_ledger::{JsonFile, POSTED_MESSAGES, PROCESSED_TRACKS, PostedMessages, ProcessedTracks};
use tgtracks_library::{Breakdown, RunOutcome, TrackFile, UploadSettings, Uploader, discover, write_export};
use tgtracks_telegram::BotApiClient;
use tracing::instrument;

fn upload_settings(tracks: &TracksConfig) -> UploadSettings {
    UploadSettings {
        marker_strip_dirs: tracks.marker_strip_dirs,
        marker_separator: tracks.marker_separator.clone(),
        pin_markers: tracks.pin_markers,
        pin_cooldown: Duration::from_secs(tracks.pin_cooldown_secs),
        max_file_size: tracks.max_file_size_bytes(),
    }
}

fn metadata_builder(tracks: &TracksConfig) -> MetadataBuilder {
    let thumbnail = tracks.default_thumbnail_path.as_deref().and_then(MetadataBuilder::load_default_thumbnail);
    MetadataBuilder::new()
        .with_performer_path(tracks.performer_strip_dirs, tracks.performer_separator.clone())
        .with_default_thumbnail(thumbnail)
}

async fn candidates(tracks: &TracksConfig) -> Result<Vec<TrackFile>> {
    discover(&tracks.path, &tracks.allowed_extensions)
        .await
        .or_raise(|| ErrorKind::Library(tracks.path.clone()))
}

fn open_ledgers(data_dir: &Path) -> Result<(ProcessedTracks, PostedMessages)> {
    let path = data_dir.join(PROCESSED_TRACKS);
    let processed = ProcessedTracks::open(JsonFile::new(&path), true).or_raise(|| ErrorKind::Ledger(path.clone()))?;
    let path = data_dir.join(POSTED_MESSAGES);
    let messages = PostedMessages::open(JsonFile::new(&path), true).or_raise(|| ErrorKind::Ledger(path.clone()))?;
    tracing::info!(processed = processed.len(), messages = messages.len(), "Ledgers loaded");
    Ok((processed, messages))
}

/// Upload every file not uploaded by a previous run.
///
/// A run halted by an oversized file still counts as a success.
#[instrument(skip_all, fields(root = %config.tracks.path.display()))]
pub async fn upload(config: Config) -> Result<()> {
    let (processed, messages) = open_ledgers(&config.data.dir)?;
    let telegram = &config.telegram;
    let chat = BotApiClient::new(&telegram.api_url, &telegram.bot_token, telegram.chat_id.clone())
        .or_raise(|| ErrorKind::Chat)?;
    let files = candidates(&config.tracks).await?;

    let mut uploader = Uploader::new(Arc::new(chat), Arc::new(LoftyReader::new()), processed, messages)
        .with_metadata(metadata_builder(&config.tracks))
        .with_settings(upload_settings(&config.tracks));
    match uploader.run(&files).await.or_raise(|| ErrorKind::Upload)? {
        RunOutcome::Completed { uploaded, skipped } => tracing::info!(uploaded, skipped, "All files processed"),
        RunOutcome::Halted { path, uploaded } => {
            tracing::warn!(path = %path.display(), uploaded, "Run halted before the end of the library")
        },
    }
    Ok(())
}

/// Write the tags of every file to the configured JSON file.
#[instrument(skip_all, fields(output = %config.metadata.output.display()))]
pub async fn export_metadata(config: Config) -> Result<()> {
    let files = candidates(&config.tracks).await?;
    let reader = LoftyReader::new();
    let dumps = tgtracks_library::export_metadata(
        &files,
        &reader,
        config.tracks.marker_strip_dirs,
        config.metadata.include_base64_artwork,
    );
    write_export(&config.metadata.output, &dumps).or_raise(|| ErrorKind::Export)
}

/// Log the total playing time of the library.
#[instrument(skip_all)]
pub async fn total_time(config: Config) -> Result<()> {
    let files = candidates(&config.tracks).await?;
    let summary = tgtracks_library::total_duration(&files, &LoftyReader::new());
    let total = summary.estimated_total();
    tracing::info!(
        with_duration = summary.with_duration,
        without_duration = summary.without_duration,
        total_secs = total.as_secs(),
        "Durations read"
    );
    tracing::info!("{}", Breakdown::from(total));
    Ok(())
}
