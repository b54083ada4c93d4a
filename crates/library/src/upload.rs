//! The upload run.
//!
//! Files are handled strictly one after the other. For each file:
//! 1. skip it if the processed tracks ledger already has it,
//! 2. post (and pin) a directory marker if it's in a different directory
//!    than the previous file handled,
//! 3. stop the run if it's too big to upload,
//! 4. read its tags, falling back on its path when they're unusable,
//! 5. upload it, riding out rate limits,
//! 6. record it in both ledgers.
//!
//! Any other failure is reported to the chat (best effort) and ends the run.

use crate::display::{format_duration, human_readable_size};
use crate::error::{Error, ErrorKind, Result};
use crate::progress::ProgressReporter;
use crate::retry::{Margin, with_backoff};
use crate::walk::TrackFile;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tgtracks_extract::error::ErrorKind as ExtractErrorKind;
use tgtracks_extract::{MetadataBuilder, TagData, TagReader, path_segments};
use tgtracks_ledger::{PostedMessage, PostedMessages, ProcessedTracks};
use tgtracks_telegram::{AudioUpload, ChatClient, TransferProgress};
use tracing::instrument;

/// Knobs for an upload run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    /// Leading directories left out of directory markers.
    pub marker_strip_dirs: usize,
    pub marker_separator: String,
    pub pin_markers: bool,
    /// Pause after pinning a marker.
    pub pin_cooldown: Duration,
    /// Largest file that will be uploaded, in bytes.
    pub max_file_size: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            marker_strip_dirs: 0,
            marker_separator: " -> ".to_string(),
            pin_markers: true,
            pin_cooldown: Duration::from_secs(90),
            max_file_size: 2000 * 1024 * 1024,
        }
    }
}

/// How a run that didn't fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every file was handled.
    Completed { uploaded: usize, skipped: usize },
    /// A file was too big to upload; it needs to be posted by hand and added
    /// to the ledgers before running again.
    Halted { path: PathBuf, uploaded: usize },
}

enum Step {
    Uploaded,
    TooBig,
}

/// Drives an upload run, owning both ledgers for its duration.
pub struct Uploader {
    chat: Arc<dyn ChatClient>,
    reader: Arc<dyn TagReader>,
    metadata: MetadataBuilder,
    processed: ProcessedTracks,
    messages: PostedMessages,
    settings: UploadSettings,
}

impl Uploader {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        reader: Arc<dyn TagReader>,
        processed: ProcessedTracks,
        messages: PostedMessages,
    ) -> Self {
        Self {
            chat,
            reader,
            metadata: MetadataBuilder::new(),
            processed,
            messages,
            settings: UploadSettings::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataBuilder) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_settings(mut self, settings: UploadSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn processed(&self) -> &ProcessedTracks {
        &self.processed
    }

    pub fn messages(&self) -> &PostedMessages {
        &self.messages
    }

    /// Upload every file not already processed, in order.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn run(&mut self, files: &[TrackFile]) -> Result<RunOutcome> {
        let mut last_dir: Option<&Path> = None;
        let (mut uploaded, mut skipped) = (0, 0);
        for (index, file) in files.iter().enumerate() {
            if self.processed.exists(&file.path) {
                tracing::debug!(path = %file.path.display(), "Skipping file: already processed");
                skipped += 1;
                continue;
            }
            let dir = file.relative.parent().unwrap_or(Path::new(""));
            let result = match last_dir == Some(dir) {
                true => self.upload(file, index, files.len()).await,
                false => match self.post_marker(file).await {
                    Ok(()) => {
                        last_dir = Some(dir);
                        self.upload(file, index, files.len()).await
                    },
                    Err(err) => Err(err),
                },
            };
            match result {
                Ok(Step::Uploaded) => uploaded += 1,
                Ok(Step::TooBig) => {
                    tracing::warn!("Exiting");
                    return Ok(RunOutcome::Halted { path: file.path.clone(), uploaded });
                },
                Err(err) => {
                    tracing::error!(path = %file.path.display(), error = ?err, "An error occurred while processing a file");
                    self.notify_failure(file, &err).await;
                    return Err(err);
                },
            }
        }
        tracing::info!(uploaded, skipped, "Run completed");
        Ok(RunOutcome::Completed { uploaded, skipped })
    }

    async fn upload(&mut self, file: &TrackFile, index: usize, total: usize) -> Result<Step> {
        tracing::info!(
            dir = %file.relative.parent().unwrap_or(Path::new("")).display(),
            file = %file.file_name(),
            position = index + 1,
            total,
            size = %human_readable_size(file.size),
            "Processing file"
        );
        if file.size > self.settings.max_file_size {
            tracing::warn!(
                path = %file.path.display(),
                size = %human_readable_size(file.size),
                limit = %human_readable_size(self.settings.max_file_size),
                "File is too big"
            );
            tracing::warn!(
                "Send it manually and add it to {} and {}",
                self.processed.name(),
                self.messages.name()
            );
            return Ok(Step::TooBig);
        }

        let data = self.read_tags(file).await?;
        let metadata = self.metadata.build(&file.relative, data.as_ref());
        tracing::info!(duration = %format_duration(metadata.duration), "Uploading");
        let upload = AudioUpload {
            path: file.path.clone(),
            file_name: file.file_name(),
            title: metadata.title,
            performer: metadata.performer,
            duration: metadata.duration,
            caption: metadata.caption,
            thumbnail: metadata.thumbnail,
            disable_notification: true,
        };
        let chat = &self.chat;
        let upload = &upload;
        let message = with_backoff("send audio", Margin::SEND, || {
            // Each attempt transfers the whole file again, so it gets its own bar.
            let reporter = Arc::new(ProgressReporter::new());
            let progress: Arc<dyn TransferProgress> = reporter.clone();
            async move {
                let result = chat.send_audio(upload, Some(progress)).await;
                reporter.finish();
                result
            }
        })
        .await
        .or_raise(|| ErrorKind::Chat("send audio"))?;

        let processed = self.processed.name().to_string();
        self.processed.add(&file.path).or_raise(|| ErrorKind::Ledger(processed))?;
        let messages = self.messages.name().to_string();
        self.messages
            .add(message.id, PostedMessage::audio(&file.path), true)
            .or_raise(|| ErrorKind::Ledger(messages))?;
        tracing::info!(message_id = message.id, pending = total - index - 1, "Upload completed");
        Ok(Step::Uploaded)
    }

    /// Tag data for a file; `None` if it couldn't be decoded.
    async fn read_tags(&self, file: &TrackFile) -> Result<Option<TagData>> {
        let reader = Arc::clone(&self.reader);
        let path = file.path.clone();
        let result = tokio::task::spawn_blocking(move || reader.read(&path))
            .await
            .or_raise(|| ErrorKind::Extract(file.path.clone()))?;
        match result {
            Ok(data) => Ok(data),
            Err(err) if matches!(&*err, ExtractErrorKind::Decode(_)) => {
                tracing::warn!(path = %file.path.display(), error = %err, "Couldn't decode tag metadata");
                Ok(None)
            },
            Err(err) => Err(err).or_raise(|| ErrorKind::Extract(file.path.clone())),
        }
    }

    async fn post_marker(&mut self, file: &TrackFile) -> Result<()> {
        let text = path_segments(&file.relative, self.settings.marker_strip_dirs, &self.settings.marker_separator)
            .unwrap_or_else(|| {
                let root = file.path.parent().unwrap_or(Path::new("/"));
                root.display().to_string()
            });
        tracing::info!(dir = %text, "New directory");
        let chat = &self.chat;
        let message = with_backoff("send marker", Margin::SEND, || chat.send_text(&text))
            .await
            .or_raise(|| ErrorKind::Chat("send marker"))?;
        let messages = self.messages.name().to_string();
        self.messages
            .add(message.id, PostedMessage::text(message.text.unwrap_or(text)), true)
            .or_raise(|| ErrorKind::Ledger(messages))?;

        if !self.settings.pin_markers {
            return Ok(());
        }
        tracing::info!(
            message_id = message.id,
            cooldown_secs = self.settings.pin_cooldown.as_secs(),
            "Pinning marker"
        );
        let notice = with_backoff("pin marker", Margin::PIN, || chat.pin(message.id))
            .await
            .or_raise(|| ErrorKind::Chat("pin marker"))?;
        if let Some(notice) = notice {
            with_backoff("delete pin notice", Margin::PIN, || chat.delete(notice))
                .await
                .or_raise(|| ErrorKind::Chat("delete pin notice"))?;
        }
        tokio::time::sleep(self.settings.pin_cooldown).await;
        Ok(())
    }

    async fn notify_failure(&self, file: &TrackFile, err: &Error) {
        let mut text = format!("error while processing {}: {}", file.path.display(), &**err);
        let mut frame = err.frame();
        while let Some(child) = frame.children().first() {
            frame = child;
        }
        if !std::ptr::eq(frame, err.frame()) {
            text.push_str(&format!(": {}", frame.error()));
        }
        if let Err(e) = self.chat.send_text(&text).await {
            tracing::warn!(error = %e, "Unable to send error notification");
        }
    }
}
