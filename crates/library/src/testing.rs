//! Test doubles shared by this crate's unit tests.

use crate::walk::TrackFile;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tgtracks_extract::error::{ErrorKind as ExtractErrorKind, Result as ExtractResult};
use tgtracks_extract::{TagData, TagReader, Tags};
use tgtracks_telegram::error::{ErrorKind as ChatErrorKind, Result as ChatResult};
use tgtracks_telegram::{AudioUpload, ChatClient, Message, MessageId, TransferProgress};

pub(crate) const ROOT: &str = "/music";

pub(crate) fn track(relative: &str, size: u64) -> TrackFile {
    TrackFile {
        path: Path::new(ROOT).join(relative),
        relative: PathBuf::from(relative),
        size,
    }
}

enum Canned {
    Data(TagData),
    Failure(ExtractErrorKind),
}

/// Tag reader answering from a table keyed by path relative to [`ROOT`].
/// Unknown files are recognised but untagged.
#[derive(Default)]
pub(crate) struct StaticReader {
    entries: HashMap<PathBuf, Canned>,
}

impl StaticReader {
    pub fn with_duration(mut self, relative: &str, duration: Duration) -> Self {
        let data = TagData { duration: Some(duration), tags: None };
        self.entries.insert(PathBuf::from(relative), Canned::Data(data));
        self
    }

    pub fn with_tags(mut self, relative: &str, tags: Tags) -> Self {
        let data = TagData { duration: Some(Duration::from_secs(200)), tags: Some(tags) };
        self.entries.insert(PathBuf::from(relative), Canned::Data(data));
        self
    }

    pub fn with_failure(mut self, relative: &str) -> Self {
        let kind = ExtractErrorKind::Decode(Path::new(ROOT).join(relative));
        self.entries.insert(PathBuf::from(relative), Canned::Failure(kind));
        self
    }

    pub fn with_io_failure(mut self, relative: &str) -> Self {
        let kind = ExtractErrorKind::Io(Path::new(ROOT).join(relative));
        self.entries.insert(PathBuf::from(relative), Canned::Failure(kind));
        self
    }
}

impl TagReader for StaticReader {
    fn read(&self, path: &Path) -> ExtractResult<Option<TagData>> {
        let relative = path.strip_prefix(ROOT).unwrap_or(path);
        match self.entries.get(relative) {
            Some(Canned::Data(data)) => Ok(Some(data.clone())),
            Some(Canned::Failure(kind)) => Err(exn::Exn::from(kind.clone())),
            None => Ok(Some(TagData::default())),
        }
    }
}

/// Something the [`RecordingChat`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sent {
    Audio { id: MessageId, relative: PathBuf, title: String, performer: Option<String>, caption: Option<String> },
    Text { id: MessageId, text: String },
    Pin(MessageId),
    Delete(MessageId),
}

/// Chat client that records every successful call.
///
/// Failures are scripted per operation and consumed in order; a scripted
/// failure isn't recorded.
#[derive(Default)]
pub(crate) struct RecordingChat {
    next_id: AtomicI64,
    sent: Mutex<Vec<Sent>>,
    audio_failures: Mutex<VecDeque<ChatErrorKind>>,
    /// Progress observer handed to each `send_audio` attempt, failed or not.
    observers: Mutex<Vec<Arc<dyn TransferProgress>>>,
    text_failures: Mutex<VecDeque<ChatErrorKind>>,
}

/// Offset between a pinned message and its service notice.
pub(crate) const NOTICE_OFFSET: MessageId = 1000;

impl RecordingChat {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_audio(&self, kind: ChatErrorKind) {
        self.audio_failures.lock().unwrap().push_back(kind);
    }

    pub fn fail_text(&self, kind: ChatErrorKind) {
        self.text_failures.lock().unwrap().push_back(kind);
    }

    /// Addresses of the progress observers, one per `send_audio` attempt.
    pub fn observers(&self) -> Vec<*const ()> {
        self.observers.lock().unwrap().iter().map(|o| Arc::as_ptr(o) as *const ()).collect()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<PathBuf> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Audio { relative, .. } => Some(relative),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn id(&self) -> MessageId {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn scripted(failures: &Mutex<VecDeque<ChatErrorKind>>) -> ChatResult<()> {
        match failures.lock().unwrap().pop_front() {
            Some(kind) => Err(exn::Exn::from(kind)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChatClient for RecordingChat {
    async fn send_audio(&self, upload: &AudioUpload, progress: Option<Arc<dyn TransferProgress>>) -> ChatResult<Message> {
        if let Some(progress) = &progress {
            self.observers.lock().unwrap().push(progress.clone());
        }
        Self::scripted(&self.audio_failures)?;
        if let Some(progress) = progress {
            progress.update(50, 100);
            progress.update(100, 100);
        }
        let id = self.id();
        let relative = upload.path.strip_prefix(ROOT).unwrap_or(&upload.path).to_path_buf();
        self.sent.lock().unwrap().push(Sent::Audio {
            id,
            relative,
            title: upload.title.clone(),
            performer: upload.performer.clone(),
            caption: upload.caption.clone(),
        });
        Ok(Message { id, text: None })
    }

    async fn send_text(&self, text: &str) -> ChatResult<Message> {
        Self::scripted(&self.text_failures)?;
        let id = self.id();
        self.sent.lock().unwrap().push(Sent::Text { id, text: text.to_string() });
        Ok(Message { id, text: Some(text.to_string()) })
    }

    async fn pin(&self, message_id: MessageId) -> ChatResult<Option<MessageId>> {
        self.sent.lock().unwrap().push(Sent::Pin(message_id));
        Ok(Some(message_id + NOTICE_OFFSET))
    }

    async fn delete(&self, message_id: MessageId) -> ChatResult<()> {
        self.sent.lock().unwrap().push(Sent::Delete(message_id));
        Ok(())
    }
}
