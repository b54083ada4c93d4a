use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

/// Platform-assigned message identifier.
pub type MessageId = i64;

/// Where messages get posted: a numeric chat ID (channels are negative,
/// `-100…`) or a public `@username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

impl Display for ChatId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(username) => f.write_str(username),
        }
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ChatId {
    fn from(username: &str) -> Self {
        Self::Username(username.to_string())
    }
}

/// A message as reported back by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: Option<String>,
}

/// Everything needed to post one audio file.
///
/// The file itself is read from disk on every send, so the same upload can be
/// retried as many times as necessary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioUpload {
    pub path: PathBuf,
    /// Name the file is presented under in the chat.
    pub file_name: String,
    pub title: String,
    pub performer: Option<String>,
    /// Whole seconds, `0` if unknown.
    pub duration: u64,
    pub caption: Option<String>,
    /// JPEG thumbnail.
    pub thumbnail: Option<Vec<u8>>,
    pub disable_notification: bool,
}

/// Observer of an upload's progress.
///
/// Called any number of times (including zero) with the number of bytes sent
/// so far and the total size of the file.
pub trait TransferProgress: Send + Sync {
    fn update(&self, transferred: u64, total: u64);
}

/// Unified interface to the destination channel.
///
/// The destination is fixed when the client is constructed.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Upload an audio file.
    async fn send_audio(&self, upload: &AudioUpload, progress: Option<Arc<dyn TransferProgress>>) -> Result<Message>;

    /// Post a plain text message. Link previews are disabled.
    async fn send_text(&self, text: &str) -> Result<Message>;

    /// Pin a message without notifying members.
    ///
    /// Returns the ID of the service message ("… pinned a message") the
    /// platform posted as a side effect, if it can be determined.
    async fn pin(&self, message_id: MessageId) -> Result<Option<MessageId>>;

    async fn delete(&self, message_id: MessageId) -> Result<()>;
}
