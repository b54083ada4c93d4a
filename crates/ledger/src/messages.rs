use crate::error::Result;
use crate::{Ledger, PathParts, Store};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// What a posted message was about.
///
/// Exactly one of the two fields is set: directory markers keep their `text`,
/// uploaded tracks keep the path components of the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMessage {
    pub text: Option<String>,
    pub origin_audio_path: Option<Vec<String>>,
}

impl PostedMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), origin_audio_path: None }
    }

    pub fn audio(path: impl AsRef<Path>) -> Self {
        Self {
            text: None,
            origin_audio_path: Some(PathParts::from_path(path).into_inner()),
        }
    }
}

/// Every message posted to the destination channel, keyed by message ID.
///
/// Message IDs are stored as strings, so the JSON document is an object of
/// `"<id>": { "text": ..., "origin_audio_path": ... }` entries.
pub struct PostedMessages {
    ledger: Ledger<BTreeMap<String, PostedMessage>>,
}

impl PostedMessages {
    pub fn open(store: impl Store + 'static, autosave: bool) -> Result<Self> {
        Ok(Self {
            ledger: Ledger::open(store, BTreeMap::new(), autosave)?,
        })
    }

    pub fn exists(&self, message_id: i64) -> bool {
        self.ledger.data().contains_key(&message_id.to_string())
    }

    pub fn get(&self, message_id: i64) -> Option<&PostedMessage> {
        self.ledger.data().get(&message_id.to_string())
    }

    /// Record a posted message.
    ///
    /// An existing entry for the same ID is replaced when `override_existing`
    /// is set; otherwise `Ok(false)` is returned and the ledger is untouched.
    pub fn add(&mut self, message_id: i64, message: PostedMessage, override_existing: bool) -> Result<bool> {
        let key = message_id.to_string();
        if !override_existing && self.ledger.data().contains_key(&key) {
            return Ok(false);
        }
        self.ledger.data_mut().insert(key, message);
        self.ledger.commit()?;
        Ok(true)
    }

    pub fn flush(&self) -> Result<()> {
        self.ledger.flush()
    }

    pub fn len(&self) -> usize {
        self.ledger.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.data().is_empty()
    }

    pub fn name(&self) -> &str {
        self.ledger.name()
    }
}
