use crate::error::Result;
use crate::{Ledger, PathParts, Store};
use std::collections::HashSet;
use std::path::Path;

/// The set of audio files that have already been uploaded.
///
/// Stored as a JSON array of normalized paths (see [`PathParts::normalized`]).
/// Entries are only ever appended: a track is recorded once its upload has
/// succeeded and stays recorded forever.
pub struct ProcessedTracks {
    ledger: Ledger<Vec<String>>,
    index: HashSet<String>,
}

impl ProcessedTracks {
    /// Open the ledger, creating an empty one if the store has never been
    /// written to.
    pub fn open(store: impl Store + 'static, autosave: bool) -> Result<Self> {
        let ledger = Ledger::open(store, Vec::new(), autosave)?;
        let index = ledger.data().iter().cloned().collect();
        Ok(Self { ledger, index })
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.index.contains(&PathParts::from_path(path).normalized())
    }

    /// Record a track as processed.
    ///
    /// Returns `Ok(false)` without touching the ledger if the track was
    /// already recorded.
    pub fn add(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let key = PathParts::from_path(path).normalized();
        if !self.index.insert(key.clone()) {
            return Ok(false);
        }
        self.ledger.data_mut().push(key);
        self.ledger.commit()?;
        Ok(true)
    }

    pub fn flush(&self) -> Result<()> {
        self.ledger.flush()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn name(&self) -> &str {
        self.ledger.name()
    }
}
