//! In-memory store for testing.

use crate::Store;
use crate::error::Result;
use std::sync::{Arc, RwLock};

/// In-memory [`Store`] for testing.
///
/// Clones share the same document, so a test can drop a ledger and open a
/// fresh one against the "same file".
///
/// # Examples
///
/// ```ignore
/// use tgtracks_ledger::{MemoryStore, ProcessedTracks};
/// use std::path::Path;
///
/// let store = MemoryStore::default();
/// let mut processed = ProcessedTracks::open(store.clone(), true).unwrap();
/// processed.add(Path::new("music/track.mp3")).unwrap();
///
/// let reopened = ProcessedTracks::open(store, true).unwrap();
/// assert!(reopened.exists(Path::new("music/track.mp3")));
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    document: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemoryStore {
    /// Create a store that already holds a saved document.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            document: Arc::new(RwLock::new(Some(contents.into()))),
        }
    }

    /// The currently saved document, if any.
    ///
    /// Panics if the lock was poisoned by a panicking test thread.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.document.read().expect("memory store lock poisoned").clone()
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    fn save(&self, data: &[u8]) -> Result<()> {
        // The panic here is DELIBERATE. MemoryStore is intended to be used in
        // tests; a poisoned lock means another test thread already failed.
        *self.document.write().expect("memory store lock poisoned") = Some(data.to_vec());
        Ok(())
    }
}
