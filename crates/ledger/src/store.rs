//! Durable storage behind a [`Ledger`](crate::Ledger).
//!
//! A store only moves whole documents around: the ledger serializes its
//! in-memory state and hands the bytes over. Swapping the JSON file for an
//! embedded key-value engine means implementing [`Store`], nothing else.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

/// Synchronous load/save hook for a serialized ledger.
pub trait Store: Send + Sync {
    /// Human-readable location of the store (used for logging and errors).
    fn name(&self) -> &str;

    /// Load the previously saved document.
    ///
    /// Returns `Ok(None)` if nothing has ever been saved.
    fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the saved document.
    fn save(&self, data: &[u8]) -> Result<()>;
}

/// A ledger stored as a single JSON file on the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use tgtracks_ledger::{JsonFile, ProcessedTracks};
///
/// # fn example() -> tgtracks_ledger::error::Result<()> {
/// let processed = ProcessedTracks::open(JsonFile::new("data/processed-tracks.json"), true)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
    name: String,
}
impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).or_raise(|| ErrorKind::Io(self.name.clone())),
        }
    }

    fn save(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).or_raise(|| ErrorKind::Io(self.name.clone()))?;
        }
        fs::write(&self.path, data).or_raise(|| ErrorKind::Io(self.name.clone()))
    }
}
