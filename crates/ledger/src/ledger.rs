//! Generic in-memory ledger with a flush-to-store hook.

use crate::Store;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// In-memory data mirrored to a [`Store`].
///
/// The ledger is loaded once when opened and written back in full on every
/// [`flush`](Self::flush). With `autosave` enabled, the specialised ledgers
/// flush after every successful mutation, so the store never lags behind what
/// the run has already done.
pub struct Ledger<T> {
    store: Box<dyn Store>,
    data: T,
    autosave: bool,
}

impl<T: Serialize + DeserializeOwned> Ledger<T> {
    /// Open a ledger, loading existing data from `store`.
    ///
    /// If the store has never been written to, the ledger starts out as
    /// `init` and is immediately persisted so the backing file exists from
    /// the very first run.
    ///
    /// # Errors
    /// Returns [`ErrorKind::Io`] if the store can't be read or written, and
    /// [`ErrorKind::InvalidData`] if the stored document doesn't deserialize.
    pub fn open(store: impl Store + 'static, init: T, autosave: bool) -> Result<Self> {
        let store: Box<dyn Store> = Box::new(store);
        match store.load()? {
            Some(bytes) => {
                let data = serde_json::from_slice(&bytes).or_raise(|| ErrorKind::InvalidData(store.name().to_string()))?;
                tracing::debug!(store = store.name(), "Ledger loaded");
                Ok(Self { store, data, autosave })
            },
            None => {
                let ledger = Self { store, data: init, autosave };
                ledger.flush()?;
                tracing::info!(store = ledger.store.name(), "Ledger created");
                Ok(ledger)
            },
        }
    }

    /// Serialize the ledger (pretty-printed, four-space indent) and write it
    /// to the store.
    pub fn flush(&self) -> Result<()> {
        let mut buffer = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        self.data.serialize(&mut serializer).or_raise(|| ErrorKind::Serialize)?;
        self.store.save(&buffer)
    }

    /// Flush, but only when autosave is enabled.
    pub(crate) fn commit(&self) -> Result<()> {
        match self.autosave {
            true => self.flush(),
            false => Ok(()),
        }
    }
}

impl<T> Ledger<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn name(&self) -> &str {
        self.store.name()
    }
}
