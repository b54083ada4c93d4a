//! JSON-backed ledgers for resumable upload runs.
//!
//! This crate provides the bookkeeping that makes an upload run idempotent.
//! The ledgers are not a database: each one is an in-memory collection that
//! is read once on startup and written back in full to its [`Store`] whenever
//! it changes (with autosave) or when explicitly flushed.
//!
//! # Ledgers
//! - **[`ProcessedTracks`]**: the set of normalized paths of audio files that
//!   have been uploaded successfully. Checked before each file is processed.
//! - **[`PostedMessages`]**: every message posted to the destination channel,
//!   keyed by message ID, pointing at either the text of a directory marker or
//!   the path components of the uploaded audio file.
//!
//! # Single writer
//! Ledger files are accessed from a single task. Two processes writing the
//! same ledger file at once will corrupt it; nothing here prevents that.

pub mod error;
mod ledger;
mod messages;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod path;
mod processed;
mod store;

pub use crate::ledger::Ledger;
pub use crate::messages::{PostedMessage, PostedMessages};
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MemoryStore;
pub use crate::path::{PATH_SEPARATOR, PathParts};
pub use crate::processed::ProcessedTracks;
pub use crate::store::{JsonFile, Store};

/// File name of the processed tracks ledger, relative to the data directory.
pub const PROCESSED_TRACKS: &str = "processed-tracks.json";
/// File name of the posted messages ledger, relative to the data directory.
pub const POSTED_MESSAGES: &str = "posted-messages.json";
