//! Audio library walking and the upload run.
//!
//! - [`walk`] and [`discover`] find candidate files under the library root.
//! - [`Uploader`] posts them to a chat, one at a time, keeping the ledgers up
//!   to date so an interrupted run picks up where it left off.
//! - [`export_metadata`] and [`total_duration`] are read-only reports over
//!   the same set of files.

mod display;
pub mod error;
mod export;
mod progress;
mod retry;
mod stats;
#[cfg(test)]
mod testing;
mod upload;
mod walk;

pub use crate::display::{Breakdown, format_duration, human_readable_size};
pub use crate::export::{export_metadata, write_export};
pub use crate::progress::ProgressReporter;
pub use crate::retry::{Margin, with_backoff};
pub use crate::stats::{DurationSummary, total_duration};
pub use crate::upload::{RunOutcome, UploadSettings, Uploader};
pub use crate::walk::{TrackFile, discover, has_allowed_extension, walk};
