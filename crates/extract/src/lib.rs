//! Audio tag reading and upload metadata derivation.
//!
//! Tag parsing itself is delegated to [`lofty`] behind the [`TagReader`]
//! trait. Everything else in this crate is about turning whatever the reader
//! managed to find (possibly nothing) into the [`AudioMetadata`] attached to
//! an upload, falling back on values derived from the file's path.

#[cfg(feature = "serde")]
mod dump;
pub mod error;
mod metadata;
mod reader;
mod tags;

#[cfg(feature = "serde")]
pub use crate::dump::{DumpMetadata, DumpTags, TagDump};
pub use crate::metadata::{AudioMetadata, DEFAULT_PERFORMER_SEPARATOR, MetadataBuilder, path_segments, year_from_date};
pub use crate::reader::LoftyReader;
pub use crate::tags::{TagData, TagReader, Tags};
