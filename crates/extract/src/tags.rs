use crate::error::Result;
use std::path::Path;
use std::time::Duration;

/// Tag fields the rest of the application cares about.
///
/// Every field is optional: files in the wild carry anything from a complete
/// tag to a single frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub composer: Option<String>,
    pub disc_number: Option<u32>,
    pub original_release_date: Option<String>,
    pub release_date: Option<String>,
    pub recording_date: Option<String>,
    /// Raw image data of every embedded picture, in tag order.
    pub pictures: Vec<Vec<u8>>,
}

/// Everything a [`TagReader`] could learn about a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagData {
    /// Playback duration; `None` if the reader couldn't determine it.
    pub duration: Option<Duration>,
    /// `None` if the file has no tag at all.
    pub tags: Option<Tags>,
}

/// Boundary to the tag parsing library.
///
/// # Returns
/// - `Ok(Some(_))` for a recognised audio file, tagged or not,
/// - `Ok(None)` if the file format isn't recognised,
/// - [`Decode`](crate::error::ErrorKind::Decode) if the tag data is broken,
/// - [`Io`](crate::error::ErrorKind::Io) if the file couldn't be read.
pub trait TagReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Option<TagData>>;
}
