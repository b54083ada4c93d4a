//! Serializable export of everything known about a file's tags.

use crate::tags::TagData;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

/// One exported file: its path components and whatever tag data was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagDump {
    pub file_path: Vec<String>,
    pub metadata: DumpMetadata,
}

/// Exported tag data. Files without readable tags export an empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DumpMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(flatten)]
    pub tags: Option<DumpTags>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DumpTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub composer: Option<String>,
    pub disc_num: Option<u32>,
    pub release_date: Option<String>,
    pub original_release_date: Option<String>,
    pub recording_date: Option<String>,
    /// Base64-encoded embedded pictures (only when requested).
    pub artworks: Vec<String>,
}

impl TagDump {
    /// Build an export record.
    ///
    /// `data` is `None` when the file couldn't be decoded; the record then
    /// only carries the path.
    pub fn new(file_path: Vec<String>, size: u64, data: Option<&TagData>, include_artwork: bool) -> Self {
        let Some(data) = data else {
            return Self { file_path, metadata: DumpMetadata::default() };
        };
        let tags = data.tags.as_ref().map(|tags| DumpTags {
            title: tags.title.clone(),
            artist: tags.artist.clone(),
            album: tags.album.clone(),
            album_artist: tags.album_artist.clone(),
            genre: tags.genre.clone(),
            composer: tags.composer.clone(),
            disc_num: tags.disc_number,
            release_date: tags.release_date.clone(),
            original_release_date: tags.original_release_date.clone(),
            recording_date: tags.recording_date.clone(),
            artworks: match include_artwork {
                true => tags.pictures.iter().map(|p| BASE64.encode(p)).collect(),
                false => Vec::new(),
            },
        });
        Self {
            file_path,
            metadata: DumpMetadata {
                time_secs: data.duration.map(|d| d.as_secs_f64()),
                size_bytes: Some(size),
                tags,
            },
        }
    }
}
