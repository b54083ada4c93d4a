//! Upload metadata derivation.

use crate::tags::{TagData, Tags};
use std::fs;
use std::path::Path;

/// Separator between directory names when a performer is derived from a path.
pub const DEFAULT_PERFORMER_SEPARATOR: &str = " - ";

/// Metadata attached to an audio upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioMetadata {
    /// Tag title, or the file name without its extension.
    pub title: String,
    /// Tag artist, or the parent directories joined together.
    pub performer: Option<String>,
    /// Whole seconds; `0` when unknown.
    pub duration: u64,
    /// Album name and release year; only present when the album is known.
    pub caption: Option<String>,
    /// Embedded artwork, or the configured default thumbnail.
    pub thumbnail: Option<Vec<u8>>,
}

/// Turns (possibly missing) tag data into [`AudioMetadata`].
///
/// Paths handed to [`build`](Self::build) are relative to the library root,
/// so the performer fallback only ever uses directories *inside* the library.
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    performer_strip: usize,
    performer_separator: String,
    default_thumbnail: Option<Vec<u8>>,
}

impl Default for MetadataBuilder {
    fn default() -> Self {
        Self {
            performer_strip: 0,
            performer_separator: DEFAULT_PERFORMER_SEPARATOR.to_string(),
            default_thumbnail: None,
        }
    }
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure how the performer fallback is derived from a path: drop
    /// `strip` leading directories, join the rest with `separator`.
    pub fn with_performer_path(mut self, strip: usize, separator: impl Into<String>) -> Self {
        self.performer_strip = strip;
        self.performer_separator = separator.into();
        self
    }

    pub fn with_default_thumbnail(mut self, thumbnail: Option<Vec<u8>>) -> Self {
        self.default_thumbnail = thumbnail.filter(|t| !t.is_empty());
        self
    }

    /// Read the default thumbnail from disk.
    ///
    /// A missing or unreadable file isn't fatal: it's logged and the run
    /// carries on without a default thumbnail.
    pub fn load_default_thumbnail(path: &Path) -> Option<Vec<u8>> {
        match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unable to read default thumbnail file");
                None
            },
        }
    }

    /// Build the upload metadata for a file.
    ///
    /// `data` is `None` when the tags couldn't be read at all, in which case
    /// only path-derived values are used.
    pub fn build(&self, relative_path: &Path, data: Option<&TagData>) -> AudioMetadata {
        let title = relative_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let mut metadata = AudioMetadata {
            title,
            performer: path_segments(relative_path, self.performer_strip, &self.performer_separator),
            duration: data.and_then(|d| d.duration).map(|d| d.as_secs()).unwrap_or(0),
            caption: None,
            thumbnail: self.default_thumbnail.clone(),
        };
        match data.and_then(|d| d.tags.as_ref()) {
            Some(tags) => self.apply_tags(&mut metadata, tags),
            None => tracing::info!(
                title = %metadata.title,
                performer = metadata.performer.as_deref().unwrap_or("-"),
                "Couldn't load tag metadata; using path"
            ),
        }
        metadata
    }

    fn apply_tags(&self, metadata: &mut AudioMetadata, tags: &Tags) {
        if let Some(title) = non_empty(&tags.title) {
            metadata.title = title.to_string();
        }
        if let Some(artist) = non_empty(&tags.artist) {
            metadata.performer = Some(artist.to_string());
        }
        if let Some(album) = non_empty(&tags.album) {
            let caption = match album_year(tags) {
                Some(year) => format!("💽 {album} ({year})"),
                None => format!("💽 {album}"),
            };
            metadata.caption = Some(caption);
        }
        match tags.pictures.first() {
            Some(picture) if !picture.is_empty() => metadata.thumbnail = Some(picture.clone()),
            Some(_) => tracing::info!("Artwork found, but its size is 0"),
            None => {},
        }
        tracing::info!(
            title = %metadata.title,
            performer = metadata.performer.as_deref().unwrap_or("-"),
            album = tags.album.as_deref().unwrap_or("-"),
            artwork = !tags.pictures.is_empty(),
            "Tag metadata loaded"
        );
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Year of the first date present: original release, then release, then
/// recording.
fn album_year(tags: &Tags) -> Option<i32> {
    [&tags.original_release_date, &tags.release_date, &tags.recording_date]
        .into_iter()
        .find_map(non_empty)
        .and_then(year_from_date)
}

/// The year component of a tag date (`2004`, `2004-05`, `2004-05-01T12:00`).
///
/// # Examples
///
/// ```
/// use tgtracks_extract::year_from_date;
///
/// assert_eq!(year_from_date("2004-05-01"), Some(2004));
/// assert_eq!(year_from_date("unknown"), None);
/// ```
pub fn year_from_date(date: &str) -> Option<i32> {
    let date = date.trim();
    let end = date.find(|c: char| !c.is_ascii_digit()).unwrap_or(date.len());
    date[..end].parse::<i32>().ok().filter(|year| *year > 0)
}

/// Join the directories of a path, after dropping `strip` leading ones.
///
/// The final component (the file name) is never included. Returns `None` if
/// no directories are left.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tgtracks_extract::path_segments;
///
/// let path = Path::new("Artist/Album/track.mp3");
/// assert_eq!(path_segments(path, 0, " - ").as_deref(), Some("Artist - Album"));
/// assert_eq!(path_segments(path, 1, " - ").as_deref(), Some("Album"));
/// assert_eq!(path_segments(path, 2, " - "), None);
/// ```
pub fn path_segments(path: &Path, strip: usize, separator: &str) -> Option<String> {
    let parent = path.parent()?;
    let segments: Vec<_> = parent.iter().skip(strip).map(|s| s.to_string_lossy()).collect();
    match segments.is_empty() {
        true => None,
        false => Some(segments.join(separator)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    fn tagged(tags: Tags) -> TagData {
        TagData {
            duration: Some(Duration::from_millis(225_900)),
            tags: Some(tags),
        }
    }

    #[rstest]
    #[case(0, " - ", Some("Artist - Album"))]
    #[case(1, " - ", Some("Album"))]
    #[case(2, " - ", None)]
    #[case(0, " -> ", Some("Artist -> Album"))]
    fn test_path_segments(#[case] strip: usize, #[case] separator: &str, #[case] expected: Option<&str>) {
        assert_eq!(path_segments(Path::new("Artist/Album/track.mp3"), strip, separator).as_deref(), expected);
    }

    #[test]
    fn test_path_segments_file_in_root() {
        assert_eq!(path_segments(Path::new("track.mp3"), 0, " - "), None);
    }

    #[rstest]
    #[case("1999", Some(1999))]
    #[case("2004-05-01", Some(2004))]
    #[case("2004-05-01T12:30:00", Some(2004))]
    #[case(" 1987 ", Some(1987))]
    #[case("0000", None)]
    #[case("", None)]
    #[case("May 2004", None)]
    fn test_year_from_date(#[case] date: &str, #[case] expected: Option<i32>) {
        assert_eq!(year_from_date(date), expected);
    }

    #[test]
    fn test_build_without_tag_data() {
        let builder = MetadataBuilder::new().with_performer_path(0, " - ");
        let metadata = builder.build(Path::new("Artist/Album/01 Intro.mp3"), None);
        assert_eq!(metadata, AudioMetadata {
            title: "01 Intro".to_string(),
            performer: Some("Artist - Album".to_string()),
            duration: 0,
            caption: None,
            thumbnail: None,
        });
    }

    #[test]
    fn test_build_untagged_file_keeps_duration() {
        let data = TagData { duration: Some(Duration::from_secs(61)), tags: None };
        let metadata = MetadataBuilder::new().build(Path::new("a/b.mp3"), Some(&data));
        assert_eq!(metadata.duration, 61);
        assert_eq!(metadata.title, "b");
    }

    #[test]
    fn test_tags_take_precedence() {
        let data = tagged(Tags {
            title: Some("Real Title".to_string()),
            artist: Some("Real Artist".to_string()),
            album: Some("Real Album".to_string()),
            release_date: Some("2001-02-03".to_string()),
            recording_date: Some("1999".to_string()),
            ..Default::default()
        });
        let metadata = MetadataBuilder::new().build(Path::new("dir/file.mp3"), Some(&data));
        assert_eq!(metadata.title, "Real Title");
        assert_eq!(metadata.performer.as_deref(), Some("Real Artist"));
        assert_eq!(metadata.duration, 225);
        assert_eq!(metadata.caption.as_deref(), Some("💽 Real Album (2001)"));
    }

    #[test]
    fn test_blank_tags_fall_back_to_path() {
        let data = tagged(Tags {
            title: Some("  ".to_string()),
            artist: Some(String::new()),
            ..Default::default()
        });
        let metadata = MetadataBuilder::new().build(Path::new("Artist/track.mp3"), Some(&data));
        assert_eq!(metadata.title, "track");
        assert_eq!(metadata.performer.as_deref(), Some("Artist"));
        assert_eq!(metadata.caption, None);
    }

    #[rstest]
    #[case(Some("1990-01-01"), Some("2000"), Some("2010"), "💽 Album (1990)")]
    #[case(None, Some("2000-06"), Some("2010"), "💽 Album (2000)")]
    #[case(None, None, Some("2010"), "💽 Album (2010)")]
    #[case(None, None, None, "💽 Album")]
    fn test_caption_date_priority(
        #[case] original: Option<&str>,
        #[case] release: Option<&str>,
        #[case] recording: Option<&str>,
        #[case] expected: &str,
    ) {
        let data = tagged(Tags {
            album: Some("Album".to_string()),
            original_release_date: original.map(str::to_string),
            release_date: release.map(str::to_string),
            recording_date: recording.map(str::to_string),
            ..Default::default()
        });
        let metadata = MetadataBuilder::new().build(Path::new("x.mp3"), Some(&data));
        assert_eq!(metadata.caption.as_deref(), Some(expected));
    }

    #[test]
    fn test_thumbnail_selection() {
        let builder = MetadataBuilder::new().with_default_thumbnail(Some(b"default".to_vec()));
        let path = Path::new("x.mp3");
        // Embedded artwork wins
        let data = tagged(Tags { pictures: vec![b"cover".to_vec()], ..Default::default() });
        assert_eq!(builder.build(path, Some(&data)).thumbnail.as_deref(), Some(&b"cover"[..]));
        // Empty artwork is ignored
        let data = tagged(Tags { pictures: vec![Vec::new()], ..Default::default() });
        assert_eq!(builder.build(path, Some(&data)).thumbnail.as_deref(), Some(&b"default"[..]));
        // No tag data at all
        assert_eq!(builder.build(path, None).thumbnail.as_deref(), Some(&b"default"[..]));
        // No default either
        assert_eq!(MetadataBuilder::new().build(path, None).thumbnail, None);
    }

    #[test]
    fn test_missing_default_thumbnail_is_not_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert_eq!(MetadataBuilder::load_default_thumbnail(&temp_dir.path().join("thumb.jpg")), None);
        let path = temp_dir.path().join("present.jpg");
        std::fs::write(&path, b"jpeg").unwrap();
        assert_eq!(MetadataBuilder::load_default_thumbnail(&path), Some(b"jpeg".to_vec()));
    }
}
