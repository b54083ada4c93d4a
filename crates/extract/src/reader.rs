//! [`TagReader`] backed by [`lofty`].

use crate::error::{ErrorKind, Result};
use crate::tags::{TagData, TagReader, Tags};
use exn::ResultExt;
use lofty::error::{ErrorKind as LoftyErrorKind, LoftyError};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use std::path::Path;
use tracing::instrument;

/// Reads tags with [`lofty`], which understands ID3v1/v2, APE, Vorbis
/// Comments, MP4 ilst and RIFF INFO.
///
/// The file type is guessed from the content first, then from the extension.
/// The primary tag for the format is preferred, falling back on whichever tag
/// comes first.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyReader;

impl LoftyReader {
    pub fn new() -> Self {
        Self
    }

    fn map_error(err: LoftyError, path: &Path) -> Result<Option<TagData>> {
        let kind = match err.kind() {
            LoftyErrorKind::UnknownFormat => return Ok(None),
            LoftyErrorKind::Io(_) => ErrorKind::Io(path.to_path_buf()),
            _ => ErrorKind::Decode(path.to_path_buf()),
        };
        tracing::debug!(path = %path.display(), error = %err, "Tag reader failed");
        exn::bail!(kind)
    }

    fn tags(tag: &Tag) -> Tags {
        let string = |key: &ItemKey| tag.get_string(key).map(str::to_string);
        Tags {
            title: tag.title().map(|s| s.to_string()),
            artist: tag.artist().map(|s| s.to_string()),
            album: tag.album().map(|s| s.to_string()),
            album_artist: string(&ItemKey::AlbumArtist),
            genre: tag.genre().map(|s| s.to_string()),
            composer: string(&ItemKey::Composer),
            disc_number: tag.disk(),
            original_release_date: string(&ItemKey::OriginalReleaseDate),
            release_date: string(&ItemKey::ReleaseDate),
            // ID3v2.3 only has a year frame, which is as good as a recording date.
            recording_date: string(&ItemKey::RecordingDate).or_else(|| tag.year().map(|y| y.to_string())),
            pictures: tag.pictures().iter().map(|p| p.data().to_vec()).collect(),
        }
    }
}

impl TagReader for LoftyReader {
    #[instrument(level = "debug", skip(self))]
    fn read(&self, path: &Path) -> Result<Option<TagData>> {
        let probe = match Probe::open(path) {
            Ok(probe) => probe,
            Err(e) => return Self::map_error(e, path),
        };
        let probe = probe.guess_file_type().or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        let tagged_file = match probe.read() {
            Ok(file) => file,
            Err(e) => return Self::map_error(e, path),
        };
        let duration = tagged_file.properties().duration();
        let tags = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()).map(Self::tags);
        Ok(Some(TagData {
            duration: (!duration.is_zero()).then_some(duration),
            tags,
        }))
    }
}
