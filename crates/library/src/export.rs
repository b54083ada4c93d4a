//! Tag metadata export.

use crate::error::{ErrorKind, Result};
use crate::walk::TrackFile;
use exn::ResultExt;
use std::fs;
use std::path::Path;
use tgtracks_extract::{TagDump, TagReader};

/// Dump the tags of every file.
///
/// Each record's `file_path` is the file's path relative to the library root,
/// split into components, with the first `strip_dirs` left out. Files whose
/// tags can't be read are still exported, with empty metadata.
pub fn export_metadata(
    files: &[TrackFile],
    reader: &dyn TagReader,
    strip_dirs: usize,
    include_artwork: bool,
) -> Vec<TagDump> {
    files
        .iter()
        .map(|file| {
            let file_path = file
                .relative
                .iter()
                .skip(strip_dirs)
                .map(|c| c.to_string_lossy().into_owned())
                .collect();
            let data = match reader.read(&file.path) {
                Ok(Some(data)) => Some(data),
                Ok(None) => {
                    tracing::warn!(path = %file.path.display(), "Loading tags returned nothing");
                    None
                },
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), error = %e, "Couldn't read tags");
                    None
                },
            };
            TagDump::new(file_path, file.size, data.as_ref(), include_artwork)
        })
        .collect()
}

/// Write an export as indented JSON, creating parent directories as needed.
pub fn write_export(path: &Path, dumps: &[TagDump]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).or_raise(|| ErrorKind::Write(path.to_path_buf()))?;
    }
    let json = serde_json::to_vec_pretty(dumps).or_raise(|| ErrorKind::Write(path.to_path_buf()))?;
    fs::write(path, json).or_raise(|| ErrorKind::Write(path.to_path_buf()))?;
    tracing::info!(path = %path.display(), records = dumps.len(), "Metadata exported");
    Ok(())
}
