//! Directory walking and extension filtering.

use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, TryStreamExt};
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

/// A regular file found under the library root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFile {
    /// The root joined with [`relative`](Self::relative).
    pub path: PathBuf,
    /// Path relative to the library root.
    pub relative: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

impl TrackFile {
    pub fn file_name(&self) -> String {
        self.relative.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }
}

enum WalkEntry {
    File(TrackFile),
    Descend(PathBuf),
    Skip,
}

/// Stream every regular file under `root` whose name passes
/// [`has_allowed_extension`], depth first.
///
/// A directory's own files are all yielded before anything from its
/// subdirectories. Symbolic links to files are followed; symbolic links to
/// directories are not, so a link back up the tree can't loop forever.
/// Order within a directory is whatever the filesystem returns.
pub fn walk<'a>(root: &'a Path, extensions: &'a [String]) -> impl Stream<Item = Result<TrackFile>> + 'a {
    let mut stack = vec![root.to_path_buf()];
    stream! {
        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await.or_raise(|| ErrorKind::Walk(current.clone())) {
                Ok(entries) => entries,
                Err(e) => { yield Err(e); continue 'dirs; },
            };
            let mut subdirs = Vec::new();
            loop {
                let entry = match entries.next_entry().await.or_raise(|| ErrorKind::Walk(current.clone())) {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => { yield Err(e); continue 'dirs; },
                };
                match process_entry(root, extensions, entry).await {
                    Ok(WalkEntry::File(file)) => yield Ok(file),
                    Ok(WalkEntry::Descend(dir)) => subdirs.push(dir),
                    Ok(WalkEntry::Skip) => {},
                    Err(e) => yield Err(e),
                }
            }
            // Reversed so the first subdirectory listed is the first walked.
            stack.extend(subdirs.into_iter().rev());
        }
    }
}

async fn process_entry(root: &Path, extensions: &[String], entry: DirEntry) -> Result<WalkEntry> {
    let path = entry.path();
    let file_type = entry.file_type().await.or_raise(|| ErrorKind::Walk(path.clone()))?;
    if file_type.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    if !has_allowed_extension(&path, extensions) {
        tracing::info!(path = %path.display(), "File ignored: extension not allowed");
        return Ok(WalkEntry::Skip);
    }
    let metadata = match fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if file_type.is_symlink() && e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "File ignored: broken symbolic link");
            return Ok(WalkEntry::Skip);
        },
        Err(e) => return Err(e).or_raise(|| ErrorKind::Walk(path.clone())),
    };
    if !metadata.is_file() {
        return Ok(WalkEntry::Skip);
    }
    let relative = path.strip_prefix(root).or_raise(|| ErrorKind::Walk(path.clone()))?.to_path_buf();
    Ok(WalkEntry::File(TrackFile {
        path,
        relative,
        size: metadata.len(),
    }))
}

/// Whether the file name ends with one of `extensions` (lowercase, with the
/// leading dot), ignoring case.
pub fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Walk `root` and collect the files with an allowed extension, in walk
/// order.
pub async fn discover(root: &Path, extensions: &[String]) -> Result<Vec<TrackFile>> {
    tracing::info!(root = %root.display(), extensions = ?extensions, "Walking library");
    let files: Vec<TrackFile> = walk(root, extensions).try_collect().await?;
    tracing::info!(count = files.len(), "Found files to process");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn touch(root: &Path, relative: &str, contents: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[rstest]
    #[case("track.mp3", true)]
    #[case("TRACK.MP3", true)]
    #[case("track.Flac", true)]
    #[case("cover.jpg", false)]
    #[case("mp3", false)]
    fn test_has_allowed_extension(#[case] name: &str, #[case] expected: bool) {
        let extensions = vec![".mp3".to_string(), ".flac".to_string()];
        assert_eq!(has_allowed_extension(Path::new(name), &extensions), expected);
    }

    #[tokio::test]
    async fn test_walk_finds_nested_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "Artist/Album/01.mp3", b"12345");
        touch(temp_dir.path(), "Artist/02.mp3", b"1");
        touch(temp_dir.path(), "top.mp3", b"");
        std::fs::create_dir_all(temp_dir.path().join("Empty/Nested")).unwrap();

        let extensions = [".mp3".to_string()];
        let mut files: Vec<TrackFile> = walk(temp_dir.path(), &extensions).try_collect().await.unwrap();
        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        let relative: Vec<_> = files.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(relative, vec![
            PathBuf::from("Artist/02.mp3"),
            PathBuf::from("Artist/Album/01.mp3"),
            PathBuf::from("top.mp3"),
        ]);
        assert_eq!(files[1].size, 5);
        assert_eq!(files[1].path, temp_dir.path().join("Artist/Album/01.mp3"));
        assert_eq!(files[1].file_name(), "01.mp3");
    }

    #[tokio::test]
    async fn test_discover_filters_by_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "A/1.MP3", b"");
        touch(temp_dir.path(), "A/cover.jpg", b"");
        touch(temp_dir.path(), "notes.txt", b"");
        let files = discover(temp_dir.path(), &[".mp3".to_string()]).await.unwrap();
        let relative: Vec<_> = files.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(relative, vec![PathBuf::from("A/1.MP3")]);
    }

    #[tokio::test]
    async fn test_directory_files_stay_together() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "A/1.mp3", b"");
        touch(temp_dir.path(), "A/B/2.mp3", b"");
        touch(temp_dir.path(), "A/c.mp3", b"");
        touch(temp_dir.path(), "top.mp3", b"");
        let files = discover(temp_dir.path(), &[".mp3".to_string()]).await.unwrap();
        let parents: Vec<_> = files.iter().map(|f| f.relative.parent().unwrap().to_path_buf()).collect();
        assert_eq!(parents, vec![
            PathBuf::from(""),
            PathBuf::from("A"),
            PathBuf::from("A"),
            PathBuf::from("A/B"),
        ]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_broken_symlinks_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "A/1.mp3", b"");
        std::os::unix::fs::symlink(temp_dir.path().join("gone.txt"), temp_dir.path().join("A/notes.txt")).unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("gone.mp3"), temp_dir.path().join("A/2.mp3")).unwrap();
        let files = discover(temp_dir.path(), &[".mp3".to_string()]).await.unwrap();
        let relative: Vec<_> = files.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(relative, vec![PathBuf::from("A/1.mp3")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_files_are_followed() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "elsewhere/real.mp3", b"123");
        std::fs::create_dir_all(temp_dir.path().join("lib")).unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("elsewhere/real.mp3"), temp_dir.path().join("lib/link.mp3")).unwrap();
        let files = discover(&temp_dir.path().join("lib"), &[".mp3".to_string()]).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative, PathBuf::from("link.mp3"));
        assert_eq!(files[0].size, 3);
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("missing");
        let err = discover(&root, &[".mp3".to_string()]).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Walk(root));
    }
}
