//! Path normalization for ledger keys.
//!
//! Ledgers never store [`Path`]s directly: a path is broken into its
//! components, which are then either stored as a list (posted messages) or
//! joined into a single string key (processed tracks).

use std::path::{Component, MAIN_SEPARATOR_STR, Path};

/// Separator used to join path components into a processed-tracks key.
pub const PATH_SEPARATOR: &str = "...";

/// The components of a path, as strings.
///
/// A leading root is kept as its own component (`/` on Unix) and current
/// directory references are dropped. Non-UTF8 components are converted
/// lossily.
///
/// # Examples
///
/// ```
/// use tgtracks_ledger::PathParts;
///
/// let parts = PathParts::from_path("/music/./Artist/track.mp3");
/// assert_eq!(parts.as_slice(), ["/", "music", "Artist", "track.mp3"]);
/// assert_eq!(parts.normalized(), "/...music...Artist...track.mp3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathParts(Vec<String>);

impl PathParts {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let mut parts: Vec<String> = Vec::new();
        for component in path.as_ref().components() {
            match component {
                Component::Prefix(prefix) => parts.push(prefix.as_os_str().to_string_lossy().into_owned()),
                // A drive prefix and its root are a single component ("C:\").
                Component::RootDir => match parts.last_mut() {
                    Some(prefix) => prefix.push_str(MAIN_SEPARATOR_STR),
                    None => parts.push(MAIN_SEPARATOR_STR.to_string()),
                },
                Component::CurDir => {},
                Component::ParentDir => parts.push("..".to_string()),
                Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            }
        }
        Self(parts)
    }

    /// Components joined with [`PATH_SEPARATOR`].
    pub fn normalized(&self) -> String {
        self.0.join(PATH_SEPARATOR)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}
