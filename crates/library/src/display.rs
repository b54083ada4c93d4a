//! Human-friendly formatting for log output.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

const SIZE_SUFFIXES: [&str; 5] = ["b", "kb", "mb", "gb", "tb"];

/// Format a byte count with a binary-scaled suffix and two decimals, dropping
/// a trailing `.00`.
///
/// # Examples
///
/// ```
/// use tgtracks_library::human_readable_size;
///
/// assert_eq!(human_readable_size(512), "512 b");
/// assert_eq!(human_readable_size(1536), "1.50 kb");
/// assert_eq!(human_readable_size(5 * 1024 * 1024), "5 mb");
/// ```
pub fn human_readable_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut suffix = 0;
    while size > 1024.0 && suffix < SIZE_SUFFIXES.len() - 1 {
        suffix += 1;
        size /= 1024.0;
    }
    format!("{size:.2} {}", SIZE_SUFFIXES[suffix]).replace(".00", "")
}

/// Format whole seconds as `H:MM:SS`.
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// A duration split into days, hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl From<Duration> for Breakdown {
    fn from(duration: Duration) -> Self {
        let secs = duration.as_secs();
        Self {
            days: secs / 86_400,
            hours: (secs % 86_400) / 3600,
            minutes: (secs % 3600) / 60,
            seconds: secs % 60,
        }
    }
}

impl Display for Breakdown {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} days, {} hours, {} minutes, {} seconds",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}
