//! Total playing time of a library.

use crate::walk::TrackFile;
use std::time::Duration;
use tgtracks_extract::TagReader;

/// Running totals of known and unknown track durations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DurationSummary {
    /// Tracks whose duration could be read.
    pub with_duration: usize,
    /// Tracks whose duration couldn't be read.
    pub without_duration: usize,
    /// Sum of the known durations.
    pub known: Duration,
}

impl DurationSummary {
    pub fn record(&mut self, duration: Option<Duration>) {
        match duration.filter(|d| !d.is_zero()) {
            Some(duration) => {
                self.with_duration += 1;
                self.known += duration;
            },
            None => self.without_duration += 1,
        }
    }

    /// Average of the known durations, zero if none are known.
    pub fn average(&self) -> Duration {
        match u32::try_from(self.with_duration) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(count) => self.known / count,
        }
    }

    /// Known durations plus the average for every track with an unknown one.
    pub fn estimated_total(&self) -> Duration {
        let unknown = u32::try_from(self.without_duration).unwrap_or(u32::MAX);
        self.known + self.average() * unknown
    }
}

/// Read the duration of every file.
///
/// Files that can't be read at all count as having an unknown duration.
pub fn total_duration(files: &[TrackFile], reader: &dyn TagReader) -> DurationSummary {
    let mut summary = DurationSummary::default();
    for file in files {
        let duration = match reader.read(&file.path) {
            Ok(data) => data.and_then(|d| d.duration),
            Err(e) => {
                tracing::warn!(path = %file.path.display(), error = %e, "Couldn't read file");
                None
            },
        };
        if duration.is_none() {
            tracing::warn!(path = %file.path.display(), "Couldn't read file duration");
        }
        summary.record(duration);
    }
    summary
}
