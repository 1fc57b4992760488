//! Per phase and per run counters

use super::Phase;
use crate::services::batch_writer::WriterStats;
use crate::services::key_cache::CacheStats;
use crate::utils::FlushOutcome;

/// Counters of one phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    /// Records (lines or sections) read from the data files
    pub records_scanned: u64,
    /// Records skipped because they did not parse
    pub parse_failures: u64,
    pub rows_written: u64,
    /// Rows given up on after the split retry reached its depth bound
    pub rows_dropped: u64,
    pub split_events: u64,
    pub files_read: u64,
    pub files_skipped: u64,
}

impl PhaseStats {
    pub fn display_string(&self) -> String {
        let mut text = format!(
            "{} records, {} rows written",
            self.records_scanned, self.rows_written
        );
        if self.parse_failures > 0 {
            text.push_str(&format!(", {} skipped", self.parse_failures));
        }
        if self.rows_dropped > 0 {
            text.push_str(&format!(", {} rows DROPPED", self.rows_dropped));
        }
        if self.split_events > 0 {
            text.push_str(&format!(", {} splits", self.split_events));
        }
        if self.files_skipped > 0 {
            text.push_str(&format!(", {} of {} files missing", self.files_skipped, self.files_read + self.files_skipped));
        }
        text
    }

    pub fn add_flush(&mut self, outcome: &FlushOutcome) {
        self.rows_written += outcome.written as u64;
        self.rows_dropped += outcome.dropped as u64;
        self.split_events += outcome.splits as u64;
    }

    pub fn add_writer(&mut self, stats: &WriterStats) {
        self.rows_written += stats.written;
        self.rows_dropped += stats.dropped;
        self.split_events += stats.splits;
    }

    /// Rows a key cache wrote since `before`
    pub fn add_cache_delta(&mut self, before: &CacheStats, after: &CacheStats) {
        self.rows_written += after.written - before.written;
        self.rows_dropped += after.dropped - before.dropped;
        self.split_events += after.splits - before.splits;
    }
}

/// Counters of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    pub phases: Vec<(Phase, PhaseStats)>,
    pub titles: CacheStats,
    pub persons: CacheStats,
    pub alias_titles: CacheStats,
}

impl RunStatistics {
    pub fn record(&mut self, phase: Phase, stats: PhaseStats) {
        self.phases.push((phase, stats));
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseStats> {
        self.phases.iter().find(|(p, _)| *p == phase).map(|(_, stats)| stats)
    }

    pub fn total(&self) -> PhaseStats {
        self.phases.iter().fold(PhaseStats::default(), |mut total, (_, stats)| {
            total.records_scanned += stats.records_scanned;
            total.parse_failures += stats.parse_failures;
            total.rows_written += stats.rows_written;
            total.rows_dropped += stats.rows_dropped;
            total.split_events += stats.split_events;
            total.files_read += stats.files_read;
            total.files_skipped += stats.files_skipped;
            total
        })
    }

    /// Rows dropped anywhere, fact rows and keys alike
    pub fn rows_dropped(&self) -> u64 {
        self.phases.iter().map(|(_, stats)| stats.rows_dropped).sum::<u64>()
            + self.titles.dropped
            + self.persons.dropped
            + self.alias_titles.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_string_mentions_only_nonzero_extras() {
        let stats = PhaseStats {
            records_scanned: 10,
            rows_written: 8,
            ..PhaseStats::default()
        };
        assert_eq!(stats.display_string(), "10 records, 8 rows written");

        let stats = PhaseStats {
            records_scanned: 10,
            rows_written: 8,
            parse_failures: 2,
            files_read: 1,
            files_skipped: 1,
            ..PhaseStats::default()
        };
        assert_eq!(
            stats.display_string(),
            "10 records, 8 rows written, 2 skipped, 1 of 2 files missing"
        );
    }

    #[test]
    fn test_total() {
        let mut run = RunStatistics::default();
        run.record(Phase::SeedTitles, PhaseStats { rows_written: 3, ..PhaseStats::default() });
        run.record(Phase::LinkFacts, PhaseStats { rows_written: 4, rows_dropped: 1, ..PhaseStats::default() });
        assert_eq!(run.total().rows_written, 7);
        assert_eq!(run.rows_dropped(), 1);
        assert_eq!(run.phase(Phase::LinkFacts).unwrap().rows_dropped, 1);
    }
}
