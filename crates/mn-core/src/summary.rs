//! Per-category totals of a finished recording.

use serde::Serialize;

use crate::action_log::{ActionLog, Interval};
use crate::ethogram::{CategoryKey, Color, Ethogram};

/// Sum of interval durations in seconds.
pub fn total_duration(intervals: &[Interval]) -> f64 {
    intervals.iter().map(Interval::duration).sum()
}

/// Totals for one category that has recorded intervals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub key: CategoryKey,
    pub label: String,
    pub color: Color,
    pub total_secs: f64,
    pub intervals: Vec<Interval>,
}

/// Category totals in ethogram order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub entries: Vec<SummaryEntry>,
}

impl Summary {
    /// Sum of all category totals.
    pub fn total_secs(&self) -> f64 {
        self.entries.iter().map(|e| e.total_secs).sum()
    }

    /// Fraction of the total held by `entry`, in `[0, 1]`. Zero when nothing
    /// was recorded.
    pub fn share(&self, entry: &SummaryEntry) -> f64 {
        let total = self.total_secs();
        if total > 0.0 {
            entry.total_secs / total
        } else {
            0.0
        }
    }
}

/// Reduces a log to per-category totals.
///
/// Categories are visited in ethogram order; categories without intervals
/// are left out.
pub fn summarize(log: &ActionLog, ethogram: &Ethogram) -> Summary {
    let entries = ethogram
        .categories()
        .iter()
        .filter_map(|category| {
            let intervals = log.intervals(category.key);
            if intervals.is_empty() {
                return None;
            }
            Some(SummaryEntry {
                key: category.key,
                label: category.label.clone(),
                color: category.color,
                total_secs: total_duration(intervals),
                intervals: intervals.to_vec(),
            })
        })
        .collect();

    Summary { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::engine::SegmentationEngine;
    use crate::ethogram::{PAUSE_KEY, Preset, QUIT_KEY};

    #[test]
    #[expect(clippy::float_cmp, reason = "sums of small integers are exact")]
    fn total_duration_sums_intervals() {
        let intervals = [Interval::new(0.0, 2.0), Interval::new(5.0, 9.0)];
        assert_eq!(total_duration(&intervals), 6.0);
        assert_eq!(total_duration(&[]), 0.0);
    }

    #[test]
    fn summary_follows_ethogram_order_and_skips_empty() {
        let ethogram = Preset::Mice.ethogram();
        let mut engine = SegmentationEngine::new(ethogram.clone());
        let events = [
            ('g', 1.0),
            ('a', 3.0),
            (PAUSE_KEY, 4.0),
            (PAUSE_KEY, 6.0),
            ('g', 7.0),
        ];
        for (key, now) in events {
            engine.apply(key, now);
        }
        engine.apply(QUIT_KEY, 10.0);
        let log = engine.finish().unwrap();

        let summary = summarize(&log, &ethogram);
        let labels: Vec<&str> = summary.entries.iter().map(|e| e.label.as_str()).collect();
        // Mice order puts allogrooming first, grooming before other.
        assert_eq!(labels, ["Allogrooming", "Grooming", "Other"]);

        let grooming = &summary.entries[1];
        assert_eq!(
            grooming.intervals,
            vec![Interval::new(1.0, 3.0), Interval::new(5.0, 8.0)]
        );
        assert!((grooming.total_secs - 5.0).abs() < f64::EPSILON);
        assert!((summary.total_secs() - 8.0).abs() < f64::EPSILON);
        assert!((summary.share(grooming) - 0.625).abs() < f64::EPSILON);
    }

    #[test]
    fn share_is_zero_for_empty_recording() {
        let ethogram = Preset::HomeCage.ethogram();
        let mut engine = SegmentationEngine::new(ethogram.clone());
        engine.apply(QUIT_KEY, 0.0);
        let summary = summarize(&engine.finish().unwrap(), &ethogram);

        assert_eq!(summary.entries.len(), 1);
        assert!(summary.share(&summary.entries[0]).abs() < f64::EPSILON);
    }
}
