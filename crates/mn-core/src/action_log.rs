//! Closed intervals of active time, grouped by category.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ethogram::CategoryKey;

/// A closed-open span of active time in seconds since recording start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Per-category intervals in the order they were closed.
///
/// Only the segmentation engine appends to a log; once handed out it is
/// read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ActionLog {
    intervals: BTreeMap<CategoryKey, Vec<Interval>>,
}

impl ActionLog {
    pub(crate) fn push(&mut self, key: CategoryKey, interval: Interval) {
        self.intervals.entry(key).or_default().push(interval);
    }

    /// Intervals recorded for a category, oldest first.
    pub fn intervals(&self, key: CategoryKey) -> &[Interval] {
        self.intervals
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterates categories that have at least one interval.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryKey, &[Interval])> {
        self.intervals.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Total number of intervals across all categories.
    pub(crate) fn len(&self) -> usize {
        self.intervals.values().map(Vec::len).sum()
    }

    /// End of the latest interval, or zero for an empty log.
    pub fn end(&self) -> f64 {
        self.intervals
            .values()
            .filter_map(|v| v.last())
            .map(|i| i.end)
            .fold(0.0, f64::max)
    }
}
