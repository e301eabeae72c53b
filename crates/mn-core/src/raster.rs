//! Discretized event occurrences for raster plots.

use serde::Serialize;
use thiserror::Error;

use crate::action_log::ActionLog;
use crate::ethogram::{CategoryKey, Color, Ethogram};

/// Most occurrence times one raster may hold.
pub const MAX_SAMPLES: u32 = 1_000_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RasterError {
    #[error("raster granularity must be a positive number of seconds, got {value}")]
    InvalidGranularity { value: f64 },

    #[error("raster granularity {granularity}s needs about {samples:.0} samples, limit is {limit}")]
    TooManySamples {
        granularity: f64,
        samples: f64,
        limit: u32,
    },
}

/// Sampled occurrence times for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterRow {
    pub key: CategoryKey,
    pub label: String,
    pub color: Color,
    pub times: Vec<f64>,
}

/// Samples every interval at `granularity` seconds.
///
/// Each interval `[start, end)` contributes `start, start + g, ...` up to but
/// excluding `end`. Rows are in ethogram order and only categories with
/// intervals get a row. Fails if the whole log would exceed [`MAX_SAMPLES`].
pub fn discretize(
    log: &ActionLog,
    ethogram: &Ethogram,
    granularity: f64,
) -> Result<Vec<RasterRow>, RasterError> {
    if !granularity.is_finite() || granularity <= 0.0 {
        return Err(RasterError::InvalidGranularity { value: granularity });
    }

    let samples: f64 = log
        .iter()
        .flat_map(|(_, intervals)| intervals)
        .map(|interval| ((interval.end - interval.start) / granularity).ceil())
        .sum();
    if samples > f64::from(MAX_SAMPLES) {
        return Err(RasterError::TooManySamples {
            granularity,
            samples,
            limit: MAX_SAMPLES,
        });
    }

    let rows = ethogram
        .categories()
        .iter()
        .filter_map(|category| {
            let intervals = log.intervals(category.key);
            if intervals.is_empty() {
                return None;
            }
            let times = intervals
                .iter()
                .flat_map(|interval| {
                    // Step by index so long intervals do not accumulate drift.
                    (0..=MAX_SAMPLES)
                        .map(move |i| f64::from(i).mul_add(granularity, interval.start))
                        .take_while(move |&t| t < interval.end)
                })
                .collect();
            Some(RasterRow {
                key: category.key,
                label: category.label.clone(),
                color: category.color,
                times,
            })
        })
        .collect();

    Ok(rows)
}
