//! Core domain logic for behavioral annotation.
//!
//! This crate contains:
//! - Ethograms: the static key/label/color tables, including built-in presets
//! - Segmentation: turning timed key presses into per-category intervals
//! - Summaries: per-category totals and raster sampling of a finished log
//! - The recording loop and the seams for key input, clock and rendering

mod action_log;
pub mod engine;
pub mod ethogram;
pub mod raster;
pub mod recorder;
pub mod render;
pub mod summary;

pub use action_log::{ActionLog, Interval};
pub use engine::{EngineSignal, SegmentationEngine, Step};
pub use ethogram::{
    Category, CategoryKey, Color, Ethogram, EthogramError, EthogramTable, PAUSE_KEY, Preset,
    QUIT_KEY,
};
pub use raster::{RasterError, RasterRow, discretize};
pub use recorder::{
    Clock, EndReason, KeyRead, KeySource, KeySourceError, MonotonicClock, Recording, StepObserver,
    record,
};
pub use render::{RenderOutcome, SummaryRenderer};
pub use summary::{Summary, SummaryEntry, summarize, total_duration};
