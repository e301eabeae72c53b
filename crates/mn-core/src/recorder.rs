//! The sequential recording loop and its input seams.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

use crate::action_log::ActionLog;
use crate::engine::{EngineSignal, SegmentationEngine, Step};
use crate::ethogram::{Ethogram, QUIT_KEY};

/// Failure of the keystroke source.
#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("failed to read key: {0}")]
    Io(#[from] std::io::Error),

    #[error("key source closed")]
    Closed,
}

/// Result of one blocking read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRead {
    Key(char),
    /// The read was interrupted. Treated as a no-op.
    Interrupted,
}

/// Supplies one key at a time, blocking until a key is pressed.
pub trait KeySource {
    fn next_key(&mut self) -> Result<KeyRead, KeySourceError>;
}

/// Elapsed seconds since recording start.
pub trait Clock {
    fn elapsed_secs(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    started: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

/// Receives every step as it happens, e.g. to print progress.
pub trait StepObserver {
    fn on_step(&mut self, step: &Step, ethogram: &Ethogram);
}

impl<F> StepObserver for F
where
    F: FnMut(&Step, &Ethogram),
{
    fn on_step(&mut self, step: &Step, ethogram: &Ethogram) {
        self(step, ethogram);
    }
}

/// How a recording ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The operator pressed the quit key.
    QuitKey,
    /// The key source failed; the log was closed at the time of failure.
    SourceFailed(String),
}

/// A finished recording.
#[derive(Debug, Clone)]
pub struct Recording {
    pub ethogram: Ethogram,
    pub log: ActionLog,
    pub ended_by: EndReason,
}

/// Drives `engine` from `source` until quit.
///
/// Interrupted reads are skipped. If the source fails, the open interval is
/// closed at the current time so nothing already captured is lost.
pub fn record<K, C, O>(
    source: &mut K,
    clock: &C,
    mut engine: SegmentationEngine,
    observer: &mut O,
) -> Recording
where
    K: KeySource + ?Sized,
    C: Clock + ?Sized,
    O: StepObserver + ?Sized,
{
    let ethogram = engine.ethogram().clone();

    let ended_by = loop {
        let key = match source.next_key() {
            Ok(KeyRead::Key(key)) => key,
            Ok(KeyRead::Interrupted) => {
                debug!("key read interrupted");
                continue;
            }
            Err(e) => {
                warn!(error = %e, "key source failed, closing recording");
                let step = engine.apply(QUIT_KEY, clock.elapsed_secs());
                observer.on_step(&step, &ethogram);
                break EndReason::SourceFailed(e.to_string());
            }
        };

        let step = engine.apply(key, clock.elapsed_secs());
        observer.on_step(&step, &ethogram);
        if step.signal() == EngineSignal::Quit {
            break EndReason::QuitKey;
        }
    };

    // Both exits above go through the quit path, so the log is final.
    let log = engine.finish().unwrap_or_default();

    Recording {
        ethogram,
        log,
        ended_by,
    }
}
