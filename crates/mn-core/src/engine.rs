//! Event segmentation state machine.
//!
//! Converts a stream of `(key, elapsed seconds)` events into per-category
//! intervals of active time.
//!
//! # Timekeeping
//!
//! `now` is the raw elapsed time since recording start. The engine keeps a
//! running `clock_offset` holding the total paused time, and every interval
//! boundary is stamped with the effective time `now - clock_offset`. Pauses
//! therefore vanish from the log: an interval open across a pause ends as if
//! the pause never happened, and at every effective instant exactly one
//! category is active.

use tracing::{debug, warn};

use crate::action_log::{ActionLog, Interval};
use crate::ethogram::{CategoryKey, Ethogram, PAUSE_KEY, QUIT_KEY};

/// Whether the driving loop should keep reading keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSignal {
    Continue,
    Quit,
}

/// What a single event did to the engine.
///
/// All times are effective (pause-excised) seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The active category changed and the previous interval was closed.
    Switched {
        from: CategoryKey,
        to: CategoryKey,
        at: f64,
        /// The pressed key was not in the ethogram and the default was used.
        substituted: bool,
    },
    /// A live key resolved to the already active category.
    Repeated {
        category: CategoryKey,
        at: f64,
        substituted: bool,
    },
    /// Recording was paused.
    Paused { at: f64 },
    /// Recording resumed after `pause_secs` of excised time.
    Resumed { at: f64, pause_secs: f64 },
    /// A key arrived while paused and was dropped.
    Ignored,
    /// The open interval was closed and the log finalized.
    Quit { at: f64 },
    /// An event arrived after the log was finalized.
    AlreadyFinished,
}

impl Step {
    pub const fn signal(&self) -> EngineSignal {
        match self {
            Self::Quit { .. } | Self::AlreadyFinished => EngineSignal::Quit,
            _ => EngineSignal::Continue,
        }
    }
}

#[derive(Debug, Clone)]
struct EngineState {
    current_category: CategoryKey,
    current_interval_start: f64,
    is_paused: bool,
    pause_started_at: f64,
    clock_offset: f64,
}

/// The segmentation engine for one recording.
#[derive(Debug, Clone)]
pub struct SegmentationEngine {
    ethogram: Ethogram,
    state: EngineState,
    log: ActionLog,
    finished: bool,
}

impl SegmentationEngine {
    /// Starts a recording in the ethogram's initial category at time zero.
    pub fn new(ethogram: Ethogram) -> Self {
        let state = EngineState {
            current_category: ethogram.initial_key(),
            current_interval_start: 0.0,
            is_paused: false,
            pause_started_at: 0.0,
            clock_offset: 0.0,
        };
        Self {
            ethogram,
            state,
            log: ActionLog::default(),
            finished: false,
        }
    }

    pub const fn ethogram(&self) -> &Ethogram {
        &self.ethogram
    }

    pub const fn current_category(&self) -> CategoryKey {
        self.state.current_category
    }

    pub const fn is_paused(&self) -> bool {
        self.state.is_paused
    }

    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feeds one event and reports whether to keep going.
    pub fn process_event(&mut self, key: char, now: f64) -> EngineSignal {
        self.apply(key, now).signal()
    }

    /// Feeds one event and reports what it did.
    pub fn apply(&mut self, key: char, now: f64) -> Step {
        if self.finished {
            debug!(?key, "event after quit ignored");
            return Step::AlreadyFinished;
        }

        let t = self.effective_time(now);

        if key == QUIT_KEY {
            // Quitting mid-pause excises the pause in progress as well.
            let at = if self.state.is_paused {
                self.state.pause_started_at
            } else {
                t
            };
            self.close_current(at);
            self.finished = true;
            debug!(at, intervals = self.log.len(), "recording finalized");
            return Step::Quit { at };
        }

        if key == PAUSE_KEY {
            return if self.state.is_paused {
                let pause_secs = (t - self.state.pause_started_at).max(0.0);
                self.state.clock_offset += pause_secs;
                self.state.is_paused = false;
                let at = self.state.pause_started_at;
                debug!(at, pause_secs, "resumed");
                Step::Resumed { at, pause_secs }
            } else {
                self.state.pause_started_at = t;
                self.state.is_paused = true;
                debug!(at = t, "paused");
                Step::Paused { at: t }
            };
        }

        if self.state.is_paused {
            debug!(?key, "key ignored while paused");
            return Step::Ignored;
        }

        let (resolved, substituted) = self.ethogram.resolve(key);
        if substituted {
            warn!(
                ?key,
                default = %self.ethogram.label(resolved),
                "unrecognized key, using default category"
            );
        }

        let from = self.state.current_category;
        if resolved == from {
            return Step::Repeated {
                category: resolved,
                at: t,
                substituted,
            };
        }

        self.close_current(t);
        self.state.current_category = resolved;
        self.state.current_interval_start = t;
        debug!(from = %from, to = %resolved, at = t, "category switched");
        Step::Switched {
            from,
            to: resolved,
            at: t,
            substituted,
        }
    }

    /// Hands out the finished log. `None` until quit has been processed.
    pub fn finish(self) -> Option<ActionLog> {
        self.finished.then_some(self.log)
    }

    /// Effective time for a raw timestamp, never earlier than the open
    /// interval's start.
    fn effective_time(&self, now: f64) -> f64 {
        (now - self.state.clock_offset).max(self.state.current_interval_start)
    }

    fn close_current(&mut self, end: f64) {
        self.log.push(
            self.state.current_category,
            Interval::new(self.state.current_interval_start, end),
        );
    }
}
