//! Contract for summary renderers.
//!
//! Rendering happens after the log is final. A renderer that cannot draw
//! (no terminal, write failure, nothing to show) reports
//! [`RenderOutcome::Unavailable`] instead of failing, and the caller carries on.

use crate::recorder::Recording;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    Unavailable(String),
}

impl RenderOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }
}

/// Draws a chart for a finished recording.
pub trait SummaryRenderer {
    fn render(&mut self, recording: &Recording) -> RenderOutcome;
}
