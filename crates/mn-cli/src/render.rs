//! Terminal charts for finished recordings.
//!
//! Both charts draw with block characters and, on a terminal, the ethogram's
//! colors. They report [`RenderOutcome::Unavailable`] rather than failing.

use std::io::{self, IsTerminal, Write};

use crossterm::style::{self, Stylize};
use mn_core::{Color, Recording, RenderOutcome, SummaryRenderer, discretize, summarize};

/// Width of bars and raster rows in columns.
const CHART_WIDTH: usize = 40;

/// Where a chart is written and whether it may use color.
#[derive(Debug)]
struct ChartOutput<W> {
    out: W,
    styled: bool,
    /// Why drawing is impossible, e.g. stdout is not a terminal.
    blocked: Option<String>,
}

impl<W: Write> ChartOutput<W> {
    fn paint(&self, text: String, color: Color) -> String {
        if self.styled {
            let color = style::Color::Rgb {
                r: color.r,
                g: color.g,
                b: color.b,
            };
            style::style(text).with(color).to_string()
        } else {
            text
        }
    }

    fn finish(&mut self, drawn: io::Result<()>) -> RenderOutcome {
        match drawn.and_then(|()| self.out.flush()) {
            Ok(()) => RenderOutcome::Rendered,
            Err(e) => RenderOutcome::unavailable(format!("failed to draw chart: {e}")),
        }
    }
}

fn stdout_output() -> ChartOutput<io::Stdout> {
    let out = io::stdout();
    let blocked = (!out.is_terminal()).then(|| "stdout is not a terminal".to_string());
    ChartOutput {
        out,
        styled: true,
        blocked,
    }
}

/// Horizontal proportion bars, one per category with recorded time.
#[derive(Debug)]
pub struct PieChart<W> {
    output: ChartOutput<W>,
}

impl PieChart<io::Stdout> {
    /// Draws on stdout in color. Unavailable when stdout is redirected.
    pub fn stdout() -> Self {
        Self {
            output: stdout_output(),
        }
    }
}

impl<W: Write> PieChart<W> {
    /// Draws plain text into `out`.
    pub const fn plain(out: W) -> Self {
        Self {
            output: ChartOutput {
                out,
                styled: false,
                blocked: None,
            },
        }
    }

    pub fn into_inner(self) -> W {
        self.output.out
    }
}

/// Number of filled cells for a share in `[0, 1]`.
///
/// Non-zero shares always get at least one cell so they stay visible.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn filled_cells(share: f64) -> usize {
    let filled = (share * CHART_WIDTH as f64)
        .round()
        .clamp(0.0, CHART_WIDTH as f64) as usize;
    if filled == 0 && share > 0.0 { 1 } else { filled }
}

impl<W: Write> SummaryRenderer for PieChart<W> {
    fn render(&mut self, recording: &Recording) -> RenderOutcome {
        if let Some(reason) = &self.output.blocked {
            return RenderOutcome::unavailable(reason.clone());
        }

        let summary = summarize(&recording.log, &recording.ethogram);
        if summary.total_secs() <= 0.0 {
            return RenderOutcome::unavailable("no recorded time to chart");
        }

        // Zero-length runs have nothing to show.
        let entries: Vec<_> = summary
            .entries
            .iter()
            .filter(|e| e.total_secs > 0.0)
            .collect();
        let width = entries
            .iter()
            .map(|e| e.label.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = vec!["TIME PER CATEGORY".to_string()];
        for entry in entries {
            let share = summary.share(entry);
            let filled = filled_cells(share);
            let bar = self.output.paint("█".repeat(filled), entry.color);
            let rest = "░".repeat(CHART_WIDTH - filled);
            let percent = share * 100.0;
            lines.push(format!(
                "{:<width$}  {bar}{rest}  {percent:>5.1}%",
                entry.label
            ));
        }

        let drawn = lines
            .iter()
            .try_for_each(|line| writeln!(self.output.out, "{line}"));
        self.output.finish(drawn)
    }
}

/// Event raster: one row per category, a tick per sampled occurrence.
#[derive(Debug)]
pub struct RasterPlot<W> {
    output: ChartOutput<W>,
    granularity: f64,
}

impl RasterPlot<io::Stdout> {
    /// Draws on stdout in color. Unavailable when stdout is redirected.
    pub fn stdout(granularity: f64) -> Self {
        Self {
            output: stdout_output(),
            granularity,
        }
    }
}

impl<W: Write> RasterPlot<W> {
    /// Draws plain text into `out`.
    pub const fn plain(out: W, granularity: f64) -> Self {
        Self {
            output: ChartOutput {
                out,
                styled: false,
                blocked: None,
            },
            granularity,
        }
    }

    pub fn into_inner(self) -> W {
        self.output.out
    }
}

/// Column for a time in `[0, end]`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn column(t: f64, end: f64) -> usize {
    let col = (t / end * CHART_WIDTH as f64).floor().max(0.0) as usize;
    col.min(CHART_WIDTH - 1)
}

impl<W: Write> SummaryRenderer for RasterPlot<W> {
    fn render(&mut self, recording: &Recording) -> RenderOutcome {
        if let Some(reason) = &self.output.blocked {
            return RenderOutcome::unavailable(reason.clone());
        }

        let end = recording.log.end();
        if end <= 0.0 {
            return RenderOutcome::unavailable("no recorded time to chart");
        }
        let rows = match discretize(&recording.log, &recording.ethogram, self.granularity) {
            Ok(rows) => rows,
            Err(e) => return RenderOutcome::unavailable(e.to_string()),
        };

        let width = rows
            .iter()
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = vec!["EVENT RASTER".to_string()];
        for row in &rows {
            let mut cells = vec![' '; CHART_WIDTH];
            for &t in &row.times {
                cells[column(t, end)] = '|';
            }
            let ticks: String = cells.into_iter().collect();
            let ticks = self.output.paint(ticks.trim_end().to_string(), row.color);
            let line = format!("{:<width$}  {ticks}", row.label);
            lines.push(line.trim_end().to_string());
        }
        let end_label = format!("{end:.1}s");
        lines.push(format!(
            "{:width$}  0s{end_label:>pad$}",
            "",
            pad = CHART_WIDTH - 2
        ));

        let drawn = lines
            .iter()
            .try_for_each(|line| writeln!(self.output.out, "{line}"));
        self.output.finish(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use mn_core::{EndReason, Preset, QUIT_KEY, SegmentationEngine};

    fn two_chamber_recording() -> Recording {
        let ethogram = Preset::TwoChamber.ethogram();
        let mut engine = SegmentationEngine::new(ethogram.clone());
        engine.apply('l', 1.0);
        engine.apply('r', 4.0);
        engine.apply(QUIT_KEY, 5.0);
        Recording {
            ethogram,
            log: engine.finish().unwrap(),
            ended_by: EndReason::QuitKey,
        }
    }

    #[test]
    fn pie_chart_draws_shares_in_ethogram_order() {
        let mut chart = PieChart::plain(Vec::new());
        let outcome = chart.render(&two_chamber_recording());
        assert_eq!(outcome, RenderOutcome::Rendered);

        let output = String::from_utf8(chart.into_inner()).unwrap();
        assert_snapshot!(output, @r"
        TIME PER CATEGORY
        Left Chamber   ████████████████████████░░░░░░░░░░░░░░░░   60.0%
        Center         ████████░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░   20.0%
        Right Chamber  ████████░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░   20.0%
        ");
    }

    #[test]
    fn pie_chart_unavailable_without_recorded_time() {
        let ethogram = Preset::Mice.ethogram();
        let mut engine = SegmentationEngine::new(ethogram.clone());
        engine.apply(QUIT_KEY, 0.0);
        let recording = Recording {
            ethogram,
            log: engine.finish().unwrap(),
            ended_by: EndReason::QuitKey,
        };

        let mut chart = PieChart::plain(Vec::new());
        assert_eq!(
            chart.render(&recording),
            RenderOutcome::unavailable("no recorded time to chart")
        );
        assert!(chart.into_inner().is_empty());
    }

    #[test]
    fn pie_chart_skips_zero_length_categories() {
        let ethogram = Preset::TwoChamber.ethogram();
        let mut engine = SegmentationEngine::new(ethogram.clone());
        engine.apply('l', 0.0);
        engine.apply(QUIT_KEY, 2.0);
        let recording = Recording {
            ethogram,
            log: engine.finish().unwrap(),
            ended_by: EndReason::QuitKey,
        };

        let mut chart = PieChart::plain(Vec::new());
        assert_eq!(chart.render(&recording), RenderOutcome::Rendered);

        let output = String::from_utf8(chart.into_inner()).unwrap();
        assert_snapshot!(output, @r"
        TIME PER CATEGORY
        Left Chamber  ████████████████████████████████████████  100.0%
        ");
    }

    #[test]
    fn tiny_shares_stay_visible() {
        assert_eq!(filled_cells(0.001), 1);
        assert_eq!(filled_cells(0.0), 0);
        assert_eq!(filled_cells(1.0), CHART_WIDTH);
    }

    #[test]
    fn raster_plot_marks_occurrences() {
        let mut plot = RasterPlot::plain(Vec::new(), 0.5);
        let outcome = plot.render(&two_chamber_recording());
        assert_eq!(outcome, RenderOutcome::Rendered);

        let output = String::from_utf8(plot.into_inner()).unwrap();
        assert_snapshot!(output, @r"
        EVENT RASTER
        Left Chamber           |   |   |   |   |   |
        Center         |   |
        Right Chamber                                  |   |
                       0s                                  5.0s
        ");
    }

    #[test]
    fn raster_plot_reports_bad_granularity() {
        let mut plot = RasterPlot::plain(Vec::new(), 0.0);
        let outcome = plot.render(&two_chamber_recording());
        assert!(matches!(
            outcome,
            RenderOutcome::Unavailable(reason) if reason.contains("granularity")
        ));
    }

    #[test]
    fn raster_plot_refuses_oversampling() {
        let mut plot = RasterPlot::plain(Vec::new(), 1e-12);
        let outcome = plot.render(&two_chamber_recording());
        assert!(matches!(
            outcome,
            RenderOutcome::Unavailable(reason) if reason.contains("limit is 1000000")
        ));
        assert!(plot.into_inner().is_empty());
    }

    #[test]
    fn write_failures_are_reported_not_raised() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("pipe closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut chart = PieChart::plain(Broken);
        let outcome = chart.render(&two_chamber_recording());
        assert!(matches!(
            outcome,
            RenderOutcome::Unavailable(reason) if reason.contains("pipe closed")
        ));
    }
}
