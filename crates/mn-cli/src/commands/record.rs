//! Record command: annotate a live session from keypresses.
//!
//! Prints a key legend, reads keys until `q`, then prints the per-category
//! summary and draws the configured chart.

use std::fmt::Write as _;
use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Args;
use mn_core::{
    EndReason, Ethogram, MonotonicClock, QUIT_KEY, Recording, RenderOutcome, SegmentationEngine,
    Step, StepObserver, SummaryRenderer, summarize,
};
use serde::Serialize;

use crate::Config;
use crate::cli::ChartKind;
use crate::render::{PieChart, RasterPlot};
use crate::terminal::TerminalKeys;

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Built-in ethogram to record with (see `mn ethograms`).
    #[arg(short, long)]
    pub ethogram: Option<String>,

    /// Do not print a line for every keypress.
    #[arg(short, long)]
    pub quiet: bool,

    /// Chart to draw after recording.
    #[arg(long, value_enum)]
    pub chart: Option<ChartKind>,

    /// Raster sampling step in seconds.
    #[arg(long)]
    pub granularity: Option<f64>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Settings for one recording after merging flags over configuration.
#[derive(Debug, Clone)]
pub struct RecordSettings {
    pub ethogram_name: String,
    pub ethogram: Ethogram,
    pub print_progress: bool,
    pub chart: ChartKind,
    pub granularity: f64,
    pub json: bool,
}

impl RecordSettings {
    pub fn resolve(args: &RecordArgs, config: &Config) -> Result<Self> {
        let (ethogram_name, ethogram) = config.resolve_ethogram(args.ethogram.as_deref())?;
        let granularity = args.granularity.unwrap_or(config.raster_granularity_secs);
        if !granularity.is_finite() || granularity <= 0.0 {
            anyhow::bail!("raster granularity must be a positive number of seconds");
        }
        Ok(Self {
            ethogram_name,
            ethogram,
            print_progress: config.print_progress && !args.quiet,
            chart: args.chart.unwrap_or(config.chart),
            granularity,
            json: args.json,
        })
    }

    /// Chart to draw after the summary. JSON output stays machine-readable,
    /// so it never gets one.
    pub const fn chart_to_draw(&self) -> ChartKind {
        if self.json {
            ChartKind::None
        } else {
            self.chart
        }
    }
}

/// Prints operator-facing progress lines as steps happen.
pub struct ConsoleProgress<W> {
    out: W,
    print_progress: bool,
}

impl<W: Write> ConsoleProgress<W> {
    pub const fn new(out: W, print_progress: bool) -> Self {
        Self {
            out,
            print_progress,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(step: &Step, ethogram: &Ethogram, print_progress: bool) -> Option<String> {
        match *step {
            Step::Switched { to, at, .. } if print_progress => {
                Some(format!("{} at {at:.6} seconds", ethogram.label(to)))
            }
            Step::Repeated { category, at, .. } if print_progress => {
                Some(format!("{} at {at:.6} seconds", ethogram.label(category)))
            }
            Step::Paused { .. } => Some("Pausing".to_string()),
            Step::Resumed { pause_secs, .. } => {
                Some(format!("Ended {pause_secs:.6} second pause"))
            }
            _ => None,
        }
    }
}

impl<W: Write> StepObserver for ConsoleProgress<W> {
    fn on_step(&mut self, step: &Step, ethogram: &Ethogram) {
        if let Some(line) = Self::line(step, ethogram, self.print_progress) {
            if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
                tracing::debug!(error = %e, "failed to print progress");
            }
        }
    }
}

/// Formats the key legend shown before recording starts.
pub fn format_legend(name: &str, ethogram: &Ethogram) -> String {
    let mut output = String::new();
    writeln!(output, "Recording with the {name} ethogram").unwrap();
    for category in ethogram.categories() {
        let mut notes = Vec::new();
        if category.key == ethogram.initial_key() {
            notes.push("start");
        }
        if category.key == ethogram.default_key() {
            notes.push("default");
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!(" ({})", notes.join(", "))
        };
        writeln!(output, "  {}  {}{notes}", category.key, category.label).unwrap();
    }
    writeln!(output, "  space  pause/resume").unwrap();
    writeln!(output, "  {QUIT_KEY}  quit").unwrap();
    output
}

/// Formats the human-readable summary of a finished recording.
pub fn format_summary(name: &str, started_at: &DateTime<Local>, recording: &Recording) -> String {
    let summary = summarize(&recording.log, &recording.ethogram);
    let mut output = String::new();

    writeln!(
        output,
        "SUMMARY: {name} ethogram, started {}",
        started_at.format("%Y-%m-%d %H:%M:%S")
    )
    .unwrap();
    writeln!(output, "───────").unwrap();

    for entry in &summary.entries {
        writeln!(output, "{} ({:.6} seconds)", entry.label, entry.total_secs).unwrap();
        for interval in &entry.intervals {
            writeln!(output, "  {:.6} - {:.6}", interval.start, interval.end).unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "Total recorded: {:.6} seconds", summary.total_secs()).unwrap();
    if let EndReason::SourceFailed(reason) = &recording.ended_by {
        writeln!(output, "Recording ended early: {reason}").unwrap();
    }

    output
}

/// JSON summary structure.
#[derive(Debug, Serialize)]
pub struct JsonSummary<'a> {
    pub ethogram: &'a str,
    pub started_at: String,
    pub ended_by_quit: bool,
    pub total_secs: f64,
    pub categories: Vec<mn_core::SummaryEntry>,
}

/// Formats the summary of a finished recording as JSON.
pub fn format_summary_json(
    name: &str,
    started_at: &DateTime<Local>,
    recording: &Recording,
) -> Result<String> {
    let summary = summarize(&recording.log, &recording.ethogram);
    let json = JsonSummary {
        ethogram: name,
        started_at: started_at.to_rfc3339(),
        ended_by_quit: recording.ended_by == EndReason::QuitKey,
        total_secs: summary.total_secs(),
        categories: summary.entries,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Draws the configured chart, reporting why it could not be drawn.
fn render_chart(settings: &RecordSettings, recording: &Recording) -> RenderOutcome {
    let mut renderer: Box<dyn SummaryRenderer> = match settings.chart_to_draw() {
        ChartKind::Pie => Box::new(PieChart::stdout()),
        ChartKind::Raster => Box::new(RasterPlot::stdout(settings.granularity)),
        ChartKind::None => return RenderOutcome::Rendered,
    };
    renderer.render(recording)
}

/// Runs the record command.
pub fn run(args: &RecordArgs, config: &Config) -> Result<()> {
    let settings = RecordSettings::resolve(args, config)?;
    tracing::debug!(
        ethogram = %settings.ethogram_name,
        chart = ?settings.chart,
        "starting recording"
    );

    let mut stdout = io::stdout();
    write!(
        stdout,
        "{}",
        format_legend(&settings.ethogram_name, &settings.ethogram)
    )?;
    stdout.flush()?;

    let started_at = Local::now();
    let clock = MonotonicClock::start();
    let engine = SegmentationEngine::new(settings.ethogram.clone());
    let mut progress = ConsoleProgress::new(io::stdout(), settings.print_progress);
    let recording = mn_core::record(&mut TerminalKeys::new(), &clock, engine, &mut progress);

    if settings.json {
        let json = format_summary_json(&settings.ethogram_name, &started_at, &recording)
            .context("failed to serialize summary")?;
        writeln!(stdout, "{json}")?;
    } else {
        writeln!(stdout)?;
        write!(
            stdout,
            "{}",
            format_summary(&settings.ethogram_name, &started_at, &recording)
        )?;
    }
    stdout.flush()?;

    if let RenderOutcome::Unavailable(reason) = render_chart(&settings, &recording) {
        tracing::warn!(%reason, "could not draw summary chart");
    }

    Ok(())
}
