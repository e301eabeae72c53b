//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::commands::record::RecordArgs;

/// Keypress-driven behavioral annotation.
///
/// Watch an animal, press the key for what it is doing, and get the time spent
/// in each behavior when you quit.
#[derive(Debug, Parser)]
#[command(name = "mn", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a session from live keypresses.
    Record(RecordArgs),

    /// List the built-in ethograms.
    Ethograms {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Chart drawn after a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Proportion of time per category.
    #[default]
    Pie,
    /// Occurrence times per category.
    Raster,
    /// No chart.
    None,
}
