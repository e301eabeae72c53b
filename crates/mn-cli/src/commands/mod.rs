//! CLI subcommand implementations.

pub mod ethograms;
pub mod record;
