//! Ethograms command for listing the built-in category sets.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use mn_core::{Category, Preset};
use serde::Serialize;

/// Preset data for display.
#[derive(Debug, Serialize)]
pub struct PresetEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub default: String,
    pub initial: String,
    pub categories: Vec<Category>,
}

pub fn preset_entries() -> Vec<PresetEntry> {
    Preset::ALL
        .iter()
        .map(|preset| {
            let ethogram = preset.ethogram();
            PresetEntry {
                name: preset.name(),
                description: preset.description(),
                default: ethogram.default_key().to_string(),
                initial: ethogram.initial_key().to_string(),
                categories: ethogram.categories().to_vec(),
            }
        })
        .collect()
}

/// Formats presets for human-readable output.
pub fn format_presets(entries: &[PresetEntry]) -> String {
    let mut output = String::new();

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            writeln!(output).unwrap();
        }
        writeln!(output, "{} - {}", entry.name, entry.description).unwrap();
        for category in &entry.categories {
            writeln!(
                output,
                "  {}  {:<22} {}",
                category.key, category.label, category.color
            )
            .unwrap();
        }
        writeln!(
            output,
            "  default {}, starts in {}",
            entry.default, entry.initial
        )
        .unwrap();
    }

    output
}

/// Formats presets as JSON.
pub fn format_presets_json(entries: &[PresetEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Runs the ethograms command.
pub fn run<W: Write>(writer: &mut W, json: bool) -> Result<()> {
    let entries = preset_entries();
    if json {
        writeln!(writer, "{}", format_presets_json(&entries)?)?;
    } else {
        write!(writer, "{}", format_presets(&entries))?;
    }
    Ok(())
}
