//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use mn_core::{Ethogram, EthogramTable, Preset};
use serde::{Deserialize, Serialize};

use crate::cli::ChartKind;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Name of the built-in ethogram to record with.
    pub ethogram: String,

    /// Print a line for every live keypress.
    pub print_progress: bool,

    /// Chart drawn after recording.
    pub chart: ChartKind,

    /// Sampling step for the raster chart, in seconds.
    pub raster_granularity_secs: f64,

    /// Custom category table. Replaces the named preset when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_ethogram: Option<EthogramTable>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ethogram: Preset::Mice.name().to_string(),
            print_progress: true,
            chart: ChartKind::Pie,
            raster_granularity_secs: 1.0,
            custom_ethogram: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (MN_*)
        figment = figment.merge(Env::prefixed("MN_"));

        figment.extract()
    }

    /// Resolves the ethogram to record with.
    ///
    /// `name` overrides the configured preset. A custom table wins unless a
    /// preset is explicitly named. Returns the display name with the ethogram.
    pub fn resolve_ethogram(&self, name: Option<&str>) -> anyhow::Result<(String, Ethogram)> {
        if let (None, Some(table)) = (name, &self.custom_ethogram) {
            let ethogram =
                Ethogram::new(table.clone()).context("invalid custom_ethogram in configuration")?;
            return Ok(("custom".to_string(), ethogram));
        }

        let name = name.unwrap_or(self.ethogram.as_str());
        let preset: Preset = name.parse()?;
        Ok((preset.name().to_string(), preset.ethogram()))
    }
}

/// Returns the platform-specific config directory for mn.
///
/// On Linux: `~/.config/mn`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mn"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use mn_core::CategoryKey;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (temp, path)
    }

    #[test]
    fn test_dirs_config_path_ends_with_mn() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "mn");
    }

    #[test]
    fn test_default_config_records_mice_with_pie_chart() {
        let config = Config::default();
        assert_eq!(config.ethogram, "mice");
        assert!(config.print_progress);
        assert_eq!(config.chart, ChartKind::Pie);
        assert!(config.custom_ethogram.is_none());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let (_temp, path) = write_config(
            r#"
ethogram = "two-chamber"
print_progress = false
chart = "raster"
raster_granularity_secs = 0.5
"#,
        );

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.ethogram, "two-chamber");
        assert!(!config.print_progress);
        assert_eq!(config.chart, ChartKind::Raster);
        assert!((config.raster_granularity_secs - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_ethogram_replaces_preset() {
        let (_temp, path) = write_config(
            r##"
[custom_ethogram]
default = "o"
initial = "h"

[[custom_ethogram.categories]]
key = "h"
label = "Huddling"
color = "#112233"

[[custom_ethogram.categories]]
key = "o"
label = "Other"
color = "#A6A6A6"
"##,
        );

        let config = Config::load_from(Some(&path)).unwrap();
        let (name, ethogram) = config.resolve_ethogram(None).unwrap();
        assert_eq!(name, "custom");
        assert_eq!(ethogram.initial_key(), CategoryKey::new('h'));
        assert_eq!(ethogram.label(CategoryKey::new('h')), "Huddling");

        // An explicit preset still wins over the custom table.
        let (name, _) = config.resolve_ethogram(Some("home-cage")).unwrap();
        assert_eq!(name, "home-cage");
    }

    #[test]
    fn test_invalid_custom_ethogram_is_rejected() {
        let config = Config {
            custom_ethogram: Some(EthogramTable {
                categories: Vec::new(),
                default: CategoryKey::new('o'),
                initial: None,
            }),
            ..Config::default()
        };

        let err = config.resolve_ethogram(None).unwrap_err();
        assert!(format!("{err:#}").contains("at least one category"));
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        let config = Config::default();
        let err = config.resolve_ethogram(Some("rats")).unwrap_err();
        assert_eq!(err.to_string(), "unknown ethogram preset: rats");
    }
}
