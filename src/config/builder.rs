//! Default configuration file generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;
use crate::prayer::solar::determine_timezone_from_coordinates;

/// Write a commented default `daybook.toml` at `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let timezone = determine_timezone_from_coordinates(DEFAULT_LATITUDE, DEFAULT_LONGITUDE);

    let content = ConfigBuilder::new()
        .add_section("Location")
        .add_setting(
            "latitude",
            &format!("{DEFAULT_LATITUDE:.6}"),
            "Geographic latitude (-90 to 90)",
        )
        .add_setting(
            "longitude",
            &format!("{DEFAULT_LONGITUDE:.6}"),
            "Geographic longitude (-180 to 180)",
        )
        .add_setting(
            "timezone",
            &format!("\"{}\"", timezone.name()),
            "IANA zone; detected from coordinates when omitted",
        )
        .add_section("Prayer times")
        .add_setting(
            "method",
            &format!("\"{DEFAULT_METHOD}\""),
            "MuslimWorldLeague, Egyptian, Karachi, NorthAmerica, UmmAlQura, Dubai",
        )
        .add_setting(
            "asr_madhab",
            &format!("\"{DEFAULT_ASR_MADHAB}\""),
            "shafi or hanafi",
        )
        .add_section("Storage")
        .add_setting(
            "user_id",
            &format!("\"{DEFAULT_USER_ID}\""),
            "Owner of the daily records",
        )
        .add_setting(
            "database",
            &format!("\"{DEFAULT_DATABASE}\""),
            "SQLite file, relative to this directory",
        )
        .build();

    fs::write(path, content + "\n")
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    log_indented!("Created default configuration at {}", path.display());
    Ok(())
}

/// Lays out sections and `key = value  # comment` lines with aligned comments.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !result.is_empty() {
                        result.push(String::new());
                    }
                    result.push(title);
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }
        result.join("\n")
    }
}
