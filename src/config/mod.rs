//! Configuration for daybook: where the user prays and where records live.
//!
//! The configuration file is `daybook.toml`, looked up in:
//! 1. The directory passed with `--config` (see [`set_config_dir`])
//! 2. **XDG_CONFIG_HOME**/daybook/daybook.toml
//!
//! A commented default file is written on first run.
//!
//! ```toml
//! #[Location]
//! latitude = 6.524400           # Geographic latitude (-90 to 90)
//! longitude = 3.379200          # Geographic longitude (-180 to 180)
//! timezone = "Africa/Lagos"     # IANA zone; detected from coordinates when omitted
//!
//! #[Prayer times]
//! method = "MuslimWorldLeague"  # MuslimWorldLeague, Egyptian, Karachi, NorthAmerica, UmmAlQura, Dubai
//! asr_madhab = "shafi"          # shafi or hanafi
//!
//! #[Storage]
//! user_id = "local"             # Owner of the daily records
//! database = "daybook.db"       # SQLite file, relative to this directory
//! ```
//!
//! Every key is optional. Values are validated before defaults are applied, so
//! a bad value is reported rather than silently replaced.

pub mod builder;
pub mod loading;
pub mod validation;


use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::common::constants::*;
use crate::prayer::{AsrMadhab, CalculationMethod, Location};

pub use builder::create_default_config;
pub use loading::{get_config_base_dir, get_config_path, load, load_from_path, set_config_dir};

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// IANA timezone name. Detected from the coordinates when absent.
    pub timezone: Option<String>,
    pub method: Option<String>,
    pub asr_madhab: Option<String>,
    pub user_id: Option<String>,
    /// SQLite database path; relative paths resolve against the config directory.
    pub database: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        load_from_path(path)
    }

    /// Build the prayer location these settings describe.
    pub fn location(&self) -> Result<Location> {
        let method: CalculationMethod = self
            .method
            .as_deref()
            .unwrap_or(DEFAULT_METHOD)
            .parse()
            .map_err(anyhow::Error::msg)?;
        let madhab: AsrMadhab = self
            .asr_madhab
            .as_deref()
            .unwrap_or(DEFAULT_ASR_MADHAB)
            .parse()
            .map_err(anyhow::Error::msg)?;
        let timezone = self
            .timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|e| anyhow::anyhow!("invalid timezone '{name}': {e}"))
            })
            .transpose()?;

        Ok(Location::resolve(
            self.latitude.unwrap_or(DEFAULT_LATITUDE),
            self.longitude.unwrap_or(DEFAULT_LONGITUDE),
            method,
            madhab,
            timezone,
        ))
    }

    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or(DEFAULT_USER_ID)
    }

    /// Database file, resolved against `base_dir` when relative.
    pub fn database_path(&self, base_dir: &Path) -> PathBuf {
        let database = Path::new(self.database.as_deref().unwrap_or(DEFAULT_DATABASE));
        if database.is_absolute() {
            database.to_path_buf()
        } else {
            base_dir.join(database)
        }
    }

    /// Database path next to the active configuration file.
    pub fn resolved_database_path(&self) -> Result<PathBuf> {
        let base = get_config_base_dir().context("Could not locate the database directory")?;
        Ok(self.database_path(&base))
    }

    pub fn log_config(&self, location: &Location) {
        log_block_start!("Loaded configuration");

        let lat_dir = if location.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if location.longitude >= 0.0 { "E" } else { "W" };
        log_indented!(
            "Location: {:.3}°{}, {:.3}°{} ({})",
            location.latitude.abs(),
            lat_dir,
            location.longitude.abs(),
            lon_dir,
            location.timezone
        );
        if self.timezone.is_none() {
            log_indented!("Timezone detected from coordinates");
        }
        log_indented!(
            "Method: {} (asr: {})",
            location.method,
            location.madhab.as_str()
        );
        log_indented!("User: {}", self.user_id());
    }
}
