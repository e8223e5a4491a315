//! Configuration validation.

use anyhow::Result;
use chrono_tz::Tz;

use super::Config;
use crate::prayer::{AsrMadhab, CalculationMethod};

/// Reject values that cannot describe a location or a record owner.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    if let Some(method) = &config.method {
        method
            .parse::<CalculationMethod>()
            .map_err(anyhow::Error::msg)?;
    }

    if let Some(madhab) = &config.asr_madhab {
        madhab.parse::<AsrMadhab>().map_err(anyhow::Error::msg)?;
    }

    if let Some(timezone) = &config.timezone
        && timezone.parse::<Tz>().is_err()
    {
        anyhow::bail!(
            "timezone '{}' is not a recognised IANA zone (e.g. \"Africa/Lagos\")",
            timezone
        );
    }

    if let Some(user_id) = &config.user_id
        && user_id.trim().is_empty()
    {
        anyhow::bail!("user_id cannot be empty");
    }

    if let Some(database) = &config.database
        && database.trim().is_empty()
    {
        anyhow::bail!("database path cannot be empty");
    }

    Ok(())
}
