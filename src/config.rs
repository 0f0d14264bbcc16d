//! Configuration file support for ham-wrapped.
//!
//! Loads settings from `~/.config/ham-wrapped/config.toml` on Linux
//! (or platform-appropriate location on other OSes).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::geo::{Coordinates, is_valid_locator};
use crate::stats::DEFAULT_STATION;

/// Default source for the country file.
pub const DEFAULT_CTY_URL: &str = "https://www.country-files.com/cty/cty.dat";

/// Station position used for distances when no locator is known.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub lat: f64,
    pub lon: f64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            lat: DEFAULT_STATION.lat,
            lon: DEFAULT_STATION.lon,
        }
    }
}

impl From<StationConfig> for Coordinates {
    fn from(station: StationConfig) -> Self {
        Coordinates::new(station.lat, station.lon)
    }
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Operator callsign, logged when the CLI starts.
    pub callsign: Option<String>,

    /// Maidenhead locator of the operator's station.
    pub locator: Option<String>,

    /// Path or URL of the CTY.DAT country file.
    pub cty_source: String,

    /// Timeout for fetching the country file, in seconds.
    pub fetch_timeout: u64,

    /// Station position used when no locator is configured.
    pub fallback_station: StationConfig,

    /// Number of callsigns listed in the summary.
    pub top_callsigns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            callsign: None,
            locator: None,
            cty_source: DEFAULT_CTY_URL.to_string(),
            fetch_timeout: 30,
            fallback_station: StationConfig::default(),
            top_callsigns: 10,
        }
    }
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Invalid TOML in config file: {}", path.display()))
            }
            _ => Ok(Config::default()),
        }
    }

    /// Returns the path to the config file.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ham-wrapped/config.toml"))
    }

    /// Validate all configuration settings.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref locator) = self.locator
            && !is_valid_locator(locator)
        {
            anyhow::bail!("Invalid locator '{}'", locator);
        }

        let station = self.fallback_station;
        if !(-90.0..=90.0).contains(&station.lat) || !(-180.0..=180.0).contains(&station.lon) {
            anyhow::bail!(
                "Invalid fallback station position {}, {}",
                station.lat,
                station.lon
            );
        }

        if self.cty_source.trim().is_empty() {
            anyhow::bail!("cty_source must not be empty");
        }

        Ok(())
    }
}
