/// Service configuration loader - parses florisk.toml
///
/// Keeps the station position, dataset location and tuning knobs out of the
/// code so a deployment can move the station or switch classifier policy
/// without recompiling. Secrets (database URL, API key) stay in the
/// environment and are read through `dotenv`.

use chrono::{Duration, FixedOffset};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::alert::risk::RiskPolicy;
use crate::analysis::precipitation::DEFAULT_LOOKBACK_MINUTES;
use crate::ingest::DEFAULT_READING_LIMIT;
use crate::model::GeoPoint;
use crate::monitor::DEFAULT_TTL_SECONDS;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "florisk.toml";

/// Environment variable that overrides the config path.
pub const CONFIG_PATH_ENV: &str = "FLORISK_CONFIG";

/// Longest accepted precipitation lookback (one week).
pub const MAX_LOOKBACK_MINUTES: i64 = 7 * 24 * 60;

/// Longest accepted display cache TTL (one day).
pub const MAX_CACHE_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub station: StationConfig,
    pub hazard_zones: HazardZonesConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub precipitation: PrecipitationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

/// The weather station being assessed.
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Station local time as minutes east of UTC (Butuan City is 480).
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl StationConfig {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }

    /// Fixed offset of the station's local time.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "station.utc_offset_minutes {} is not a valid UTC offset",
                    self.utc_offset_minutes
                ))
            })
    }
}

/// Where the hazard zone GeoJSON lives.
#[derive(Debug, Clone, Deserialize)]
pub struct HazardZonesConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub policy: RiskPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrecipitationConfig {
    /// Minimum age of the "previous" reading, in minutes.
    #[serde(default = "default_lookback_minutes")]
    pub lookback_minutes: i64,
    /// Rows requested from the sensor source.
    #[serde(default = "default_reading_limit")]
    pub reading_limit: usize,
}

impl PrecipitationConfig {
    /// The lookback window as a duration.
    pub fn lookback(&self) -> Result<Duration, ConfigError> {
        bounded_duration(
            "precipitation.lookback_minutes",
            self.lookback_minutes,
            MAX_LOOKBACK_MINUTES,
            Duration::try_minutes,
        )
    }
}

impl Default for PrecipitationConfig {
    fn default() -> Self {
        Self {
            lookback_minutes: default_lookback_minutes(),
            reading_limit: default_reading_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: i64,
}

impl DisplayConfig {
    /// The display cache TTL as a duration.
    pub fn cache_ttl(&self) -> Result<Duration, ConfigError> {
        bounded_duration(
            "display.cache_ttl_seconds",
            self.cache_ttl_seconds,
            MAX_CACHE_TTL_SECONDS,
            Duration::try_seconds,
        )
    }
}

/// `value` must lie in `1..=max` and convert without overflow.
fn bounded_duration(
    name: &str,
    value: i64,
    max: i64,
    convert: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    if !(1..=max).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{} must be between 1 and {}, got {}",
            name, max, value
        )));
    }
    convert(value)
        .ok_or_else(|| ConfigError::Invalid(format!("{} is out of range: {}", name, value)))
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl_seconds(),
        }
    }
}

/// Which sensor reading source to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Postgres,
    Rest,
    #[default]
    Simulated,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// Restrict readings to one station node.
    pub node_id: Option<String>,
    /// PostgREST base URL; `SENSOR_API_URL` takes precedence.
    pub rest_url: Option<String>,
}

fn default_lookback_minutes() -> i64 {
    DEFAULT_LOOKBACK_MINUTES
}

fn default_reading_limit() -> usize {
    DEFAULT_READING_LIMIT
}

fn default_cache_ttl_seconds() -> i64 {
    DEFAULT_TTL_SECONDS
}

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Resolves the config path: `FLORISK_CONFIG` if set, else `florisk.toml`.
pub fn config_path() -> PathBuf {
    dotenv::dotenv().ok();
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads and validates the configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let config = parse_config(&contents).map_err(|e| match e {
        ConfigError::Parse { source, .. } => ConfigError::Parse {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })?;

    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Loads the configuration from `config_path()`.
pub fn load_default_config() -> Result<ServiceConfig, ConfigError> {
    load_config(config_path())
}

/// Parses and validates configuration text.
pub fn parse_config(contents: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: "<inline>".to_string(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.station
            .location()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("station location: {}", e)))?;

        if !(-180.0..=180.0).contains(&self.station.longitude)
            || !(-90.0..=90.0).contains(&self.station.latitude)
        {
            return Err(ConfigError::Invalid(format!(
                "station location [{}, {}] is outside WGS84 range",
                self.station.longitude, self.station.latitude
            )));
        }
        self.station.utc_offset()?;
        self.precipitation.lookback()?;
        if self.precipitation.reading_limit == 0 {
            return Err(ConfigError::Invalid(
                "precipitation.reading_limit must be at least 1".to_string(),
            ));
        }
        self.display.cache_ttl()?;
        Ok(())
    }
}
