/// Sensor reading sources.
///
/// Every source implements `ReadingSource::fetch_recent`, returning the
/// latest readings most recent first. Retrieval may fail; the assessment
/// pipeline only ever calls `fetch_or_empty`, which logs the failure and
/// degrades to an empty sequence so the estimator's "no readings ⇒ 0%"
/// default applies.
///
/// Submodules:
/// - `database`  - `sensor_logs` table over a direct PostgreSQL connection
/// - `rest`      - the same table through its PostgREST HTTP API
/// - `simulated` - deterministic simulated weather for demos and offline use
/// - `fixtures`  - (test only) representative payloads

pub mod database;
pub mod rest;
pub mod simulated;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::model::{SensorReading, SourceError};

/// Default number of rows requested for the precipitation estimate.
pub const DEFAULT_READING_LIMIT: usize = 10;

/// An external collaborator that can hand out recent sensor readings.
pub trait ReadingSource: Send {
    /// Short identifier used in logs (e.g. `"postgres"`).
    fn name(&self) -> &str;

    /// Up to `limit` readings, most recent first.
    fn fetch_recent(&mut self, limit: usize) -> Result<Vec<SensorReading>, SourceError>;
}

/// Fetches readings, turning any failure into an empty sequence.
///
/// The result is re-sorted most recent first, so callers can rely on the
/// ordering even if a source returns rows out of order.
pub fn fetch_or_empty(source: &mut dyn ReadingSource, limit: usize) -> Vec<SensorReading> {
    match source.fetch_recent(limit) {
        Ok(mut readings) => {
            readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            readings.truncate(limit);
            log::debug!("{} returned {} readings", source.name(), readings.len());
            readings
        }
        Err(e) => {
            log::warn!(
                "Sensor data unavailable from {}: {}; treating as no readings",
                source.name(),
                e
            );
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// sensor_logs row shape
// ---------------------------------------------------------------------------

/// One `sensor_logs` row as returned by the REST API.
///
/// Every column is nullable; nodes without a rain gauge or anemometer
/// simply leave those columns out. A row without `created_at` deserializes
/// but cannot become a reading.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorLogRow {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub precipitation: Option<f64>,
    #[serde(default)]
    pub soil_moisture: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
}

impl SensorLogRow {
    /// Converts the row, defaulting missing core metrics to 0. Pressure stays
    /// optional so the estimator can tell "missing" from a real value.
    pub fn into_reading(self) -> Result<SensorReading, SourceError> {
        let created_at = self
            .created_at
            .as_deref()
            .ok_or_else(|| SourceError::Parse("row has no created_at".to_string()))?;
        let timestamp = parse_timestamp(created_at)?;
        Ok(SensorReading {
            timestamp,
            temperature_c: self.temperature.unwrap_or(0.0),
            humidity_pct: self.humidity.unwrap_or(0.0),
            pressure_hpa: self.pressure,
            wind_speed_kmh: self.wind_speed.unwrap_or(0.0),
            precipitation_mm: self.precipitation.unwrap_or(0.0),
            soil_moisture_pct: self.soil_moisture,
            elevation_m: self.altitude,
        })
    }
}

/// Parses an RFC 3339 timestamp, or a naive one assumed to be UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, SourceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SourceError::Parse(format!("invalid timestamp '{}'", s)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
