/// SensorReading, WeatherMetrics, GeoPoint, RiskAssessment, error types
///
/// Core data types for the flood risk assessment service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond small conversions, and no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// Standard sea-level pressure, used when the current reading has no
/// pressure value.
pub const STANDARD_PRESSURE_HPA: f64 = 1013.25;

/// A single row from the weather station's sensor log.
///
/// Readings are immutable once recorded. Sources always hand them out
/// most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    /// `None` when the barometer did not report for this row.
    pub pressure_hpa: Option<f64>,
    pub wind_speed_kmh: f64,
    pub precipitation_mm: f64,
    pub soil_moisture_pct: Option<f64>,
    pub elevation_m: Option<f64>,
}

/// Weather metrics fed to the risk classifier.
///
/// `precipitation_chance` is the 0–100 score from
/// `analysis::precipitation::estimate_chance`, or `None` if the caller has
/// no estimate (the zone-gated policy then falls back to raw metrics).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherMetrics {
    pub precipitation_mm: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
    pub temperature_c: f64,
    pub precipitation_chance: Option<f64>,
}

impl WeatherMetrics {
    /// Raw metrics of a reading, without a precipitation chance.
    pub fn from_reading(reading: &SensorReading) -> Self {
        WeatherMetrics {
            precipitation_mm: reading.precipitation_mm,
            humidity_pct: reading.humidity_pct,
            wind_speed_kmh: reading.wind_speed_kmh,
            temperature_c: reading.temperature_c,
            precipitation_chance: None,
        }
    }

    pub fn with_chance(mut self, chance: f64) -> Self {
        self.precipitation_chance = Some(chance);
        self
    }
}

// ---------------------------------------------------------------------------
// Geometry types
// ---------------------------------------------------------------------------

/// WGS84 coordinate in GeoJSON axis order (longitude first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        GeoPoint { longitude, latitude }
    }

    /// Rejects NaN and infinite coordinates.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.longitude.is_finite() && self.latitude.is_finite() {
            Ok(())
        } else {
            Err(GeometryError::InvalidGeometry {
                reason: format!(
                    "point [{}, {}] has a non-finite coordinate",
                    self.longitude, self.latitude
                ),
            })
        }
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(pair: [f64; 2]) -> Self {
        GeoPoint::new(pair[0], pair[1])
    }
}

// ---------------------------------------------------------------------------
// Assessment types
// ---------------------------------------------------------------------------

/// Final user-facing flood risk classification, in ascending severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Moderate,
    High,
}

/// Outcome of one evaluation. Recomputed on every call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// `Var` of the hazard zone containing the station, if any.
    pub hazard_zone_id: Option<i32>,
    pub precipitation_chance: Option<f64>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Malformed point or polygon input. This is the only error the core
/// surfaces to callers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },
}

/// Errors raised while retrieving sensor readings.
///
/// Never surfaced past `ingest::fetch_or_empty`; the pipeline treats any of
/// these as an empty reading set.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the sensor log API.
    #[error("Sensor API returned HTTP {0}")]
    Status(u16),

    /// Database query failed.
    #[error("Database query failed: {0}")]
    Database(#[from] postgres::Error),

    /// A row could not be turned into a `SensorReading`.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The source is missing settings it needs (URL, key, ...).
    #[error("Sensor source misconfigured: {0}")]
    Config(String),
}
