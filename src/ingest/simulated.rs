/// Deterministic simulated weather.
///
/// Stands in for the station network when no sensors are wired up (demos,
/// offline dashboards). Values follow the station's local time of day: a
/// sine over the day peaking in the early evening, plus a small drift
/// within the hour. There is no randomness, so two calls with the same
/// instant agree exactly.

use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone, Timelike, Utc};
use std::f64::consts::PI;

use super::ReadingSource;
use crate::analysis::precipitation::DEFAULT_LOOKBACK_MINUTES;
use crate::model::{SensorReading, SourceError, WeatherMetrics};

const BASE_PRECIPITATION_MM: f64 = 8.0;
const BASE_HUMIDITY_PCT: f64 = 75.0;
const BASE_WIND_KMH: f64 = 8.0;
const BASE_TEMPERATURE_C: f64 = 27.0;
const BASE_PRESSURE_HPA: f64 = 1009.0;
const STATION_ELEVATION_M: f64 = 45.0;

/// Mapped as no-risk, so keep the simulated conditions dry there.
const DRY_ZONE_MAX_VAR: i32 = -2;

/// Simulated metrics for instant `at` in a station with zone `hazard_zone`.
///
/// The cycle follows the hour of `at` in its own time zone, so pass a
/// station-local `DateTime`. `precipitation_chance` is filled in and stays
/// within 10–90%.
pub fn simulate_metrics<Tz: TimeZone>(
    hazard_zone: Option<i32>,
    at: &DateTime<Tz>,
) -> WeatherMetrics {
    let (base_precipitation, base_humidity) = match hazard_zone {
        Some(var) if var <= DRY_ZONE_MAX_VAR => (5.0, 70.0),
        _ => (BASE_PRECIPITATION_MM, BASE_HUMIDITY_PCT),
    };

    let (daily, intra_hour) = cycle(at);

    WeatherMetrics {
        precipitation_mm: (base_precipitation + daily * 2.0).max(0.0),
        humidity_pct: (base_humidity + daily * 3.0 + intra_hour * 1.5).clamp(0.0, 100.0),
        wind_speed_kmh: (BASE_WIND_KMH + daily * 2.0).max(0.0),
        temperature_c: BASE_TEMPERATURE_C + daily * 2.5 + intra_hour * 0.5,
        precipitation_chance: Some(((daily + 1.0) * 40.0 + intra_hour * 10.0).clamp(10.0, 90.0)),
    }
}

/// Daily sine in [-1, 1] and the fraction of the current hour in [0, 1).
fn cycle<Tz: TimeZone>(at: &DateTime<Tz>) -> (f64, f64) {
    let hour = at.hour() as f64;
    let daily = ((hour - 12.0) * PI / 12.0).sin();
    let intra_hour = at.minute() as f64 / 60.0;
    (daily, intra_hour)
}

fn simulated_reading(hazard_zone: Option<i32>, at: &DateTime<FixedOffset>) -> SensorReading {
    let metrics = simulate_metrics(hazard_zone, at);
    let (daily, _) = cycle(at);
    SensorReading {
        timestamp: at.with_timezone(&Utc),
        temperature_c: metrics.temperature_c,
        humidity_pct: metrics.humidity_pct,
        // Pressure sags as the daily cycle turns wetter.
        pressure_hpa: Some(BASE_PRESSURE_HPA - daily * 3.0),
        wind_speed_kmh: metrics.wind_speed_kmh,
        precipitation_mm: metrics.precipitation_mm,
        soil_moisture_pct: None,
        elevation_m: Some(STATION_ELEVATION_M),
    }
}

/// `ReadingSource` over the simulation: the reading at the current instant
/// and one from an hour earlier, so the pressure trend is populated.
pub struct SimulatedSource {
    hazard_zone: Option<i32>,
    fixed_time: Option<DateTime<Utc>>,
    utc_offset: FixedOffset,
}

impl SimulatedSource {
    pub fn new(hazard_zone: Option<i32>) -> Self {
        Self {
            hazard_zone,
            fixed_time: None,
            utc_offset: Utc.fix(),
        }
    }

    /// Pin the simulated clock.
    pub fn at(hazard_zone: Option<i32>, time: DateTime<Utc>) -> Self {
        Self {
            fixed_time: Some(time),
            ..Self::new(hazard_zone)
        }
    }

    /// Run the daily cycle on the station's local time.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }
}

impl ReadingSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    fn fetch_recent(&mut self, limit: usize) -> Result<Vec<SensorReading>, SourceError> {
        let now = self
            .fixed_time
            .unwrap_or_else(Utc::now)
            .with_timezone(&self.utc_offset);
        let earlier = now - Duration::minutes(DEFAULT_LOOKBACK_MINUTES);

        let mut readings = vec![
            simulated_reading(self.hazard_zone, &now),
            simulated_reading(self.hazard_zone, &earlier),
        ];
        readings.truncate(limit);
        Ok(readings)
    }
}
