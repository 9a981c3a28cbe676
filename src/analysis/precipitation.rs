/// Precipitation chance from humidity and pressure trend.
///
/// `estimate_chance` scores the likelihood of rain on a 0–100 scale from the
/// most recent reading's humidity and the pressure drop since a reading at
/// least one lookback period (default one hour) older:
///
/// ```text
/// drop%  = clamp((prev.pressure - cur.pressure) / prev.pressure * 100, 0, 100)
/// chance = clamp(cur.humidity * 0.6 + drop% * 0.4, 0, 100)
/// ```
///
/// Without a usable previous reading the score falls back to the current
/// humidity alone. The result depends only on the readings passed in.

use chrono::Duration;

use crate::model::{STANDARD_PRESSURE_HPA, SensorReading};

const HUMIDITY_WEIGHT: f64 = 0.6;
const PRESSURE_DROP_WEIGHT: f64 = 0.4;

/// How far back the "previous" reading must be, in minutes.
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 60;

/// Chance of precipitation in percent, using the default one-hour lookback.
///
/// `readings` must be ordered most recent first. An empty slice yields 0.
pub fn estimate_chance(readings: &[SensorReading]) -> f64 {
    estimate_chance_with_lookback(readings, Duration::minutes(DEFAULT_LOOKBACK_MINUTES))
}

/// Same as `estimate_chance` with an explicit lookback window.
pub fn estimate_chance_with_lookback(readings: &[SensorReading], lookback: Duration) -> f64 {
    let Some(current) = readings.first() else {
        log::debug!("No sensor readings, precipitation chance defaults to 0");
        return 0.0;
    };

    let humidity = finite_or_zero(current.humidity_pct);
    let current_pressure = current
        .pressure_hpa
        .filter(|p| p.is_finite())
        .unwrap_or(STANDARD_PRESSURE_HPA);

    // A lookback reaching past the representable range has no previous
    // reading either.
    let Some(cutoff) = current.timestamp.checked_sub_signed(lookback) else {
        log::debug!("Lookback {} out of range, using humidity only", lookback);
        return clamp_percent(humidity);
    };
    let previous = readings[1..].iter().find(|r| r.timestamp <= cutoff);

    let Some(previous) = previous else {
        return clamp_percent(humidity);
    };

    let Some(drop_pct) = previous
        .pressure_hpa
        .and_then(|p| pressure_drop_percent(p, current_pressure))
    else {
        // Zero, missing or non-finite denominator.
        log::debug!(
            "Reading at {} has unusable pressure, using humidity only",
            previous.timestamp
        );
        return clamp_percent(humidity);
    };

    clamp_percent(humidity * HUMIDITY_WEIGHT + drop_pct * PRESSURE_DROP_WEIGHT)
}

/// Pressure drop between two readings as a percentage of the earlier one,
/// clamped to 0–100. A rise gives 0. Returns `None` for a zero or
/// non-finite earlier pressure.
pub fn pressure_drop_percent(previous_hpa: f64, current_hpa: f64) -> Option<f64> {
    if !previous_hpa.is_finite() || previous_hpa == 0.0 || !current_hpa.is_finite() {
        return None;
    }
    Some(clamp_percent((previous_hpa - current_hpa) / previous_hpa * 100.0))
}

fn clamp_percent(value: f64) -> f64 {
    finite_or_zero(value).clamp(0.0, 100.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 14, hour, minute, 0).unwrap()
    }

    fn reading(ts: DateTime<Utc>, humidity: f64, pressure: Option<f64>) -> SensorReading {
        SensorReading {
            timestamp: ts,
            temperature_c: 27.0,
            humidity_pct: humidity,
            pressure_hpa: pressure,
            wind_speed_kmh: 8.0,
            precipitation_mm: 0.0,
            soil_moisture_pct: None,
            elevation_m: None,
        }
    }

    #[test]
    fn test_empty_readings_yield_zero() {
        assert_eq!(estimate_chance(&[]), 0.0);
    }

    #[test]
    fn test_humidity_and_pressure_drop_weighting() {
        // 80% humidity, 1010 -> 1000 hPa over an hour: drop is 0.990...%.
        let readings = vec![
            reading(at(12, 0), 80.0, Some(1000.0)),
            reading(at(11, 0), 75.0, Some(1010.0)),
        ];
        let drop = (1010.0 - 1000.0) / 1010.0 * 100.0;
        let expected = 80.0 * 0.6 + drop * 0.4;
        let chance = estimate_chance(&readings);
        assert!((chance - expected).abs() < 1e-9, "got {}", chance);
        // Roughly 48.4 as quoted for a 1% drop.
        assert!((chance - 48.4).abs() < 0.01, "got {}", chance);
    }

    #[test]
    fn test_unrepresentable_lookback_falls_back_to_humidity() {
        let readings = vec![
            reading(at(12, 0), 80.0, Some(1000.0)),
            reading(at(11, 0), 75.0, Some(1010.0)),
        ];
        assert_eq!(estimate_chance_with_lookback(&readings, Duration::MAX), 80.0);
        let huge = Duration::try_minutes(100_000_000_000_000).unwrap_or(Duration::MAX);
        assert_eq!(estimate_chance_with_lookback(&readings, huge), 80.0);
    }

    #[test]
    fn test_exact_one_percent_drop() {
        let readings = vec![
            reading(at(12, 0), 80.0, Some(990.0)),
            reading(at(10, 30), 80.0, Some(1000.0)),
        ];
        assert!((estimate_chance(&readings) - 48.4).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_rise_contributes_nothing() {
        let readings = vec![
            reading(at(12, 0), 50.0, Some(1020.0)),
            reading(at(11, 0), 50.0, Some(1000.0)),
        ];
        assert!((estimate_chance(&readings) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_previous_is_first_reading_at_least_an_hour_older() {
        // The 11:30 reading is too recent; 11:00 is the first eligible one,
        // and the older 10:00 one must not be used.
        let readings = vec![
            reading(at(12, 0), 60.0, Some(1000.0)),
            reading(at(11, 30), 60.0, Some(2000.0)),
            reading(at(11, 0), 60.0, Some(1000.0)),
            reading(at(10, 0), 60.0, Some(1100.0)),
        ];
        // No drop against 11:00, so humidity term only.
        assert!((estimate_chance(&readings) - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_reading_an_hour_older_falls_back_to_humidity() {
        let readings = vec![
            reading(at(12, 0), 72.5, Some(1000.0)),
            reading(at(11, 45), 70.0, Some(1010.0)),
        ];
        assert_eq!(estimate_chance(&readings), 72.5);
    }

    #[test]
    fn test_single_reading_falls_back_to_humidity() {
        let readings = vec![reading(at(12, 0), 64.0, Some(1000.0))];
        assert_eq!(estimate_chance(&readings), 64.0);
    }

    #[test]
    fn test_fallback_caps_humidity_at_100() {
        let readings = vec![reading(at(12, 0), 130.0, Some(1000.0))];
        assert_eq!(estimate_chance(&readings), 100.0);
    }

    #[test]
    fn test_zero_previous_pressure_uses_fallback() {
        let readings = vec![
            reading(at(12, 0), 55.0, Some(1000.0)),
            reading(at(11, 0), 55.0, Some(0.0)),
        ];
        assert_eq!(estimate_chance(&readings), 55.0);
    }

    #[test]
    fn test_missing_previous_pressure_uses_fallback() {
        let readings = vec![
            reading(at(12, 0), 55.0, Some(1000.0)),
            reading(at(11, 0), 55.0, None),
        ];
        assert_eq!(estimate_chance(&readings), 55.0);
    }

    #[test]
    fn test_missing_current_pressure_assumes_standard_atmosphere() {
        let readings = vec![
            reading(at(12, 0), 50.0, None),
            reading(at(11, 0), 50.0, Some(1023.25)),
        ];
        let drop = (1023.25 - STANDARD_PRESSURE_HPA) / 1023.25 * 100.0;
        let expected = 30.0 + drop * 0.4;
        assert!((estimate_chance(&readings) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_output_always_within_percent_range() {
        let cases = [
            (250.0, Some(10.0), Some(5000.0)),
            (-40.0, Some(1200.0), Some(900.0)),
            (f64::NAN, Some(1000.0), Some(1010.0)),
            (90.0, Some(-50.0), Some(1000.0)),
            (95.0, Some(f64::INFINITY), Some(1000.0)),
        ];
        for (humidity, current, previous) in cases {
            let readings = vec![
                reading(at(12, 0), humidity, current),
                reading(at(10, 0), humidity, previous),
            ];
            let chance = estimate_chance(&readings);
            assert!(
                (0.0..=100.0).contains(&chance),
                "humidity {} pressures {:?}/{:?} gave {}",
                humidity,
                current,
                previous,
                chance
            );
        }
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let readings = vec![
            reading(at(12, 0), 88.0, Some(1001.0)),
            reading(at(11, 0), 85.0, Some(1006.0)),
        ];
        assert_eq!(estimate_chance(&readings), estimate_chance(&readings));
    }

    #[test]
    fn test_custom_lookback_window() {
        let readings = vec![
            reading(at(12, 0), 80.0, Some(990.0)),
            reading(at(11, 45), 80.0, Some(1000.0)),
        ];
        // Too recent for one hour, eligible for fifteen minutes.
        assert_eq!(estimate_chance(&readings), 80.0);
        let chance = estimate_chance_with_lookback(&readings, Duration::minutes(15));
        assert!((chance - 48.4).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_drop_percent_helper() {
        let drop = pressure_drop_percent(1000.0, 990.0).unwrap();
        assert!((drop - 1.0).abs() < 1e-12);
        assert_eq!(pressure_drop_percent(1000.0, 1010.0), Some(0.0));
        assert_eq!(pressure_drop_percent(0.0, 990.0), None);
        assert_eq!(pressure_drop_percent(f64::NAN, 990.0), None);
    }
}
