//! Flood risk classification.
//!
//! Two policies are supported and callers pick one explicitly:
//!
//! - [`RiskPolicy::ZoneGated`] - driven by the precipitation chance. Below
//!   80% the station is safe whatever its zone; at or above 80% the hazard
//!   zone decides. Without a chance estimate it defers to the raw-metrics
//!   policy.
//! - [`RiskPolicy::RawMetrics`] - driven by precipitation, humidity and
//!   wind speed only; the hazard zone is ignored.
//!
//! Both are pure and total: any combination of inputs (NaN included) maps
//! to exactly one [`RiskLevel`].

use serde::{Deserialize, Serialize};

use crate::model::{RiskLevel, WeatherMetrics};

/// Precipitation chance (percent) at which the hazard zone starts to matter.
pub const CHANCE_GATE_PCT: f64 = 80.0;

// Raw-metrics thresholds.
const HIGH_PRECIP_MM: f64 = 50.0;
const HIGH_HUMID_PRECIP_MM: f64 = 20.0;
const HIGH_HUMIDITY_PCT: f64 = 90.0;
const MODERATE_PRECIP_MM: f64 = 20.0;
const MODERATE_HUMID_PRECIP_MM: f64 = 10.0;
const MODERATE_HUMIDITY_PCT: f64 = 80.0;
const MODERATE_WIND_KMH: f64 = 30.0;

/// Which classification rules to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskPolicy {
    #[default]
    ZoneGated,
    RawMetrics,
}

impl RiskPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskPolicy::ZoneGated => "zone_gated",
            RiskPolicy::RawMetrics => "raw_metrics",
        }
    }
}

impl std::str::FromStr for RiskPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zone_gated" | "zone-gated" => Ok(RiskPolicy::ZoneGated),
            "raw_metrics" | "raw-metrics" => Ok(RiskPolicy::RawMetrics),
            other => Err(format!(
                "unknown risk policy '{}' (expected zone_gated or raw_metrics)",
                other
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classifies `metrics` for a station in zone `hazard_zone` (its `Var`).
pub fn classify(policy: RiskPolicy, metrics: &WeatherMetrics, hazard_zone: Option<i32>) -> RiskLevel {
    match policy {
        RiskPolicy::ZoneGated => classify_zone_gated(metrics, hazard_zone),
        RiskPolicy::RawMetrics => classify_raw_metrics(metrics),
    }
}

/// Precipitation-chance gate, then hazard zone.
///
/// A non-finite chance counts as no estimate.
pub fn classify_zone_gated(metrics: &WeatherMetrics, hazard_zone: Option<i32>) -> RiskLevel {
    let Some(chance) = metrics.precipitation_chance.filter(|c| c.is_finite()) else {
        return classify_raw_metrics(metrics);
    };

    if chance < CHANCE_GATE_PCT {
        return RiskLevel::Safe;
    }

    match hazard_zone {
        Some(var) if var >= 1 => RiskLevel::High,
        Some(0) => RiskLevel::Moderate,
        Some(_) => RiskLevel::Safe,
        None => RiskLevel::Moderate,
    }
}

/// Zone-independent thresholds on precipitation, humidity and wind.
pub fn classify_raw_metrics(metrics: &WeatherMetrics) -> RiskLevel {
    let precip = metrics.precipitation_mm;
    let humidity = metrics.humidity_pct;

    if precip > HIGH_PRECIP_MM || (humidity > HIGH_HUMIDITY_PCT && precip > HIGH_HUMID_PRECIP_MM) {
        RiskLevel::High
    } else if precip > MODERATE_PRECIP_MM
        || (humidity > MODERATE_HUMIDITY_PCT && precip > MODERATE_HUMID_PRECIP_MM)
        || metrics.wind_speed_kmh > MODERATE_WIND_KMH
    {
        RiskLevel::Moderate
    } else {
        RiskLevel::Safe
    }
}

// ---------------------------------------------------------------------------
// Display metadata
// ---------------------------------------------------------------------------

impl RiskLevel {
    pub fn title(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "No flood risk detected",
            RiskLevel::Moderate => "Monitor weather conditions",
            RiskLevel::High => "Flood risk detected - Take precautions",
        }
    }

    /// Recommendations in display order.
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            RiskLevel::Safe => &["Normal activities", "Monitor weather updates"],
            RiskLevel::Moderate => &["Stay alert", "Prepare emergency kit", "Monitor local news"],
            RiskLevel::High => &[
                "Move to higher ground",
                "Follow evacuation orders",
                "Contact emergency services",
            ],
        }
    }

    /// Status indicator colour.
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "#10b981",
            RiskLevel::Moderate => "#f59e0b",
            RiskLevel::High => "#ef4444",
        }
    }

    /// Fill colour of the risk circle drawn around the station on the map.
    pub fn overlay_color(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "#44ff44",
            RiskLevel::Moderate => "#ffaa00",
            RiskLevel::High => "#ff4444",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
