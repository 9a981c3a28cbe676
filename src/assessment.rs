/// End-to-end flood risk assessment for a station.
///
/// Ties the three pure pieces together:
///
/// ```text
/// readings ──> estimate_chance ──> chance ─┐
///                                          ├─> classify ──> RiskReport
/// point + dataset ──> resolve_zone ──> Var ┘
/// ```
///
/// The `Assessor` owns the hazard-zone dataset (loaded once, read-only) and
/// the chosen classifier policy. It holds no mutable state, so one instance
/// can be shared behind an `Arc` by every request handler.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::alert::risk::{RiskPolicy, classify};
use crate::analysis::geometry::resolve_zone;
use crate::analysis::precipitation::{DEFAULT_LOOKBACK_MINUTES, estimate_chance_with_lookback};
use crate::config::{ConfigError, ServiceConfig};
use crate::ingest::{DEFAULT_READING_LIMIT, ReadingSource, fetch_or_empty};
use crate::model::{
    GeoPoint, GeometryError, RiskAssessment, RiskLevel, SensorReading, WeatherMetrics,
};
use crate::zones::{HazardZoneDataset, ZoneBand, zone_label};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything the dashboard needs to render one assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    #[serde(flatten)]
    pub assessment: RiskAssessment,
    pub policy: RiskPolicy,

    pub title: &'static str,
    pub description: &'static str,
    pub recommendations: Vec<&'static str>,
    pub risk_color: &'static str,
    pub overlay_color: &'static str,

    pub zone_band: ZoneBand,
    pub zone_band_label: &'static str,
    pub zone_label: String,
    pub zone_color: &'static str,

    /// Metrics the classifier saw.
    pub metrics: WeatherMetrics,
    pub reading_count: usize,
    pub latest_reading_at: Option<DateTime<Utc>>,
}

impl RiskReport {
    fn build(
        policy: RiskPolicy,
        risk_level: RiskLevel,
        hazard_zone_id: Option<i32>,
        metrics: WeatherMetrics,
        readings: &[SensorReading],
    ) -> Self {
        let band = ZoneBand::from_var(hazard_zone_id);
        RiskReport {
            assessment: RiskAssessment {
                risk_level,
                hazard_zone_id,
                precipitation_chance: metrics.precipitation_chance,
            },
            policy,
            title: risk_level.title(),
            description: risk_level.description(),
            recommendations: risk_level.recommendations().to_vec(),
            risk_color: risk_level.color(),
            overlay_color: risk_level.overlay_color(),
            zone_band: band,
            zone_band_label: band.label(),
            zone_label: zone_label(hazard_zone_id),
            zone_color: band.color(),
            metrics,
            reading_count: readings.len(),
            latest_reading_at: readings.first().map(|r| r.timestamp),
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.assessment.risk_level
    }
}

// ---------------------------------------------------------------------------
// Assessor
// ---------------------------------------------------------------------------

pub struct Assessor {
    dataset: HazardZoneDataset,
    policy: RiskPolicy,
    lookback: Duration,
    reading_limit: usize,
}

impl Assessor {
    /// Assessor with the default policy, one-hour lookback and 10-row fetch.
    pub fn new(dataset: HazardZoneDataset) -> Self {
        Self {
            dataset,
            policy: RiskPolicy::default(),
            lookback: Duration::minutes(DEFAULT_LOOKBACK_MINUTES),
            reading_limit: DEFAULT_READING_LIMIT,
        }
    }

    /// Fails if the configured lookback is out of range.
    pub fn from_config(
        config: &ServiceConfig,
        dataset: HazardZoneDataset,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            dataset,
            policy: config.risk.policy,
            lookback: config.precipitation.lookback()?,
            reading_limit: config.precipitation.reading_limit,
        })
    }

    pub fn with_policy(mut self, policy: RiskPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RiskPolicy {
        self.policy
    }

    pub fn dataset(&self) -> &HazardZoneDataset {
        &self.dataset
    }

    /// Hazard zone `Var` for a point, or `None` outside every zone.
    pub fn resolve(&self, point: GeoPoint) -> Result<Option<i32>, GeometryError> {
        resolve_zone(point, &self.dataset)
    }

    /// Fetches readings from `source` and assesses `point` with the
    /// configured policy. A failing source counts as no readings.
    pub fn assess(
        &self,
        point: GeoPoint,
        source: &mut dyn ReadingSource,
    ) -> Result<RiskReport, GeometryError> {
        self.assess_with_policy(point, source, self.policy)
    }

    pub fn assess_with_policy(
        &self,
        point: GeoPoint,
        source: &mut dyn ReadingSource,
        policy: RiskPolicy,
    ) -> Result<RiskReport, GeometryError> {
        // Reject bad geometry before touching the source.
        point.validate()?;
        let readings = fetch_or_empty(source, self.reading_limit);
        self.assess_readings(point, &readings, policy)
    }

    /// Assesses an already-fetched reading history (most recent first).
    ///
    /// With no readings the metrics are all zero and the chance is 0%.
    pub fn assess_readings(
        &self,
        point: GeoPoint,
        readings: &[SensorReading],
        policy: RiskPolicy,
    ) -> Result<RiskReport, GeometryError> {
        let hazard_zone = self.resolve(point)?;

        let chance = estimate_chance_with_lookback(readings, self.lookback);
        let metrics = readings
            .first()
            .map(WeatherMetrics::from_reading)
            .unwrap_or_default()
            .with_chance(chance);

        let level = classify(policy, &metrics, hazard_zone);
        log::info!(
            "Assessed [{}, {}]: zone {:?}, chance {:.1}%, {:?} ({})",
            point.longitude,
            point.latitude,
            hazard_zone,
            chance,
            level,
            policy.as_str()
        );

        Ok(RiskReport::build(policy, level, hazard_zone, metrics, readings))
    }

    /// Assesses caller-supplied metrics, e.g. from `simulate_metrics`.
    /// A `None` chance makes the zone-gated policy use raw metrics.
    pub fn assess_metrics(
        &self,
        point: GeoPoint,
        metrics: WeatherMetrics,
        policy: RiskPolicy,
    ) -> Result<RiskReport, GeometryError> {
        let hazard_zone = self.resolve(point)?;
        let level = classify(policy, &metrics, hazard_zone);
        Ok(RiskReport::build(policy, level, hazard_zone, metrics, &[]))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
