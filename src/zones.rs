/// Flood hazard zones loaded from a GeoJSON FeatureCollection
///
/// Each feature is a `Polygon` or `MultiPolygon` tagged with an integer
/// severity `properties.Var` (3+ = extreme, down to -2 = no risk / outside
/// the LIDAR-mapped area). The dataset is loaded once at startup and is
/// read-only afterwards; lookups live in `analysis::geometry`.

use geojson::GeoJson;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::model::GeometryError;

// ============================================================================
// Dataset Structures
// ============================================================================

/// Outer ring of one polygon part, as `[longitude, latitude]` vertices.
/// The closing vertex of the GeoJSON ring may or may not be repeated.
pub type Ring = Vec<[f64; 2]>;

/// A single mapped hazard zone.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardZone {
    /// Position of the feature in the source collection.
    pub feature_index: usize,
    /// Severity value (`properties.Var`).
    pub var: i32,
    /// Outer rings of each polygon part. A `Polygon` has one part.
    pub parts: Vec<Ring>,
}

/// The full hazard-zone collection, in source order.
#[derive(Debug, Clone, Default)]
pub struct HazardZoneDataset {
    zones: Vec<HazardZone>,
}

/// Errors raised while loading the dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to read hazard zone file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse hazard zone GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Hazard zone file must be a FeatureCollection")]
    NotFeatureCollection,

    #[error("Feature {index}: {source}")]
    Feature {
        index: usize,
        #[source]
        source: GeometryError,
    },
}

// ============================================================================
// Loading Functions
// ============================================================================

impl HazardZoneDataset {
    pub fn new(zones: Vec<HazardZone>) -> Self {
        HazardZoneDataset { zones }
    }

    /// Load and validate a hazard zone FeatureCollection from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let dataset = Self::from_geojson_str(&content)?;
        log::info!(
            "Loaded {} hazard zones from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parse a FeatureCollection string.
    ///
    /// Features whose geometry is missing or is not a `Polygon` /
    /// `MultiPolygon` are skipped with a warning. Malformed polygons or a
    /// missing `Var` reject the whole dataset.
    pub fn from_geojson_str(content: &str) -> Result<Self, DatasetError> {
        let geojson: GeoJson = content.parse()?;
        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            _ => return Err(DatasetError::NotFeatureCollection),
        };

        let mut zones = Vec::with_capacity(collection.features.len());

        for (index, feature) in collection.features.iter().enumerate() {
            let Some(geometry) = feature.geometry.as_ref() else {
                log::warn!("Hazard zone feature {index} has no geometry, skipping");
                continue;
            };

            let parts = match &geometry.value {
                geojson::Value::Polygon(rings) => vec![outer_ring(rings)],
                geojson::Value::MultiPolygon(polygons) => {
                    polygons.iter().map(|rings| outer_ring(rings)).collect()
                }
                _ => {
                    log::warn!("Hazard zone feature {index} is not a polygon, skipping");
                    continue;
                }
            };

            let parts = parts
                .into_iter()
                .collect::<Result<Vec<Ring>, GeometryError>>()
                .map_err(|source| DatasetError::Feature { index, source })?;

            let var = severity(feature.property("Var"))
                .map_err(|source| DatasetError::Feature { index, source })?;

            zones.push(HazardZone {
                feature_index: index,
                var,
                parts,
            });
        }

        Ok(HazardZoneDataset { zones })
    }

    /// Zones in dataset iteration order.
    pub fn zones(&self) -> &[HazardZone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Extracts and validates the outer ring of a polygon. Holes are ignored.
fn outer_ring<P: AsRef<[f64]>>(rings: &[Vec<P>]) -> Result<Ring, GeometryError> {
    let outer = rings.first().ok_or_else(|| GeometryError::InvalidGeometry {
        reason: "polygon has no rings".to_string(),
    })?;

    let mut ring = Ring::with_capacity(outer.len());
    for position in outer {
        let position = position.as_ref();
        match position {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => ring.push([*lon, *lat]),
            _ => {
                return Err(GeometryError::InvalidGeometry {
                    reason: format!("invalid ring position {:?}", position),
                });
            }
        }
    }

    // A closed triangle is 4 positions; an unclosed one is 3.
    if ring.len() < 3 {
        return Err(GeometryError::InvalidGeometry {
            reason: format!("ring has {} vertices, need at least 3", ring.len()),
        });
    }

    Ok(ring)
}

/// Reads `properties.Var`, accepting integral floats such as `1.0`.
fn severity(value: Option<&serde_json::Value>) -> Result<i32, GeometryError> {
    let value = value.ok_or_else(|| GeometryError::InvalidGeometry {
        reason: "feature has no Var property".to_string(),
    })?;

    let var = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .and_then(|v| i32::try_from(v).ok());

    var.ok_or_else(|| GeometryError::InvalidGeometry {
        reason: format!("Var must be an integer, got {}", value),
    })
}

// ============================================================================
// Zone Bands (display lookup)
// ============================================================================

/// Display band for a hazard zone severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneBand {
    Extreme,
    VeryHigh,
    High,
    Moderate,
    Low,
    /// `Var <= -2`, or the point is outside every mapped zone.
    NoRisk,
}

impl ZoneBand {
    /// Total over every integer and `None`.
    pub fn from_var(var: Option<i32>) -> Self {
        match var {
            Some(v) if v >= 3 => ZoneBand::Extreme,
            Some(2) => ZoneBand::VeryHigh,
            Some(1) => ZoneBand::High,
            Some(0) => ZoneBand::Moderate,
            Some(-1) => ZoneBand::Low,
            _ => ZoneBand::NoRisk,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ZoneBand::Extreme => "Extreme",
            ZoneBand::VeryHigh => "Very High",
            ZoneBand::High => "High",
            ZoneBand::Moderate => "Moderate",
            ZoneBand::Low => "Low",
            ZoneBand::NoRisk => "No risk / unmapped",
        }
    }

    /// Map fill colour for the band.
    pub fn color(&self) -> &'static str {
        match self {
            ZoneBand::Extreme => "#8B0000",  // dark red
            ZoneBand::VeryHigh => "#DC143C", // crimson
            ZoneBand::High => "#FF8C00",     // orange
            ZoneBand::Moderate => "#FFD700", // gold
            ZoneBand::Low => "#90EE90",      // light green
            ZoneBand::NoRisk => "#00AA00",   // medium green
        }
    }
}

/// Long-form label shown on the dashboard map legend.
///
/// Only `-2` is the mapped no-risk code; anything lower is not a value the
/// dataset defines and reads as "Unknown Zone".
pub fn zone_label(var: Option<i32>) -> String {
    let label = match var {
        None => "Outside Hazard Zones",
        Some(v) if v >= 3 => "Extreme Flood Risk Zone (Var 3+)",
        Some(2) => "Very High Flood Risk Zone (Var 2)",
        Some(1) => "High Flood Risk Zone (Var 1)",
        Some(0) => "Moderate Flood Risk Zone (Var 0)",
        Some(-1) => "Low Flood Risk Zone (Var -1)",
        Some(-2) => "No Flood Risk Area (Var -2)",
        Some(_) => "Unknown Zone",
    };
    label.to_string()
}

// ============================================================================
// Tests
// ============================================================================
