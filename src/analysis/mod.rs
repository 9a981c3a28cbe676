/// Pure computations behind the flood risk assessment.
///
/// Submodules:
/// - `geometry`      - resolves a station coordinate to its hazard zone.
/// - `precipitation` - precipitation chance from humidity and pressure trend.

pub mod geometry;
pub mod precipitation;
