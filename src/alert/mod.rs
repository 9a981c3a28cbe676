/// Risk classification for the dashboard.
///
/// Submodules:
/// - `risk` - zone-gated and raw-metrics classifiers, plus the fixed
///   description and recommendations attached to each level.

pub mod risk;
