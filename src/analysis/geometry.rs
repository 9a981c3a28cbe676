/// Station-to-hazard-zone resolution.
///
/// `resolve_zone` finds the hazard zone containing a `[longitude, latitude]`
/// point with an even-odd ray-casting test against each zone's outer rings.
///
/// Conventions:
/// - A point lying exactly on a ring edge or vertex is OUTSIDE that ring.
///   The edge check runs before ray casting so the result does not depend on
///   which side of the polygon the edge is on.
/// - When zones overlap, the first containing zone in dataset order wins.
/// - Coordinates are treated as planar; hazard polygons are small enough
///   that the curvature error is irrelevant.

use crate::model::{GeoPoint, GeometryError};
use crate::zones::{HazardZone, HazardZoneDataset};

/// Cross-product tolerance for the on-edge test, in squared degrees.
const EDGE_TOLERANCE: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Zone resolution
// ---------------------------------------------------------------------------

/// Returns the `Var` of the first zone containing `point`, or `None` if no
/// zone does.
///
/// Fails only when the point has a non-finite coordinate.
pub fn resolve_zone(
    point: GeoPoint,
    dataset: &HazardZoneDataset,
) -> Result<Option<i32>, GeometryError> {
    Ok(find_containing_zone(point, dataset)?.map(|zone| zone.var))
}

/// Like `resolve_zone` but returns the whole zone.
pub fn find_containing_zone(
    point: GeoPoint,
    dataset: &HazardZoneDataset,
) -> Result<Option<&HazardZone>, GeometryError> {
    point.validate()?;

    let found = dataset.zones().iter().find(|zone| zone_contains(zone, point));

    if let Some(zone) = found {
        log::debug!(
            "Point [{}, {}] resolved to feature {} (Var {})",
            point.longitude,
            point.latitude,
            zone.feature_index,
            zone.var
        );
    }

    Ok(found)
}

/// A multi-part zone contains the point if any of its parts does.
pub fn zone_contains(zone: &HazardZone, point: GeoPoint) -> bool {
    zone.parts.iter().any(|ring| ring_contains(ring, point))
}

// ---------------------------------------------------------------------------
// Ray casting
// ---------------------------------------------------------------------------

/// Even-odd test: cast a ray towards +x and count edge crossings.
///
/// The ring may be open or closed; the closing edge from the last vertex
/// back to the first is always tested, and a repeated closing vertex only
/// adds a zero-length edge that never crosses.
pub fn ring_contains(ring: &[[f64; 2]], point: GeoPoint) -> bool {
    if ring.len() < 3 || on_boundary(ring, point) {
        return false;
    }

    let (x, y) = (point.longitude, point.latitude);
    let mut inside = false;

    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];

        // Half-open rule on y so a vertex shared by two edges counts once.
        if (yi > y) != (yj > y) {
            let x_cross = (xj - xi) * (y - yi) / (yj - yi) + xi;
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

fn on_boundary(ring: &[[f64; 2]], point: GeoPoint) -> bool {
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        if on_segment(ring[j], ring[i], point) {
            return true;
        }
        j = i;
    }
    false
}

fn on_segment(a: [f64; 2], b: [f64; 2], p: GeoPoint) -> bool {
    let (px, py) = (p.longitude, p.latitude);
    let cross = (b[0] - a[0]) * (py - a[1]) - (b[1] - a[1]) * (px - a[0]);
    if cross.abs() > EDGE_TOLERANCE {
        return false;
    }
    px >= a[0].min(b[0]) && px <= a[0].max(b[0]) && py >= a[1].min(b[1]) && py <= a[1].max(b[1])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::fixture_hazard_zones_geojson;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<[f64; 2]> {
        vec![
            [x0, y0],
            [x0 + size, y0],
            [x0 + size, y0 + size],
            [x0, y0 + size],
            [x0, y0],
        ]
    }

    fn zone(index: usize, var: i32, parts: Vec<Vec<[f64; 2]>>) -> HazardZone {
        HazardZone {
            feature_index: index,
            var,
            parts,
        }
    }

    // --- Ring containment ----------------------------------------------------

    #[test]
    fn test_point_strictly_inside_square() {
        let ring = square(0.0, 0.0, 10.0);
        assert!(ring_contains(&ring, GeoPoint::new(5.0, 5.0)));
        assert!(ring_contains(&ring, GeoPoint::new(0.001, 9.999)));
    }

    #[test]
    fn test_point_outside_square() {
        let ring = square(0.0, 0.0, 10.0);
        assert!(!ring_contains(&ring, GeoPoint::new(-1.0, 5.0)));
        assert!(!ring_contains(&ring, GeoPoint::new(11.0, 5.0)));
        assert!(!ring_contains(&ring, GeoPoint::new(5.0, 10.5)));
    }

    #[test]
    fn test_boundary_points_are_outside() {
        let ring = square(0.0, 0.0, 10.0);
        // Every edge, including the left and bottom edges that plain
        // ray casting would count as inside.
        for p in [[0.0, 5.0], [10.0, 5.0], [5.0, 0.0], [5.0, 10.0]] {
            assert!(!ring_contains(&ring, p.into()), "edge point {:?}", p);
        }
        for p in [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]] {
            assert!(!ring_contains(&ring, p.into()), "vertex {:?}", p);
        }
    }

    #[test]
    fn test_boundary_on_diagonal_edge_is_outside() {
        let triangle = vec![[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]];
        assert!(!ring_contains(&triangle, GeoPoint::new(2.0, 2.0)));
        assert!(ring_contains(&triangle, GeoPoint::new(1.0, 1.0)));
    }

    #[test]
    fn test_open_ring_matches_closed_ring() {
        let closed = square(0.0, 0.0, 10.0);
        let open = closed[..4].to_vec();
        for p in [[5.0, 5.0], [12.0, 5.0], [0.0, 3.0], [9.9, 0.1]] {
            assert_eq!(
                ring_contains(&closed, p.into()),
                ring_contains(&open, p.into()),
                "point {:?}",
                p
            );
        }
    }

    #[test]
    fn test_concave_polygon_notch_is_outside() {
        // U shape: notch between x=3..7 above y=3.
        let u = vec![
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 10.0],
            [7.0, 10.0],
            [7.0, 3.0],
            [3.0, 3.0],
            [3.0, 10.0],
            [0.0, 10.0],
        ];
        assert!(!ring_contains(&u, GeoPoint::new(5.0, 6.0)), "notch");
        assert!(ring_contains(&u, GeoPoint::new(1.5, 8.0)), "left arm");
        assert!(ring_contains(&u, GeoPoint::new(8.5, 8.0)), "right arm");
        assert!(ring_contains(&u, GeoPoint::new(5.0, 1.5)), "base");
    }

    #[test]
    fn test_ray_through_vertex_counts_once() {
        // Diamond: a ray from (0, 0) passes exactly through the vertex (2, 0).
        let diamond = vec![[0.0, -2.0], [2.0, 0.0], [0.0, 2.0], [-2.0, 0.0]];
        assert!(ring_contains(&diamond, GeoPoint::new(0.0, 0.0)));
        assert!(!ring_contains(&diamond, GeoPoint::new(-3.0, 0.0)));
    }

    #[test]
    fn test_rotation_invariance() {
        let ring = vec![[0.0, 0.0], [6.0, 1.0], [7.0, 6.0], [2.0, 8.0], [-1.0, 4.0]];
        let points = [
            [3.0, 4.0],
            [6.9, 5.9],
            [-0.5, 4.0],
            [8.0, 3.0],
            [3.0, 0.5],
            [6.0, 1.0],
            [0.0, 0.0],
        ];
        let baseline: Vec<bool> = points.iter().map(|p| ring_contains(&ring, (*p).into())).collect();

        for shift in 1..ring.len() {
            let mut rotated = ring.clone();
            rotated.rotate_left(shift);
            let got: Vec<bool> = points
                .iter()
                .map(|p| ring_contains(&rotated, (*p).into()))
                .collect();
            assert_eq!(got, baseline, "rotation by {}", shift);
        }
    }

    #[test]
    fn test_degenerate_ring_contains_nothing() {
        let line = vec![[0.0, 0.0], [1.0, 1.0]];
        assert!(!ring_contains(&line, GeoPoint::new(0.5, 0.5)));
    }

    // --- Dataset resolution --------------------------------------------------

    #[test]
    fn test_resolve_zone_returns_var_of_containing_zone() {
        let dataset = HazardZoneDataset::new(vec![
            zone(0, 2, vec![square(0.0, 0.0, 1.0)]),
            zone(1, -1, vec![square(5.0, 5.0, 1.0)]),
        ]);
        assert_eq!(resolve_zone(GeoPoint::new(0.5, 0.5), &dataset), Ok(Some(2)));
        assert_eq!(resolve_zone(GeoPoint::new(5.5, 5.5), &dataset), Ok(Some(-1)));
    }

    #[test]
    fn test_resolve_zone_outside_everything_is_none() {
        let dataset = HazardZoneDataset::new(vec![zone(0, 2, vec![square(0.0, 0.0, 1.0)])]);
        assert_eq!(resolve_zone(GeoPoint::new(3.0, 3.0), &dataset), Ok(None));
    }

    #[test]
    fn test_resolve_zone_empty_dataset_is_none() {
        let dataset = HazardZoneDataset::default();
        assert_eq!(resolve_zone(GeoPoint::new(0.0, 0.0), &dataset), Ok(None));
    }

    #[test]
    fn test_overlap_tie_break_is_first_in_dataset_order() {
        let first = zone(0, 0, vec![square(0.0, 0.0, 10.0)]);
        let second = zone(1, 3, vec![square(2.0, 2.0, 2.0)]);

        let dataset = HazardZoneDataset::new(vec![first.clone(), second.clone()]);
        assert_eq!(resolve_zone(GeoPoint::new(3.0, 3.0), &dataset), Ok(Some(0)));

        let reversed = HazardZoneDataset::new(vec![second, first]);
        assert_eq!(resolve_zone(GeoPoint::new(3.0, 3.0), &reversed), Ok(Some(3)));
    }

    #[test]
    fn test_multipolygon_matches_any_part() {
        let dataset = HazardZoneDataset::new(vec![zone(
            0,
            1,
            vec![square(0.0, 0.0, 1.0), square(10.0, 10.0, 1.0)],
        )]);
        assert_eq!(resolve_zone(GeoPoint::new(0.5, 0.5), &dataset), Ok(Some(1)));
        assert_eq!(resolve_zone(GeoPoint::new(10.5, 10.5), &dataset), Ok(Some(1)));
        assert_eq!(resolve_zone(GeoPoint::new(5.0, 5.0), &dataset), Ok(None));
    }

    #[test]
    fn test_resolve_zone_rejects_non_finite_point() {
        let dataset = HazardZoneDataset::new(vec![zone(0, 2, vec![square(0.0, 0.0, 1.0)])]);
        let result = resolve_zone(GeoPoint::new(f64::NAN, 0.5), &dataset);
        assert!(matches!(result, Err(GeometryError::InvalidGeometry { .. })));
        let result = resolve_zone(GeoPoint::new(0.5, f64::NEG_INFINITY), &dataset);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_zone_against_fixture_collection() {
        let dataset = HazardZoneDataset::from_geojson_str(fixture_hazard_zones_geojson())
            .expect("fixture should parse");

        // Inside the Var 2 riverbank polygon, which also overlaps the Var 1
        // polygon listed later.
        assert_eq!(resolve_zone(GeoPoint::new(125.525, 8.945), &dataset), Ok(Some(2)));
        // Only inside the Var 1 polygon.
        assert_eq!(resolve_zone(GeoPoint::new(125.545, 8.945), &dataset), Ok(Some(1)));
        // Second part of the Var -1 MultiPolygon.
        assert_eq!(resolve_zone(GeoPoint::new(125.605, 8.905), &dataset), Ok(Some(-1)));
        // Far away.
        assert_eq!(resolve_zone(GeoPoint::new(120.0, 10.0), &dataset), Ok(None));
    }
}
