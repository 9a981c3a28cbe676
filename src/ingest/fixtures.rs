/// Test fixtures: representative payloads for the hazard zone dataset and
/// the PostgREST `sensor_logs` API.
///
/// Hazard zone FeatureCollection (`fixture_hazard_zones_geojson`), in order:
///   0  Polygon       Var  2  riverbank strip   lon 125.51–125.54, lat 8.93–8.96
///   1  Polygon       Var  0  upland pocket     lon 125.56–125.58, lat 8.97–8.99
///   2  MultiPolygon  Var -1  two small parts   around (125.505, 8.905) and (125.605, 8.905)
///   3  Point         -       gauge marker, must be skipped
///   4  Polygon       Var  1  floodplain        lon 125.52–125.56, lat 8.93–8.96
///                            (overlaps feature 0 between 125.52 and 125.54)
///
/// Sensor log rows are newest first, as PostgREST returns them with
/// `order=created_at.desc`.

/// Hazard zones with overlap, a MultiPolygon and an unsupported geometry.
#[cfg(test)]
pub(crate) fn fixture_hazard_zones_geojson() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": { "Var": 2 },
          "geometry": {
            "type": "Polygon",
            "coordinates": [[
              [125.51, 8.93], [125.54, 8.93], [125.54, 8.96], [125.51, 8.96], [125.51, 8.93]
            ]]
          }
        },
        {
          "type": "Feature",
          "properties": { "Var": 0 },
          "geometry": {
            "type": "Polygon",
            "coordinates": [[
              [125.56, 8.97], [125.58, 8.97], [125.58, 8.99], [125.56, 8.99], [125.56, 8.97]
            ]]
          }
        },
        {
          "type": "Feature",
          "properties": { "Var": -1 },
          "geometry": {
            "type": "MultiPolygon",
            "coordinates": [
              [[[125.50, 8.90], [125.51, 8.90], [125.51, 8.91], [125.50, 8.91], [125.50, 8.90]]],
              [[[125.60, 8.90], [125.61, 8.90], [125.61, 8.91], [125.60, 8.91], [125.60, 8.90]]]
            ]
          }
        },
        {
          "type": "Feature",
          "properties": { "name": "Agusan River gauge" },
          "geometry": { "type": "Point", "coordinates": [125.53, 8.95] }
        },
        {
          "type": "Feature",
          "properties": { "Var": 1.0 },
          "geometry": {
            "type": "Polygon",
            "coordinates": [[
              [125.52, 8.93], [125.56, 8.93], [125.56, 8.96], [125.52, 8.96], [125.52, 8.93]
            ]]
          }
        }
      ]
    }"#
}

/// A polygon feature with no `Var` property.
#[cfg(test)]
pub(crate) fn fixture_missing_var_geojson() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": { "zone": "unlabelled" },
          "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
          }
        }
      ]
    }"#
}

/// A polygon whose ring collapses to two vertices.
#[cfg(test)]
pub(crate) fn fixture_degenerate_ring_geojson() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": { "Var": 1 },
          "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 1.0]]]
          }
        }
      ]
    }"#
}

/// Three rows: current (80% RH, 1000 hPa), a sparse row 30 minutes older,
/// and one 70 minutes older at 1010 hPa.
#[cfg(test)]
pub(crate) fn fixture_sensor_logs_json() -> &'static str {
    r#"[
      {
        "id": 812, "node_id": "node-1",
        "created_at": "2024-07-14T12:00:00.000000+00:00",
        "temperature": 28.4, "humidity": 80.0, "pressure": 1000.0,
        "wind_speed": 6.5, "precipitation": 4.2,
        "soil_moisture": 40.1, "altitude": 45.0
      },
      {
        "id": 811, "node_id": "node-1",
        "created_at": "2024-07-14T11:30:00.000000+00:00",
        "temperature": 28.0, "humidity": 78.0
      },
      {
        "id": 810, "node_id": "node-1",
        "created_at": "2024-07-14T10:50:00.000000+00:00",
        "temperature": 27.6, "humidity": 75.0, "pressure": 1010.0,
        "wind_speed": null, "precipitation": null,
        "soil_moisture": 39.8, "altitude": 45.0
      }
    ]"#
}

/// One good row and one whose timestamp cannot be parsed.
#[cfg(test)]
pub(crate) fn fixture_sensor_logs_bad_timestamp_json() -> &'static str {
    r#"[
      { "created_at": "2024-07-14T12:00:00Z", "humidity": 70.0, "pressure": 1005.0 },
      { "created_at": "not a time", "humidity": 71.0, "pressure": 1006.0 }
    ]"#
}

/// Rows with `created_at` absent or null alongside a good one.
pub(crate) fn fixture_sensor_logs_missing_created_at_json() -> &'static str {
    r#"[
      { "humidity": 69.0, "pressure": 1004.0 },
      { "created_at": "2024-07-14T12:00:00Z", "humidity": 70.0, "pressure": 1005.0 },
      { "created_at": null, "humidity": 72.0 }
    ]"#
}
