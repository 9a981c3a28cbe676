/// PostgreSQL `sensor_logs` reader.
///
/// Reads the newest rows straight from the dashboard database. The table is
/// written by the station nodes; this module only ever runs SELECTs.

use chrono::{DateTime, Utc};
use postgres::{Client, Row};

use super::ReadingSource;
use crate::model::{SensorReading, SourceError};

const RECENT_QUERY: &str = "SELECT created_at, temperature, humidity, pressure, \
            wind_speed, precipitation, soil_moisture, altitude \
     FROM sensor_logs \
     ORDER BY created_at DESC \
     LIMIT $1";

const RECENT_BY_NODE_QUERY: &str = "SELECT created_at, temperature, humidity, pressure, \
            wind_speed, precipitation, soil_moisture, altitude \
     FROM sensor_logs \
     WHERE node_id::text = $2 \
     ORDER BY created_at DESC \
     LIMIT $1";

/// Reads recent readings over a direct database connection.
pub struct DatabaseSource {
    client: Client,
    node_id: Option<String>,
}

impl DatabaseSource {
    pub fn new(client: Client) -> Self {
        Self { client, node_id: None }
    }

    /// Only return rows uploaded by one station node.
    pub fn for_node(client: Client, node_id: impl Into<String>) -> Self {
        Self {
            client,
            node_id: Some(node_id.into()),
        }
    }
}

impl ReadingSource for DatabaseSource {
    fn name(&self) -> &str {
        "postgres"
    }

    fn fetch_recent(&mut self, limit: usize) -> Result<Vec<SensorReading>, SourceError> {
        let limit = i64::try_from(limit)
            .map_err(|_| SourceError::Config(format!("limit {} out of range", limit)))?;

        let rows = match &self.node_id {
            Some(node) => self.client.query(RECENT_BY_NODE_QUERY, &[&limit, node])?,
            None => self.client.query(RECENT_QUERY, &[&limit])?,
        };

        let mut readings = Vec::with_capacity(rows.len());
        for row in &rows {
            match reading_from_row(row) {
                Ok(reading) => readings.push(reading),
                Err(e) => log::warn!("Skipping sensor_logs row: {}", e),
            }
        }

        Ok(readings)
    }
}

/// Decodes one result row. A NULL `created_at` or a column of an
/// unexpected type is an error for that row only.
fn reading_from_row(row: &Row) -> Result<SensorReading, postgres::Error> {
    let timestamp: DateTime<Utc> = row.try_get(0)?;
    let temperature: Option<f64> = row.try_get(1)?;
    let humidity: Option<f64> = row.try_get(2)?;
    let pressure: Option<f64> = row.try_get(3)?;
    let wind_speed: Option<f64> = row.try_get(4)?;
    let precipitation: Option<f64> = row.try_get(5)?;

    Ok(SensorReading {
        timestamp,
        temperature_c: temperature.unwrap_or(0.0),
        humidity_pct: humidity.unwrap_or(0.0),
        pressure_hpa: pressure,
        wind_speed_kmh: wind_speed.unwrap_or(0.0),
        precipitation_mm: precipitation.unwrap_or(0.0),
        soil_moisture_pct: row.try_get(6)?,
        elevation_m: row.try_get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_order_newest_first() {
        for query in [RECENT_QUERY, RECENT_BY_NODE_QUERY] {
            assert!(query.contains("ORDER BY created_at DESC"));
            assert!(query.contains("LIMIT $1"));
        }
        assert!(RECENT_BY_NODE_QUERY.contains("node_id::text = $2"));
    }

    #[test]
    #[ignore] // Only run when database is available
    fn test_fetch_recent_from_database() {
        let client = crate::db::connect_and_verify().expect("database should be reachable");
        let mut source = DatabaseSource::new(client);
        let readings = source.fetch_recent(5).expect("query should succeed");
        assert!(readings.len() <= 5);
        for pair in readings.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    /// Connection whose `sensor_logs` is a session-local table created by
    /// `columns`. Temporary tables shadow the real one for this session.
    fn client_with_temp_table(columns: &str) -> Client {
        let mut client = crate::db::connect_with_validation().expect("database should be reachable");
        client
            .batch_execute(&format!("CREATE TEMP TABLE sensor_logs ({})", columns))
            .expect("temp table should be created");
        client
    }

    #[test]
    #[ignore] // Only run when database is available
    fn test_null_created_at_row_is_skipped() {
        let mut client = client_with_temp_table(
            "created_at timestamptz, temperature float8, humidity float8, pressure float8, \
             wind_speed float8, precipitation float8, soil_moisture float8, altitude float8, \
             node_id text",
        );
        client
            .batch_execute(
                "INSERT INTO sensor_logs VALUES \
                 ('2024-11-03T16:00:00Z', 27.0, 88.0, 1006.0, 10.0, 2.0, 50.0, 45.0, 'n1'), \
                 (NULL, 27.0, 90.0, 1005.0, 10.0, 3.0, 50.0, 45.0, 'n1'), \
                 ('2024-11-03T15:00:00Z', 26.0, 80.0, 1008.0, 8.0, 0.0, NULL, NULL, 'n1')",
            )
            .expect("rows should insert");

        let mut source = DatabaseSource::new(client);
        let readings = source.fetch_recent(10).expect("a NULL timestamp must not fail the batch");
        assert_eq!(readings.len(), 2, "only the NULL created_at row is dropped");
        assert_eq!(readings[0].humidity_pct, 88.0);
        assert_eq!(readings[1].soil_moisture_pct, None);
    }

    #[test]
    #[ignore] // Only run when database is available
    fn test_mistyped_column_does_not_panic() {
        // `real` is float4, which does not decode as f64.
        let mut client = client_with_temp_table(
            "created_at timestamptz, temperature real, humidity float8, pressure float8, \
             wind_speed float8, precipitation float8, soil_moisture float8, altitude float8, \
             node_id text",
        );
        client
            .batch_execute(
                "INSERT INTO sensor_logs VALUES \
                 ('2024-11-03T16:00:00Z', 27.0, 88.0, 1006.0, 10.0, 2.0, 50.0, 45.0, 'n1')",
            )
            .expect("row should insert");

        let mut source = DatabaseSource::new(client);
        let readings = source.fetch_recent(10).expect("a type mismatch must not fail the batch");
        assert!(readings.is_empty(), "the undecodable row is skipped");
    }
}
