/// PostgREST (Supabase REST) `sensor_logs` client
///
/// Same rows as `ingest::database`, fetched over HTTPS with the project's
/// anon key:
///   GET {base}/rest/v1/sensor_logs?select=*&order=created_at.desc&limit=N
///
/// Response shape: a JSON array of row objects, e.g.
///   [{ "id": 812, "node_id": "node-1", "created_at": "2024-07-14T12:00:00+00:00",
///      "temperature": 28.4, "humidity": 81.0, "pressure": 1004.2,
///      "soil_moisture": 40.1, "altitude": 45.0 }]

use super::{ReadingSource, SensorLogRow};
use crate::db::SENSOR_LOG_TABLE;
use crate::model::{SensorReading, SourceError};

/// Reads recent readings from a PostgREST endpoint.
pub struct RestSource {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    node_id: Option<String>,
}

impl RestSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            node_id: None,
        }
    }

    /// Only return rows uploaded by one station node.
    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }
}

impl ReadingSource for RestSource {
    fn name(&self) -> &str {
        "rest"
    }

    fn fetch_recent(&mut self, limit: usize) -> Result<Vec<SensorReading>, SourceError> {
        let url = build_logs_url(&self.base_url, limit, self.node_id.as_deref());

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body = response.text()?;
        parse_logs_response(&body)
    }
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds the PostgREST query URL for the newest `limit` rows.
pub fn build_logs_url(base_url: &str, limit: usize, node_id: Option<&str>) -> String {
    let mut url = format!(
        "{}/rest/v1/{}?select=*&order=created_at.desc&limit={}",
        base_url.trim_end_matches('/'),
        SENSOR_LOG_TABLE,
        limit
    );

    if let Some(node) = node_id {
        url.push_str("&node_id=eq.");
        url.push_str(&urlencoding::encode(node));
    }

    url
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses a PostgREST row array. Rows with an unreadable timestamp are
/// skipped with a warning rather than failing the whole batch.
pub fn parse_logs_response(body: &str) -> Result<Vec<SensorReading>, SourceError> {
    let rows: Vec<SensorLogRow> =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    let mut readings = Vec::with_capacity(rows.len());
    for row in rows {
        match row.into_reading() {
            Ok(reading) => readings.push(reading),
            Err(e) => log::warn!("Skipping sensor log row: {}", e),
        }
    }

    Ok(readings)
}
