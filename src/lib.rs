/// florisk_service: flood risk assessment for a single weather station.
///
/// # Module structure
///
/// ```text
/// florisk_service
/// ├── model       - shared data types (SensorReading, WeatherMetrics, RiskLevel, errors)
/// ├── config      - service configuration loader (florisk.toml)
/// ├── zones       - hazard zone dataset (GeoJSON) and zone bands/labels
/// ├── db          - PostgreSQL connection and table validation
/// ├── assessment  - readings + location -> RiskReport pipeline
/// ├── endpoint    - HTTP API for the dashboard
/// ├── ingest
/// │   ├── database  - sensor_logs via PostgreSQL
/// │   ├── rest      - sensor_logs via PostgREST
/// │   ├── simulated - deterministic time-of-day weather
/// │   └── fixtures (test only) - representative GeoJSON and API payloads
/// ├── monitor     - TTL cache for display results
/// ├── alert
/// │   └── risk    - classifier policies and risk display metadata
/// └── analysis
///     ├── geometry      - point-in-polygon zone resolution
///     └── precipitation - precipitation chance estimate
/// ```

/// Public modules
pub mod alert;
pub mod analysis;
pub mod assessment;
pub mod config;
pub mod db;
pub mod endpoint;
pub mod ingest;
pub mod model;
pub mod monitor;
pub mod zones;
