//! Flood Risk Service - Main Entry Point
//!
//! Assesses flood risk at the configured weather station:
//! 1. Loads florisk.toml and the hazard zone GeoJSON
//! 2. Resolves which hazard zone the station sits in
//! 3. Pulls recent sensor readings (PostgreSQL, PostgREST or simulated)
//! 4. Estimates precipitation chance and classifies the risk
//! 5. Optionally serves the result over HTTP for the dashboard
//!
//! Usage:
//!   cargo run --release                              # One-shot assessment, printed as JSON
//!   cargo run --release -- --endpoint 8080           # Serve the HTTP API on port 8080
//!   cargo run --release -- --config other.toml       # Use another configuration file
//!   cargo run --release -- --policy raw_metrics      # Override the classifier policy
//!
//! Environment:
//!   FLORISK_CONFIG   - Configuration file path (default: florisk.toml)
//!   DATABASE_URL     - PostgreSQL connection string (source.kind = "postgres")
//!   SENSOR_API_URL   - PostgREST base URL (source.kind = "rest")
//!   SENSOR_API_KEY   - PostgREST API key (source.kind = "rest")
//!   RUST_LOG         - Log filter, e.g. info or florisk_service=debug

use florisk_service::alert::risk::RiskPolicy;
use florisk_service::assessment::Assessor;
use florisk_service::config::{self, ServiceConfig, SourceKind};
use florisk_service::db;
use florisk_service::endpoint::{self, EndpointState};
use florisk_service::ingest::ReadingSource;
use florisk_service::ingest::database::DatabaseSource;
use florisk_service::ingest::rest::RestSource;
use florisk_service::ingest::simulated::SimulatedSource;
use florisk_service::zones::HazardZoneDataset;
use std::env;
use std::path::PathBuf;

const SENSOR_API_URL_ENV: &str = "SENSOR_API_URL";
const SENSOR_API_KEY_ENV: &str = "SENSOR_API_KEY";

fn main() {
    pretty_env_logger::init();

    println!("🌧️  Flood Risk Service");
    println!("======================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut endpoint_port: Option<u16> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut policy_override: Option<RiskPolicy> = None;

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--endpoint", Some(port)) => match port.parse() {
                Ok(port) => endpoint_port = Some(port),
                Err(_) => fail(&format!("--endpoint expects a port number, got '{}'", port)),
            },
            ("--config", Some(path)) => config_path = Some(PathBuf::from(path)),
            ("--policy", Some(policy)) => match policy.parse() {
                Ok(policy) => policy_override = Some(policy),
                Err(e) => fail(&e),
            },
            ("--endpoint" | "--config" | "--policy", None) => {
                fail(&format!("{} requires a value", args[i]))
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!(
                    "Usage: {} [--endpoint PORT] [--config PATH] [--policy zone_gated|raw_metrics]",
                    args[0]
                );
                std::process::exit(1);
            }
        }
        i += 2;
    }

    // Configuration
    let config_path = config_path.unwrap_or_else(config::config_path);
    println!("📋 Loading configuration from {}...", config_path.display());
    let mut config = config::load_config(&config_path).unwrap_or_else(|e| fail(&e.to_string()));
    if let Some(policy) = policy_override {
        config.risk.policy = policy;
    }
    println!(
        "✓ Station: {} [{}, {}]",
        config.station.name, config.station.longitude, config.station.latitude
    );

    // Hazard zones
    println!("🗺️  Loading hazard zones from {}...", config.hazard_zones.path.display());
    let dataset = HazardZoneDataset::load(&config.hazard_zones.path)
        .unwrap_or_else(|e| fail(&e.to_string()));
    println!("✓ {} hazard zones loaded\n", dataset.len());

    let assessor =
        Assessor::from_config(&config, dataset).unwrap_or_else(|e| fail(&e.to_string()));
    let station = config.station.location();
    let station_zone = assessor
        .resolve(station)
        .unwrap_or_else(|e| fail(&e.to_string()));

    // Sensor source
    let mut source = build_source(&config, station_zone).unwrap_or_else(|e| fail(&e));
    println!("📡 Sensor source: {}", source.name());
    println!("⚖️  Policy: {}\n", assessor.policy().as_str());

    match endpoint_port {
        Some(port) => {
            let state = EndpointState::new(
                assessor,
                config.station.name.clone(),
                station,
                source,
                config.display.cache_ttl().unwrap_or_else(|e| fail(&e.to_string())),
            );
            if let Err(e) = endpoint::start_endpoint_server(port, state) {
                fail(&e);
            }
        }
        None => {
            let report = assessor
                .assess(station, source.as_mut())
                .unwrap_or_else(|e| fail(&e.to_string()));

            println!("{} - {}", report.title, report.description);
            println!("   Zone: {}", report.zone_label);
            match report.assessment.precipitation_chance {
                Some(chance) => println!("   Precipitation chance: {:.1}%", chance),
                None => println!("   Precipitation chance: n/a"),
            }
            println!();

            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => fail(&format!("Failed to serialize report: {}", e)),
            }
        }
    }
}

/// Builds the configured reading source.
fn build_source(
    config: &ServiceConfig,
    station_zone: Option<i32>,
) -> Result<Box<dyn ReadingSource>, String> {
    let node_id = config.source.node_id.clone();

    match config.source.kind {
        SourceKind::Postgres => {
            let client = db::connect_and_verify().map_err(|e| {
                format!("{}\n\nRun with source.kind = \"simulated\" to skip the database.", e)
            })?;
            Ok(match node_id {
                Some(node) => Box::new(DatabaseSource::for_node(client, node)),
                None => Box::new(DatabaseSource::new(client)),
            })
        }
        SourceKind::Rest => {
            dotenv::dotenv().ok();
            let base_url = env::var(SENSOR_API_URL_ENV)
                .ok()
                .or_else(|| config.source.rest_url.clone())
                .ok_or_else(|| {
                    format!("{} is not set and source.rest_url is missing", SENSOR_API_URL_ENV)
                })?;
            let api_key = env::var(SENSOR_API_KEY_ENV)
                .map_err(|_| format!("{} environment variable not set", SENSOR_API_KEY_ENV))?;

            let source = RestSource::new(base_url, api_key);
            Ok(Box::new(match node_id {
                Some(node) => source.with_node(node),
                None => source,
            }))
        }
        SourceKind::Simulated => {
            let offset = config.station.utc_offset().map_err(|e| e.to_string())?;
            Ok(Box::new(SimulatedSource::new(station_zone).with_utc_offset(offset)))
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("\n❌ {}\n", message);
    std::process::exit(1);
}
