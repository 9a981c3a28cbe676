//! Hazard Zone Lookup
//!
//! Prints which hazard zone of a GeoJSON dataset contains a point. Useful
//! for checking a station's position against a new dataset before
//! deploying it.
//!
//! Usage:
//!   cargo run --bin resolve_zone -- <hazard_zones.geojson> <lon> <lat>

use florisk_service::analysis::geometry::find_containing_zone;
use florisk_service::model::GeoPoint;
use florisk_service::zones::{HazardZoneDataset, ZoneBand, zone_label};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: {} <hazard_zones.geojson> <lon> <lat>", args[0]);
        std::process::exit(1);
    }

    let dataset = HazardZoneDataset::load(&args[1])?;
    let longitude: f64 = args[2].parse()?;
    let latitude: f64 = args[3].parse()?;
    let point = GeoPoint::new(longitude, latitude);

    println!("🗺️  {} hazard zones in {}", dataset.len(), args[1]);
    println!("📍 Point [{}, {}]", longitude, latitude);

    match find_containing_zone(point, &dataset)? {
        Some(zone) => {
            let band = ZoneBand::from_var(Some(zone.var));
            println!("   Feature #{}: {}", zone.feature_index, zone_label(Some(zone.var)));
            println!("   Band: {} ({})", band.label(), band.color());
        }
        None => println!("   {}", zone_label(None)),
    }

    Ok(())
}
