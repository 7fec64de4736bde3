//! Query demonstration binary.
//!
//! Connects to an in-memory catalog, seeds it with the Beijing subway station
//! demo data, and runs the configured filter queries. Accepts one optional
//! argument: the path to a JSON configuration file.

use geocatalog::{DemoConfig, FeatureType, MemoryStore, Result, harness};
use log::info;
use std::io;

/// Demo records, registered under the original-case type name so the default
/// lower-case target exercises the case-insensitive match.
const DEMO_TYPE_NAME: &str = "Beijing_Subway_Station";
const DEMO_STATIONS: &str = include_str!("../data/beijing_subway_stations.geojson");

fn main() {
    env_logger::init();

    if let Err(err) = try_main() {
        eprintln!("fatal: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => DemoConfig::from_path(path)?,
        None => DemoConfig::default(),
    };

    println!("connecting to catalog '{}'", config.catalog);
    let store = MemoryStore::connect(&config)?;
    println!("connected");

    let loaded = seed_demo_data(&store)?;
    info!("seeded {loaded} demo records into '{DEMO_TYPE_NAME}'");

    harness::run(&store, &config, &mut io::stdout())?;
    Ok(())
}

fn seed_demo_data(store: &MemoryStore) -> Result<usize> {
    store.create_type(
        FeatureType::new(DEMO_TYPE_NAME)
            .with_field("name")
            .with_field("stationNameEn")
            .with_field("line"),
    )?;
    store.load_geojson(DEMO_TYPE_NAME, DEMO_STATIONS)
}
