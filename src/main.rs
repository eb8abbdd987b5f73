extern crate log;
pub mod config;
pub mod crs;
pub mod geofile;
pub mod offset;
use crate::config::{load_config, Config, ConfigOverrides};
use crate::geofile::geojson::{read_feature_collection, write_feature_collection};
use crate::offset::batch::{BatchProcessor, ScaledCollections};
use crate::offset::buffer::GeodesicBuffer;
use crate::offset::transform::OffsetTransformer;
use clap::Parser;
use std::path::PathBuf;

/// Derive expanded (outer) and contracted (inner) copies of polygonal GeoJSON features.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an optional YAML config file.
    #[arg(short, long)]
    config_filepath: Option<PathBuf>,

    /// Input FeatureCollection, overrides the config file.
    #[arg(long)]
    input_path: Option<PathBuf>,

    /// Destination of the expanded features, overrides the config file.
    #[arg(long)]
    outer_path: Option<PathBuf>,

    /// Destination of the contracted features, overrides the config file.
    #[arg(long)]
    inner_path: Option<PathBuf>,

    /// Offset distance in kilometers, overrides the config file.
    #[arg(long)]
    scale_distance_km: Option<f64>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_path: self.input_path.clone(),
            outer_path: self.outer_path.clone(),
            inner_path: self.inner_path.clone(),
            scale_distance_km: self.scale_distance_km,
        }
    }
}

fn scale_deserts(config: &Config) -> anyhow::Result<ScaledCollections> {
    log::info!("Reading features from {:?}", config.input_path);
    let feature_collection = read_feature_collection(&config.input_path)?;
    log::info!("Read {} features", feature_collection.features.len());

    let transformer = OffsetTransformer::new(GeodesicBuffer::new(config.buffer_steps));
    let scaled =
        BatchProcessor::new(&transformer, config.scale_distance_km).process(&feature_collection);
    log::info!("{:?}", scaled.report);

    // The two writes are independent. If the second one fails the first file stays written.
    log::info!("Writing outer features to {:?}", config.outer_path);
    write_feature_collection(&scaled.outer, &config.outer_path)?;
    log::info!("Writing inner features to {:?}", config.inner_path);
    write_feature_collection(&scaled.inner, &config.inner_path)?;
    Ok(scaled)
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::try_parse()?;
    let config = load_config(args.config_filepath.as_deref(), args.overrides())?;
    log::debug!("{:?}", config);

    scale_deserts(&config)?;
    println!("Desert scaled by {}km.", config.scale_distance_km);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = try_main() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1)
    }
}
