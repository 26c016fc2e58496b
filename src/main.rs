mod annotations;
mod config;
mod error;
mod image_utils;
mod object_detection;
mod prediction;

use clap::Parser;
use config::{Config, DEFAULT_CONFIG_PATH};
use log::{debug, error};
use std::error::Error;
use std::path::PathBuf;

/// Runs an oriented bounding box model over a directory of images and writes the
/// detections as COCO annotations.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file with model, image and output settings.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let config = Config::from_yaml_file(&args.config).map_err(|e| {
        error!("{}", e);
        e
    })?;
    prediction::batch_predict::run(&config).map_err(|e| {
        error!("{}", e);
        e
    })?;
    debug!("Done");
    Ok(())
}
