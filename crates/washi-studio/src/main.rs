use std::path::PathBuf;

use washi_engine::device::GpuInit;
use washi_engine::logging::{init_logging, LoggingConfig};
use washi_engine::window::{Runtime, RuntimeConfig};

mod scenes;

/// Asset root for distance-field images; overridden by `WASHI_ASSETS`.
const DEFAULT_ASSET_DIR: &str = "assets";

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let assets = std::env::var_os("WASHI_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR));
    log::info!("studio: assets from {}", assets.display());

    let registry = scenes::registry(assets);
    log::info!("studio: press {:?} to switch scenes, Esc to quit", registry.keys().collect::<String>());

    let config = RuntimeConfig {
        title: "washi studio".to_string(),
        initial_trigger: Some('1'),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GpuInit::default(), registry)
}
