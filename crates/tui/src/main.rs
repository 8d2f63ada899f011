mod app;
mod shop;
mod styled;

use anyhow::Result;
use std::{
    env,
    fs::{self, OpenOptions},
    sync::Mutex,
};

use bulkbuy_core::{
    config::{self, AppConfig, ConfigHandle},
    BulkBuy,
};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::shop::{Catalogue, ShopWorld};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config_path = config::ensure_default_config()?;
    let config = ConfigHandle::new(AppConfig::load_from(&config_path)?)?;
    let _watcher = match config.watch(&config_path) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!("Config changes will need a restart: {err:#}");
            None
        }
    };

    let catalogue = match env::args().nth(1) {
        Some(path) => Catalogue::load(path)?,
        None => Catalogue::default(),
    };

    let mut app = app::BulkBuyApp::new(BulkBuy::new(config), ShopWorld::new(catalogue));
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("bulkbuy.log"))?;

    // The terminal UI owns stdout, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(file_layer)
        .init();

    Ok(())
}
