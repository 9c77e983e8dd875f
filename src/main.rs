mod api;
mod attendance;
mod catalog;
mod config;
mod error;
mod logging;
mod models;
mod roster;
mod session;
mod ui;

use anyhow::{Context, Result};
use catalog::ClassCatalog;
use config::Config;
use ui::App;

#[cfg(feature = "cli")]
#[derive(clap::Parser)]
#[command(about = "Record classroom attendance into a spreadsheet-backed store")]
struct Cli {
    /// Read configuration from this file instead of ./.env
    #[arg(long)]
    env_file: Option<std::path::PathBuf>,

    /// YAML class list to use instead of the built-in one
    #[arg(long)]
    classes: Option<std::path::PathBuf>,
}

#[cfg(feature = "cli")]
fn load_config() -> Result<Config> {
    use clap::Parser;

    let cli = Cli::parse();
    let mut config = match &cli.env_file {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.classes.is_some() {
        config.classes_file = cli.classes;
    }
    Ok(config)
}

#[cfg(not(feature = "cli"))]
fn load_config() -> Result<Config> {
    Config::load()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = load_config().context("Failed to load configuration")?;
    logging::init(&config.log_file)?;

    let catalog = match &config.classes_file {
        Some(path) => ClassCatalog::from_file(path)?,
        None => ClassCatalog::builtin()?,
    };

    let store = api::SheetsClient::new(&config)?;
    log::info!(
        "Starting with {} class(es), request timeout {:?}",
        catalog.classes().len(),
        config.request_timeout
    );

    // Start TUI application
    let mut app = App::new(store, catalog);
    app.run().await?;

    log::info!("Shutting down");
    Ok(())
}
