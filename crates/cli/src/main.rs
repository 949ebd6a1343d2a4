//! Agri Advisory CLI
//!
//! A command-line tool for requesting crop recommendations and water-use
//! estimates from the advisory service, and for checking its health.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{crop, health, water_use};

/// Agri Advisory CLI
#[derive(Parser)]
#[command(name = "agri")]
#[command(author, version, about = "CLI for the Agri Advisory service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (falls back to ~/.config/agri/config.json, then http://localhost:8000)
    #[arg(long, env = "AGRI_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend crops for the given soil and climate conditions
    Crop(crop::CropArgs),

    /// Estimate water use for a crop
    WaterUse(water_use::WaterUseArgs),

    /// Show service health and readiness
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let api_url = match cli.api_url.as_deref() {
        Some(url) => url.to_string(),
        None => config::Config::load()?.resolve_api_url(None),
    };
    let client = client::ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Crop(args) => crop::recommend(&client, args, cli.format).await?,
        Commands::WaterUse(args) => water_use::estimate(&client, args, cli.format).await?,
        Commands::Health => health::show_health(&client, cli.format).await?,
    }

    Ok(())
}
