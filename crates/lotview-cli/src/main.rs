use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

mod gallery;
mod inspect;

#[derive(Debug, Parser)]
#[command(name = "lotview")]
#[command(about = "Run the catalog filter engine against local JSON data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Mount the inventory filters on a query string and print the result.
    Inspect(InspectArgs),
    /// Run the gallery tag filter on a query string.
    Gallery(GalleryArgs),
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// JSON array of catalog items.
    #[arg(long)]
    items: PathBuf,
    /// Browser query string, e.g. `?search=barn&sort=price-ascending`.
    #[arg(long, default_value = "")]
    search: String,
    /// JSON object of location slug to meters (or null).
    #[arg(long)]
    distances: Option<PathBuf>,
    /// Answer the region prompt with this slug.
    #[arg(long)]
    region: Option<String>,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct GalleryArgs {
    /// JSON array of gallery entries.
    #[arg(long)]
    entries: PathBuf,
    #[arg(long, default_value = "")]
    search: String,
    /// Click this tag after loading.
    #[arg(long)]
    tag: Option<String>,
    /// Validate as a server render (redirect instead of replace).
    #[arg(long)]
    server: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = lotview_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect(args) => inspect::run_inspect(&config, args).await,
        Commands::Gallery(args) => gallery::run_gallery(&config, args).await,
    }
}
