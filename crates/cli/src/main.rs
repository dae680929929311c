mod commands;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use designflow_core::constants::DEFAULT_API_URL;
use designflow_core::env_string;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "designflow")]
#[command(about = "Import, analyze and generate designs from product pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the action endpoint for the browser extension
    Serve {
        #[arg(short, long, default_value = "37778")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Import one scraped product
    Import {
        #[arg(long)]
        title: String,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        image: String,
    },
    /// Generate prompts for pending designs
    Analyze {
        /// Only this design
        #[arg(long)]
        id: Option<String>,
    },
    List,
    Get {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Remove every stored design
    Clear,
    /// Submit designs to the studio and wait until the queue drains
    Automate {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

pub(crate) fn get_db_path() -> PathBuf {
    env_string("DESIGNFLOW_DB_PATH").map_or_else(
        || {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("designflow")
                .join("designs.db")
        },
        PathBuf::from,
    )
}

pub(crate) fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub(crate) fn get_api_key() -> Result<String> {
    env_string("DESIGNFLOW_API_KEY").or_else(|| env_string("OPENAI_API_KEY")).ok_or_else(|| {
        anyhow::anyhow!("DESIGNFLOW_API_KEY or OPENAI_API_KEY environment variable must be set")
    })
}

pub(crate) fn get_base_url() -> String {
    env_string("DESIGNFLOW_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned())
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await,
        Commands::Import { title, brand, url, image } => {
            commands::designs::import(title, brand, url, image).await
        },
        Commands::Analyze { id } => commands::analyze::run(id).await,
        Commands::List => commands::designs::list().await,
        Commands::Get { id } => commands::designs::get(&id).await,
        Commands::Delete { id } => commands::designs::delete(&id).await,
        Commands::Clear => commands::designs::clear().await,
        Commands::Automate { ids } => commands::automate::run(&ids).await,
    }
}
