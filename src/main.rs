//! mediasession - inspect the action catalog and replay bridge scenarios
//! against recording platform sinks.

use std::{
    error::Error,
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use mediasession::{
    cli::{
        Scenario,
        formatting::{format_catalog, format_error},
        replay,
    },
    config::{Config, ConfigPaths},
    session::{ActionCatalog, DefaultArtworkResolver},
    tracing_config,
};
use tracing::{info, instrument};

#[derive(Parser)]
#[command(name = "mediasession")]
#[command(about = "Media session reconciliation tools")]
struct Cli {
    /// Configuration file (defaults to the XDG config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to the state directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the transport action catalog
    Catalog,
    /// Replay a TOML scenario and print every platform push as JSON
    Replay {
        /// Scenario file
        scenario: PathBuf,
    },
    /// Print the configuration JSON schema
    Schema,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{}", format_error(&e.to_string()));
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    if cli.log_file {
        tracing_config::init_with_file(config.general.log_level, &ConfigPaths::log_dir()?)?;
    } else {
        tracing_config::init(config.general.log_level)?;
    }

    match cli.command {
        Commands::Catalog => print!("{}", format_catalog(&ActionCatalog::standard())),
        Commands::Replay { scenario } => run_replay(&scenario, &config).await?,
        Commands::Schema => println!("{}", serde_json::to_string_pretty(&Config::json_schema())?),
    }

    Ok(())
}

#[instrument(skip(config))]
async fn run_replay(path: &Path, config: &Config) -> Result<(), Box<dyn Error>> {
    let scenario = Scenario::load(path)?;
    let resolver = DefaultArtworkResolver::new(&config.artwork)?;
    info!(steps = scenario.steps.len(), "replaying scenario");

    for entry in replay(scenario, config, &resolver).await {
        println!("{entry}");
    }
    Ok(())
}
