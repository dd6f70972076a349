//! Accident Trends CLI
//!
//! Command-line front end:
//! - Show the accidents/deaths chart as text or JSON
//! - Generate a default config file

use accident_trends::component::fetch_and_render;
use accident_trends::{generate_default_config, logging, Config, RenderedView};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "accident-trends")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Monthly accident and death statistics as an area chart")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Statistics API base URL, overriding the config
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the statistics and print the chart
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Bar width for text output
        #[arg(short, long, default_value = "40")]
        width: usize,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default().context("loading default config")?,
    };
    if let Some(url) = cli.base_url {
        config.source.base_url = url;
    }
    config.validate().context("invalid configuration")?;

    logging::init(&config.logging);
    match cli.config.or_else(Config::default_path) {
        Some(path) => tracing::debug!(path = %path.display(), "Loaded config file"),
        None => tracing::debug!("No config file found, using defaults and environment"),
    }

    match cli.command {
        Commands::Show { format, width } => {
            tracing::info!(url = %config.source.accidents_url(), "Loading accident chart");

            let view = fetch_and_render(&config).await?;
            match format {
                OutputFormat::Text => println!("{}", view.to_text(width)),
                OutputFormat::Json => println!("{}", view.to_json()?),
            }

            if matches!(view, RenderedView::Error { .. }) {
                std::process::exit(1);
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}
