use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::search::{SearchArgs, SourceArgs};

#[derive(Parser)]
#[command(name = "flux")]
#[command(about = "Flux - search a Flux site's index from the terminal", long_about = None)]
struct Cli {
    /// Configuration file (defaults to <config_dir>/flux/search.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single query and print the results
    Search(SearchArgs),
    /// Read queries from stdin, one per line; newer lines supersede older ones
    Interactive(SourceArgs),
    /// Inspect the resolved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration with secrets masked
    Show,
    /// Print the configuration file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => commands::search::run(cli.config, args).await?,
        Commands::Interactive(args) => commands::interactive::run(cli.config, args).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(cli.config).await?,
            ConfigAction::Path => commands::config::path(cli.config)?,
        },
    }

    Ok(())
}
