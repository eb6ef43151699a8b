use anyhow::{Result, bail};
use clap::Args;
use flux_application::SearchCoordinator;
use flux_core::config::{SearchConfig, SearchMode};
use std::path::PathBuf;

use super::utils::{config_service, print_results};

/// Options selecting and overriding the search backend.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Backend to use: local, remote-a or remote-b
    #[arg(long)]
    pub mode: Option<SearchMode>,

    /// Read the local index from a file
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Fetch the local index from <BASE_URL>/search/index.json
    #[arg(long)]
    pub base_url: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Query text; every token must match
    pub query: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

pub async fn run(config_path: Option<PathBuf>, args: SearchArgs) -> Result<()> {
    let config = resolve_config(config_path, &args.source).await?;
    let coordinator = SearchCoordinator::from_config(&config)?;
    tracing::info!(mode = %config.mode, query = %args.query, "Searching");

    coordinator.set_query(&args.query).await;

    let state = coordinator.state();
    if let Some(message) = state.error() {
        bail!("{message}");
    }
    print_results(&state, args.source.json)
}

/// Loads the configuration and applies command-line overrides.
pub async fn resolve_config(
    config_path: Option<PathBuf>,
    source: &SourceArgs,
) -> Result<SearchConfig> {
    let service = config_service(config_path)?;
    let mut config = service.get_config().await?;

    if let Some(mode) = source.mode {
        config.mode = mode;
    }
    if let Some(index) = &source.index {
        config.local.index_path = Some(index.clone());
    }
    if let Some(base_url) = &source.base_url {
        config.local.base_url = Some(base_url.clone());
    }

    Ok(config)
}
