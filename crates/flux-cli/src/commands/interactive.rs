use anyhow::Result;
use flux_application::SearchCoordinator;
use flux_core::search::SearchStatus;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::search::{SourceArgs, resolve_config};
use super::utils::print_results;

/// Runs every stdin line as a query without waiting for the previous one.
///
/// Only settled states are printed, so a line typed while an earlier search
/// is still running replaces that search's output.
pub async fn run(config_path: Option<PathBuf>, args: SourceArgs) -> Result<()> {
    let config = resolve_config(config_path, &args).await?;
    let coordinator = Arc::new(SearchCoordinator::from_config(&config)?);
    let mut updates = coordinator.subscribe();

    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            match &state.status {
                SearchStatus::Success => {
                    if let Err(e) = print_results(&state, args.json) {
                        tracing::error!("Failed to print results: {}", e);
                    }
                }
                SearchStatus::Error(message) => eprintln!("{message}"),
                SearchStatus::Idle | SearchStatus::Loading => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut searches = Vec::new();
    while let Some(line) = lines.next_line().await? {
        // Begin in line order so a later line always supersedes an earlier one
        let Some(pending) = coordinator.begin_search(&line).await else {
            continue;
        };
        let coordinator = coordinator.clone();
        searches.push(tokio::spawn(async move {
            coordinator.finish_search(pending).await;
        }));
    }

    for search in searches {
        if let Err(e) = search.await {
            tracing::error!("Search task failed: {}", e);
        }
    }
    drop(coordinator);
    printer.await?;

    Ok(())
}
