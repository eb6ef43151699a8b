use anyhow::{Context, Result};
use flux_core::search::SearchState;
use flux_core::view::ResultView;
use flux_infrastructure::ConfigService;
use std::path::PathBuf;

/// Config service for an explicit file, or the default location.
pub fn config_service(path: Option<PathBuf>) -> Result<ConfigService> {
    match path {
        Some(path) => Ok(ConfigService::new(path)),
        None => ConfigService::with_default_path().context("Failed to locate configuration"),
    }
}

/// Prints the results of a finished search, as text or JSON.
pub fn print_results(state: &SearchState, json: bool) -> Result<()> {
    let views: Vec<ResultView> = state.results.iter().map(ResultView::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No results for \"{}\"", state.query.trim());
        return Ok(());
    }

    for view in &views {
        print_row(view);
    }
    Ok(())
}

fn print_row(view: &ResultView) {
    let lock = if view.locked { " [locked]" } else { "" };
    match &view.date {
        Some(date) => println!("{}{}  [{}] {}", view.title, lock, view.type_label, date),
        None => println!("{}{}  [{}]", view.title, lock, view.type_label),
    }
    println!("  {}", view.url);
    if !view.excerpt.is_empty() {
        println!("  {}", view.excerpt);
    }
}
