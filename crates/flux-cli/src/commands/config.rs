use anyhow::Result;
use std::path::PathBuf;

use super::utils::config_service;

const MASK: &str = "********";

pub async fn show(config_path: Option<PathBuf>) -> Result<()> {
    let service = config_service(config_path)?;
    let mut config = service.get_config().await?;

    if let Some(section) = config.hash_scan.as_mut() {
        section.token = mask(&section.token);
    }
    if let Some(section) = config.rest_table.as_mut() {
        section.key = mask(&section.key);
    }

    println!("# {}", service.path().display());
    print!("{}", toml::to_string_pretty(&config)?);

    if let Err(e) = config.validate() {
        eprintln!("warning: {e}");
    }
    Ok(())
}

pub fn path(config_path: Option<PathBuf>) -> Result<()> {
    let service = config_service(config_path)?;
    println!("{}", service.path().display());
    Ok(())
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        MASK.to_string()
    }
}
