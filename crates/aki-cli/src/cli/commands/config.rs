//! Config command handlers.

use aki_core::config::{Config, paths};
use anyhow::{Context, Result};

/// Prints the config path. Works before the file exists.
pub fn path() {
    let config_path = paths::config_path();
    println!("{}", config_path.display());
    if !config_path.exists() {
        eprintln!("(not created yet; run `aki config init`)");
    }
}

pub fn init() -> Result<()> {
    let config_path = paths::config_path();
    Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    println!("Set [firebase].api_key and project_id, or AKI_FIREBASE_API_KEY / AKI_FIREBASE_PROJECT_ID.");
    Ok(())
}
