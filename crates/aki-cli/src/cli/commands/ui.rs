//! Interactive UI command.

use aki_core::config::Config;
use anyhow::Result;

#[cfg(feature = "tui")]
pub async fn run(config: &Config) -> Result<()> {
    let controller = super::controller(config)?;
    aki_tui::run_interactive(config, controller).await
}

#[cfg(not(feature = "tui"))]
pub async fn run(_config: &Config) -> Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}
