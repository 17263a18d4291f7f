//! Auth command handlers.

use std::io::{self, BufRead};

use aki_core::config::Config;
use aki_core::providers::FirebaseAuth;
use anyhow::{Context, Result};

use super::{controller, restored_controller};

/// Signs in with `email` and a password read from the first line of stdin.
pub async fn login(config: &Config, email: &str) -> Result<()> {
    let mut password = String::new();
    io::stdin()
        .lock()
        .read_line(&mut password)
        .context("read password from stdin")?;
    let password = password.trim_end_matches(['\r', '\n']);

    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        anyhow::bail!("Please enter both email and password");
    }

    let identity = controller(config)?.login(email, password).await?;
    println!("Logged in as {}", identity.display_name());
    Ok(())
}

pub async fn logout(config: &Config) -> Result<()> {
    let controller = controller(config)?;
    if controller.provider().current_identity().is_none() {
        println!("Not logged in");
        return Ok(());
    }

    controller.logout().await?;
    println!("Logged out");
    Ok(())
}

pub fn status(config: &Config) -> Result<()> {
    let provider = FirebaseAuth::new(config)?;
    match provider.current_identity() {
        Some(identity) => println!("Signed in as {}", identity.display_name()),
        None => println!("Signed out"),
    }
    Ok(())
}

pub async fn token(config: &Config, refresh: bool) -> Result<()> {
    let mut controller = restored_controller(config).await?;
    let token = if refresh {
        controller.get_valid_token().await
    } else {
        controller.session().token().map(str::to_string)
    };

    let token = token.context("Not authenticated")?;
    println!("{token}");
    Ok(())
}
