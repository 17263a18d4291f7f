//! Record lookup command.

use aki_core::config::Config;
use aki_core::records::{DocumentStore, Record};
use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table};

use super::restored_controller;

pub async fn run(config: &Config, username: &str) -> Result<()> {
    let username = username.trim();
    if username.is_empty() {
        anyhow::bail!("Please enter a username");
    }

    let store = DocumentStore::new(config)?;
    let mut controller = restored_controller(config).await?;
    let token = controller
        .get_valid_token()
        .await
        .context("Not authenticated")?;

    let records = store
        .find_by_username(&token, username)
        .await
        .context("Error loading data")?;

    if records.is_empty() {
        println!("No data to display");
    } else {
        println!("{}", render_table(&records));
    }
    Ok(())
}

fn render_table(records: &[Record]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(Record::HEADERS);
    for record in records {
        table.add_row(record.cells());
    }
    table
}
