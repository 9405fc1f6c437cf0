use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::dom::{parse_html, Document};
use crate::settings::FileSettingsStore;

pub mod augment;
pub mod click;
pub mod ids;
pub mod settings;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

pub fn settings_store(path: Option<&PathBuf>) -> FileSettingsStore {
    path.map(FileSettingsStore::new).unwrap_or_default()
}

pub async fn read_page(input: &Path) -> Result<Document> {
    let html = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read page {}", input.display()))?;
    Ok(parse_html(&html))
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("🔗 Odoo PR Linker - Odoo conveniences for pull request pages");
    println!();
    println!("To get started:");
    println!("  🧩 odoo-pr-linker augment page.html     # Link ids and add Task/Branch buttons");
    println!("  🔎 odoo-pr-linker ids --branch NAME      # Show the ids found in a branch name");
    println!("  🌐 odoo-pr-linker open page.html         # Open the page's Odoo task");
    println!("  📋 odoo-pr-linker copy-branch page.html  # Copy the page's branch name");
    println!();
    println!("Settings:");
    println!("  ⚙️  odoo-pr-linker settings show|save|reset");
    Ok(())
}
