use anyhow::{anyhow, Result};
use std::path::PathBuf;

use super::{settings_store, Command};
use crate::config::Configuration;
use crate::settings::{load_settings_for_display, reset_settings, save_settings, SaveStatus};

pub enum SettingsOperation {
    Show,
    Save {
        branch_selector: String,
        body_selector: String,
    },
    Reset,
}

pub struct SettingsCommand {
    pub operation: SettingsOperation,
    pub settings: Option<PathBuf>,
}

impl SettingsCommand {
    pub fn new(operation: SettingsOperation) -> Self {
        Self {
            operation,
            settings: None,
        }
    }

    pub fn with_settings(mut self, settings: Option<PathBuf>) -> Self {
        self.settings = settings;
        self
    }
}

impl Command for SettingsCommand {
    async fn execute(&self) -> Result<()> {
        let store = settings_store(self.settings.as_ref());
        let status = match &self.operation {
            SettingsOperation::Show => {
                let config = load_settings_for_display(&store).await;
                println!("⚙️  SETTINGS ({})", store.path().display());
                print_config(&config);
                return Ok(());
            }
            SettingsOperation::Save {
                branch_selector,
                body_selector,
            } => save_settings(&store, branch_selector, body_selector).await,
            SettingsOperation::Reset => reset_settings(&store).await,
        };

        match status {
            SaveStatus::Saved(config) => {
                println!("✅ Settings saved to {}", store.path().display());
                print_config(&config);
                Ok(())
            }
            SaveStatus::Failed(err) => Err(anyhow!("❌ Failed to save settings: {err}")),
        }
    }
}

fn print_config(config: &Configuration) {
    println!("   🌿 Branch selector: {}", config.branch_selector);
    println!("   📄 Pull request body selector: {}", config.pull_request_body_selector);
}
