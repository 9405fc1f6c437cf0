use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;

use super::augment::print_summary;
use super::{read_page, settings_store, Command};
use crate::augment::ButtonKind;
use crate::host::{BrowserHost, SystemHost};
use crate::page::{ClickOutcome, Page};

/// Augments a saved page, then clicks its first Task or Branch button.
pub struct ClickCommand {
    pub input: PathBuf,
    pub settings: Option<PathBuf>,
    pub button: ButtonKind,
    host: Arc<dyn BrowserHost>,
}

impl ClickCommand {
    pub fn new(input: PathBuf, button: ButtonKind) -> Self {
        Self {
            input,
            settings: None,
            button,
            host: Arc::new(SystemHost),
        }
    }

    pub fn with_settings(mut self, settings: Option<PathBuf>) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_host(mut self, host: Arc<dyn BrowserHost>) -> Self {
        self.host = host;
        self
    }
}

impl Command for ClickCommand {
    async fn execute(&self) -> Result<()> {
        let page = Page::new(read_page(&self.input).await?, Arc::clone(&self.host));
        let report = page
            .on_content_ready(&settings_store(self.settings.as_ref()))
            .await;
        print_summary(&report);

        let Some(button) = page.find_button(self.button) else {
            return Err(match self.button {
                ButtonKind::Task => anyhow!("No opw/task/runbot id found, so there is no Task button"),
                ButtonKind::Branch => anyhow!("No branch link matched, so there is no Branch button"),
            });
        };

        match page.click(button).await {
            ClickOutcome::Opened(url) => {
                println!("🌐 Opened {url}");
                Ok(())
            }
            ClickOutcome::Copied { revert } => {
                let branch = report.branch_title.unwrap_or_default();
                println!("{} {branch}", crate::augment::buttons::COPIED_LABEL);
                revert.await?;
                Ok(())
            }
            ClickOutcome::OpenFailed(err) | ClickOutcome::CopyFailed(err) => Err(err.into()),
            ClickOutcome::NotAButton => Err(anyhow!("Element is not a generated button")),
        }
    }
}
