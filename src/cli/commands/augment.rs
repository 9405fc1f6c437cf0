use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{read_page, settings_store, Command};
use crate::augment::{self, AugmentReport, HeaderOutcome};
use crate::config::Configuration;
use crate::dom::outer_html;
use crate::settings::load_config;

pub struct AugmentCommand {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub branch_selector: Option<String>,
    pub body_selector: Option<String>,
}

impl AugmentCommand {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            output: None,
            settings: None,
            branch_selector: None,
            body_selector: None,
        }
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_settings(mut self, settings: Option<PathBuf>) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_selectors(mut self, branch: Option<String>, body: Option<String>) -> Self {
        self.branch_selector = branch;
        self.body_selector = body;
        self
    }

    /// Stored configuration with command-line overrides applied.
    async fn resolve_config(&self) -> Configuration {
        let mut config = load_config(&settings_store(self.settings.as_ref())).await;
        if let Some(branch) = self.branch_selector.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            config.branch_selector = branch.to_string();
        }
        if let Some(body) = self.body_selector.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            config.pull_request_body_selector = body.to_string();
        }
        config
    }
}

impl Command for AugmentCommand {
    async fn execute(&self) -> Result<()> {
        let mut doc = read_page(&self.input).await?;
        let config = self.resolve_config().await;
        let report = augment::run(&mut doc, Some(&config));
        let html = outer_html(&doc, doc.root());

        match &self.output {
            Some(path) => tokio::fs::write(path, html)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => print!("{html}"),
        }

        print_summary(&report);
        Ok(())
    }
}

pub fn print_summary(report: &AugmentReport) {
    eprintln!("🧩 AUGMENTATION SUMMARY");
    eprintln!("───────────────────────");
    eprintln!(
        "   🌿 Branch: {}",
        report.branch_title.as_deref().unwrap_or("(not found)")
    );
    eprintln!(
        "   🎫 Ticket: {}",
        report.ids.ticket_id.as_deref().unwrap_or("-")
    );
    eprintln!(
        "   🤖 Runbot: {}",
        report.ids.runbot_ticket_id.as_deref().unwrap_or("-")
    );
    if report.body_found {
        eprintln!("   🔗 Links created in description: {}", report.links_created);
    } else {
        eprintln!("   📄 No pull request description found");
    }
    if report.headers.is_empty() {
        eprintln!("   ⚠️  No branch link matched the selector");
    }
    for (index, outcome) in report.headers.iter().enumerate() {
        match outcome {
            HeaderOutcome::Inserted { buttons } => {
                eprintln!("   ✅ Branch link {}: added {} button(s)", index + 1, buttons)
            }
            HeaderOutcome::AlreadyAugmented => {
                eprintln!("   ⏭️  Branch link {}: buttons already present", index + 1)
            }
            HeaderOutcome::NoContainer => {
                eprintln!("   ⚠️  Branch link {}: no container to attach buttons to", index + 1)
            }
        }
    }
}
