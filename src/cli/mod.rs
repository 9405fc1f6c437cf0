use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "odoo-pr-linker")]
#[command(about = "Odoo conveniences for GitHub pull request pages")]
#[command(long_about = "Odoo PR Linker finds opw/task/runbot identifiers in a pull request's branch name \
                       and description, links them to their Odoo records and adds Task and Branch buttons \
                       next to the branch link. Start with 'odoo-pr-linker augment page.html'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Settings file holding the selectors
    #[arg(long, global = true, env = "ODOO_PR_LINKER_SETTINGS", help = "Path of the settings file (default: .odoo-pr-linker.toml)")]
    pub settings: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true, help = "Write structured JSON logs to stderr")]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Augment a saved pull request page and print the resulting HTML
    Augment {
        /// Saved pull request page
        input: PathBuf,
        /// Where to write the augmented page
        #[arg(long, short = 'o', help = "Write the augmented HTML here instead of stdout")]
        output: Option<PathBuf>,
        /// Override the stored branch link selector
        #[arg(long, help = "CSS selector of the branch link(s)")]
        branch_selector: Option<String>,
        /// Override the stored pull request body selector
        #[arg(long, help = "CSS selector of the pull request description")]
        body_selector: Option<String>,
    },
    /// Show the ticket and runbot ids found in a branch name and description
    Ids {
        /// Branch name, e.g. 17.0-fix-opw-1234-abc
        #[arg(long, help = "Branch name to search first")]
        branch: Option<String>,
        /// Pull request description text
        #[arg(long, help = "Description text searched when the branch has no id")]
        body: Option<String>,
        /// Print JSON instead of text
        #[arg(long, help = "Output machine-readable JSON")]
        json: bool,
    },
    /// Open the task of a saved pull request page in the browser
    Open {
        /// Saved pull request page
        input: PathBuf,
    },
    /// Copy the branch name of a saved pull request page to the clipboard
    CopyBranch {
        /// Saved pull request page
        input: PathBuf,
    },
    /// Show, change or reset the stored selectors
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the selectors the settings form would show
    Show,
    /// Store new selectors (blank values fall back to the defaults)
    Save {
        #[arg(long, default_value = "", help = "CSS selector of the branch link(s)")]
        branch_selector: String,
        #[arg(long, default_value = "", help = "CSS selector of the pull request description")]
        body_selector: String,
    },
    /// Restore the default selectors
    Reset,
}
