use anyhow::Result;
use clap::Parser;

use odoo_pr_linker::augment::ButtonKind;
use odoo_pr_linker::cli::commands::augment::AugmentCommand;
use odoo_pr_linker::cli::commands::click::ClickCommand;
use odoo_pr_linker::cli::commands::ids::IdsCommand;
use odoo_pr_linker::cli::commands::settings::{SettingsCommand, SettingsOperation};
use odoo_pr_linker::cli::commands::{show_how_to_get_started, Command};
use odoo_pr_linker::cli::{Cli, Commands, SettingsAction};
use odoo_pr_linker::telemetry::init_telemetry;

fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_telemetry(cli.json_logs)?;
    let settings = cli.settings;

    match cli.command {
        // No subcommand: explain how to use the tool
        None => tokio::runtime::Runtime::new()?.block_on(async {
            show_how_to_get_started().await
        }),
        Some(Commands::Augment {
            input,
            output,
            branch_selector,
            body_selector,
        }) => tokio::runtime::Runtime::new()?.block_on(async {
            AugmentCommand::new(input)
                .with_output(output)
                .with_settings(settings)
                .with_selectors(branch_selector, body_selector)
                .execute()
                .await
        }),
        Some(Commands::Ids { branch, body, json }) => {
            tokio::runtime::Runtime::new()?.block_on(async {
                IdsCommand::new(branch, body).with_json(json).execute().await
            })
        }
        Some(Commands::Open { input }) => tokio::runtime::Runtime::new()?.block_on(async {
            ClickCommand::new(input, ButtonKind::Task)
                .with_settings(settings)
                .execute()
                .await
        }),
        Some(Commands::CopyBranch { input }) => {
            tokio::runtime::Runtime::new()?.block_on(async {
                ClickCommand::new(input, ButtonKind::Branch)
                    .with_settings(settings)
                    .execute()
                    .await
            })
        }
        Some(Commands::Settings { action }) => {
            let operation = match action {
                SettingsAction::Show => SettingsOperation::Show,
                SettingsAction::Save {
                    branch_selector,
                    body_selector,
                } => SettingsOperation::Save {
                    branch_selector,
                    body_selector,
                },
                SettingsAction::Reset => SettingsOperation::Reset,
            };
            tokio::runtime::Runtime::new()?.block_on(async {
                SettingsCommand::new(operation)
                    .with_settings(settings)
                    .execute()
                    .await
            })
        }
    }
}
