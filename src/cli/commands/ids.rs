use anyhow::Result;
use serde::Serialize;

use super::Command;
use crate::augment::{IdKind, ResolvedIds};

pub struct IdsCommand {
    pub branch: Option<String>,
    pub body: Option<String>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct IdsOutput {
    #[serde(flatten)]
    ids: ResolvedIds,
    task_url: Option<String>,
    runbot_url: Option<String>,
}

impl IdsCommand {
    pub fn new(branch: Option<String>, body: Option<String>) -> Self {
        Self {
            branch,
            body,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn output(&self) -> IdsOutput {
        let ids = ResolvedIds::resolve(self.branch.as_deref(), self.body.as_deref());
        IdsOutput {
            task_url: ids.task_url(),
            runbot_url: ids
                .runbot_ticket_id
                .as_deref()
                .map(|id| IdKind::Runbot.url_for(id)),
            ids,
        }
    }
}

impl Command for IdsCommand {
    async fn execute(&self) -> Result<()> {
        let output = self.output();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("🔎 IDENTIFIERS");
        println!("──────────────");
        match &output.ids.ticket_id {
            Some(id) => println!("   🎫 Ticket: {id}"),
            None => println!("   🎫 Ticket: none"),
        }
        match &output.ids.runbot_ticket_id {
            Some(id) => println!("   🤖 Runbot: {id}"),
            None => println!("   🤖 Runbot: none"),
        }
        if let Some(url) = &output.task_url {
            println!("   🔗 Task button opens: {url}");
        }
        if let Some(url) = &output.runbot_url {
            println!("   🧪 Runbot error: {url}");
        }
        Ok(())
    }
}
