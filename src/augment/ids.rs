use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const TASK_URL_BASE: &str = "https://www.odoo.com/odoo/all-tasks/";
pub const RUNBOT_URL_BASE: &str = "https://runbot.odoo.com/odoo/runbot.build.error/";

/// Identifier families that can appear in branch names and PR descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Opw,
    Task,
    Runbot,
}

/// Ticket-style identifiers, opw first so it wins over task in the same text
pub const TICKET_PREFIXES: [IdKind; 2] = [IdKind::Opw, IdKind::Task];
pub const RUNBOT_PREFIXES: [IdKind; 1] = [IdKind::Runbot];

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Opw => "opw",
            IdKind::Task => "task",
            IdKind::Runbot => "runbot",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        [IdKind::Opw, IdKind::Task, IdKind::Runbot]
            .into_iter()
            .find(|kind| kind.prefix().eq_ignore_ascii_case(prefix))
    }

    /// Where an identifier of this kind is tracked.
    pub fn url_for(self, digits: &str) -> String {
        match self {
            IdKind::Opw | IdKind::Task => format!("{TASK_URL_BASE}{digits}"),
            IdKind::Runbot => format!("{RUNBOT_URL_BASE}{digits}"),
        }
    }

    fn pattern(self) -> Option<&'static Regex> {
        static PATTERNS: [OnceLock<Option<Regex>>; 3] = [OnceLock::new(), OnceLock::new(), OnceLock::new()];
        let slot = match self {
            IdKind::Opw => &PATTERNS[0],
            IdKind::Task => &PATTERNS[1],
            IdKind::Runbot => &PATTERNS[2],
        };
        slot.get_or_init(|| prefix_pattern(self.prefix())).as_ref()
    }
}

fn prefix_pattern(prefix: &str) -> Option<Regex> {
    // ASCII-only case folding and digits: no long s, Kelvin sign or Arabic-Indic digits
    Regex::new(&format!("(?i-u:{})-([0-9]+)", regex::escape(prefix))).ok()
}

fn first_digits(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|digits| digits.as_str().to_string())
}

/// First digit run following `<prefix>-` in `text`, case-insensitively.
pub fn extract_id(text: Option<&str>, prefix: &str) -> Option<String> {
    let text = text?;
    let pattern = prefix_pattern(prefix)?;
    first_digits(&pattern, text)
}

/// Tries each prefix in order and returns the first hit.
pub fn find_id(text: Option<&str>, prefixes: &[IdKind]) -> Option<String> {
    let text = text?;
    prefixes
        .iter()
        .find_map(|kind| kind.pattern().and_then(|pattern| first_digits(pattern, text)))
}

/// Identifiers resolved for one page, branch name taking precedence over the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedIds {
    pub ticket_id: Option<String>,
    pub runbot_ticket_id: Option<String>,
}

impl ResolvedIds {
    pub fn resolve(branch_title: Option<&str>, body: Option<&str>) -> Self {
        let lookup = |prefixes: &[IdKind]| find_id(branch_title, prefixes).or_else(|| find_id(body, prefixes));
        Self {
            ticket_id: lookup(&TICKET_PREFIXES),
            runbot_ticket_id: lookup(&RUNBOT_PREFIXES),
        }
    }

    /// Target of the Task button: the ticket when known, otherwise the runbot error.
    pub fn task_url(&self) -> Option<String> {
        match (&self.ticket_id, &self.runbot_ticket_id) {
            (Some(ticket), _) => Some(IdKind::Task.url_for(ticket)),
            (None, Some(runbot)) => Some(IdKind::Runbot.url_for(runbot)),
            (None, None) => None,
        }
    }
}
