use std::time::Duration;

use super::ids::ResolvedIds;
use super::styles::{BRANCH_BUTTON, BRANCH_BUTTON_CLASS, TASK_BUTTON, TASK_BUTTON_CLASS};
use crate::dom::{Document, DomError, NodeId};

pub const TASK_LABEL: &str = "🔗 Task";
pub const BRANCH_LABEL: &str = "📋 Branch";
pub const COPIED_LABEL: &str = "✅ Copied!";

/// How long the Branch button shows [`COPIED_LABEL`] after a successful copy
pub const LABEL_REVERT_DELAY: Duration = Duration::from_millis(1500);

/// Attribute holding the text the Branch button copies
pub const COPY_TEXT_ATTRIBUTE: &str = "data-copy-text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Task,
    Branch,
}

impl ButtonKind {
    pub fn marker_class(self) -> &'static str {
        match self {
            ButtonKind::Task => TASK_BUTTON_CLASS,
            ButtonKind::Branch => BRANCH_BUTTON_CLASS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ButtonKind::Task => TASK_LABEL,
            ButtonKind::Branch => BRANCH_LABEL,
        }
    }

    /// Which button `node` is, if any.
    pub fn of(doc: &Document, node: NodeId) -> Option<Self> {
        [ButtonKind::Task, ButtonKind::Branch]
            .into_iter()
            .find(|kind| doc.has_class(node, kind.marker_class()))
    }
}

/// What a click on a generated button does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    OpenInNewContext(String),
    CopyToClipboard(String),
}

impl ClickAction {
    /// Reads the action back from a generated button's attributes.
    pub fn of(doc: &Document, node: NodeId) -> Option<Self> {
        match ButtonKind::of(doc, node)? {
            ButtonKind::Task => doc
                .attribute(node, "href")
                .map(|url| ClickAction::OpenInNewContext(url.to_string())),
            ButtonKind::Branch => Some(ClickAction::CopyToClipboard(
                doc.attribute(node, COPY_TEXT_ATTRIBUTE)
                    .unwrap_or_default()
                    .to_string(),
            )),
        }
    }
}

/// Builds the detached buttons for one header, in insertion order: Task (when
/// a ticket or runbot id is known) then Branch.
pub fn create_buttons(
    doc: &mut Document,
    ticket_id: Option<&str>,
    runbot_ticket_id: Option<&str>,
    branch_name: &str,
) -> Result<Vec<NodeId>, DomError> {
    let ids = ResolvedIds {
        ticket_id: ticket_id.map(str::to_string),
        runbot_ticket_id: runbot_ticket_id.map(str::to_string),
    };
    let mut buttons = Vec::with_capacity(2);

    if let Some(url) = ids.task_url() {
        let task = TASK_BUTTON.build(doc, TASK_LABEL)?;
        doc.set_attribute(task, "href", &url)?;
        buttons.push(task);
    }

    let branch = BRANCH_BUTTON.build(doc, BRANCH_LABEL)?;
    doc.set_attribute(branch, COPY_TEXT_ATTRIBUTE, branch_name)?;
    buttons.push(branch);

    Ok(buttons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_only_without_ids() {
        let mut doc = Document::new();
        let buttons = create_buttons(&mut doc, None, None, "my-branch").unwrap();
        assert_eq!(buttons.len(), 1);
        assert_eq!(ButtonKind::of(&doc, buttons[0]), Some(ButtonKind::Branch));
        assert_eq!(doc.text_content(buttons[0]), BRANCH_LABEL);
        assert_eq!(
            ClickAction::of(&doc, buttons[0]),
            Some(ClickAction::CopyToClipboard("my-branch".to_string()))
        );
    }

    #[test]
    fn test_task_button_comes_first() {
        let mut doc = Document::new();
        let buttons = create_buttons(&mut doc, Some("55"), None, "my-branch").unwrap();
        assert_eq!(buttons.len(), 2);
        assert_eq!(ButtonKind::of(&doc, buttons[0]), Some(ButtonKind::Task));
        assert_eq!(ButtonKind::of(&doc, buttons[1]), Some(ButtonKind::Branch));
        assert_eq!(doc.text_content(buttons[0]), TASK_LABEL);
        assert_eq!(
            ClickAction::of(&doc, buttons[0]),
            Some(ClickAction::OpenInNewContext(
                "https://www.odoo.com/odoo/all-tasks/55".to_string()
            ))
        );
    }

    #[test]
    fn test_ticket_beats_runbot_and_runbot_is_fallback() {
        let mut doc = Document::new();
        let both = create_buttons(&mut doc, Some("1"), Some("2"), "b").unwrap();
        assert_eq!(doc.attribute(both[0], "href"), Some("https://www.odoo.com/odoo/all-tasks/1"));

        let runbot = create_buttons(&mut doc, None, Some("2"), "b").unwrap();
        assert_eq!(
            doc.attribute(runbot[0], "href"),
            Some("https://runbot.odoo.com/odoo/runbot.build.error/2")
        );
        assert_eq!(doc.attribute(runbot[0], "target"), Some("_blank"));
    }

    #[test]
    fn test_every_call_builds_fresh_nodes() {
        let mut doc = Document::new();
        let first = create_buttons(&mut doc, Some("1"), None, "b").unwrap();
        let second = create_buttons(&mut doc, Some("1"), None, "b").unwrap();
        assert!(first.iter().all(|node| !second.contains(node)));
    }

    #[test]
    fn test_plain_elements_have_no_action() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        doc.set_attribute(a, "href", "https://example.com").unwrap();
        assert_eq!(ClickAction::of(&doc, a), None);
        assert_eq!(ButtonKind::of(&doc, a), None);
    }
}
