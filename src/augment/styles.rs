//! Declarative description of every element the augmentation pass creates.

use crate::dom::{Document, DomError, NodeId};

/// Marker on generated links; also the linkifier's "already done" signal
pub const LINKIFIED_CLASS: &str = "odoo-task-linkified";
pub const TASK_BUTTON_CLASS: &str = "odoo-task-button";
pub const BRANCH_BUTTON_CLASS: &str = "odoo-branch-button";

/// Everything needed to build one generated element.
#[derive(Debug, Clone, Copy)]
pub struct ElementSpec {
    pub tag: &'static str,
    pub class: &'static str,
    pub title: Option<&'static str>,
    pub attributes: &'static [(&'static str, &'static str)],
    pub style: &'static [(&'static str, &'static str)],
}

pub const TICKET_LINK: ElementSpec = ElementSpec {
    tag: "a",
    class: LINKIFIED_CLASS,
    title: None,
    attributes: &[("target", "_blank"), ("rel", "noopener noreferrer")],
    style: &[
        ("color", "#58a6ff"),
        ("text-decoration", "underline"),
        ("cursor", "pointer"),
    ],
};

pub const TASK_BUTTON: ElementSpec = ElementSpec {
    tag: "a",
    class: TASK_BUTTON_CLASS,
    title: Some("Open corresponding Odoo task"),
    attributes: &[("target", "_blank"), ("rel", "noopener noreferrer"), ("role", "button")],
    style: &[
        ("background", "#714B67"),
        ("color", "white"),
        ("border", "none"),
        ("border-radius", "6px"),
        ("padding", "5px 12px"),
        ("font-size", "12px"),
        ("font-weight", "500"),
        ("margin-left", "8px"),
        ("cursor", "pointer"),
        ("transition", "background 0.2s ease, transform 0.1s ease"),
    ],
};

pub const BRANCH_BUTTON: ElementSpec = ElementSpec {
    tag: "a",
    class: BRANCH_BUTTON_CLASS,
    title: Some("Copy branch name"),
    attributes: &[("role", "button")],
    style: &[
        ("display", "inline-flex"),
        ("align-items", "center"),
        ("justify-content", "center"),
        ("margin-left", "8px"),
        ("padding", "4px 10px"),
        ("font-size", "12px"),
        ("font-weight", "500"),
        ("text-decoration", "none"),
        ("color", "#ffffff"),
        ("background", "#238636"),
        ("border", "1px solid rgba(240,246,252,0.1)"),
        ("border-radius", "6px"),
        ("cursor", "pointer"),
    ],
};

impl ElementSpec {
    /// Creates the detached element with its class, title, attributes, style and text.
    pub fn build(&self, doc: &mut Document, text: &str) -> Result<NodeId, DomError> {
        let node = doc.create_element(self.tag);
        doc.add_class(node, self.class)?;
        if let Some(title) = self.title {
            doc.set_attribute(node, "title", title)?;
        }
        for (name, value) in self.attributes {
            doc.set_attribute(node, name, value)?;
        }
        doc.set_style(node, self.style)?;
        doc.set_text_content(node, text)?;
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_applies_the_whole_table() {
        let mut doc = Document::new();
        let node = TASK_BUTTON.build(&mut doc, "label").unwrap();
        assert_eq!(doc.tag_name(node), Some("a"));
        assert!(doc.has_class(node, TASK_BUTTON_CLASS));
        assert_eq!(doc.attribute(node, "title"), Some("Open corresponding Odoo task"));
        assert_eq!(doc.attribute(node, "target"), Some("_blank"));
        assert!(doc.attribute(node, "style").unwrap().starts_with("background: #714B67;"));
        assert_eq!(doc.text_content(node), "label");
        assert_eq!(doc.parent(node), None);
    }
}
