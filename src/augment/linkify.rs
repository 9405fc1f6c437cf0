use regex::Regex;
use tracing::debug;

use super::ids::{IdKind, TICKET_PREFIXES};
use super::styles::{LINKIFIED_CLASS, TICKET_LINK};
use crate::dom::{Document, DomError, NodeId, TextWalker};

/// Parents whose text is never rewritten
const SKIPPED_PARENTS: &[&str] = &["code", "pre", "a"];

/// Turns inline identifier mentions into links to their tracker.
#[derive(Debug, Clone)]
pub struct Linkifier {
    /// `None` when no prefixes were given: nothing is ever linked
    pattern: Option<Regex>,
}

impl Linkifier {
    pub fn new(prefixes: &[IdKind]) -> Self {
        let alternation = prefixes
            .iter()
            .map(|kind| regex::escape(kind.prefix()))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = if alternation.is_empty() {
            None
        } else {
            Regex::new(&format!(r"((?i-u:{alternation}))-([0-9]+)")).ok()
        };
        Self { pattern }
    }

    /// Text nodes worth rewriting: they mention an identifier and are not
    /// inside code, an existing link or a link we generated earlier.
    pub fn accepts(&self, doc: &Document, node: NodeId) -> bool {
        let (Some(pattern), Some(text)) = (&self.pattern, doc.text(node)) else {
            return false;
        };
        if !pattern.is_match(text) {
            return false;
        }
        let Some(parent) = doc.parent_element(node) else {
            return false;
        };
        if doc
            .tag_name(parent)
            .is_some_and(|tag| SKIPPED_PARENTS.contains(&tag))
        {
            return false;
        }
        !std::iter::once(parent)
            .chain(doc.ancestors(parent))
            .any(|ancestor| doc.has_class(ancestor, LINKIFIED_CLASS))
    }

    /// Rewrites every accepted text node under `root`; returns how many links
    /// were created. A missing root is a no-op.
    pub fn linkify(&self, doc: &mut Document, root: Option<NodeId>) -> Result<usize, DomError> {
        let Some(root) = root else {
            return Ok(0);
        };
        let targets: Vec<NodeId> =
            TextWalker::new(doc, root, |doc, node| self.accepts(doc, node)).collect();

        let mut created = 0;
        for node in targets {
            created += self.rewrite(doc, node)?;
        }
        if created > 0 {
            debug!(links = created, "Linkified identifiers");
        }
        Ok(created)
    }

    fn rewrite(&self, doc: &mut Document, node: NodeId) -> Result<usize, DomError> {
        let (Some(pattern), Some(text)) = (&self.pattern, doc.text(node)) else {
            return Ok(0);
        };
        let original = text.to_string();

        let mut replacements = Vec::new();
        let mut last_end = 0;
        for captures in pattern.captures_iter(&original) {
            let (Some(full), Some(prefix), Some(digits)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                continue;
            };
            let Some(kind) = IdKind::from_prefix(prefix.as_str()) else {
                continue;
            };
            if full.start() > last_end {
                replacements.push(doc.create_text(&original[last_end..full.start()]));
            }
            let link = TICKET_LINK.build(doc, full.as_str())?;
            doc.set_attribute(link, "href", &kind.url_for(digits.as_str()))?;
            replacements.push(link);
            last_end = full.end();
        }

        let links = replacements.iter().filter(|&&n| doc.is_element(n)).count();
        if links == 0 {
            return Ok(0);
        }
        if last_end < original.len() {
            replacements.push(doc.create_text(&original[last_end..]));
        }
        doc.replace_with(node, &replacements)?;
        Ok(links)
    }
}

impl Default for Linkifier {
    fn default() -> Self {
        Self::new(&TICKET_PREFIXES)
    }
}

/// Linkifies `root` with the given identifier kinds.
pub fn linkify(doc: &mut Document, root: Option<NodeId>, prefixes: &[IdKind]) -> Result<usize, DomError> {
    Linkifier::new(prefixes).linkify(doc, root)
}
