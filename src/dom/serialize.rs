use super::parser::{RAW_TEXT_ELEMENTS, VOID_ELEMENTS};
use super::{Document, NodeData, NodeId};

/// HTML for `node` itself and everything below it. For the document node this
/// is the whole page.
pub fn outer_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, false, &mut out);
    out
}

/// HTML for the children of `node`.
pub fn inner_html(doc: &Document, node: NodeId) -> String {
    let raw = doc
        .tag_name(node)
        .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
    let mut out = String::new();
    for &child in doc.children(node) {
        write_node(doc, child, raw, &mut out);
    }
    out
}

enum Step {
    Open { node: NodeId, raw_parent: bool },
    Close(NodeId),
}

fn write_node(doc: &Document, node: NodeId, raw_parent: bool, out: &mut String) {
    let mut stack = vec![Step::Open { node, raw_parent }];
    while let Some(step) = stack.pop() {
        let (node, raw_parent) = match step {
            Step::Open { node, raw_parent } => (node, raw_parent),
            Step::Close(node) => {
                if let Some(tag) = doc.tag_name(node) {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                continue;
            }
        };
        match doc.data(node) {
            None => {}
            Some(NodeData::Document) => {
                push_children(doc, node, false, &mut stack);
            }
            Some(NodeData::Text(text)) => {
                if raw_parent {
                    out.push_str(text);
                } else {
                    escape_into(text, false, out);
                }
            }
            Some(NodeData::Comment(text)) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Some(NodeData::Element(element)) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    continue;
                }
                let raw = RAW_TEXT_ELEMENTS.contains(&element.tag.as_str());
                stack.push(Step::Close(node));
                push_children(doc, node, raw, &mut stack);
            }
        }
    }
}

/// Children go on in reverse so they pop in document order.
fn push_children(doc: &Document, node: NodeId, raw_parent: bool, stack: &mut Vec<Step>) {
    stack.extend(
        doc.children(node)
            .iter()
            .rev()
            .map(|&child| Step::Open { node: child, raw_parent }),
    );
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
