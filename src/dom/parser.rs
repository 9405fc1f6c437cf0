//! Tolerant HTML reader
//!
//! Good enough for saved pull-request pages and hand-written fixtures. It never
//! fails: unknown constructs become text, unclosed elements are closed at end
//! of input and stray end tags are dropped.

use super::{Document, NodeData, NodeId};

pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

/// Tags that implicitly close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p",
    "pre", "section", "table", "ul",
];

pub fn parse_html(input: &str) -> Document {
    let mut builder = TreeBuilder::new();
    builder.run(input);
    builder.doc
}

struct TreeBuilder {
    doc: Document,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        let doc = Document::new();
        let root = doc.root();
        Self {
            doc,
            open: vec![root],
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn append(&mut self, node: NodeId) {
        let parent = self.current();
        // Both nodes are fresh and the parent is an open element, so this cannot fail.
        let _ = self.doc.append_child(parent, node);
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.current();
        if let Some(&last) = self.doc.children(parent).last() {
            if let Ok(node) = self.doc.node_mut(last) {
                if let NodeData::Text(existing) = &mut node.data {
                    existing.push_str(text);
                    return;
                }
            }
        }
        let node = self.doc.create_text(text);
        self.append(node);
    }

    fn open_tag_name(&self, index: usize) -> Option<&str> {
        self.open.get(index).and_then(|&node| self.doc.tag_name(node))
    }

    fn close_implied(&mut self, tag: &str) {
        let closes = |open: &str| match open {
            "p" => CLOSES_PARAGRAPH.contains(&tag),
            "li" => tag == "li",
            "option" => tag == "option",
            "dt" | "dd" => tag == "dt" || tag == "dd",
            "td" | "th" => tag == "td" || tag == "th" || tag == "tr",
            "tr" => tag == "tr",
            _ => false,
        };
        while let Some(name) = self.open_tag_name(self.open.len() - 1) {
            if closes(name) {
                self.open.pop();
            } else {
                break;
            }
        }
    }

    fn close_tag(&mut self, tag: &str) {
        let position = (1..self.open.len())
            .rev()
            .find(|&index| self.open_tag_name(index) == Some(tag));
        if let Some(position) = position {
            self.open.truncate(position);
        }
    }

    fn run(&mut self, input: &str) {
        let mut pos = 0;
        let mut text_start = 0;
        while let Some(offset) = input[pos..].find('<') {
            let lt = pos + offset;
            let rest = &input[lt..];
            let consumed = if rest.starts_with("<!--") {
                self.flush_text(&input[text_start..lt]);
                let end = rest[4..].find("-->").map(|i| i + 4);
                let (body, len) = match end {
                    Some(end) => (&rest[4..end], end + 3),
                    None => (&rest[4..], rest.len()),
                };
                let comment = self.doc.create_comment(body);
                self.append(comment);
                Some(len)
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.flush_text(&input[text_start..lt]);
                Some(rest.find('>').map(|i| i + 1).unwrap_or(rest.len()))
            } else if rest.starts_with("</") && starts_with_letter(&rest[2..]) {
                self.flush_text(&input[text_start..lt]);
                let len = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
                let name: String = rest[2..]
                    .chars()
                    .take_while(|c| is_tag_name_char(*c))
                    .collect::<String>()
                    .to_ascii_lowercase();
                self.close_tag(&name);
                Some(len)
            } else if starts_with_letter(&rest[1..]) {
                self.flush_text(&input[text_start..lt]);
                Some(self.start_tag(rest))
            } else {
                None
            };
            match consumed {
                Some(len) => {
                    pos = lt + len;
                    text_start = pos;
                }
                None => pos = lt + 1,
            }
        }
        self.flush_text(&input[text_start..]);
    }

    fn flush_text(&mut self, raw: &str) {
        if !raw.is_empty() {
            self.append_text(&decode_entities(raw));
        }
    }

    /// Handles `<name ...>` at the start of `rest`, returns bytes consumed.
    fn start_tag(&mut self, rest: &str) -> usize {
        let (tag, attributes, self_closing, len) = parse_tag(rest);
        self.close_implied(&tag);

        let element = self.doc.create_element(&tag);
        for (name, value) in &attributes {
            let _ = self.doc.set_attribute(element, name, value);
        }
        self.append(element);

        if VOID_ELEMENTS.contains(&tag.as_str()) || self_closing {
            return len;
        }

        let raw = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
        if raw || ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let body_start = len;
            let closing = format!("</{tag}");
            let body_end = find_ascii_case_insensitive(&rest[body_start..], &closing)
                .map(|i| body_start + i)
                .unwrap_or(rest.len());
            let body = &rest[body_start..body_end];
            if !body.is_empty() {
                let text = if raw { body.to_string() } else { decode_entities(body) };
                let node = self.doc.create_text(text);
                let _ = self.doc.append_child(element, node);
            }
            let after = rest[body_end..]
                .find('>')
                .map(|i| body_end + i + 1)
                .unwrap_or(rest.len());
            return after;
        }

        self.open.push(element);
        len
    }
}

fn starts_with_letter(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Parses a start tag; returns (name, attributes, self-closing, bytes consumed).
fn parse_tag(rest: &str) -> (String, Vec<(String, String)>, bool, usize) {
    let bytes = rest.as_bytes();
    let mut i = 1;
    while i < bytes.len() && is_tag_name_char(bytes[i] as char) {
        i += 1;
    }
    let name = rest[1..i].to_ascii_lowercase();
    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return (name, attributes, self_closing, bytes.len());
        }
        match bytes[i] {
            b'>' => return (name, attributes, self_closing, i + 1),
            b'/' => {
                self_closing = true;
                i += 1;
                continue;
            }
            _ => self_closing = false,
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        // Attribute names can contain stray quotes or other odd bytes; keep them verbatim.
        let attr_name = rest[name_start..i].to_ascii_lowercase();
        if attr_name.is_empty() {
            i += 1;
            continue;
        }

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                let value_start = i + 1;
                let value_end = rest[value_start..]
                    .bytes()
                    .position(|b| b == quote)
                    .map(|p| value_start + p)
                    .unwrap_or(bytes.len());
                value = decode_entities(&rest[value_start..value_end]);
                i = (value_end + 1).min(bytes.len());
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                value = decode_entities(&rest[value_start..i]);
            }
        }
        if !attributes.iter().any(|(existing, _): &(String, String)| *existing == attr_name) {
            attributes.push((attr_name, value));
        }
    }
}

/// Decodes the character references that show up in real pages.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        match candidate.find(';').filter(|&semi| semi <= 12) {
            Some(semi) => {
                let entity = &candidate[1..semi];
                match decode_entity(entity) {
                    Some(decoded) => {
                        out.push(decoded);
                        rest = &candidate[semi + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &candidate[1..];
                    }
                }
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::outer_html;

    #[test]
    fn test_nested_elements_and_attributes() {
        let doc = parse_html(r#"<div class="a b" data-x='1'><span>hi</span> there</div>"#);
        let div = doc.query_selector("div").unwrap().unwrap();
        assert_eq!(doc.attribute(div, "class"), Some("a b"));
        assert_eq!(doc.attribute(div, "data-x"), Some("1"));
        assert_eq!(doc.text_content(div), "hi there");
    }

    #[test]
    fn test_void_and_self_closing() {
        let doc = parse_html("<p>a<br>b<img src=x.png/>c</p>");
        let p = doc.query_selector("p").unwrap().unwrap();
        assert_eq!(doc.text_content(p), "abc");
        assert_eq!(doc.element_children(p).count(), 2);
    }

    #[test]
    fn test_entities_are_decoded() {
        let doc = parse_html(r#"<p title="a &amp; b">x &lt; y &#65;&#x42; &bogus; &</p>"#);
        let p = doc.query_selector("p").unwrap().unwrap();
        assert_eq!(doc.attribute(p, "title"), Some("a & b"));
        assert_eq!(doc.text_content(p), "x < y AB &bogus; &");
    }

    #[test]
    fn test_comments_doctype_and_raw_text() {
        let doc = parse_html("<!DOCTYPE html><!-- note --><script>if (a < b) {}</script><p>x</p>");
        let script = doc.query_selector("script").unwrap().unwrap();
        assert_eq!(doc.text_content(script), "if (a < b) {}");
        assert_eq!(doc.query_selector_all("p").unwrap().len(), 1);
        assert!(matches!(
            doc.data(doc.children(doc.root())[0]),
            Some(NodeData::Comment(text)) if text == " note "
        ));
    }

    #[test]
    fn test_unclosed_and_stray_tags() {
        let doc = parse_html("<ul><li>one<li>two</ul></span><p>a<div>b</div>");
        let items = doc.query_selector_all("li").unwrap();
        assert_eq!(items.len(), 2);
        let div = doc.query_selector("div").unwrap().unwrap();
        assert_eq!(doc.tag_name(doc.parent(div).unwrap()), None);
        assert_eq!(
            outer_html(&doc, doc.root()),
            "<ul><li>one</li><li>two</li></ul><p>a</p><div>b</div>"
        );
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let doc = parse_html("<p>1 < 2 and 3 <> 4</p>");
        let p = doc.query_selector("p").unwrap().unwrap();
        assert_eq!(doc.text_content(p), "1 < 2 and 3 <> 4");
    }
}
