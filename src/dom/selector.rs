//! CSS selector subset used to locate page elements
//!
//! Supported: selector lists, type and universal selectors, `#id`, `.class`,
//! attribute selectors (`[a]`, `=`, `~=`, `|=`, `^=`, `$=`, `*=`, with an
//! optional `i`/`s` flag) and the descendant and child combinators.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use super::{Document, NodeId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("`{selector}` at offset {offset}: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub offset: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOperator {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    condition: Option<(AttrOperator, String)>,
    case_insensitive: bool,
}

impl AttrSelector {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let Some((operator, expected)) = &self.condition else {
            return true;
        };
        let (actual, expected) = if self.case_insensitive {
            (actual.to_lowercase(), expected.to_lowercase())
        } else {
            (actual.to_string(), expected.clone())
        };
        match operator {
            AttrOperator::Equals => actual == expected,
            AttrOperator::Includes => {
                !expected.is_empty() && actual.split_ascii_whitespace().any(|word| word == expected)
            }
            AttrOperator::DashMatch => {
                actual == expected || actual.starts_with(&format!("{expected}-"))
            }
            AttrOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttrOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
            AttrOperator::Substring => !expected.is_empty() && actual.contains(&expected),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    /// `None` is the universal selector
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<AttrSelector>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.ids.is_empty() && self.classes.is_empty() && self.attributes.is_empty()
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(element) = doc.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if element.tag != *tag {
                return false;
            }
        }
        if !self.ids.iter().all(|id| element.attribute("id") == Some(id.as_str())) {
            return false;
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|attr| attr.matches(element.attribute(&attr.name)))
    }
}

/// One selector of a comma-separated list, e.g. `div.header > a[href]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.matches_at(doc, node, self.compounds.len() - 1)
    }

    fn matches_at(&self, doc: &Document, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(doc, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => doc
                .parent_element(node)
                .map(|parent| self.matches_at(doc, parent, index - 1))
                .unwrap_or(false),
            Combinator::Descendant => doc
                .ancestors(node)
                .filter(|&ancestor| doc.is_element(ancestor))
                .any(|ancestor| self.matches_at(doc, ancestor, index - 1)),
        }
    }
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        SelectorParser::new(input).parse_list()
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.selectors.iter().any(|selector| selector.matches(doc, node))
    }
}

impl std::str::FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

struct SelectorParser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> SelectorParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map(|(offset, _)| *offset).unwrap_or(self.input.len())
    }

    fn error(&mut self, reason: impl Into<String>) -> SelectorError {
        SelectorError {
            selector: self.input.to_string(),
            offset: self.offset(),
            reason: reason.into(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
            skipped = true;
        }
        skipped
    }

    fn parse_list(mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                None => break,
                Some(other) => return Err(self.error(format!("unexpected `{other}`"))),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(other) => return Err(self.error(format!("unexpected `{other}`"))),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut universal = false;
        match self.peek() {
            Some('*') => {
                self.bump();
                universal = true;
            }
            Some(c) if is_ident_start(c) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.ids.push(self.parse_ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attributes.push(self.parse_attribute()?);
                }
                _ => break,
            }
        }
        if compound.is_empty() && !universal {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let operator = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttrSelector {
                    name,
                    condition: None,
                    case_insensitive: false,
                });
            }
            Some('=') => {
                self.bump();
                AttrOperator::Equals
            }
            Some(prefix @ ('~' | '|' | '^' | '$' | '*')) => {
                self.bump();
                if self.bump() != Some('=') {
                    return Err(self.error(format!("expected `=` after `{prefix}`")));
                }
                match prefix {
                    '~' => AttrOperator::Includes,
                    '|' => AttrOperator::DashMatch,
                    '^' => AttrOperator::Prefix,
                    '$' => AttrOperator::Suffix,
                    _ => AttrOperator::Substring,
                }
            }
            _ => return Err(self.error("expected an attribute operator or `]`")),
        };
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.parse_quoted(quote)?
            }
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();
        let case_insensitive = match self.peek() {
            Some('i' | 'I') => {
                self.bump();
                true
            }
            Some('s' | 'S') => {
                self.bump();
                false
            }
            _ => false,
        };
        self.skip_whitespace();
        if self.bump() != Some(']') {
            return Err(self.error("expected `]`"));
        }
        Ok(AttrSelector {
            name,
            condition: Some((operator, value)),
            case_insensitive,
        })
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                match self.bump() {
                    Some(escaped) => ident.push(escaped),
                    None => return Err(self.error("unterminated escape")),
                }
            } else if is_ident_char(c) {
                ident.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(ident)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
