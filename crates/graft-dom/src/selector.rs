//! Selector matching
//!
//! Selector lists of compound selectors joined by descendant or child
//! combinators. Enough of CSS for registry lookups and delegated events;
//! pseudo-classes are rejected as unsupported.

use crate::{DomTree, ElementData, NodeId};

/// Selector parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Invalid selector `{0}`")]
    Invalid(String),
}

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (matcher, val) = match (&self.matcher, value) {
            (None, Some(_)) => return true, // [attr] - just check existence
            (_, None) => return false,
            (Some(matcher), Some(val)) => (matcher, val),
        };

        let fold = |s: &str| if self.case_insensitive { s.to_lowercase() } else { s.to_string() };
        let val = fold(val);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{}-", expected))
            }
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && val.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && val.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && val.contains(&fold(expected))
            }
        }
    }
}

/// Combinator between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

/// Compound selector: components that must all match one element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    fn matches(&self, elem: &ElementData) -> bool {
        self.components.iter().all(|component| match component {
            SelectorComponent::Universal => true,
            SelectorComponent::Type(tag) => elem.local_name.eq_ignore_ascii_case(tag),
            SelectorComponent::Id(id) => elem.get_attr("id") == Some(id.as_str()),
            SelectorComponent::Class(class) => elem.class_list().any(|c| c == class),
            SelectorComponent::Attribute(attr) => attr.matches(elem.get_attr(&attr.name)),
        })
    }
}

/// Complex selector; `parts[i].0` joins `parts[i - 1]` to `parts[i]`
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    parts: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.parts
            .len()
            .checked_sub(1)
            .is_some_and(|last| self.matches_from(tree, node, last))
    }

    fn matches_from(&self, tree: &DomTree, node: NodeId, idx: usize) -> bool {
        let Some(elem) = tree.get(node).and_then(|n| n.as_element()) else {
            return false;
        };
        let (combinator, compound) = &self.parts[idx];
        if !compound.matches(elem) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match combinator {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|parent| self.matches_from(tree, parent, idx - 1)),
            Combinator::Descendant => tree
                .ancestors(node)
                .skip(1)
                .any(|ancestor| self.matches_from(tree, ancestor, idx - 1)),
        }
    }
}

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list such as `li.item > a, [data-action]`
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        if input.trim().is_empty() {
            return Err(SelectorError::Empty);
        }

        let selectors = split_top_level(input, ',')
            .into_iter()
            .map(|part| {
                parse_complex(part).ok_or_else(|| SelectorError::Invalid(input.trim().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { selectors })
    }

    /// Whether any selector in the list matches the element
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, node))
    }
}

/// Split on `sep` outside of brackets and quotes
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_complex(input: &str) -> Option<ComplexSelector> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let mut pending = Combinator::Descendant;
    let mut saw_child = false;
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '>' {
            if saw_child || parts.is_empty() {
                return None;
            }
            saw_child = true;
            pending = Combinator::Child;
            chars.next();
            continue;
        }

        // Read one compound, stopping at whitespace or '>' outside brackets
        let mut end = input.len();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        while let Some(&(i, ch)) = chars.peek() {
            match (quote, ch) {
                (Some(q), ch) if ch == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(ch),
                (None, '[') => depth += 1,
                (None, ']') => depth = depth.saturating_sub(1),
                (None, ch) if depth == 0 && (ch.is_whitespace() || ch == '>') => {
                    end = i;
                    break;
                }
                _ => {}
            }
            chars.next();
        }

        let compound = parse_compound(&input[start..end])?;
        parts.push((pending, compound));
        pending = Combinator::Descendant;
        saw_child = false;
    }

    // Dangling combinator
    if saw_child || parts.is_empty() {
        return None;
    }
    Some(ComplexSelector { parts })
}

/// Parse a compound selector like `li.item[data-x="1"]#main`
fn parse_compound(input: &str) -> Option<CompoundSelector> {
    let mut components = Vec::new();
    let mut rest = input;

    if let Some(after) = rest.strip_prefix('*') {
        components.push(SelectorComponent::Universal);
        rest = after;
    } else {
        let len = ident_len(rest);
        if len > 0 {
            components.push(SelectorComponent::Type(rest[..len].to_ascii_lowercase()));
            rest = &rest[len..];
        }
    }

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('#') {
            let len = ident_len(after);
            if len == 0 {
                return None;
            }
            components.push(SelectorComponent::Id(after[..len].to_string()));
            rest = &after[len..];
        } else if let Some(after) = rest.strip_prefix('.') {
            let len = ident_len(after);
            if len == 0 {
                return None;
            }
            components.push(SelectorComponent::Class(after[..len].to_string()));
            rest = &after[len..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let close = closing_bracket(after)?;
            let attribute = parse_attribute_selector(&after[..close])?;
            components.push(SelectorComponent::Attribute(attribute));
            rest = &after[close + 1..];
        } else {
            return None;
        }
    }

    (!components.is_empty()).then_some(CompoundSelector { components })
}

/// Length of the CSS identifier at the start of `s`
fn ident_len(s: &str) -> usize {
    let mut chars = s.char_indices();

    // First character must be a letter, underscore, or hyphen
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' || c == '-' => {}
        _ => return 0,
    }

    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        .map_or(s.len(), |(i, _)| i)
}

/// Byte offset of the `]` closing an attribute selector body
fn closing_bracket(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

/// Parse an attribute selector content (without brackets)
fn parse_attribute_selector(content: &str) -> Option<AttributeSelector> {
    let content = content.trim();

    // Case-insensitive flag
    let flagged = content.strip_suffix(" i").or_else(|| content.strip_suffix(" I"));
    let (content, case_insensitive) = match flagged {
        Some(stripped) => (stripped.trim_end(), true),
        None => (content, false),
    };

    const OPERATORS: &[&str] = &["~=", "|=", "^=", "$=", "*=", "="];
    let Some((pos, op)) = OPERATORS
        .iter()
        .filter_map(|op| content.find(op).map(|pos| (pos, *op)))
        .min_by_key(|(pos, _)| *pos)
    else {
        let name = content.trim();
        return (ident_len(name) == name.len() && !name.is_empty()).then(|| AttributeSelector {
            name: name.to_string(),
            matcher: None,
            case_insensitive,
        });
    };

    let name = content[..pos].trim();
    if name.is_empty() || ident_len(name) != name.len() {
        return None;
    }

    let raw = content[pos + op.len()..].trim();
    let value = match raw.chars().next() {
        Some(q @ ('"' | '\'')) => raw.strip_prefix(q)?.strip_suffix(q)?.to_string(),
        _ if raw.is_empty() || raw.contains(char::is_whitespace) => return None,
        _ => raw.to_string(),
    };

    let matcher = match op {
        "=" => AttributeMatcher::Exact(value),
        "~=" => AttributeMatcher::Contains(value),
        "|=" => AttributeMatcher::DashMatch(value),
        "^=" => AttributeMatcher::Prefix(value),
        "$=" => AttributeMatcher::Suffix(value),
        _ => AttributeMatcher::Substring(value),
    };

    Some(AttributeSelector {
        name: name.to_string(),
        matcher: Some(matcher),
        case_insensitive,
    })
}
