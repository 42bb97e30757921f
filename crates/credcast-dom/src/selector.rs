//! A small CSS selector subset for querying content trees.
//!
//! Supported syntax:
//! - type selectors (`pre`, `code`) and the universal selector `*`
//! - class selectors (`.mermaid`)
//! - negated classes (`:not(.mermaid-processed)`)
//! - descendant (`a b`) and child (`a > b`) combinators

use std::fmt;
use std::str::FromStr;

use crate::error::DomError;
use crate::node::Node;

/// Relationship between two compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Conditions on a single element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    excluded: Vec<String>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag
            && !node.tag.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        self.classes.iter().all(|c| node.has_class(c))
            && !self.excluded.iter().any(|c| node.has_class(c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// Combinator linking this step to the previous one (`None` for the first).
    combinator: Option<Combinator>,
    compound: Compound,
}

/// Parsed selector.
///
/// # Example
///
/// ```
/// use credcast_dom::Selector;
///
/// let selector = Selector::parse(".mermaid:not(.mermaid-processed)").unwrap();
/// assert_eq!(selector.to_string(), ".mermaid:not(.mermaid-processed)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    steps: Vec<Step>,
}

impl Selector {
    /// Parse a selector string.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Selector`] for empty input or unsupported syntax.
    pub fn parse(source: &str) -> Result<Self, DomError> {
        let fail = |reason: &str| DomError::Selector {
            selector: source.to_owned(),
            reason: reason.to_owned(),
        };

        let mut steps: Vec<Step> = Vec::new();
        let mut pending: Option<Combinator> = None;
        let mut rest = source.trim();

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('>') {
                if steps.is_empty() || pending == Some(Combinator::Child) {
                    return Err(fail("unexpected '>'"));
                }
                pending = Some(Combinator::Child);
                rest = after.trim_start();
                continue;
            }
            if rest.starts_with(char::is_whitespace) {
                if pending.is_none() {
                    pending = Some(Combinator::Descendant);
                }
                rest = rest.trim_start();
                continue;
            }

            let (compound, after) = parse_compound(rest).map_err(|reason| fail(&reason))?;
            let combinator = if steps.is_empty() { None } else { pending.take() };
            if !steps.is_empty() && combinator.is_none() {
                return Err(fail("missing combinator"));
            }
            steps.push(Step {
                combinator,
                compound,
            });
            pending = None;
            rest = after;
        }

        if steps.is_empty() {
            return Err(fail("empty selector"));
        }
        if pending == Some(Combinator::Child) {
            return Err(fail("dangling '>'"));
        }

        Ok(Self {
            source: source.trim().to_owned(),
            steps,
        })
    }

    /// Whether `node` matches, given its ancestors ordered outermost first.
    ///
    /// The synthetic tree root should not be part of `ancestors`.
    #[must_use]
    pub fn matches(&self, node: &Node, ancestors: &[&Node]) -> bool {
        self.matches_step(self.steps.len() - 1, node, ancestors)
    }

    fn matches_step(&self, index: usize, node: &Node, ancestors: &[&Node]) -> bool {
        let step = &self.steps[index];
        if !step.compound.matches(node) {
            return false;
        }
        match step.combinator {
            None => true,
            Some(Combinator::Child) => ancestors
                .split_last()
                .is_some_and(|(parent, rest)| self.matches_step(index - 1, parent, rest)),
            Some(Combinator::Descendant) => (0..ancestors.len())
                .rev()
                .any(|i| self.matches_step(index - 1, ancestors[i], &ancestors[..i])),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse one compound selector from the front of `input`.
fn parse_compound(input: &str) -> Result<(Compound, &str), String> {
    let mut compound = Compound::default();
    let mut rest = input;

    if let Some(after) = rest.strip_prefix('*') {
        rest = after;
    } else {
        let (name, after) = take_ident(rest);
        if !name.is_empty() {
            compound.tag = Some(name.to_ascii_lowercase());
            rest = after;
        }
    }

    loop {
        if let Some(after) = rest.strip_prefix('.') {
            let (class, after) = take_ident(after);
            if class.is_empty() {
                return Err("expected class name after '.'".to_owned());
            }
            compound.classes.push(class.to_owned());
            rest = after;
        } else if let Some(after) = rest.strip_prefix(":not(") {
            let after = after.trim_start();
            let Some(after) = after.strip_prefix('.') else {
                return Err(":not() only supports a class selector".to_owned());
            };
            let (class, after) = take_ident(after);
            let Some(after) = after.trim_start().strip_prefix(')') else {
                return Err("unclosed :not(".to_owned());
            };
            if class.is_empty() {
                return Err("expected class name in :not()".to_owned());
            }
            compound.excluded.push(class.to_owned());
            rest = after;
        } else {
            break;
        }
    }

    if rest.len() == input.len() {
        let found = rest.chars().next().unwrap_or(' ');
        return Err(format!("unexpected character '{found}'"));
    }
    Ok((compound, rest))
}

/// Split a leading identifier (`[A-Za-z0-9_-]`) from `input`.
fn take_ident(input: &str) -> (&str, &str) {
    let end = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(input.len());
    input.split_at(end)
}
