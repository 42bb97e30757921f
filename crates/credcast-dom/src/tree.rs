//! Mutable content tree with path-based addressing.

use std::fmt;

use crate::error::DomError;
use crate::node::Node;
use crate::parser::{ROOT_TAG, parse_fragment};
use crate::selector::Selector;
use crate::serializer::inner_html;

/// Position of a node as child indices from the tree root.
///
/// The empty path addresses the synthetic root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the synthetic root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the `index`-th child of this node.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    /// Whether this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// Rendered page content as an owned, mutable tree.
///
/// The root is a synthetic wrapper; its content is the page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTree {
    root: Node,
}

impl Default for ContentTree {
    fn default() -> Self {
        Self {
            root: Node::new(ROOT_TAG),
        }
    }
}

impl ContentTree {
    /// Parse page markup into a tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be parsed.
    pub fn parse(html: &str) -> Result<Self, DomError> {
        Ok(Self {
            root: parse_fragment(html)?,
        })
    }

    /// Build a tree from top-level elements.
    #[must_use]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            root: Node::new(ROOT_TAG).with_children(nodes),
        }
    }

    /// The synthetic root.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Serialize the page content.
    #[must_use]
    pub fn to_html(&self) -> String {
        inner_html(&self.root)
    }

    /// Node at `path`.
    #[must_use]
    pub fn get(&self, path: &NodePath) -> Option<&Node> {
        path.0
            .iter()
            .try_fold(&self.root, |node, &index| node.children.get(index))
    }

    /// Mutable node at `path`.
    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        path.0
            .iter()
            .try_fold(&mut self.root, |node, &index| node.children.get_mut(index))
    }

    /// Paths of all elements matching `selector`, in document order.
    #[must_use]
    pub fn select(&self, selector: &Selector) -> Vec<NodePath> {
        let mut found = Vec::new();
        let mut ancestors = Vec::new();
        let mut indices = Vec::new();
        collect_matches(&self.root, selector, &mut ancestors, &mut indices, &mut found);
        found
    }

    /// Number of elements matching `selector`.
    #[must_use]
    pub fn count(&self, selector: &Selector) -> usize {
        self.select(selector).len()
    }

    /// Replace the node at `path`, returning the old node.
    ///
    /// The replacement inherits the old node's tail so surrounding text stays
    /// in place.
    ///
    /// # Errors
    ///
    /// Returns an error for the root path or a path that addresses nothing.
    pub fn replace(&mut self, path: &NodePath, mut node: Node) -> Result<Node, DomError> {
        let (&index, _) = path.0.split_last().ok_or(DomError::RootReplacement)?;
        let parent_path = path.parent().ok_or(DomError::RootReplacement)?;
        let parent = self
            .get_mut(&parent_path)
            .ok_or_else(|| DomError::InvalidPath(path.to_string()))?;
        let slot = parent
            .children
            .get_mut(index)
            .ok_or_else(|| DomError::InvalidPath(path.to_string()))?;

        node.tail = std::mem::take(&mut slot.tail);
        Ok(std::mem::replace(slot, node))
    }

    /// Append `node` as the last child of the node at `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` addresses nothing.
    pub fn append_child(&mut self, parent: &NodePath, node: Node) -> Result<NodePath, DomError> {
        let target = self
            .get_mut(parent)
            .ok_or_else(|| DomError::InvalidPath(parent.to_string()))?;
        target.children.push(node);
        Ok(parent.child(target.children.len() - 1))
    }

    /// Serialized content of the node at `path`.
    #[must_use]
    pub fn inner_html(&self, path: &NodePath) -> Option<String> {
        self.get(path).map(inner_html)
    }

    /// Replace the content of the node at `path` with parsed markup.
    ///
    /// The node keeps its tag, attributes and tail. On a parse error the node
    /// is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` addresses nothing or the markup cannot be parsed.
    pub fn set_inner_html(&mut self, path: &NodePath, html: &str) -> Result<(), DomError> {
        let parsed = parse_fragment(html)?;
        let target = self
            .get_mut(path)
            .ok_or_else(|| DomError::InvalidPath(path.to_string()))?;
        target.text = parsed.text;
        target.children = parsed.children;
        Ok(())
    }
}

fn collect_matches<'a>(
    node: &'a Node,
    selector: &Selector,
    ancestors: &mut Vec<&'a Node>,
    indices: &mut Vec<usize>,
    found: &mut Vec<NodePath>,
) {
    for (index, child) in node.children.iter().enumerate() {
        indices.push(index);
        if selector.matches(child, ancestors) {
            found.push(NodePath(indices.clone()));
        }
        ancestors.push(child);
        collect_matches(child, selector, ancestors, indices, found);
        ancestors.pop();
        indices.pop();
    }
}
