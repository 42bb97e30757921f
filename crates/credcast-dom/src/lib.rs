//! Content tree for credcast page post-processing.
//!
//! Rendered page markup is parsed into an owned [`ContentTree`] of [`Node`]s,
//! queried with a small [`Selector`] subset, mutated in place, and serialized
//! back to markup.
//!
//! # Example
//!
//! ```
//! use credcast_dom::{ContentTree, Node, Selector};
//!
//! let mut tree = ContentTree::parse(
//!     r#"<pre><code class="language-mermaid">graph TD</code></pre>"#,
//! ).unwrap();
//!
//! let selector = Selector::parse("pre > code.language-mermaid").unwrap();
//! let code = tree.select(&selector).remove(0);
//! let source = tree.get(&code).unwrap().text_content();
//!
//! let pre = code.parent().unwrap();
//! tree.replace(&pre, Node::new("div").with_class("mermaid").with_text(source)).unwrap();
//! assert_eq!(tree.to_html(), r#"<div class="mermaid">graph TD</div>"#);
//! ```

mod entities;
mod error;
mod node;
mod parser;
mod selector;
mod serializer;
mod tree;

pub use error::DomError;
pub use node::{Node, is_void_element};
pub use parser::{ROOT_TAG, parse_fragment};
pub use selector::Selector;
pub use serializer::inner_html;
pub use tree::{ContentTree, NodePath};
