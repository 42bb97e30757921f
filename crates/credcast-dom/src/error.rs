//! Error types for content tree operations.

/// Error while parsing markup or addressing nodes in a [`ContentTree`](crate::ContentTree).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DomError {
    /// XML parsing error.
    #[error("markup parse error: {0}")]
    Parse(#[from] quick_xml::Error),

    /// Encoding error while decoding markup.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Selector string could not be parsed.
    #[error("invalid selector '{selector}': {reason}")]
    Selector {
        /// Selector as written.
        selector: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Path does not address a node in the tree.
    #[error("no node at path {0}")]
    InvalidPath(String),

    /// The root node cannot be replaced or removed.
    #[error("the root node cannot be replaced")]
    RootReplacement,
}
