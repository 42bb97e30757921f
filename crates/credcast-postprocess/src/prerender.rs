//! Diagram conversion on serialized HTML.
//!
//! For pipelines that rewrite rendered pages before they reach a browser:
//! the diagram engine then finds ready containers without any tree pass.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static FENCED_DIAGRAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<pre[^>]*>\s*<code class="(?:[^"]*\s)?language-mermaid(?:\s[^"]*)?"[^>]*>(.*?)</code>\s*</pre>"#,
    )
    .expect("invalid fenced diagram regex")
});

/// Replace `<pre><code class="language-mermaid">…</code></pre>` blocks with
/// `<div class="mermaid">…</div>`.
///
/// The code content is moved over as-is, entities included. Returns the input
/// borrowed when there is nothing to convert.
#[must_use]
pub fn convert_diagram_markup(html: &str) -> Cow<'_, str> {
    let converted = FENCED_DIAGRAM_RE.replace_all(html, r#"<div class="mermaid">$1</div>"#);
    if let Cow::Owned(_) = &converted {
        tracing::debug!("Converted fenced diagram markup");
    }
    converted
}
