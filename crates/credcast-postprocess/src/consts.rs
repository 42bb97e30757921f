//! Markup contract shared with page templates and other tooling.

use std::sync::LazyLock;
use std::time::Duration;

use credcast_dom::Selector;

/// Class marking a code element as diagram source.
pub const DIAGRAM_LANGUAGE_CLASS: &str = "language-mermaid";

/// Block-level element wrapping diagram source code.
pub const DIAGRAM_WRAPPER_TAG: &str = "pre";

/// Element created for a converted diagram.
pub const DIAGRAM_CONTAINER_TAG: &str = "div";

/// Class of diagram containers.
pub const DIAGRAM_CONTAINER_CLASS: &str = "mermaid";

/// Class added to containers once the diagram engine rendered them.
pub const DIAGRAM_PROCESSED_CLASS: &str = "mermaid-processed";

/// Class marking a code element as annotation-language source.
pub const ANNOTATION_LANGUAGE_CLASS: &str = "language-cred";

/// Class of the span wrapping an annotation token.
pub const ANNOTATION_HIGHLIGHT_CLASS: &str = "cred-highlight";

/// Prefix every annotation token starts with.
pub const ANNOTATION_PREFIX: &str = "@cred@";

/// Delay between activation and the deferred diagram render.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Code elements carrying diagram source, wrapped or not.
pub(crate) static DIAGRAM_SOURCE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("code.language-mermaid").expect("invalid source selector"));

/// Containers the diagram engine has not rendered yet.
pub(crate) static UNPROCESSED_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".mermaid:not(.mermaid-processed)").expect("invalid container selector")
});

/// Code elements in the annotation language.
pub(crate) static ANNOTATION_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("code.language-cred").expect("invalid annotation selector"));
