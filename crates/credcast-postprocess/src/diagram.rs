//! Diagram normalization and rendering.
//!
//! Fenced diagram blocks arrive as `<pre><code class="language-mermaid">`. The
//! diagram engine wants `<div class="mermaid">` containers holding the raw
//! source, so blocks are converted first and then handed to the engine. A
//! container the engine has rendered carries `mermaid-processed` and is never
//! selected again.

use credcast_config::DiagramsConfig;
use credcast_dom::{ContentTree, Node};

use crate::capability::{DiagramEngine, guarded};
use crate::consts::{
    DIAGRAM_CONTAINER_CLASS, DIAGRAM_CONTAINER_TAG, DIAGRAM_LANGUAGE_CLASS,
    DIAGRAM_PROCESSED_CLASS, DIAGRAM_SOURCE, DIAGRAM_WRAPPER_TAG, UNPROCESSED_CONTAINERS,
};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Pass};

/// Lifecycle position of a diagram element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramState {
    /// Fenced source code, not yet converted.
    Source,
    /// Container waiting for the engine.
    Unprocessed,
    /// Container the engine has rendered.
    Processed,
}

impl DiagramState {
    /// State of `node`, or `None` if it is not a diagram element.
    #[must_use]
    pub fn of(node: &Node) -> Option<Self> {
        if node.tag.eq_ignore_ascii_case("code") && node.has_class(DIAGRAM_LANGUAGE_CLASS) {
            Some(Self::Source)
        } else if node.has_class(DIAGRAM_CONTAINER_CLASS) {
            if node.has_class(DIAGRAM_PROCESSED_CLASS) {
                Some(Self::Processed)
            } else {
                Some(Self::Unprocessed)
            }
        } else {
            None
        }
    }
}

/// Counts from one conversion sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Source blocks replaced by containers.
    pub converted: usize,
    /// Source elements left alone.
    pub skipped: usize,
}

/// Result of one render invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The engine succeeded and `marked` containers became processed.
    Rendered { marked: usize },
    /// The engine failed; nothing was marked.
    Failed,
}

/// Diagram elements on a page, by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagramCensus {
    pub sources: usize,
    pub unprocessed: usize,
    pub processed: usize,
}

/// Count diagram elements in `tree` by state.
#[must_use]
pub fn census(tree: &ContentTree) -> DiagramCensus {
    let mut counts = DiagramCensus::default();
    tally(tree.root(), &mut counts);
    counts
}

fn tally(node: &Node, counts: &mut DiagramCensus) {
    for child in &node.children {
        match DiagramState::of(child) {
            Some(DiagramState::Source) => counts.sources += 1,
            Some(DiagramState::Unprocessed) => counts.unprocessed += 1,
            Some(DiagramState::Processed) => counts.processed += 1,
            None => {}
        }
        tally(child, counts);
    }
}

/// Replace every `pre > code.language-mermaid` block with a container.
///
/// The container receives the code's text content unchanged and takes the
/// wrapper's place, keeping the text that followed it.
pub fn convert_sources(tree: &mut ContentTree, diagnostics: &Diagnostics) -> ConversionSummary {
    let mut summary = ConversionSummary::default();

    for path in tree.select(&DIAGRAM_SOURCE) {
        // An earlier conversion in the same wrapper removed this element.
        let Some(code) = tree.get(&path) else {
            diagnostics.report(
                Pass::Diagrams,
                DiagnosticKind::MalformedContent,
                format!("diagram source at {path} was replaced by an earlier block"),
            );
            summary.skipped += 1;
            continue;
        };
        let source = code.text_content();

        let wrapper_path = path.parent().filter(|parent| {
            !parent.is_root()
                && tree
                    .get(parent)
                    .is_some_and(|wrapper| wrapper.tag.eq_ignore_ascii_case(DIAGRAM_WRAPPER_TAG))
        });
        let Some(wrapper_path) = wrapper_path else {
            diagnostics.report(
                Pass::Diagrams,
                DiagnosticKind::MalformedContent,
                format!("diagram source at {path} has no <pre> wrapper"),
            );
            summary.skipped += 1;
            continue;
        };

        let container = Node::new(DIAGRAM_CONTAINER_TAG)
            .with_class(DIAGRAM_CONTAINER_CLASS)
            .with_text(source);
        match tree.replace(&wrapper_path, container) {
            Ok(_) => summary.converted += 1,
            Err(e) => {
                diagnostics.report(
                    Pass::Diagrams,
                    DiagnosticKind::MalformedContent,
                    format!("failed to convert diagram at {wrapper_path}: {e}"),
                );
                summary.skipped += 1;
            }
        }
    }

    if summary.converted > 0 {
        tracing::info!(converted = summary.converted, "Converted diagram blocks");
    }
    summary
}

/// Apply diagram options to the engine.
///
/// Returns `false` if the engine rejected them; rendering still proceeds.
pub(crate) fn configure_engine(
    engine: &dyn DiagramEngine,
    config: &DiagramsConfig,
    diagnostics: &Diagnostics,
) -> bool {
    match guarded(|| engine.configure(config)) {
        Ok(()) => true,
        Err(e) => {
            diagnostics.report(
                Pass::Diagrams,
                DiagnosticKind::EngineFailure,
                format!("diagram engine rejected configuration: {e}"),
            );
            false
        }
    }
}

/// Render all unprocessed containers and mark them processed.
///
/// The engine is invoked even when nothing is pending.
pub fn render_pending(
    tree: &mut ContentTree,
    engine: &dyn DiagramEngine,
    pass: Pass,
    diagnostics: &Diagnostics,
) -> RenderOutcome {
    match guarded(|| engine.render(tree, &UNPROCESSED_CONTAINERS)) {
        Ok(()) => {
            let marked = mark_processed(tree);
            tracing::debug!(%pass, marked, "Rendered diagrams");
            RenderOutcome::Rendered { marked }
        }
        Err(e) => {
            diagnostics.report(
                pass,
                DiagnosticKind::EngineFailure,
                format!("diagram engine failed to render: {e}"),
            );
            RenderOutcome::Failed
        }
    }
}

fn mark_processed(tree: &mut ContentTree) -> usize {
    let mut marked = 0;
    for path in tree.select(&UNPROCESSED_CONTAINERS) {
        if let Some(container) = tree.get_mut(&path) {
            container.add_class(DIAGRAM_PROCESSED_CLASS);
            marked += 1;
        }
    }
    marked
}
