//! Post-processing of rendered documentation pages.
//!
//! After a page's content is in place, [`PostProcessor::activate`] runs four
//! passes over the shared [`ContentTree`](credcast_dom::ContentTree):
//!
//! 1. Syntax highlighting through an optional [`SyntaxHighlighter`].
//! 2. Math typesetting queued on an optional [`MathTypesetter`].
//! 3. Diagram normalization: `<pre><code class="language-mermaid">` blocks become
//!    `<div class="mermaid">` containers, which an optional [`DiagramEngine`]
//!    renders. One deferred render is scheduled to catch late containers.
//! 4. Annotation highlighting: `@cred@…` tokens inside `code.language-cred` are
//!    wrapped in `<span class="cred-highlight">`.
//!
//! Missing engines skip their pass. Engine errors and panics are caught and
//! reported through [`Diagnostics`]; activation itself never fails.
//!
//! [`convert_diagram_markup`] performs the diagram conversion on serialized
//! HTML for build-time pipelines.

mod annotation;
mod capability;
mod consts;
mod diagnostics;
mod diagram;
mod engines;
mod prerender;
mod processor;
mod schedule;

pub use annotation::{annotate_tree, highlight_annotations};
pub use capability::{
    Capabilities, DiagramEngine, EngineError, MathTypesetter, SharedTree, SyntaxHighlighter,
};
pub use consts::{
    ANNOTATION_HIGHLIGHT_CLASS, ANNOTATION_LANGUAGE_CLASS, ANNOTATION_PREFIX,
    DEFAULT_RETRY_DELAY, DIAGRAM_CONTAINER_CLASS, DIAGRAM_CONTAINER_TAG, DIAGRAM_LANGUAGE_CLASS,
    DIAGRAM_PROCESSED_CLASS, DIAGRAM_WRAPPER_TAG,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Pass};
pub use diagram::{
    ConversionSummary, DiagramCensus, DiagramState, RenderOutcome, census, convert_sources,
    render_pending,
};
pub use engines::PassOutcome;
pub use prerender::convert_diagram_markup;
pub use processor::{
    ActivationReport, DiagramReport, PostProcessor, ProcessorConfig, RetryHandle, RetryOutcome,
};
pub use schedule::{DeferredTask, ManualScheduler, Scheduler, TokioScheduler};
