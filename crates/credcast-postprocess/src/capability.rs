//! External engines the post-processor drives.
//!
//! Each engine is optional. The processor checks presence once per activation
//! and treats absence as a skipped pass, never as an error.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use credcast_config::DiagramsConfig;
use credcast_dom::{ContentTree, Selector};

/// Content tree shared between the host page, engines and the deferred retry.
pub type SharedTree = Rc<RefCell<ContentTree>>;

/// Failure reported by an external engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Create an error with the engine's message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The engine's message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Syntax highlighting engine.
pub trait SyntaxHighlighter {
    /// Highlight every code block in the tree.
    fn highlight_all(&self, tree: &mut ContentTree) -> Result<(), EngineError>;
}

/// Math typesetting engine with its own work queue.
pub trait MathTypesetter {
    /// Queue a typeset pass over the tree.
    ///
    /// The engine may keep the handle and run the work later.
    fn enqueue_typeset(&self, tree: &SharedTree) -> Result<(), EngineError>;
}

/// Diagram rendering engine.
pub trait DiagramEngine {
    /// Apply engine options. Called once per activation before rendering.
    fn configure(&self, config: &DiagramsConfig) -> Result<(), EngineError>;

    /// Render every element matching `targets`.
    ///
    /// Must tolerate a selector that matches nothing.
    fn render(&self, tree: &mut ContentTree, targets: &Selector) -> Result<(), EngineError>;
}

/// The set of engines available to one activation.
///
/// # Example
///
/// ```ignore
/// let capabilities = Capabilities::new()
///     .with_highlighter(Rc::new(MyHighlighter))
///     .with_diagram_engine(Rc::new(MyDiagrams::default()));
/// ```
#[derive(Clone, Default)]
pub struct Capabilities {
    highlighter: Option<Rc<dyn SyntaxHighlighter>>,
    typesetter: Option<Rc<dyn MathTypesetter>>,
    diagram_engine: Option<Rc<dyn DiagramEngine>>,
}

impl Capabilities {
    /// No engines available.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide a syntax highlighter.
    #[must_use]
    pub fn with_highlighter<H: SyntaxHighlighter + 'static>(mut self, highlighter: Rc<H>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Provide a math typesetter.
    #[must_use]
    pub fn with_typesetter<T: MathTypesetter + 'static>(mut self, typesetter: Rc<T>) -> Self {
        self.typesetter = Some(typesetter);
        self
    }

    /// Provide a diagram engine.
    #[must_use]
    pub fn with_diagram_engine<D: DiagramEngine + 'static>(mut self, engine: Rc<D>) -> Self {
        self.diagram_engine = Some(engine);
        self
    }

    /// The syntax highlighter, if present.
    #[must_use]
    pub fn highlighter(&self) -> Option<&dyn SyntaxHighlighter> {
        self.highlighter.as_deref()
    }

    /// The math typesetter, if present.
    #[must_use]
    pub fn typesetter(&self) -> Option<&dyn MathTypesetter> {
        self.typesetter.as_deref()
    }

    /// The diagram engine, if present.
    #[must_use]
    pub fn diagram_engine(&self) -> Option<Rc<dyn DiagramEngine>> {
        self.diagram_engine.clone()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("highlighter", &self.highlighter.is_some())
            .field("typesetter", &self.typesetter.is_some())
            .field("diagram_engine", &self.diagram_engine.is_some())
            .finish()
    }
}

/// Run an engine call, turning a panic into an [`EngineError`].
pub(crate) fn guarded<F>(call: F) -> Result<(), EngineError>
where
    F: FnOnce() -> Result<(), EngineError>,
{
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|payload| {
        Err(EngineError::new(format!(
            "engine panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}
