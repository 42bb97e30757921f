//! Diagnostic channel for non-fatal post-processing problems.
//!
//! Nothing the processor encounters is fatal to the page. Problems are logged
//! through `tracing` and accumulated in a [`Diagnostics`] sink that outlives the
//! synchronous pass, so failures of the deferred retry are visible too.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Post-processing pass that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Highlight,
    Typeset,
    Diagrams,
    DiagramRetry,
    Annotations,
}

impl Pass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Highlight => "highlight",
            Self::Typeset => "typeset",
            Self::Diagrams => "diagrams",
            Self::DiagramRetry => "diagram-retry",
            Self::Annotations => "annotations",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An optional engine is not available; the pass was skipped.
    CapabilityAbsent,
    /// An engine returned an error or panicked.
    EngineFailure,
    /// A block had unexpected structure and was left unchanged.
    MalformedContent,
    /// The content tree was dropped before the deferred retry fired.
    TreeGone,
    /// The content tree was borrowed elsewhere when a pass needed it.
    TreeBusy,
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub pass: Pass,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Shared, append-only diagnostic sink.
///
/// Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Rc<RefCell<Vec<Diagnostic>>>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a diagnostic.
    pub fn report(&self, pass: Pass, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            DiagnosticKind::CapabilityAbsent | DiagnosticKind::TreeGone => {
                tracing::debug!(%pass, ?kind, "{message}");
            }
            DiagnosticKind::EngineFailure
            | DiagnosticKind::MalformedContent
            | DiagnosticKind::TreeBusy => {
                tracing::warn!(%pass, ?kind, "{message}");
            }
        }
        self.entries.borrow_mut().push(Diagnostic {
            pass,
            kind,
            message,
        });
    }

    /// Copy of all diagnostics recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Number of diagnostics of `kind`.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.borrow().iter().filter(|d| d.kind == kind).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
