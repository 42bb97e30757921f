//! Highlighter and typesetter invocation.

use crate::capability::{Capabilities, SharedTree, guarded};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Pass};

/// Result of one pass over the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The pass ran to completion.
    Completed,
    /// The pass is switched off in configuration.
    Disabled,
    /// The engine the pass needs is not available.
    CapabilityAbsent,
    /// The engine reported an error or panicked.
    Failed,
    /// The tree was already borrowed.
    TreeBusy,
}

/// Invoke the syntax highlighter over the whole tree.
pub(crate) fn run_highlighter(
    tree: &SharedTree,
    capabilities: &Capabilities,
    diagnostics: &Diagnostics,
) -> PassOutcome {
    let Some(highlighter) = capabilities.highlighter() else {
        diagnostics.report(
            Pass::Highlight,
            DiagnosticKind::CapabilityAbsent,
            "no syntax highlighter available",
        );
        return PassOutcome::CapabilityAbsent;
    };

    let Ok(mut content) = tree.try_borrow_mut() else {
        diagnostics.report(
            Pass::Highlight,
            DiagnosticKind::TreeBusy,
            "content tree is borrowed elsewhere",
        );
        return PassOutcome::TreeBusy;
    };

    match guarded(|| highlighter.highlight_all(&mut content)) {
        Ok(()) => {
            tracing::debug!("Highlighted code blocks");
            PassOutcome::Completed
        }
        Err(e) => {
            diagnostics.report(
                Pass::Highlight,
                DiagnosticKind::EngineFailure,
                format!("syntax highlighter failed: {e}"),
            );
            PassOutcome::Failed
        }
    }
}

/// Queue math typesetting for the tree.
///
/// The typesetter receives the shared handle, not a borrow, so it can run
/// the work whenever its own queue gets to it.
pub(crate) fn run_typesetter(
    tree: &SharedTree,
    capabilities: &Capabilities,
    diagnostics: &Diagnostics,
) -> PassOutcome {
    let Some(typesetter) = capabilities.typesetter() else {
        diagnostics.report(
            Pass::Typeset,
            DiagnosticKind::CapabilityAbsent,
            "no math typesetter available",
        );
        return PassOutcome::CapabilityAbsent;
    };

    match guarded(|| typesetter.enqueue_typeset(tree)) {
        Ok(()) => {
            tracing::debug!("Queued math typesetting");
            PassOutcome::Completed
        }
        Err(e) => {
            diagnostics.report(
                Pass::Typeset,
                DiagnosticKind::EngineFailure,
                format!("math typesetter failed: {e}"),
            );
            PassOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use credcast_dom::{ContentTree, Node};

    use super::*;
    use crate::capability::{EngineError, MathTypesetter, SyntaxHighlighter};

    struct ClassTagger;

    impl SyntaxHighlighter for ClassTagger {
        fn highlight_all(&self, tree: &mut ContentTree) -> Result<(), EngineError> {
            let selector = credcast_dom::Selector::parse("code").unwrap();
            for path in tree.select(&selector) {
                if let Some(node) = tree.get_mut(&path) {
                    node.add_class("hljs");
                }
            }
            Ok(())
        }
    }

    struct Broken;

    impl SyntaxHighlighter for Broken {
        fn highlight_all(&self, _tree: &mut ContentTree) -> Result<(), EngineError> {
            Err(EngineError::new("grammar not loaded"))
        }
    }

    #[derive(Default)]
    struct Queue {
        queued: Cell<usize>,
    }

    impl MathTypesetter for Queue {
        fn enqueue_typeset(&self, _tree: &SharedTree) -> Result<(), EngineError> {
            self.queued.set(self.queued.get() + 1);
            Ok(())
        }
    }

    fn shared(html: &str) -> SharedTree {
        Rc::new(RefCell::new(ContentTree::parse(html).unwrap()))
    }

    #[test]
    fn test_highlighter_mutates_tree() {
        let tree = shared("<pre><code class=\"language-rust\">fn main() {}</code></pre>");
        let capabilities = Capabilities::new().with_highlighter(Rc::new(ClassTagger));
        let diagnostics = Diagnostics::new();

        let outcome = run_highlighter(&tree, &capabilities, &diagnostics);

        assert_eq!(outcome, PassOutcome::Completed);
        assert_eq!(
            tree.borrow().to_html(),
            "<pre><code class=\"language-rust hljs\">fn main() {}</code></pre>"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_absent_highlighter_is_not_an_error() {
        let tree = shared("<p>plain</p>");
        let diagnostics = Diagnostics::new();

        let outcome = run_highlighter(&tree, &Capabilities::new(), &diagnostics);

        assert_eq!(outcome, PassOutcome::CapabilityAbsent);
        assert_eq!(diagnostics.count(DiagnosticKind::CapabilityAbsent), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::EngineFailure), 0);
    }

    #[test]
    fn test_highlighter_failure_is_reported() {
        let tree = shared("<p>plain</p>");
        let capabilities = Capabilities::new().with_highlighter(Rc::new(Broken));
        let diagnostics = Diagnostics::new();

        let outcome = run_highlighter(&tree, &capabilities, &diagnostics);

        assert_eq!(outcome, PassOutcome::Failed);
        let reported = diagnostics.snapshot();
        assert_eq!(reported[0].pass, Pass::Highlight);
        assert!(reported[0].message.contains("grammar not loaded"));
    }

    #[test]
    fn test_highlighter_reports_busy_tree() {
        let tree = Rc::new(RefCell::new(ContentTree::from_nodes(vec![Node::new("p")])));
        let capabilities = Capabilities::new().with_highlighter(Rc::new(ClassTagger));
        let diagnostics = Diagnostics::new();

        let _held = tree.borrow();
        let outcome = run_highlighter(&tree, &capabilities, &diagnostics);

        assert_eq!(outcome, PassOutcome::TreeBusy);
        assert_eq!(diagnostics.count(DiagnosticKind::TreeBusy), 1);
    }

    #[test]
    fn test_typesetter_is_queued_once() {
        let tree = shared("<p>$x^2$</p>");
        let queue = Rc::new(Queue::default());
        let capabilities = Capabilities::new().with_typesetter(Rc::clone(&queue));
        let diagnostics = Diagnostics::new();

        let outcome = run_typesetter(&tree, &capabilities, &diagnostics);

        assert_eq!(outcome, PassOutcome::Completed);
        assert_eq!(queue.queued.get(), 1);
    }

    #[test]
    fn test_absent_typesetter_is_skipped() {
        let tree = shared("<p>$x^2$</p>");
        let diagnostics = Diagnostics::new();

        let outcome = run_typesetter(&tree, &Capabilities::new(), &diagnostics);

        assert_eq!(outcome, PassOutcome::CapabilityAbsent);
        assert_eq!(diagnostics.snapshot()[0].pass, Pass::Typeset);
    }
}
