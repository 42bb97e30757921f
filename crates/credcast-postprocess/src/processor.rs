//! Post-processor entry point.
//!
//! One activation per page load runs four passes over the shared tree:
//! syntax highlighting, math typesetting, diagram conversion and rendering,
//! and annotation highlighting. A single deferred diagram render is then left
//! on the scheduler to pick up containers the first render missed.

use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::time::Duration;

use credcast_config::{Config, DiagramsConfig, PassesConfig};
use credcast_dom::ContentTree;

use crate::annotation::annotate_tree;
use crate::capability::{Capabilities, DiagramEngine, SharedTree};
use crate::consts::DEFAULT_RETRY_DELAY;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Pass};
use crate::diagram::{
    ConversionSummary, RenderOutcome, configure_engine, convert_sources, render_pending,
};
use crate::engines::{PassOutcome, run_highlighter, run_typesetter};
use crate::schedule::Scheduler;

/// Settings for a [`PostProcessor`].
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Options handed to the diagram engine before rendering.
    pub diagrams: DiagramsConfig,
    /// Delay of the deferred diagram render, `None` to skip it.
    pub retry_delay: Option<Duration>,
    /// Per-pass switches.
    pub passes: PassesConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            diagrams: DiagramsConfig::default(),
            retry_delay: Some(DEFAULT_RETRY_DELAY),
            passes: PassesConfig::default(),
        }
    }
}

impl From<&Config> for ProcessorConfig {
    fn from(config: &Config) -> Self {
        Self {
            diagrams: config.diagrams.clone(),
            retry_delay: config.retry.enabled.then(|| config.retry.delay()),
            passes: config.passes,
        }
    }
}

/// What the diagram pass did during activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramReport {
    pub outcome: PassOutcome,
    pub conversion: ConversionSummary,
    /// Result of the immediate render, if the engine was invoked.
    pub render: Option<RenderOutcome>,
}

impl DiagramReport {
    fn skipped(outcome: PassOutcome) -> Self {
        Self {
            outcome,
            conversion: ConversionSummary::default(),
            render: None,
        }
    }
}

/// Result of the deferred diagram render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The engine was invoked.
    Render(RenderOutcome),
    /// The page was torn down first.
    TreeGone,
    /// The tree was borrowed when the retry fired.
    TreeBusy,
}

/// Observer for the scheduled retry.
///
/// The retry cannot be cancelled; the handle only reports what happened.
#[derive(Debug, Clone)]
pub struct RetryHandle {
    delay: Duration,
    outcome: Rc<RefCell<Option<RetryOutcome>>>,
}

impl RetryHandle {
    /// Delay the retry was scheduled with.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Outcome, once the retry has fired.
    #[must_use]
    pub fn outcome(&self) -> Option<RetryOutcome> {
        *self.outcome.borrow()
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.outcome.borrow().is_some()
    }
}

/// Per-pass results of one activation.
#[derive(Debug, Clone)]
pub struct ActivationReport {
    pub highlight: PassOutcome,
    pub typeset: PassOutcome,
    pub diagrams: DiagramReport,
    pub annotations: PassOutcome,
    /// Annotation blocks whose content changed.
    pub annotated: usize,
    /// The scheduled diagram retry, if any.
    pub retry: Option<RetryHandle>,
}

/// Runs the post-processing passes over rendered page content.
///
/// # Example
///
/// ```ignore
/// let tree = Rc::new(RefCell::new(ContentTree::parse(&html)?));
/// let processor = PostProcessor::new(ProcessorConfig::from(&config));
/// let report = processor.activate(&tree, &capabilities, &TokioScheduler);
/// ```
#[derive(Debug, Default)]
pub struct PostProcessor {
    config: ProcessorConfig,
    diagnostics: Diagnostics,
}

impl PostProcessor {
    #[must_use]
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            diagnostics: Diagnostics::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Everything reported so far, including by deferred retries.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Wait for `ready`, then activate.
    pub async fn activate_when_ready<F>(
        &self,
        ready: F,
        tree: &SharedTree,
        capabilities: &Capabilities,
        scheduler: &dyn Scheduler,
    ) -> ActivationReport
    where
        F: Future<Output = ()>,
    {
        ready.await;
        self.activate(tree, capabilities, scheduler)
    }

    /// Run all passes over `tree`.
    ///
    /// Never fails: problems are recorded in [`diagnostics`](Self::diagnostics)
    /// and reflected in the returned report.
    ///
    /// # Panics
    ///
    /// Scheduling the diagram retry on a [`TokioScheduler`](crate::TokioScheduler)
    /// panics outside a [`tokio::task::LocalSet`]. Other schedulers impose no
    /// such requirement.
    pub fn activate(
        &self,
        tree: &SharedTree,
        capabilities: &Capabilities,
        scheduler: &dyn Scheduler,
    ) -> ActivationReport {
        let passes = self.config.passes;
        tracing::debug!(?capabilities, "Activating post-processor");

        let highlight = if passes.highlight {
            run_highlighter(tree, capabilities, &self.diagnostics)
        } else {
            PassOutcome::Disabled
        };

        let typeset = if passes.typeset {
            run_typesetter(tree, capabilities, &self.diagnostics)
        } else {
            PassOutcome::Disabled
        };

        let (diagrams, retry) = if passes.diagrams {
            self.run_diagrams(tree, capabilities, scheduler)
        } else {
            (DiagramReport::skipped(PassOutcome::Disabled), None)
        };

        let (annotations, annotated) = if passes.annotations {
            self.run_annotations(tree)
        } else {
            (PassOutcome::Disabled, 0)
        };

        tracing::info!(
            converted = diagrams.conversion.converted,
            annotated,
            diagnostics = self.diagnostics.len(),
            "Post-processing complete"
        );

        ActivationReport {
            highlight,
            typeset,
            diagrams,
            annotations,
            annotated,
            retry,
        }
    }

    fn run_diagrams(
        &self,
        tree: &SharedTree,
        capabilities: &Capabilities,
        scheduler: &dyn Scheduler,
    ) -> (DiagramReport, Option<RetryHandle>) {
        let Ok(mut content) = tree.try_borrow_mut() else {
            self.diagnostics.report(
                Pass::Diagrams,
                DiagnosticKind::TreeBusy,
                "content tree is borrowed elsewhere",
            );
            return (DiagramReport::skipped(PassOutcome::TreeBusy), None);
        };

        let conversion = convert_sources(&mut content, &self.diagnostics);

        let Some(engine) = capabilities.diagram_engine() else {
            self.diagnostics.report(
                Pass::Diagrams,
                DiagnosticKind::CapabilityAbsent,
                "no diagram engine available",
            );
            let report = DiagramReport {
                outcome: PassOutcome::CapabilityAbsent,
                conversion,
                render: None,
            };
            return (report, None);
        };

        configure_engine(engine.as_ref(), &self.config.diagrams, &self.diagnostics);
        let render = render_pending(&mut content, engine.as_ref(), Pass::Diagrams, &self.diagnostics);
        drop(content);

        let outcome = match render {
            RenderOutcome::Rendered { .. } => PassOutcome::Completed,
            RenderOutcome::Failed => PassOutcome::Failed,
        };
        let retry = self
            .config
            .retry_delay
            .map(|delay| self.schedule_retry(tree, engine, delay, scheduler));

        let report = DiagramReport {
            outcome,
            conversion,
            render: Some(render),
        };
        (report, retry)
    }

    fn schedule_retry(
        &self,
        tree: &SharedTree,
        engine: Rc<dyn DiagramEngine>,
        delay: Duration,
        scheduler: &dyn Scheduler,
    ) -> RetryHandle {
        let outcome = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&outcome);
        let tree = Rc::downgrade(tree);
        let diagnostics = self.diagnostics.clone();

        scheduler.schedule(
            delay,
            Box::new(move || {
                let result = retry_render(&tree, engine.as_ref(), &diagnostics);
                *slot.borrow_mut() = Some(result);
            }),
        );
        tracing::debug!(delay_ms = delay.as_millis(), "Scheduled diagram retry");

        RetryHandle { delay, outcome }
    }

    fn run_annotations(&self, tree: &SharedTree) -> (PassOutcome, usize) {
        let Ok(mut content) = tree.try_borrow_mut() else {
            self.diagnostics.report(
                Pass::Annotations,
                DiagnosticKind::TreeBusy,
                "content tree is borrowed elsewhere",
            );
            return (PassOutcome::TreeBusy, 0);
        };
        let annotated = annotate_tree(&mut content, &self.diagnostics);
        (PassOutcome::Completed, annotated)
    }
}

fn retry_render(
    tree: &Weak<RefCell<ContentTree>>,
    engine: &dyn DiagramEngine,
    diagnostics: &Diagnostics,
) -> RetryOutcome {
    let Some(tree) = tree.upgrade() else {
        diagnostics.report(
            Pass::DiagramRetry,
            DiagnosticKind::TreeGone,
            "content tree dropped before diagram retry",
        );
        return RetryOutcome::TreeGone;
    };
    let Ok(mut content) = tree.try_borrow_mut() else {
        diagnostics.report(
            Pass::DiagramRetry,
            DiagnosticKind::TreeBusy,
            "content tree is borrowed elsewhere",
        );
        return RetryOutcome::TreeBusy;
    };
    RetryOutcome::Render(render_pending(
        &mut content,
        engine,
        Pass::DiagramRetry,
        diagnostics,
    ))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use credcast_dom::{Node, Selector};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::capability::{EngineError, MathTypesetter, SyntaxHighlighter};
    use crate::diagram::{DiagramCensus, census};
    use crate::schedule::{ManualScheduler, TokioScheduler};

    type Log = Rc<RefCell<Vec<String>>>;

    struct Highlighter {
        log: Log,
    }

    impl SyntaxHighlighter for Highlighter {
        fn highlight_all(&self, tree: &mut ContentTree) -> Result<(), EngineError> {
            self.log.borrow_mut().push("highlight".to_owned());
            let code = Selector::parse("pre > code").unwrap();
            for path in tree.select(&code) {
                if let Some(node) = tree.get_mut(&path) {
                    node.add_class("hljs");
                }
            }
            Ok(())
        }
    }

    struct Typesetter {
        log: Log,
    }

    impl MathTypesetter for Typesetter {
        fn enqueue_typeset(&self, _tree: &SharedTree) -> Result<(), EngineError> {
            self.log.borrow_mut().push("typeset".to_owned());
            Ok(())
        }
    }

    /// Replaces each target's content with an `<svg>`.
    struct Diagrams {
        log: Log,
        failures_left: Cell<usize>,
    }

    impl DiagramEngine for Diagrams {
        fn configure(&self, config: &DiagramsConfig) -> Result<(), EngineError> {
            self.log
                .borrow_mut()
                .push(format!("configure {}", config.to_json()["theme"]));
            Ok(())
        }

        fn render(&self, tree: &mut ContentTree, targets: &Selector) -> Result<(), EngineError> {
            let paths = tree.select(targets);
            self.log
                .borrow_mut()
                .push(format!("render {}", paths.len()));
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(EngineError::new("Syntax error in graph"));
            }
            for path in paths {
                if let Some(container) = tree.get_mut(&path) {
                    container.set_text_content("");
                    container.children.push(Node::new("svg"));
                }
            }
            Ok(())
        }
    }

    struct Fixture {
        log: Log,
        capabilities: Capabilities,
    }

    fn fixture(render_failures: usize) -> Fixture {
        let log: Log = Rc::default();
        let capabilities = Capabilities::new()
            .with_highlighter(Rc::new(Highlighter {
                log: Rc::clone(&log),
            }))
            .with_typesetter(Rc::new(Typesetter {
                log: Rc::clone(&log),
            }))
            .with_diagram_engine(Rc::new(Diagrams {
                log: Rc::clone(&log),
                failures_left: Cell::new(render_failures),
            }));
        Fixture { log, capabilities }
    }

    fn shared(html: &str) -> SharedTree {
        Rc::new(RefCell::new(ContentTree::parse(html).unwrap()))
    }

    const PAGE: &str = concat!(
        "<h1>Deploy</h1>\n",
        "<pre><code class=\"language-mermaid\">graph TD\n  A --&gt; B</code></pre>\n",
        "<pre><code class=\"language-cred\">grant @cred@team-42 deploy</code></pre>\n",
        "<pre><code class=\"language-mermaid\">pie\n  \"a\" : 1</code></pre>\n"
    );

    #[test]
    fn test_passes_run_in_order() {
        let Fixture { log, capabilities } = fixture(0);
        let tree = shared(PAGE);
        let scheduler = ManualScheduler::new();
        let processor = PostProcessor::default();

        let report = processor.activate(&tree, &capabilities, &scheduler);

        assert_eq!(
            *log.borrow(),
            vec!["highlight", "typeset", "configure \"dark\"", "render 2"]
        );
        assert_eq!(report.highlight, PassOutcome::Completed);
        assert_eq!(report.typeset, PassOutcome::Completed);
        assert_eq!(report.diagrams.outcome, PassOutcome::Completed);
        assert_eq!(report.diagrams.conversion.converted, 2);
        assert_eq!(
            report.diagrams.render,
            Some(RenderOutcome::Rendered { marked: 2 })
        );
        assert_eq!(report.annotations, PassOutcome::Completed);
        assert_eq!(report.annotated, 1);
        assert!(processor.diagnostics().is_empty());
    }

    #[test]
    fn test_annotations_survive_highlighting() {
        let Fixture { capabilities, .. } = fixture(0);
        let tree = shared(PAGE);

        PostProcessor::default().activate(&tree, &capabilities, &ManualScheduler::new());

        let html = tree.borrow().to_html();
        assert!(html.contains(concat!(
            "<code class=\"language-cred hljs\">grant ",
            "<span class=\"cred-highlight\">@cred@team-42</span> deploy</code>"
        )));
        assert_eq!(html.matches("cred-highlight").count(), 1);
    }

    #[test]
    fn test_all_sources_processed_after_retry() {
        let Fixture { log, capabilities } = fixture(0);
        let tree = shared(PAGE);
        let scheduler = ManualScheduler::new();

        let report = PostProcessor::default().activate(&tree, &capabilities, &scheduler);
        let retry = report.retry.unwrap();
        assert_eq!(retry.delay(), Duration::from_millis(1000));
        assert!(!retry.has_fired());

        assert_eq!(scheduler.advance(Duration::from_millis(1000)), 1);

        assert_eq!(
            retry.outcome(),
            Some(RetryOutcome::Render(RenderOutcome::Rendered { marked: 0 }))
        );
        assert_eq!(log.borrow().last().map(String::as_str), Some("render 0"));
        assert_eq!(
            census(&tree.borrow()),
            DiagramCensus {
                sources: 0,
                unprocessed: 0,
                processed: 2
            }
        );
    }

    #[test]
    fn test_two_activations_equal_one() {
        let Fixture { capabilities, .. } = fixture(0);
        let tree = shared(PAGE);
        let scheduler = ManualScheduler::new();
        let processor = PostProcessor::default();

        processor.activate(&tree, &capabilities, &scheduler);
        scheduler.advance(Duration::from_secs(1));
        let once = tree.borrow().to_html();

        processor.activate(&tree, &capabilities, &scheduler);
        scheduler.advance(Duration::from_secs(1));
        let twice = tree.borrow().to_html();

        assert_eq!(twice, once);
        assert_eq!(once.matches("class=\"mermaid mermaid-processed\"").count(), 2);
        assert_eq!(once.matches("cred-highlight").count(), 1);
    }

    #[test]
    fn test_absent_diagram_engine() {
        let tree = shared(PAGE);
        let scheduler = ManualScheduler::new();
        let processor = PostProcessor::default();

        let report = processor.activate(&tree, &Capabilities::new(), &scheduler);

        assert_eq!(report.diagrams.outcome, PassOutcome::CapabilityAbsent);
        assert_eq!(report.diagrams.conversion.converted, 2);
        assert_eq!(report.diagrams.render, None);
        assert!(report.retry.is_none());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(
            census(&tree.borrow()),
            DiagramCensus {
                sources: 0,
                unprocessed: 2,
                processed: 0
            }
        );
        assert_eq!(report.annotated, 1);
        let diagnostics = processor.diagnostics();
        assert_eq!(diagnostics.count(DiagnosticKind::CapabilityAbsent), 3);
        assert_eq!(diagnostics.count(DiagnosticKind::EngineFailure), 0);
    }

    #[test]
    fn test_empty_page_is_untouched() {
        let Fixture { log, capabilities } = fixture(0);
        let tree: SharedTree = Rc::default();
        let before = tree.borrow().clone();
        let scheduler = ManualScheduler::new();

        let report = PostProcessor::default().activate(&tree, &capabilities, &scheduler);
        scheduler.advance(Duration::from_secs(1));

        assert_eq!(*tree.borrow(), before);
        assert_eq!(report.diagrams.conversion, ConversionSummary::default());
        assert_eq!(report.annotated, 0);
        assert_eq!(
            log.borrow().iter().filter(|entry| *entry == "render 0").count(),
            2
        );
    }

    #[test]
    fn test_render_failure_does_not_stop_annotations() {
        let Fixture { capabilities, .. } = fixture(1);
        let tree = shared(PAGE);
        let scheduler = ManualScheduler::new();
        let processor = PostProcessor::default();

        let report = processor.activate(&tree, &capabilities, &scheduler);

        assert_eq!(report.diagrams.outcome, PassOutcome::Failed);
        assert_eq!(report.diagrams.render, Some(RenderOutcome::Failed));
        assert_eq!(report.annotations, PassOutcome::Completed);
        assert_eq!(report.annotated, 1);
        assert_eq!(census(&tree.borrow()).unprocessed, 2);
        assert_eq!(processor.diagnostics().count(DiagnosticKind::EngineFailure), 1);

        scheduler.advance(Duration::from_secs(1));

        assert_eq!(
            report.retry.and_then(|retry| retry.outcome()),
            Some(RetryOutcome::Render(RenderOutcome::Rendered { marked: 2 }))
        );
        assert_eq!(census(&tree.borrow()).processed, 2);
    }

    #[test]
    fn test_container_added_before_retry_is_processed() {
        let Fixture { capabilities, .. } = fixture(0);
        let tree = shared(PAGE);
        let scheduler = ManualScheduler::new();

        PostProcessor::default().activate(&tree, &capabilities, &scheduler);
        tree.borrow_mut()
            .append_child(
                &credcast_dom::NodePath::root(),
                Node::new("div").with_class("mermaid").with_text("graph LR"),
            )
            .unwrap();
        assert_eq!(census(&tree.borrow()).unprocessed, 1);

        scheduler.advance(Duration::from_millis(999));
        assert_eq!(census(&tree.borrow()).unprocessed, 1);

        scheduler.advance(Duration::from_millis(1));
        assert_eq!(
            census(&tree.borrow()),
            DiagramCensus {
                sources: 0,
                unprocessed: 0,
                processed: 3
            }
        );
    }

    #[test]
    fn test_retry_after_tree_dropped() {
        let Fixture { log, capabilities } = fixture(0);
        let tree = shared(PAGE);
        let scheduler = ManualScheduler::new();
        let processor = PostProcessor::default();

        let report = processor.activate(&tree, &capabilities, &scheduler);
        drop(tree);
        scheduler.advance(Duration::from_secs(1));

        assert_eq!(
            report.retry.unwrap().outcome(),
            Some(RetryOutcome::TreeGone)
        );
        assert_eq!(processor.diagnostics().count(DiagnosticKind::TreeGone), 1);
        assert_eq!(log.borrow().last().map(String::as_str), Some("render 2"));
    }

    #[test]
    fn test_retry_with_busy_tree() {
        let Fixture { capabilities, .. } = fixture(0);
        let tree = shared(PAGE);
        let scheduler = ManualScheduler::new();
        let processor = PostProcessor::default();

        let report = processor.activate(&tree, &capabilities, &scheduler);
        let held = tree.borrow();
        scheduler.advance(Duration::from_secs(1));
        drop(held);

        assert_eq!(
            report.retry.unwrap().outcome(),
            Some(RetryOutcome::TreeBusy)
        );
        assert_eq!(processor.diagnostics().count(DiagnosticKind::TreeBusy), 1);
    }

    #[test]
    fn test_retry_disabled() {
        let Fixture { capabilities, .. } = fixture(0);
        let tree = shared(PAGE);
        let scheduler = ManualScheduler::new();
        let processor = PostProcessor::new(ProcessorConfig {
            retry_delay: None,
            ..ProcessorConfig::default()
        });

        let report = processor.activate(&tree, &capabilities, &scheduler);

        assert!(report.retry.is_none());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_disabled_passes_are_skipped() {
        let Fixture { log, capabilities } = fixture(0);
        let tree = shared(PAGE);
        let before = tree.borrow().to_html();
        let processor = PostProcessor::new(ProcessorConfig {
            passes: PassesConfig {
                highlight: false,
                typeset: true,
                diagrams: false,
                annotations: false,
            },
            ..ProcessorConfig::default()
        });

        let report = processor.activate(&tree, &capabilities, &ManualScheduler::new());

        assert_eq!(*log.borrow(), vec!["typeset"]);
        assert_eq!(report.highlight, PassOutcome::Disabled);
        assert_eq!(report.diagrams.outcome, PassOutcome::Disabled);
        assert_eq!(report.annotations, PassOutcome::Disabled);
        assert_eq!(tree.borrow().to_html(), before);
    }

    #[test]
    fn test_activate_with_busy_tree() {
        let Fixture { capabilities, .. } = fixture(0);
        let tree = shared(PAGE);
        let processor = PostProcessor::default();

        let _held = tree.borrow();
        let report = processor.activate(&tree, &capabilities, &ManualScheduler::new());

        assert_eq!(report.highlight, PassOutcome::TreeBusy);
        assert_eq!(report.typeset, PassOutcome::Completed);
        assert_eq!(report.diagrams.outcome, PassOutcome::TreeBusy);
        assert_eq!(report.annotations, PassOutcome::TreeBusy);
        assert!(report.retry.is_none());
    }

    #[test]
    fn test_config_from_loaded_file() {
        let config: Config = toml::from_str(concat!(
            "[diagrams]\ntheme = \"forest\"\n",
            "[retry]\nenabled = false\n",
            "[passes]\ntypeset = false\n"
        ))
        .unwrap();

        let processor_config = ProcessorConfig::from(&config);

        assert_eq!(processor_config.retry_delay, None);
        assert!(!processor_config.passes.typeset);
        assert_eq!(processor_config.diagrams.to_json()["theme"], "forest");
    }

    #[test]
    fn test_configured_theme_reaches_engine() {
        let Fixture { log, capabilities } = fixture(0);
        let tree = shared(PAGE);
        let mut config = ProcessorConfig::default();
        config.diagrams.theme = credcast_config::Theme::Neutral;

        PostProcessor::new(config).activate(&tree, &capabilities, &ManualScheduler::new());

        assert!(log.borrow().contains(&"configure \"neutral\"".to_owned()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_activate_when_ready_with_tokio_scheduler() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let Fixture { capabilities, .. } = fixture(0);
                let tree = shared(PAGE);
                let processor = PostProcessor::default();

                let ready = tokio::time::sleep(Duration::from_millis(50));
                let report = processor
                    .activate_when_ready(ready, &tree, &capabilities, &TokioScheduler)
                    .await;
                let retry = report.retry.unwrap();
                assert!(!retry.has_fired());

                tokio::time::sleep(Duration::from_millis(1001)).await;
                tokio::task::yield_now().await;

                assert_eq!(
                    retry.outcome(),
                    Some(RetryOutcome::Render(RenderOutcome::Rendered { marked: 0 }))
                );
                assert_eq!(census(&tree.borrow()).processed, 2);
            })
            .await;
    }
}
