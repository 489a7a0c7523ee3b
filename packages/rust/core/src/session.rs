//! The session state container.
//!
//! Everything a front end renders lives in [`Session`] and changes only
//! through its methods. Results of background processes carry the
//! generation they were started under; once the session has moved on
//! (new process, stop, reset) those results are dropped on arrival.

use tracing::{debug, info};

use contentsynth_markdown::render_markdown;
use contentsynth_shared::{AppConfig, Channel, InsightBlock, RewriteOptions, Voice};

use crate::drag::DragState;
use crate::skeleton::Skeleton;

/// Which screen is active. Exactly one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Start screen, optionally showing the last failure.
    Initial { error: Option<String> },
    /// Ingestion or deconstruction in progress.
    Loading { message: String },
    /// Insight blocks are ready for curation.
    Insights,
    /// The article is being synthesized.
    Rewriting { message: String },
    /// The article is ready.
    Article,
}

impl Default for View {
    fn default() -> Self {
        Self::Initial { error: None }
    }
}

impl View {
    /// Progress message for the two in-flight views.
    pub fn progress_message(&self) -> Option<&str> {
        match self {
            Self::Loading { message } | Self::Rewriting { message } => Some(message),
            _ => None,
        }
    }
}

/// A synthesized article and its rendered, sanitized HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub markdown: String,
    pub html: String,
}

impl Article {
    pub fn new(markdown: impl Into<String>) -> Self {
        let markdown = markdown.into();
        let html = render_markdown(&markdown);
        Self { markdown, html }
    }
}

/// What a background process produces.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// Deconstruction finished.
    Insights {
        blocks: Vec<InsightBlock>,
        source_label: String,
    },
    /// Rewriting finished with this Markdown.
    Article(String),
}

/// The two kinds of background process. Failures route differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    /// Fetch or parse a source, then deconstruct it.
    Ingest,
    /// Rewrite the skeleton into an article.
    Rewrite,
}

/// Elapsed-time tracking and the advisory pause flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMonitor {
    elapsed_secs: u64,
    paused: bool,
    pause_after_secs: u64,
}

impl ProcessMonitor {
    pub fn new(pause_after_secs: u64) -> Self {
        Self {
            elapsed_secs: 0,
            paused: false,
            pause_after_secs,
        }
    }

    fn tick(&mut self) {
        self.elapsed_secs += 1;
        // Only at the threshold: after Continue the banner stays down for the rest of the run.
        if self.elapsed_secs == self.pause_after_secs {
            self.paused = true;
        }
    }

    fn reset(&mut self) {
        self.elapsed_secs = 0;
        self.paused = false;
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause_after_secs(&self) -> u64 {
        self.pause_after_secs
    }
}

/// Default seconds before the pause banner appears.
pub const DEFAULT_PAUSE_AFTER_SECS: u64 = 35;

/// Spinner text while a URL is fetched.
pub const FETCHING_MESSAGE: &str = "Fetching content from URL...";
/// Spinner text while the model deconstructs content.
pub const DECONSTRUCTING_MESSAGE: &str = "Deconstructing content with AI...";
/// Spinner text while the model rewrites the skeleton.
pub const SYNTHESIZING_MESSAGE: &str = "Synthesizing your article...";

/// All state for one ingest → curate → synthesize session.
#[derive(Debug, Clone)]
pub struct Session {
    view: View,
    insights: Vec<InsightBlock>,
    skeleton: Skeleton,
    options: RewriteOptions,
    article: Option<Article>,
    source_label: Option<String>,
    monitor: ProcessMonitor,
    notice: Option<String>,
    drag: DragState,
    generation: u64,
    running: Option<ProcessKind>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RewriteOptions::default(), DEFAULT_PAUSE_AFTER_SECS)
    }
}

impl Session {
    pub fn new(options: RewriteOptions, pause_after_secs: u64) -> Self {
        Self {
            view: View::default(),
            insights: Vec::new(),
            skeleton: Skeleton::new(),
            options,
            article: None,
            source_label: None,
            monitor: ProcessMonitor::new(pause_after_secs),
            notice: None,
            drag: DragState::default(),
            generation: 0,
            running: None,
        }
    }

    /// Session with default channel/voice and pause threshold from config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(RewriteOptions::from(config), config.process.pause_after_secs)
    }

    // -- accessors ----------------------------------------------------------

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn insights(&self) -> &[InsightBlock] {
        &self.insights
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Skeleton entries resolved to blocks, in outline order.
    pub fn skeleton_blocks(&self) -> Vec<&InsightBlock> {
        self.skeleton.resolve(&self.insights)
    }

    pub fn options(&self) -> RewriteOptions {
        self.options
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    pub fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }

    pub fn monitor(&self) -> &ProcessMonitor {
        &self.monitor
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.monitor.elapsed_secs
    }

    pub fn is_paused(&self) -> bool {
        self.monitor.paused
    }

    /// Non-fatal message to show above the current view.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a process is in flight.
    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    pub fn block(&self, id: &str) -> Option<&InsightBlock> {
        self.insights.iter().find(|b| b.id == id)
    }

    /// Synthesis needs curated blocks and an idle insights view.
    pub fn can_synthesize(&self) -> bool {
        self.view == View::Insights && !self.skeleton.is_empty() && !self.is_busy()
    }

    // -- rewrite options ----------------------------------------------------

    pub fn set_channel(&mut self, channel: Channel) {
        self.options.channel = channel;
    }

    pub fn set_voice(&mut self, voice: Voice) {
        self.options.voice = voice;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // -- skeleton editing ---------------------------------------------------

    /// Add a block to the skeleton. Unknown ids are ignored.
    pub fn add_to_skeleton(&mut self, id: &str) -> bool {
        if self.block(id).is_none() {
            debug!(id, "ignoring unknown block id");
            return false;
        }
        self.skeleton.add(id)
    }

    pub fn remove_from_skeleton(&mut self, id: &str) -> bool {
        self.skeleton.remove(id)
    }

    /// Add the block if absent, remove it if present. Returns membership after.
    pub fn toggle_in_skeleton(&mut self, id: &str) -> bool {
        if self.skeleton.contains(id) {
            self.skeleton.remove(id);
            false
        } else {
            self.add_to_skeleton(id)
        }
    }

    pub fn reorder_skeleton(&mut self, from: Option<usize>, to: Option<usize>) -> bool {
        self.skeleton.reorder(from, to)
    }

    // -- drag and drop ------------------------------------------------------

    pub fn start_block_drag(&mut self, id: &str) {
        self.drag.start_block(id);
    }

    pub fn end_block_drag(&mut self) {
        self.drag.end_block();
    }

    pub fn skeleton_drag_over(&mut self) {
        self.drag.enter_skeleton();
    }

    pub fn skeleton_drag_leave(&mut self) {
        self.drag.leave_skeleton();
    }

    /// Drop the dragged block onto the skeleton.
    pub fn drop_on_skeleton(&mut self) -> bool {
        match self.drag.take_block() {
            Some(id) => self.add_to_skeleton(&id),
            None => false,
        }
    }

    pub fn start_item_drag(&mut self, index: usize) {
        self.drag.start_item(index);
    }

    pub fn item_drag_over(&mut self, index: usize) {
        self.drag.item_over(index);
    }

    pub fn end_item_drag(&mut self) {
        self.drag.end_item();
    }

    /// Drop the dragged skeleton item on the current target.
    pub fn drop_on_item(&mut self) -> bool {
        let (from, to) = self.drag.take_item_move();
        self.skeleton.reorder(from, to)
    }

    // -- process lifecycle --------------------------------------------------

    /// Start a process: new generation, zeroed clock, `view` shown.
    pub fn begin_process(&mut self, kind: ProcessKind, view: View) -> u64 {
        self.generation += 1;
        self.running = Some(kind);
        self.monitor.reset();
        self.notice = None;
        self.view = view;
        info!(generation = self.generation, ?kind, "process started");
        self.generation
    }

    fn is_current(&self, generation: u64, what: &str) -> bool {
        let current = self.running.is_some() && generation == self.generation;
        if !current {
            debug!(
                generation,
                current = self.generation,
                event = what,
                "discarding stale process event"
            );
        }
        current
    }

    /// Advance the clock by one tick.
    pub fn tick(&mut self, generation: u64) -> bool {
        if !self.is_current(generation, "tick") {
            return false;
        }
        self.monitor.tick();
        if self.monitor.elapsed_secs == self.monitor.pause_after_secs {
            info!(elapsed = self.monitor.elapsed_secs, "process is taking longer than expected");
        }
        true
    }

    /// Replace the progress view while a process runs.
    pub fn show_progress(&mut self, generation: u64, view: View) -> bool {
        if !self.is_current(generation, "progress") {
            return false;
        }
        self.view = view;
        true
    }

    /// Clear the pause banner. The process is unaffected.
    pub fn continue_process(&mut self) {
        self.monitor.paused = false;
    }

    /// Apply a successful result.
    pub fn finish(&mut self, generation: u64, outcome: TaskOutcome) -> bool {
        if !self.is_current(generation, "finished") {
            return false;
        }
        self.running = None;

        match outcome {
            TaskOutcome::Insights {
                blocks,
                source_label,
            } => {
                info!(blocks = blocks.len(), source = %source_label, "insights ready");
                self.insights = blocks;
                self.skeleton.clear();
                self.drag = DragState::default();
                self.article = None;
                self.source_label = Some(source_label);
                self.view = View::Insights;
            }
            TaskOutcome::Article(markdown) => {
                info!(chars = markdown.len(), "article ready");
                self.article = Some(Article::new(markdown));
                self.view = View::Article;
            }
        }
        true
    }

    /// Apply a failure.
    ///
    /// Ingest failures return to the start screen and drop all session data;
    /// rewrite failures return to the insights screen with a notice, keeping
    /// the curated skeleton.
    pub fn fail(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if !self.is_current(generation, "failed") {
            return false;
        }
        let message = message.into();
        let kind = self.running.take();

        match kind {
            Some(ProcessKind::Rewrite) => {
                self.view = View::Insights;
                self.notice = Some(message);
            }
            _ => {
                self.clear_data();
                self.view = View::Initial {
                    error: Some(message),
                };
            }
        }
        true
    }

    /// Abandon any process and return to a blank start screen.
    ///
    /// Rewrite options are kept.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.running = None;
        self.clear_data();
        self.monitor.reset();
        self.notice = None;
        self.view = View::default();
        info!(generation = self.generation, "session reset");
    }

    fn clear_data(&mut self) {
        self.insights.clear();
        self.skeleton.clear();
        self.article = None;
        self.source_label = None;
        self.drag = DragState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str) -> InsightBlock {
        InsightBlock {
            id: id.into(),
            kind: "Result".into(),
            content: format!("content {id}"),
            summary: format!("summary {id}"),
            tags: vec!["tag".into()],
            confidence_score: 0.9,
        }
    }

    fn with_insights(ids: &[&str]) -> Session {
        let mut session = Session::default();
        let generation = session.begin_process(
            ProcessKind::Ingest,
            View::Loading {
                message: FETCHING_MESSAGE.into(),
            },
        );
        session.finish(
            generation,
            TaskOutcome::Insights {
                blocks: ids.iter().map(|id| block(id)).collect(),
                source_label: "Text File".into(),
            },
        );
        session
    }

    #[test]
    fn starts_on_blank_initial_view() {
        let session = Session::default();
        assert_eq!(session.view(), &View::Initial { error: None });
        assert!(session.insights().is_empty());
        assert!(!session.is_busy());
    }

    #[test]
    fn insights_outcome_moves_to_insights_view() {
        let session = with_insights(&["a", "b"]);
        assert_eq!(session.view(), &View::Insights);
        assert_eq!(session.insights().len(), 2);
        assert_eq!(session.source_label(), Some("Text File"));
        assert!(!session.is_busy());
    }

    #[test]
    fn pause_flag_set_on_reaching_threshold() {
        let mut session = Session::new(RewriteOptions::default(), 3);
        let generation = session.begin_process(ProcessKind::Ingest, View::Insights);
        session.tick(generation);
        session.tick(generation);
        assert!(!session.is_paused());
        session.tick(generation);
        assert!(session.is_paused());
        assert_eq!(session.elapsed_secs(), 3);
    }

    #[test]
    fn continue_is_durable() {
        let mut session = Session::new(RewriteOptions::default(), 2);
        let generation = session.begin_process(ProcessKind::Ingest, View::Insights);
        session.tick(generation);
        session.tick(generation);
        session.continue_process();
        for _ in 0..10 {
            session.tick(generation);
        }
        assert!(!session.is_paused());
        assert_eq!(session.elapsed_secs(), 12);
    }

    #[test]
    fn stale_results_are_discarded_after_reset() {
        let mut session = Session::default();
        let generation = session.begin_process(
            ProcessKind::Ingest,
            View::Loading {
                message: FETCHING_MESSAGE.into(),
            },
        );
        session.reset();

        assert!(!session.tick(generation));
        assert!(!session.show_progress(
            generation,
            View::Loading {
                message: DECONSTRUCTING_MESSAGE.into()
            }
        ));
        assert!(!session.finish(
            generation,
            TaskOutcome::Insights {
                blocks: vec![block("late")],
                source_label: "Webpage".into(),
            }
        ));
        assert_eq!(session.view(), &View::Initial { error: None });
        assert!(session.insights().is_empty());
        assert_eq!(session.elapsed_secs(), 0);
    }

    #[test]
    fn older_process_cannot_clobber_newer_one() {
        let mut session = Session::default();
        let first = session.begin_process(ProcessKind::Ingest, View::Insights);
        let second = session.begin_process(ProcessKind::Ingest, View::Insights);
        assert!(!session.fail(first, "boom"));
        assert!(session.is_busy());
        assert!(session.fail(second, "real failure"));
        assert_eq!(
            session.view(),
            &View::Initial {
                error: Some("real failure".into())
            }
        );
    }

    #[test]
    fn ingest_failure_returns_to_initial_with_error() {
        let mut session = with_insights(&["a"]);
        session.add_to_skeleton("a");
        let generation = session.begin_process(
            ProcessKind::Ingest,
            View::Loading {
                message: FETCHING_MESSAGE.into(),
            },
        );
        session.fail(
            generation,
            "Content not found at the source URL (Error 404). Please check if the URL is correct.",
        );

        match session.view() {
            View::Initial { error: Some(e) } => assert!(e.contains("not found")),
            other => panic!("unexpected view {other:?}"),
        }
        assert!(session.insights().is_empty());
        assert!(session.skeleton().is_empty());
    }

    #[test]
    fn rewrite_failure_keeps_curation() {
        let mut session = with_insights(&["a", "b"]);
        session.add_to_skeleton("b");
        session.add_to_skeleton("a");
        let generation = session.begin_process(
            ProcessKind::Rewrite,
            View::Rewriting {
                message: SYNTHESIZING_MESSAGE.into(),
            },
        );
        session.fail(generation, "The AI failed to rewrite the article.");

        assert_eq!(session.view(), &View::Insights);
        assert_eq!(session.notice(), Some("The AI failed to rewrite the article."));
        assert_eq!(session.skeleton().ids(), ["b", "a"]);
    }

    #[test]
    fn reset_from_article_clears_everything() {
        let mut session = with_insights(&["a"]);
        session.add_to_skeleton("a");
        session.set_voice(Voice::Journalistic);
        let generation = session.begin_process(
            ProcessKind::Rewrite,
            View::Rewriting {
                message: SYNTHESIZING_MESSAGE.into(),
            },
        );
        session.tick(generation);
        session.finish(generation, TaskOutcome::Article("# Done".into()));
        assert_eq!(session.view(), &View::Article);
        assert!(session.article().unwrap().html.contains("<h1>"));

        session.reset();
        assert_eq!(session.view(), &View::Initial { error: None });
        assert!(session.insights().is_empty());
        assert!(session.skeleton().is_empty());
        assert!(session.article().is_none());
        assert_eq!(session.elapsed_secs(), 0);
        assert!(!session.is_paused());
        assert_eq!(session.options().voice, Voice::Journalistic);
    }

    #[test]
    fn new_insights_clear_old_skeleton() {
        let mut session = with_insights(&["a"]);
        session.add_to_skeleton("a");
        let generation = session.begin_process(ProcessKind::Ingest, View::Insights);
        session.finish(
            generation,
            TaskOutcome::Insights {
                blocks: vec![block("c")],
                source_label: "Webpage".into(),
            },
        );
        assert!(session.skeleton().is_empty());
    }

    #[test]
    fn skeleton_only_accepts_known_blocks() {
        let mut session = with_insights(&["a"]);
        assert!(!session.add_to_skeleton("ghost"));
        assert!(session.add_to_skeleton("a"));
        assert!(!session.add_to_skeleton("a"));
        assert_eq!(session.skeleton().len(), 1);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut session = with_insights(&["a"]);
        assert!(session.toggle_in_skeleton("a"));
        assert!(!session.toggle_in_skeleton("a"));
        assert!(session.skeleton().is_empty());
    }

    #[test]
    fn drag_block_onto_skeleton_adds_it() {
        let mut session = with_insights(&["a", "b"]);
        session.start_block_drag("b");
        session.skeleton_drag_over();
        assert!(session.drop_on_skeleton());
        assert_eq!(session.skeleton().ids(), ["b"]);
        assert!(!session.drag().is_active());
    }

    #[test]
    fn drag_item_reorders_skeleton() {
        let mut session = with_insights(&["a", "b", "c"]);
        for id in ["a", "b", "c"] {
            session.add_to_skeleton(id);
        }
        session.start_item_drag(0);
        session.item_drag_over(2);
        assert!(session.drop_on_item());
        assert_eq!(session.skeleton().ids(), ["b", "c", "a"]);
    }

    #[test]
    fn can_synthesize_requires_skeleton() {
        let mut session = with_insights(&["a"]);
        assert!(!session.can_synthesize());
        session.add_to_skeleton("a");
        assert!(session.can_synthesize());
    }
}
