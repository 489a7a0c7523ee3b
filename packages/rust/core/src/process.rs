//! Background process runner with an elapsed-time ticker.
//!
//! One process at a time is monitored. The task itself is never aborted:
//! stopping only tears down the ticker and moves the session to a new
//! generation, so the task's eventual result is discarded on arrival.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use contentsynth_shared::{AppConfig, Result};

use crate::session::{ProcessKind, Session, TaskOutcome, View};

/// Default ticker period.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Messages from the ticker and from running tasks.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Tick { generation: u64 },
    Progress { generation: u64, view: View },
    Finished { generation: u64, outcome: TaskOutcome },
    Failed { generation: u64, message: String },
}

impl ProcessEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Tick { generation }
            | Self::Progress { generation, .. }
            | Self::Finished { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}

/// Handle a running task uses to publish progress views.
#[derive(Debug, Clone)]
pub struct TaskReporter {
    generation: u64,
    tx: mpsc::UnboundedSender<ProcessEvent>,
}

impl TaskReporter {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Show `Loading { message }`.
    pub fn loading(&self, message: impl Into<String>) {
        self.report(View::Loading {
            message: message.into(),
        });
    }

    /// Show `Rewriting { message }`.
    pub fn rewriting(&self, message: impl Into<String>) {
        self.report(View::Rewriting {
            message: message.into(),
        });
    }

    pub fn report(&self, view: View) {
        // The receiver lives as long as the controller; a closed channel
        // means nobody is listening any more.
        let _ = self.tx.send(ProcessEvent::Progress {
            generation: self.generation,
            view,
        });
    }
}

/// Runs monitored processes and folds their events into a [`Session`].
pub struct ProcessController {
    tx: mpsc::UnboundedSender<ProcessEvent>,
    rx: mpsc::UnboundedReceiver<ProcessEvent>,
    ticker: Option<JoinHandle<()>>,
    tick: Duration,
}

impl Default for ProcessController {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl ProcessController {
    pub fn new(tick: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            ticker: None,
            tick,
        }
    }

    /// Controller ticking at `[process].tick_millis`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Duration::from_millis(config.process.tick_millis.max(1)))
    }

    /// Start `task` as the current process.
    ///
    /// Any previous ticker is stopped, the session enters a new generation
    /// showing `view`, and a fresh ticker starts. Must be called inside a
    /// tokio runtime. Returns the new generation.
    pub fn run_monitored<F, Fut>(
        &mut self,
        session: &mut Session,
        kind: ProcessKind,
        view: View,
        task: F,
    ) -> u64
    where
        F: FnOnce(TaskReporter) -> Fut,
        Fut: Future<Output = Result<TaskOutcome>> + Send + 'static,
    {
        self.stop_ticker();
        let generation = session.begin_process(kind, view);

        let tick = self.tick;
        let tick_tx = self.tx.clone();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
            loop {
                interval.tick().await;
                if tick_tx.send(ProcessEvent::Tick { generation }).is_err() {
                    break;
                }
            }
        }));

        let reporter = TaskReporter {
            generation,
            tx: self.tx.clone(),
        };
        let done_tx = self.tx.clone();
        let fut = task(reporter);
        tokio::spawn(async move {
            let event = match fut.await {
                Ok(outcome) => ProcessEvent::Finished {
                    generation,
                    outcome,
                },
                Err(e) => {
                    warn!(generation, error = %e, "process failed");
                    ProcessEvent::Failed {
                        generation,
                        message: e.user_message(),
                    }
                }
            };
            let _ = done_tx.send(event);
        });

        generation
    }

    /// Wait for the next event.
    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        self.rx.recv().await
    }

    /// Take the next event if one is queued.
    pub fn try_next_event(&mut self) -> Option<ProcessEvent> {
        self.rx.try_recv().ok()
    }

    /// Fold `event` into `session`. Returns whether it was applied.
    ///
    /// When the current process finishes or fails the ticker stops.
    pub fn apply(&mut self, session: &mut Session, event: ProcessEvent) -> bool {
        match event {
            ProcessEvent::Tick { generation } => session.tick(generation),
            ProcessEvent::Progress { generation, view } => session.show_progress(generation, view),
            ProcessEvent::Finished {
                generation,
                outcome,
            } => {
                let applied = session.finish(generation, outcome);
                if applied {
                    self.stop_ticker();
                }
                applied
            }
            ProcessEvent::Failed {
                generation,
                message,
            } => {
                let applied = session.fail(generation, message);
                if applied {
                    self.stop_ticker();
                }
                applied
            }
        }
    }

    /// Apply every queued event. Returns how many were applied.
    pub fn drain(&mut self, session: &mut Session) -> usize {
        let mut applied = 0;
        while let Some(event) = self.try_next_event() {
            if self.apply(session, event) {
                applied += 1;
            }
        }
        applied
    }

    /// User abort: stop ticking and reset the session. The task keeps
    /// running; its result will be stale.
    pub fn stop_process(&mut self, session: &mut Session) {
        self.stop_ticker();
        session.reset();
    }

    /// Dismiss the pause banner.
    pub fn continue_process(&mut self, session: &mut Session) {
        session.continue_process();
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            debug!("stopping process ticker");
            ticker.abort();
        }
    }
}

impl Drop for ProcessController {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

#[cfg(test)]
mod tests {
    use contentsynth_shared::{InsightBlock, RewriteOptions, SynthError};
    use tokio::sync::oneshot;

    use super::*;
    use crate::session::{DECONSTRUCTING_MESSAGE, FETCHING_MESSAGE};

    fn loading() -> View {
        View::Loading {
            message: FETCHING_MESSAGE.into(),
        }
    }

    fn insights(id: &str) -> TaskOutcome {
        TaskOutcome::Insights {
            blocks: vec![InsightBlock {
                id: id.into(),
                kind: "Result".into(),
                content: "c".into(),
                summary: "s".into(),
                tags: vec![],
                confidence_score: 0.8,
            }],
            source_label: "Text File".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_advance_elapsed_and_pause_at_threshold() {
        let mut session = Session::new(RewriteOptions::default(), 35);
        let mut controller = ProcessController::default();
        let (_hold, wait) = oneshot::channel::<()>();

        controller.run_monitored(&mut session, ProcessKind::Ingest, loading(), |_r| async move {
            let _ = wait.await;
            Ok(insights("a"))
        });

        for _ in 0..34 {
            let event = controller.next_event().await.unwrap();
            controller.apply(&mut session, event);
        }
        assert_eq!(session.elapsed_secs(), 34);
        assert!(!session.is_paused());

        let event = controller.next_event().await.unwrap();
        controller.apply(&mut session, event);
        assert_eq!(session.elapsed_secs(), 35);
        assert!(session.is_paused());
        assert!(session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn finished_task_stops_ticker_and_shows_insights() {
        let mut session = Session::default();
        let mut controller = ProcessController::default();

        controller.run_monitored(&mut session, ProcessKind::Ingest, loading(), |reporter| async move {
            reporter.loading(DECONSTRUCTING_MESSAGE);
            Ok(insights("a"))
        });

        let progress = controller.next_event().await.unwrap();
        assert!(matches!(progress, ProcessEvent::Progress { .. }));
        controller.apply(&mut session, progress);
        assert_eq!(
            session.view(),
            &View::Loading {
                message: DECONSTRUCTING_MESSAGE.into()
            }
        );

        let done = controller.next_event().await.unwrap();
        assert!(controller.apply(&mut session, done));
        assert_eq!(session.view(), &View::Insights);
        assert!(!controller.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_message_lands_on_initial_view() {
        let mut session = Session::default();
        let mut controller = ProcessController::default();

        controller.run_monitored(&mut session, ProcessKind::Ingest, loading(), |_r| async move {
            Err(SynthError::remote(
                404,
                "Content not found at the source URL (Error 404). Please check if the URL is correct.",
            ))
        });

        let event = controller.next_event().await.unwrap();
        controller.apply(&mut session, event);
        match session.view() {
            View::Initial { error: Some(e) } => assert!(e.contains("not found")),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_late_result() {
        let mut session = Session::default();
        let mut controller = ProcessController::default();
        let (release, wait) = oneshot::channel::<()>();

        let generation =
            controller.run_monitored(&mut session, ProcessKind::Ingest, loading(), |_r| async move {
                let _ = wait.await;
                Ok(insights("late"))
            });

        controller.stop_process(&mut session);
        assert!(!controller.is_ticking());
        assert_eq!(session.view(), &View::Initial { error: None });

        release.send(()).unwrap();
        let event = controller.next_event().await.unwrap();
        assert_eq!(event.generation(), generation);
        assert!(!controller.apply(&mut session, event));
        assert!(session.insights().is_empty());
        assert_eq!(session.view(), &View::Initial { error: None });
    }

    #[tokio::test(start_paused = true)]
    async fn new_process_replaces_previous_ticker() {
        let mut session = Session::default();
        let mut controller = ProcessController::default();

        let first = controller.run_monitored(&mut session, ProcessKind::Ingest, loading(), |_r| {
            std::future::pending()
        });
        let second = controller.run_monitored(&mut session, ProcessKind::Ingest, loading(), |_r| {
            std::future::pending()
        });
        assert!(second > first);

        let event = controller.next_event().await.unwrap();
        assert_eq!(event.generation(), second);
        assert!(controller.apply(&mut session, event));
        assert_eq!(session.elapsed_secs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn continue_clears_pause_without_touching_task() {
        let mut session = Session::new(RewriteOptions::default(), 1);
        let mut controller = ProcessController::default();

        controller.run_monitored(&mut session, ProcessKind::Ingest, loading(), |_r| {
            std::future::pending()
        });
        let event = controller.next_event().await.unwrap();
        controller.apply(&mut session, event);
        assert!(session.is_paused());

        controller.continue_process(&mut session);
        assert!(!session.is_paused());
        assert!(session.is_busy());
        assert!(controller.is_ticking());
    }
}
