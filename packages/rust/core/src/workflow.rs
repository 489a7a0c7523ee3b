//! End-to-end workflows: source → insights, skeleton → article.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument};

use contentsynth_ai::{GenerativeModel, deconstruct_content, rewrite_article};
use contentsynth_ingest::{ContentFetcher, parse_file};
use contentsynth_shared::{AppConfig, InsightBlock, Result, RewriteOptions, SourceContent};

use crate::process::{ProcessController, TaskReporter};
use crate::session::{
    DECONSTRUCTING_MESSAGE, FETCHING_MESSAGE, ProcessKind, SYNTHESIZING_MESSAGE, Session,
    TaskOutcome, View,
};

/// Where source content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    Url(String),
    File(PathBuf),
}

impl SourceInput {
    /// First progress message for this source.
    pub fn loading_message(&self) -> String {
        match self {
            Self::Url(_) => FETCHING_MESSAGE.to_string(),
            Self::File(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("Parsing {name}...")
            }
        }
    }
}

/// Fetch or read `source`.
pub async fn ingest(source: &SourceInput, fetcher: &ContentFetcher) -> Result<SourceContent> {
    match source {
        SourceInput::Url(url) => fetcher.fetch_from_url(url).await,
        SourceInput::File(path) => parse_file(path).await,
    }
}

/// Ingest `source`, then deconstruct it into insight blocks.
#[instrument(skip_all, fields(source = ?source))]
pub async fn ingest_and_deconstruct<M: GenerativeModel>(
    source: SourceInput,
    fetcher: &ContentFetcher,
    model: &M,
    thinking_budget: Option<u32>,
    reporter: &TaskReporter,
) -> Result<TaskOutcome> {
    reporter.loading(source.loading_message());
    let content = ingest(&source, fetcher).await?;

    reporter.loading(DECONSTRUCTING_MESSAGE);
    let blocks = deconstruct_content(model, &content.content, &content.label, thinking_budget).await?;

    Ok(TaskOutcome::Insights {
        blocks,
        source_label: content.label,
    })
}

/// Rewrite `blocks`, in order, into an article.
pub async fn synthesize<M: GenerativeModel>(
    blocks: Vec<InsightBlock>,
    options: RewriteOptions,
    model: &M,
) -> Result<TaskOutcome> {
    let markdown = rewrite_article(model, &blocks, &options).await?;
    Ok(TaskOutcome::Article(markdown))
}

/// Shared collaborators for starting workflows as monitored processes.
pub struct Workflows<M> {
    fetcher: Arc<ContentFetcher>,
    model: Arc<M>,
    thinking_budget: Option<u32>,
}

impl<M> Clone for Workflows<M> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            model: Arc::clone(&self.model),
            thinking_budget: self.thinking_budget,
        }
    }
}

impl<M: GenerativeModel + 'static> Workflows<M> {
    pub fn new(fetcher: ContentFetcher, model: M, thinking_budget: Option<u32>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            model: Arc::new(model),
            thinking_budget,
        }
    }

    /// Build from config: proxy fetcher plus the deconstruction thinking budget.
    pub fn from_config(config: &AppConfig, model: M) -> Result<Self> {
        Ok(Self::new(
            ContentFetcher::from_config(config)?,
            model,
            Some(config.gemini.thinking_budget),
        ))
    }

    pub fn fetcher(&self) -> &ContentFetcher {
        &self.fetcher
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Start ingest + deconstruction of `source`. Returns the generation.
    pub fn start_ingest(
        &self,
        controller: &mut ProcessController,
        session: &mut Session,
        source: SourceInput,
    ) -> u64 {
        info!(?source, "starting ingestion");
        let view = View::Loading {
            message: source.loading_message(),
        };
        let fetcher = Arc::clone(&self.fetcher);
        let model = Arc::clone(&self.model);
        let thinking_budget = self.thinking_budget;

        controller.run_monitored(session, ProcessKind::Ingest, view, move |reporter| async move {
            ingest_and_deconstruct(source, &fetcher, model.as_ref(), thinking_budget, &reporter).await
        })
    }

    /// Start synthesis of the session's skeleton.
    ///
    /// Returns `None` without doing anything when the skeleton is empty or a
    /// process is already running.
    pub fn start_rewrite(
        &self,
        controller: &mut ProcessController,
        session: &mut Session,
    ) -> Option<u64> {
        if !session.can_synthesize() {
            return None;
        }
        let blocks: Vec<InsightBlock> = session.skeleton_blocks().into_iter().cloned().collect();
        let options = session.options();
        let model = Arc::clone(&self.model);

        info!(blocks = blocks.len(), channel = %options.channel, voice = %options.voice, "starting synthesis");
        let view = View::Rewriting {
            message: SYNTHESIZING_MESSAGE.to_string(),
        };
        Some(controller.run_monitored(
            session,
            ProcessKind::Rewrite,
            view,
            move |_reporter| async move { synthesize(blocks, options, model.as_ref()).await },
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use contentsynth_ai::GenerationRequest;
    use contentsynth_shared::SynthError;

    use super::*;

    /// Answers deconstruction and rewrite requests from fixed JSON.
    struct ScriptedModel {
        blocks_json: String,
        article_json: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(blocks_json: &str, article_json: Result<String>) -> Self {
            Self {
                blocks_json: blocks_json.to_string(),
                article_json,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl GenerativeModel for ScriptedModel {
        async fn generate_json(&self, req: &GenerationRequest) -> Result<String> {
            self.prompts.lock().unwrap().push(req.prompt.clone());
            if req.response_schema["type"] == "ARRAY" {
                Ok(self.blocks_json.clone())
            } else {
                match &self.article_json {
                    Ok(text) => Ok(text.clone()),
                    Err(e) => Err(SynthError::Ai(e.to_string())),
                }
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    const BLOCKS: &str = r#"[
        {"type":"Problem Statement","content":"p","summary":"sp","tags":["a"],"confidenceScore":0.9},
        {"type":"Result","content":"r","summary":"sr","tags":["b"],"confidenceScore":0.7}
    ]"#;

    fn workflows(model: ScriptedModel) -> Workflows<ScriptedModel> {
        let fetcher = ContentFetcher::new("http://127.0.0.1:9").unwrap();
        Workflows::new(fetcher, model, Some(0))
    }

    async fn run_to_idle(controller: &mut ProcessController, session: &mut Session) {
        while session.is_busy() {
            let event = controller.next_event().await.unwrap();
            controller.apply(session, event);
        }
    }

    #[test]
    fn loading_message_names_the_file() {
        let source = SourceInput::File(PathBuf::from("/tmp/data/report.ipynb"));
        assert_eq!(source.loading_message(), "Parsing report.ipynb...");
        assert_eq!(
            SourceInput::Url("https://x.dev".into()).loading_message(),
            FETCHING_MESSAGE
        );
    }

    #[tokio::test]
    async fn file_to_article_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Our model improved recall by 4 points.").unwrap();

        let flows = workflows(ScriptedModel::new(
            BLOCKS,
            Ok(r##"{"articleContent":"# Recall\n\nIt improved."}"##.into()),
        ));
        let mut session = Session::default();
        let mut controller = ProcessController::default();

        flows.start_ingest(&mut controller, &mut session, SourceInput::File(path));
        run_to_idle(&mut controller, &mut session).await;
        assert_eq!(session.view(), &View::Insights);
        assert_eq!(session.source_label(), Some("Text File"));
        assert_eq!(session.insights().len(), 2);

        let ids: Vec<String> = session.insights().iter().map(|b| b.id.clone()).collect();
        session.add_to_skeleton(&ids[1]);
        session.add_to_skeleton(&ids[0]);

        assert!(flows.start_rewrite(&mut controller, &mut session).is_some());
        run_to_idle(&mut controller, &mut session).await;
        assert_eq!(session.view(), &View::Article);
        assert_eq!(session.article().unwrap().markdown, "# Recall\n\nIt improved.");

        let prompts = flows.model().prompts.lock().unwrap();
        assert!(prompts[0].contains("Text File"));
        assert!(prompts[1].find("\"sr\"").unwrap() < prompts[1].find("\"sp\"").unwrap());
    }

    #[tokio::test]
    async fn rewrite_needs_a_skeleton() {
        let flows = workflows(ScriptedModel::new(BLOCKS, Ok("{}".into())));
        let mut session = Session::default();
        let mut controller = ProcessController::default();
        assert!(flows.start_rewrite(&mut controller, &mut session).is_none());
    }

    #[tokio::test]
    async fn rewrite_failure_returns_to_insights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes").unwrap();

        let flows = workflows(ScriptedModel::new(
            BLOCKS,
            Err(SynthError::Ai("HTTP 503".into())),
        ));
        let mut session = Session::default();
        let mut controller = ProcessController::default();

        flows.start_ingest(&mut controller, &mut session, SourceInput::File(path));
        run_to_idle(&mut controller, &mut session).await;
        let first = session.insights()[0].id.clone();
        session.add_to_skeleton(&first);

        flows.start_rewrite(&mut controller, &mut session);
        run_to_idle(&mut controller, &mut session).await;
        assert_eq!(session.view(), &View::Insights);
        assert_eq!(session.notice(), Some(contentsynth_ai::REWRITE_FAILED));
        assert_eq!(session.skeleton().len(), 1);
    }

    #[tokio::test]
    async fn missing_file_fails_to_initial() {
        let flows = workflows(ScriptedModel::new(BLOCKS, Ok("{}".into())));
        let mut session = Session::default();
        let mut controller = ProcessController::default();

        flows.start_ingest(
            &mut controller,
            &mut session,
            SourceInput::File(PathBuf::from("/definitely/not/here.txt")),
        );
        run_to_idle(&mut controller, &mut session).await;
        assert_eq!(
            session.view(),
            &View::Initial {
                error: Some("Failed to read the file.".into())
            }
        );
    }
}
