//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use contentsynth_ai::GeminiClient;
use contentsynth_core::{
    ExportMeta, ProcessController, Session, SourceInput, View, Workflows, write_article,
};
use contentsynth_ingest::ContentFetcher;
use contentsynth_shared::{AppConfig, Channel, InsightBlock, Voice, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ContentSynth: turn documents into curated, rewritten articles.
#[derive(Parser)]
#[command(
    name = "contentsynth",
    version,
    about = "Deconstruct documents into insight blocks and synthesize them into articles.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Where to read source content from. Exactly one is required.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub(crate) struct SourceArgs {
    /// Public URL to fetch through the content proxy.
    #[arg(long)]
    pub url: Option<String>,

    /// Local file to read (.ipynb notebooks are flattened).
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl SourceArgs {
    fn into_source(self) -> Result<SourceInput> {
        match (self.url, self.file) {
            (Some(url), None) => Ok(SourceInput::Url(url)),
            (None, Some(file)) => Ok(SourceInput::File(file)),
            _ => Err(eyre!("specify exactly one of --url or --file")),
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch or read a source and print the extracted text.
    Ingest {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Deconstruct a source into insight blocks.
    Deconstruct {
        #[command(flatten)]
        source: SourceArgs,

        /// Print blocks as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Deconstruct a source, select blocks, and synthesize an article.
    Synthesize {
        #[command(flatten)]
        source: SourceArgs,

        /// Target channel: "Blog Post", "LinkedIn", "X.com Post", "Technical Paper".
        #[arg(short, long)]
        channel: Option<Channel>,

        /// Target voice: Formal, Conversational, Creative, Journalistic.
        #[arg(long)]
        voice: Option<Voice>,

        /// Keep only blocks with at least this confidence (0.0 to 1.0).
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Keep only blocks whose type contains one of these (comma-separated).
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Write the article here (.md, or .html for rendered output).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Render a Markdown file to sanitized HTML.
    Render {
        /// Markdown file.
        path: PathBuf,
    },

    /// Launch the interactive TUI.
    Tui,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so article output on stdout stays clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "contentsynth=info",
        1 => "contentsynth=debug",
        _ => "contentsynth=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest { source } => cmd_ingest(source.into_source()?).await,
        Command::Deconstruct { source, json } => cmd_deconstruct(source.into_source()?, json).await,
        Command::Synthesize {
            source,
            channel,
            voice,
            min_confidence,
            types,
            out,
        } => {
            let selection = Selection {
                min_confidence,
                types,
            };
            cmd_synthesize(source.into_source()?, channel, voice, &selection, out).await
        }
        Command::Render { path } => cmd_render(&path).await,
        Command::Tui => cmd_tui().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest(source: SourceInput) -> Result<()> {
    let config = load_config()?;
    let fetcher = ContentFetcher::from_config(&config)?;

    let spinner = new_spinner()?;
    spinner.set_message(source.loading_message());
    let result = contentsynth_core::ingest(&source, &fetcher).await;
    spinner.finish_and_clear();

    let content = result.map_err(|e| eyre!(e.user_message()))?;
    println!("# {}\n", content.label);
    println!("{}", content.content);
    Ok(())
}

async fn cmd_deconstruct(source: SourceInput, json: bool) -> Result<()> {
    let config = load_config()?;
    let workflows = Workflows::from_config(&config, GeminiClient::from_config(&config)?)?;
    let mut session = Session::from_config(&config);
    let mut controller = ProcessController::from_config(&config);

    info!(?source, "deconstructing");
    workflows.start_ingest(&mut controller, &mut session, source);
    drive(&mut controller, &mut session).await?;
    ensure_no_error(&session)?;

    if json {
        println!("{}", serde_json::to_string_pretty(session.insights())?);
    } else {
        print_blocks(session.source_label(), session.insights());
    }
    Ok(())
}

/// Block filter for non-interactive synthesis.
struct Selection {
    min_confidence: Option<f64>,
    types: Vec<String>,
}

impl Selection {
    fn accepts(&self, block: &InsightBlock) -> bool {
        let confident = self
            .min_confidence
            .is_none_or(|min| block.confidence_score >= min);
        let kind = block.kind.to_lowercase();
        let typed = self.types.is_empty()
            || self
                .types
                .iter()
                .any(|t| !t.trim().is_empty() && kind.contains(&t.trim().to_lowercase()));
        confident && typed
    }
}

async fn cmd_synthesize(
    source: SourceInput,
    channel: Option<Channel>,
    voice: Option<Voice>,
    selection: &Selection,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config()?;
    let workflows = Workflows::from_config(&config, GeminiClient::from_config(&config)?)?;
    let mut session = Session::from_config(&config);
    let mut controller = ProcessController::from_config(&config);

    if let Some(channel) = channel {
        session.set_channel(channel);
    }
    if let Some(voice) = voice {
        session.set_voice(voice);
    }

    workflows.start_ingest(&mut controller, &mut session, source);
    drive(&mut controller, &mut session).await?;
    ensure_no_error(&session)?;

    let selected: Vec<String> = session
        .insights()
        .iter()
        .filter(|b| selection.accepts(b))
        .map(|b| b.id.clone())
        .collect();
    for id in &selected {
        session.add_to_skeleton(id);
    }
    info!(
        total = session.insights().len(),
        selected = selected.len(),
        "blocks selected for synthesis"
    );

    if workflows
        .start_rewrite(&mut controller, &mut session)
        .is_none()
    {
        return Err(eyre!(
            "no insight blocks matched the selection ({} found)",
            session.insights().len()
        ));
    }
    drive(&mut controller, &mut session).await?;
    if let Some(notice) = session.notice() {
        return Err(eyre!(notice.to_string()));
    }

    let article = session
        .article()
        .ok_or_else(|| eyre!("synthesis finished without an article"))?;

    match out {
        Some(path) => {
            write_article(&path, article, &ExportMeta::from_session(&session))?;
            println!("Article written to {}", path.display());
        }
        None => println!("{}", article.markdown),
    }
    Ok(())
}

async fn cmd_render(path: &Path) -> Result<()> {
    let markdown = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| eyre!("failed to read {}: {e}", path.display()))?;
    println!("{}", contentsynth_markdown::render_markdown(&markdown));
    Ok(())
}

async fn cmd_tui() -> Result<()> {
    info!("launching TUI");
    println!("Run `contentsynth-tui` to start the interactive interface.");
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Process display
// ---------------------------------------------------------------------------

fn new_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

fn spinner_message(session: &Session) -> String {
    let message = session.view().progress_message().unwrap_or("Working...");
    let mut line = format!("{message} ({}s)", session.elapsed_secs());
    if session.is_paused() {
        line.push_str("  This is taking longer than expected. Press Ctrl-C to stop.");
    }
    line
}

/// Pump process events into the session until it is idle, mirroring
/// progress on a spinner. Ctrl-C stops the process.
async fn drive(controller: &mut ProcessController, session: &mut Session) -> Result<()> {
    let spinner = new_spinner()?;
    spinner.set_message(spinner_message(session));

    while session.is_busy() {
        tokio::select! {
            event = controller.next_event() => {
                let Some(event) = event else { break };
                controller.apply(session, event);
                spinner.set_message(spinner_message(session));
            }
            _ = tokio::signal::ctrl_c() => {
                controller.stop_process(session);
                spinner.finish_and_clear();
                return Err(eyre!("stopped by user"));
            }
        }
    }

    spinner.finish_and_clear();
    Ok(())
}

fn ensure_no_error(session: &Session) -> Result<()> {
    match session.view() {
        View::Initial { error: Some(e) } => Err(eyre!(e.clone())),
        _ => Ok(()),
    }
}

fn print_blocks(label: Option<&str>, blocks: &[InsightBlock]) {
    println!();
    println!("  Source: {}", label.unwrap_or("unknown"));
    println!("  Blocks: {}", blocks.len());
    println!();
    for (i, block) in blocks.iter().enumerate() {
        println!(
            "  {:>2}. [{:>3}%] {}",
            i + 1,
            block.confidence_percent(),
            block.kind
        );
        println!("      {}", block.summary);
        if !block.tags.is_empty() {
            println!("      tags: {}", block.tags.join(", "));
        }
        println!();
    }
}
