//! Core TUI application state and event loop.

use std::io;
use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs};
use tracing::{info, warn};

use contentsynth_ai::{GeminiClient, GenerativeModel};
use contentsynth_core::{
    ExportMeta, ProcessController, Session, SourceInput, View, Workflows, write_article,
};
use contentsynth_shared::load_config;

use crate::screens::{Action, ArticleScreen, InsightsScreen, ProgressScreen, StartScreen};
use crate::widgets::{centered_rect, status_bar};

const STEPS: [&str; 3] = ["1 Source", "2 Insights", "3 Article"];

/// Application state.
pub(crate) struct App {
    session: Session,
    controller: ProcessController,
    workflows: Workflows<GeminiClient>,
    start: StartScreen,
    progress: ProgressScreen,
    insights: InsightsScreen,
    article: ArticleScreen,
    /// Whether the app should quit.
    should_quit: bool,
    /// Status message shown in bottom bar.
    status: String,
    /// Whether help overlay is visible.
    show_help: bool,
}

impl App {
    fn new(
        session: Session,
        controller: ProcessController,
        workflows: Workflows<GeminiClient>,
    ) -> Self {
        Self {
            session,
            controller,
            workflows,
            start: StartScreen::new(),
            progress: ProgressScreen::new(),
            insights: InsightsScreen::new(),
            article: ArticleScreen::new(),
            should_quit: false,
            status: "Ready · press ? for help".to_string(),
            show_help: false,
        }
    }

    fn is_editing(&self) -> bool {
        matches!(self.session.view(), View::Initial { .. }) && self.start.is_editing()
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::FetchUrl(url) => self.start_ingest(SourceInput::Url(url)),
            Action::LoadFile(path) => self.start_ingest(SourceInput::File(path)),
            Action::Stop => {
                self.controller.stop_process(&mut self.session);
                self.status = "Stopped".into();
            }
            Action::Continue => {
                self.controller.continue_process(&mut self.session);
                self.status = "Still waiting...".into();
            }
            Action::Synthesize => {
                self.article.clear();
                if self
                    .workflows
                    .start_rewrite(&mut self.controller, &mut self.session)
                    .is_some()
                {
                    self.status = format!(
                        "Synthesizing with {}",
                        self.workflows.model().model_name()
                    );
                }
            }
            Action::StartOver => {
                self.controller.stop_process(&mut self.session);
                self.start.clear();
                self.insights.clear();
                self.article.clear();
                self.status = "Ready".into();
            }
            Action::Export => self.export(),
            Action::Status(message) => self.status = message,
        }
    }

    fn start_ingest(&mut self, source: SourceInput) {
        self.insights.clear();
        self.status = source.loading_message();
        self.workflows
            .start_ingest(&mut self.controller, &mut self.session, source);
    }

    fn export(&mut self) {
        let Some(article) = self.session.article() else {
            return;
        };
        let meta = ExportMeta::from_session(&self.session);
        let file_name = meta.default_file_name();
        let path = Path::new(&file_name);
        match write_article(path, article, &meta) {
            Ok(()) => {
                info!(path = %path.display(), "article written");
                self.status = format!("Wrote {}", path.display());
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.status = e.user_message();
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        // Global keybindings (always active)
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('q') if !self.is_editing() => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') if !self.is_editing() => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        // If help is showing, consume any key to dismiss
        if self.show_help {
            self.show_help = false;
            return;
        }

        let view = self.session.view().clone();
        let action = match view {
            View::Initial { .. } => self.start.handle_key(code),
            View::Loading { .. } | View::Rewriting { .. } => {
                self.progress.handle_key(code, &self.session)
            }
            View::Insights => self.insights.handle_key(code, &mut self.session),
            View::Article => self.article.handle_key(code),
        };
        self.apply(action);
    }
}

/// Entry point: builds collaborators, sets up terminal, runs event loop,
/// restores terminal.
pub(crate) async fn run() -> Result<()> {
    let config = load_config()?;
    let model = GeminiClient::from_config(&config)?;
    let workflows = Workflows::from_config(&config, model)?;
    let app = App::new(
        Session::from_config(&config),
        ProcessController::from_config(&config),
        workflows,
    );
    info!(model = %config.gemini.model, "tui starting");

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        app.controller.drain(&mut app.session);
        app.progress.animate();

        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn step_index(view: &View) -> usize {
    match view {
        View::Initial { .. } | View::Loading { .. } => 0,
        View::Insights | View::Rewriting { .. } => 1,
        View::Article => 2,
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Step bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let steps = Tabs::new(STEPS.iter().map(|s| Line::from(*s)).collect::<Vec<_>>())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" ContentSynth "),
        )
        .select(step_index(app.session.view()))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" → ");
    f.render_widget(steps, chunks[0]);

    match app.session.view() {
        View::Initial { error } => app.start.draw(f, chunks[1], error.as_deref()),
        View::Loading { .. } | View::Rewriting { .. } => {
            app.progress.draw(f, chunks[1], &app.session)
        }
        View::Insights => app.insights.draw(f, chunks[1], &app.session),
        View::Article => app.article.draw(f, chunks[1], &app.session),
    }

    f.render_widget(status_bar(&app.status), chunks[2]);

    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let help_text = vec![
        Line::from("Keybindings").style(bold),
        Line::from(""),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Source:").style(bold),
        Line::from("  Enter        Edit field / fetch or load"),
        Line::from("  Tab          Switch between URL and file"),
        Line::from(""),
        Line::from("Working:").style(bold),
        Line::from("  s / Esc      Stop and start over"),
        Line::from("  c            Keep waiting when paused"),
        Line::from(""),
        Line::from("Insights:").style(bold),
        Line::from("  ↑/↓          Navigate"),
        Line::from("  Enter        Expand block"),
        Line::from("  a / g        Add to skeleton / drag onto it"),
        Line::from("  Tab          Switch blocks / skeleton"),
        Line::from("  d / m        Remove / move skeleton item"),
        Line::from("  c / v        Cycle channel / voice"),
        Line::from("  s            Synthesize article"),
        Line::from(""),
        Line::from("Article:").style(bold),
        Line::from("  w            Write article to current directory"),
        Line::from("  r            Start over"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help · press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_follow_the_view() {
        assert_eq!(step_index(&View::Initial { error: None }), 0);
        assert_eq!(
            step_index(&View::Rewriting {
                message: "x".into()
            }),
            1
        );
        assert_eq!(step_index(&View::Article), 2);
    }
}
