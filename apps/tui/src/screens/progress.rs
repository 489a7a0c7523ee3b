//! Progress screen shown while a process runs.

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use contentsynth_core::Session;

use super::Action;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(crate) struct ProgressScreen {
    frame: usize,
}

impl ProgressScreen {
    pub(crate) fn new() -> Self {
        Self { frame: 0 }
    }

    /// Advance the spinner by one frame.
    pub(crate) fn animate(&mut self) {
        self.frame = (self.frame + 1) % SPINNER.len();
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, session: &Session) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Message
                Constraint::Length(5), // Paused banner
                Constraint::Min(1),
            ])
            .split(area);

        let message = session.view().progress_message().unwrap_or("Working...");
        let line = Line::from(vec![
            Span::styled(SPINNER[self.frame], Style::default().fg(Color::Cyan)),
            Span::raw(format!(" {message} ({}s)", session.elapsed_secs())),
        ]);
        f.render_widget(
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Working ")),
            chunks[0],
        );

        let hint = if session.is_paused() {
            let banner = Paragraph::new(vec![
                Line::from("This is taking longer than expected.").style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Line::from("The request is still running in the background."),
                Line::from("c continue waiting · s stop and start over"),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(banner, chunks[1]);
            None
        } else {
            Some("s stop")
        };

        if let Some(hint) = hint {
            f.render_widget(
                Paragraph::new(hint)
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Center),
                chunks[2],
            );
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, session: &Session) -> Action {
        match code {
            KeyCode::Char('s') | KeyCode::Esc => Action::Stop,
            KeyCode::Char('c') if session.is_paused() => Action::Continue,
            _ => Action::None,
        }
    }
}
