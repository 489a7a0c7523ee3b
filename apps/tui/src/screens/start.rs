//! Start screen: URL field, file-path field, and the last error.

use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::Action;

/// Which input field is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Url,
    File,
}

pub(crate) struct StartScreen {
    url: String,
    file: String,
    focused: Field,
    editing: bool,
}

impl StartScreen {
    pub(crate) fn new() -> Self {
        Self {
            url: String::new(),
            file: String::new(),
            focused: Field::Url,
            editing: false,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    /// Forget typed input after a reset.
    pub(crate) fn clear(&mut self) {
        self.url.clear();
        self.file.clear();
        self.editing = false;
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, error: Option<&str>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // URL
                Constraint::Length(3), // File
                Constraint::Length(2), // Hint
                Constraint::Min(1),    // Error
            ])
            .split(area);

        f.render_widget(
            Paragraph::new(self.url.as_str()).block(self.field_block(Field::Url, " Public URL ")),
            chunks[0],
        );
        f.render_widget(
            Paragraph::new(self.file.as_str())
                .block(self.field_block(Field::File, " Local file (.ipynb, .md, .txt, ...) ")),
            chunks[1],
        );

        let hint = if self.editing {
            "Type to edit · Enter to fetch/load · Esc to stop editing"
        } else {
            "Enter to edit · Tab/↑/↓ to switch field · ? for help"
        };
        f.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            chunks[2],
        );

        if let Some(error) = error {
            let error_p = Paragraph::new(error)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Error "));
            f.render_widget(error_p, chunks[3]);
        }
    }

    fn field_block(&self, field: Field, title: &'static str) -> Block<'static> {
        let style = if self.focused == field && self.editing {
            Style::default().fg(Color::Yellow)
        } else if self.focused == field {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(style)
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode) -> Action {
        if self.editing {
            match code {
                KeyCode::Esc => self.editing = false,
                KeyCode::Tab => {
                    self.editing = false;
                    self.toggle_field();
                }
                KeyCode::Backspace => {
                    self.current_field_mut().pop();
                }
                KeyCode::Enter => return self.submit(),
                KeyCode::Char(c) => self.current_field_mut().push(c),
                _ => {}
            }
            return Action::None;
        }

        match code {
            KeyCode::Enter => self.editing = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_field(),
            _ => {}
        }
        Action::None
    }

    fn submit(&mut self) -> Action {
        match self.focused {
            Field::Url => {
                let url = self.url.trim();
                if url.is_empty() {
                    return Action::None;
                }
                self.editing = false;
                Action::FetchUrl(url.to_string())
            }
            Field::File => {
                let path = self.file.trim();
                if path.is_empty() {
                    return Action::None;
                }
                self.editing = false;
                Action::LoadFile(PathBuf::from(path))
            }
        }
    }

    fn current_field_mut(&mut self) -> &mut String {
        match self.focused {
            Field::Url => &mut self.url,
            Field::File => &mut self.file,
        }
    }

    fn toggle_field(&mut self) {
        self.focused = match self.focused {
            Field::Url => Field::File,
            Field::File => Field::Url,
        };
    }
}
