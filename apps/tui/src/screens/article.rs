//! Article screen: the synthesized article rendered for the terminal.

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use contentsynth_core::Session;
use contentsynth_markdown::{LineKind, TerminalLine, terminal_lines};

use super::Action;

pub(crate) struct ArticleScreen {
    scroll: u16,
}

impl ArticleScreen {
    pub(crate) fn new() -> Self {
        Self { scroll: 0 }
    }

    pub(crate) fn clear(&mut self) {
        self.scroll = 0;
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, session: &Session) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let lines: Vec<Line> = session
            .article()
            .map(|article| terminal_lines(&article.markdown))
            .unwrap_or_default()
            .into_iter()
            .map(styled_line)
            .collect();

        let options = session.options();
        let title = format!(" Article · {} · {} ", options.channel, options.voice);
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0))
                .block(Block::default().borders(Borders::ALL).title(title)),
            chunks[0],
        );
        f.render_widget(
            Paragraph::new("↑/↓ PgUp/PgDn scroll · w write to file · r start over")
                .style(Style::default().fg(Color::DarkGray)),
            chunks[1],
        );
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::Char('w') => return Action::Export,
            KeyCode::Char('r') => return Action::StartOver,
            _ => {}
        }
        Action::None
    }
}

fn styled_line(line: TerminalLine) -> Line<'static> {
    let style = match line.kind {
        LineKind::Heading(1) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineKind::Heading(_) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        LineKind::Quote => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
        LineKind::Code => Style::default().fg(Color::Green),
        LineKind::ListItem | LineKind::Paragraph | LineKind::Blank => Style::default(),
    };
    let text = match line.kind {
        LineKind::Quote => format!("│ {}", line.text),
        LineKind::Code => format!("    {}", line.text),
        _ => line.text,
    };
    Line::from(Span::styled(text, style))
}
