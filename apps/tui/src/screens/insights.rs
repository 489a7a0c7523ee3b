//! Insights screen: block list on the left, skeleton outline on the right.
//!
//! Drag and drop is keyboard-driven. `g` picks a block up and drops it on
//! the skeleton; `m` picks a skeleton item up and moves it with ↑/↓.

use std::collections::HashSet;

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use contentsynth_core::Session;

use super::Action;
use crate::widgets::type_badge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Blocks,
    Skeleton,
}

pub(crate) struct InsightsScreen {
    pane: Pane,
    block_cursor: usize,
    skeleton_cursor: usize,
    expanded: HashSet<String>,
}

impl InsightsScreen {
    pub(crate) fn new() -> Self {
        Self {
            pane: Pane::Blocks,
            block_cursor: 0,
            skeleton_cursor: 0,
            expanded: HashSet::new(),
        }
    }

    /// Forget cursor and expansion state for a new set of insights.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, session: &Session) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.draw_blocks(f, columns[0], session);

        let notice_height = if session.notice().is_some() { 3 } else { 0 };
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),             // Options
                Constraint::Min(3),                // Skeleton
                Constraint::Length(notice_height), // Notice
                Constraint::Length(1),             // Hint
            ])
            .split(columns[1]);

        self.draw_options(f, right[0], session);
        self.draw_skeleton(f, right[1], session);

        if let Some(notice) = session.notice() {
            f.render_widget(
                Paragraph::new(notice)
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL)),
                right[2],
            );
        }

        f.render_widget(
            Paragraph::new(self.hint(session)).style(Style::default().fg(Color::DarkGray)),
            right[3],
        );
    }

    fn draw_blocks(&self, f: &mut Frame, area: Rect, session: &Session) {
        let dragged = session.drag().dragged_block();
        let items: Vec<ListItem> = session
            .insights()
            .iter()
            .map(|block| {
                let in_skeleton = session.skeleton().contains(&block.id);
                let marker = if dragged == Some(block.id.as_str()) {
                    Span::styled("⇢ ", Style::default().fg(Color::Yellow))
                } else if in_skeleton {
                    Span::styled("✓ ", Style::default().fg(Color::Green))
                } else {
                    Span::raw("  ")
                };
                let mut lines = vec![Line::from(vec![
                    marker,
                    type_badge(block),
                    Span::raw(" "),
                    Span::raw(block.summary.clone()),
                    Span::styled(
                        format!("  {}%", block.confidence_percent()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])];
                if self.expanded.contains(&block.id) {
                    for content_line in block.content.lines() {
                        lines.push(Line::from(format!("    {content_line}")));
                    }
                    if !block.tags.is_empty() {
                        lines.push(
                            Line::from(format!("    #{}", block.tags.join(" #")))
                                .style(Style::default().fg(Color::Cyan)),
                        );
                    }
                }
                ListItem::new(lines)
            })
            .collect();

        let title = format!(
            " Insights ({}) · {} ",
            session.insights().len(),
            session.source_label().unwrap_or("source")
        );
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(self.pane_style(Pane::Blocks)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if !session.insights().is_empty() {
            state.select(Some(self.block_cursor));
        }
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_options(&self, f: &mut Frame, area: Rect, session: &Session) {
        let options = session.options();
        let lines = vec![
            Line::from(vec![
                Span::raw("Channel: "),
                Span::styled(
                    options.channel.label(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled("  (c/C)", Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(vec![
                Span::raw("Voice:   "),
                Span::styled(
                    options.voice.label(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled("  (v/V)", Style::default().fg(Color::DarkGray)),
            ]),
        ];
        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Rewrite ")),
            area,
        );
    }

    fn draw_skeleton(&self, f: &mut Frame, area: Rect, session: &Session) {
        let drag = session.drag();
        let receiving = drag.dragged_block().is_some() && drag.is_over_skeleton();
        let blocks = session.skeleton_blocks();

        let items: Vec<ListItem> = if blocks.is_empty() {
            vec![ListItem::new(
                Line::from("Add blocks with a, or drag them here with g.")
                    .style(Style::default().fg(Color::DarkGray)),
            )]
        } else {
            blocks
                .iter()
                .enumerate()
                .map(|(i, block)| {
                    let style = if drag.dragged_index() == Some(i) {
                        Style::default().fg(Color::Yellow)
                    } else if drag.is_drop_target(i) {
                        Style::default().add_modifier(Modifier::UNDERLINED)
                    } else {
                        Style::default()
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{}. ", i + 1)),
                        type_badge(block),
                        Span::raw(" "),
                        Span::raw(block.summary.clone()),
                    ]))
                    .style(style)
                })
                .collect()
        };

        let border = if receiving {
            Style::default().fg(Color::Yellow)
        } else {
            self.pane_style(Pane::Skeleton)
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Skeleton ({}) ", blocks.len()))
                    .border_style(border),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if self.pane == Pane::Skeleton && !blocks.is_empty() {
            state.select(Some(self.skeleton_cursor));
        }
        f.render_stateful_widget(list, area, &mut state);
    }

    fn pane_style(&self, pane: Pane) -> Style {
        if self.pane == pane {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        }
    }

    fn hint(&self, session: &Session) -> &'static str {
        let drag = session.drag();
        if drag.dragged_block().is_some() {
            "Enter/g drop on skeleton · Esc cancel"
        } else if drag.dragged_index().is_some() {
            "↑/↓ choose position · Enter/m drop · Esc cancel"
        } else if self.pane == Pane::Blocks {
            "a add/remove · g drag · Enter expand · Tab skeleton · s synthesize"
        } else {
            "d remove · m move · Tab blocks · s synthesize · r start over"
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, session: &mut Session) -> Action {
        self.clamp(session);

        if session.drag().dragged_block().is_some() {
            return self.handle_block_drag(code, session);
        }
        if session.drag().dragged_index().is_some() {
            return self.handle_item_drag(code, session);
        }

        match code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.pane = match self.pane {
                    Pane::Blocks => Pane::Skeleton,
                    Pane::Skeleton => Pane::Blocks,
                };
                Action::None
            }
            KeyCode::Char('c') => {
                session.set_channel(session.options().channel.next());
                Action::None
            }
            KeyCode::Char('C') => {
                session.set_channel(session.options().channel.prev());
                Action::None
            }
            KeyCode::Char('v') => {
                session.set_voice(session.options().voice.next());
                Action::None
            }
            KeyCode::Char('V') => {
                session.set_voice(session.options().voice.prev());
                Action::None
            }
            KeyCode::Char('s') => {
                if session.can_synthesize() {
                    Action::Synthesize
                } else {
                    Action::Status("Add at least one block to the skeleton first".into())
                }
            }
            KeyCode::Char('r') => Action::StartOver,
            KeyCode::Char('x') => {
                session.dismiss_notice();
                Action::None
            }
            _ => match self.pane {
                Pane::Blocks => self.handle_blocks_key(code, session),
                Pane::Skeleton => self.handle_skeleton_key(code, session),
            },
        }
    }

    fn handle_blocks_key(&mut self, code: KeyCode, session: &mut Session) -> Action {
        let count = session.insights().len();
        let Some(id) = session.insights().get(self.block_cursor).map(|b| b.id.clone()) else {
            return Action::None;
        };
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.block_cursor = self.block_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.block_cursor + 1 < count {
                    self.block_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if !self.expanded.remove(&id) {
                    self.expanded.insert(id);
                }
            }
            KeyCode::Char('a') => {
                session.toggle_in_skeleton(&id);
            }
            KeyCode::Char('g') => {
                session.start_block_drag(&id);
                session.skeleton_drag_over();
            }
            _ => {}
        }
        Action::None
    }

    fn handle_skeleton_key(&mut self, code: KeyCode, session: &mut Session) -> Action {
        let count = session.skeleton().len();
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.skeleton_cursor = self.skeleton_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.skeleton_cursor + 1 < count {
                    self.skeleton_cursor += 1;
                }
            }
            KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                if let Some(id) = session.skeleton().ids().get(self.skeleton_cursor).cloned() {
                    session.remove_from_skeleton(&id);
                    self.clamp(session);
                }
            }
            KeyCode::Char('m') if count > 1 => {
                session.start_item_drag(self.skeleton_cursor);
                session.item_drag_over(self.skeleton_cursor);
            }
            _ => {}
        }
        Action::None
    }

    fn handle_block_drag(&mut self, code: KeyCode, session: &mut Session) -> Action {
        match code {
            KeyCode::Enter | KeyCode::Char('g') => {
                if !session.drop_on_skeleton() {
                    return Action::Status("Block is already in the skeleton".into());
                }
            }
            KeyCode::Esc => session.end_block_drag(),
            _ => {}
        }
        Action::None
    }

    fn handle_item_drag(&mut self, code: KeyCode, session: &mut Session) -> Action {
        let count = session.skeleton().len();
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.skeleton_cursor = self.skeleton_cursor.saturating_sub(1);
                session.item_drag_over(self.skeleton_cursor);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.skeleton_cursor + 1 < count {
                    self.skeleton_cursor += 1;
                }
                session.item_drag_over(self.skeleton_cursor);
            }
            KeyCode::Enter | KeyCode::Char('m') => {
                session.drop_on_item();
            }
            KeyCode::Esc => session.end_item_drag(),
            _ => {}
        }
        Action::None
    }

    fn clamp(&mut self, session: &Session) {
        self.block_cursor = self.block_cursor.min(session.insights().len().saturating_sub(1));
        self.skeleton_cursor = self
            .skeleton_cursor
            .min(session.skeleton().len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use contentsynth_core::{ProcessKind, TaskOutcome, View};
    use contentsynth_shared::InsightBlock;

    use super::*;

    fn block(id: &str) -> InsightBlock {
        InsightBlock {
            id: id.into(),
            kind: "Result".into(),
            content: "c".into(),
            summary: format!("summary {id}"),
            tags: vec![],
            confidence_score: 0.5,
        }
    }

    fn session_with(ids: &[&str]) -> Session {
        let mut session = Session::default();
        let generation = session.begin_process(
            ProcessKind::Ingest,
            View::Loading {
                message: "loading".into(),
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
    fn a_toggles_block_membership() {
        let mut session = session_with(&["a", "b"]);
        let mut screen = InsightsScreen::new();
        screen.handle_key(KeyCode::Down, &mut session);
        screen.handle_key(KeyCode::Char('a'), &mut session);
        assert_eq!(session.skeleton().ids(), ["b".to_string()]);
        screen.handle_key(KeyCode::Char('a'), &mut session);
        assert!(session.skeleton().is_empty());
    }

    #[test]
    fn keyboard_drag_adds_block_to_skeleton() {
        let mut session = session_with(&["a", "b"]);
        let mut screen = InsightsScreen::new();
        screen.handle_key(KeyCode::Char('g'), &mut session);
        assert_eq!(session.drag().dragged_block(), Some("a"));
        screen.handle_key(KeyCode::Enter, &mut session);
        assert_eq!(session.skeleton().ids(), ["a".to_string()]);
        assert!(!session.drag().is_active());
    }

    #[test]
    fn escape_cancels_block_drag() {
        let mut session = session_with(&["a"]);
        let mut screen = InsightsScreen::new();
        screen.handle_key(KeyCode::Char('g'), &mut session);
        screen.handle_key(KeyCode::Esc, &mut session);
        assert!(session.skeleton().is_empty());
        assert!(!session.drag().is_active());
    }

    #[test]
    fn moving_a_skeleton_item_reorders() {
        let mut session = session_with(&["a", "b", "c"]);
        for id in ["a", "b", "c"] {
            session.add_to_skeleton(id);
        }
        let mut screen = InsightsScreen::new();
        screen.handle_key(KeyCode::Tab, &mut session);
        screen.handle_key(KeyCode::Char('m'), &mut session);
        screen.handle_key(KeyCode::Down, &mut session);
        screen.handle_key(KeyCode::Down, &mut session);
        screen.handle_key(KeyCode::Enter, &mut session);
        assert_eq!(
            session.skeleton().ids(),
            ["b".to_string(), "c".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn synthesize_requires_a_skeleton() {
        let mut session = session_with(&["a"]);
        let mut screen = InsightsScreen::new();
        assert!(matches!(
            screen.handle_key(KeyCode::Char('s'), &mut session),
            Action::Status(_)
        ));
        screen.handle_key(KeyCode::Char('a'), &mut session);
        assert_eq!(
            screen.handle_key(KeyCode::Char('s'), &mut session),
            Action::Synthesize
        );
    }

    #[test]
    fn c_cycles_channel() {
        let mut session = session_with(&["a"]);
        let mut screen = InsightsScreen::new();
        let before = session.options().channel;
        screen.handle_key(KeyCode::Char('c'), &mut session);
        assert_eq!(session.options().channel, before.next());
        screen.handle_key(KeyCode::Char('C'), &mut session);
        assert_eq!(session.options().channel, before);
    }
}
