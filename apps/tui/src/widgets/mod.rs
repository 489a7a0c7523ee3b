//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use contentsynth_shared::{BlockCategory, InsightBlock};

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {msg}"))
        .style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White),
        )
}

/// Badge colour for a block category.
pub(crate) fn category_color(category: BlockCategory) -> Color {
    match category {
        BlockCategory::Title => Color::Blue,
        BlockCategory::Outcome => Color::Green,
        BlockCategory::Code => Color::Gray,
        BlockCategory::Metric => Color::Magenta,
        BlockCategory::Hypothesis => Color::Yellow,
        BlockCategory::Limitation => Color::LightRed,
        BlockCategory::Other => Color::White,
    }
}

/// `[ Type ]` badge in the block's category colour.
pub(crate) fn type_badge(block: &InsightBlock) -> Span<'static> {
    Span::styled(
        format!("[{}]", block.kind),
        Style::default()
            .fg(Color::Black)
            .bg(category_color(block.category())),
    )
}

/// Create a centered rectangle with percentage width and height.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
