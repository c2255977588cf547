//! Confirmation dialog
//!
//! Centered yes/no box drawn over the main panel.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

const DIALOG_HEIGHT: u16 = 4; // text + hint inside borders
const DIALOG_PADDING: u16 = 4;

/// Render the prompt centered in `area`.
pub fn render(frame: &mut Frame, text: &str, area: Rect) {
    let width = (text.len() as u16)
        .saturating_add(DIALOG_PADDING)
        .max(20)
        .min(area.width);
    let height = DIALOG_HEIGHT.min(area.height);
    let dialog = Rect {
        x: area.x.saturating_add(area.width.saturating_sub(width) / 2),
        y: area.y.saturating_add(area.height.saturating_sub(height) / 2),
        width,
        height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let paragraph = Paragraph::new(vec![
        Line::from(text.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("[y] yes   [n] no"),
    ])
    .block(block);

    frame.render_widget(Clear, dialog);
    frame.render_widget(paragraph, dialog);
}
