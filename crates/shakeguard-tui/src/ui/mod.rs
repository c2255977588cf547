//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod prompt;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use shakeguard_core::Platform;

use crate::App;

/// Shell state shown next to the app state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    /// Platform the capability was registered for
    pub platform: Option<Platform>,
    /// Keyboard simulation currently attached
    pub keyboard_attached: bool,
    /// Confirmation prompt on screen. `None` if no prompt.
    pub prompt: Option<String>,
}

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App, screen: &Screen) {
    const BODY_MIN_HEIGHT: u16 = 8;
    const STATUS_HEIGHT: u16 = 1;
    const HELP_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(BODY_MIN_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(HELP_HEIGHT),
        ])
        .split(frame.area());

    let [body_area, status_area, help_area] = chunks.as_ref() else {
        return;
    };

    let block = Block::default().borders(Borders::ALL).title(" Shake to log out ");
    let body = Paragraph::new(body_lines(app, screen)).block(block);
    frame.render_widget(body, *body_area);
    status::render(frame, app, *status_area);
    frame.render_widget(Paragraph::new(help_line()), *help_area);

    if let Some(text) = &screen.prompt {
        prompt::render(frame, text, *body_area);
    }
}

/// Lines of the main panel.
pub fn body_lines(app: &App, screen: &Screen) -> Vec<Line<'static>> {
    let session = if app.is_authenticated() {
        Span::styled("logged in", Style::default().fg(Color::Green))
    } else {
        Span::styled("anonymous", Style::default().fg(Color::Yellow))
    };

    let detection = if app.detection_active() {
        Span::styled("listening", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("off", Style::default().fg(Color::DarkGray))
    };

    let source = match screen.platform {
        Some(platform) if platform.is_native() => "accelerometer (none in a terminal, press 'm')".to_string(),
        Some(_) if screen.keyboard_attached => "keyboard, press 's' to shake".to_string(),
        Some(_) => "keyboard (detached)".to_string(),
        None => "unresolved".to_string(),
    };

    let settings = app.settings();
    vec![
        Line::from(vec![Span::raw("Session:   "), session]),
        Line::from(vec![Span::raw("Detection: "), detection]),
        Line::from(format!("Source:    {source}")),
        Line::from(format!("Shakes:    {}", app.shake_count())),
        Line::from(""),
        Line::from(format!("Detect while anonymous: {}", on_off(settings.enabled_for_unauthenticated))),
        Line::from(format!("Ask before logout:      {}", on_off(settings.show_logout_prompt_on_shake))),
    ]
}

fn help_line() -> Line<'static> {
    Line::from(Span::styled(
        " l login/logout | u anonymous detection | p prompt | m manual shake | r permission | c reset | q quit",
        Style::default().fg(Color::DarkGray),
    ))
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}
