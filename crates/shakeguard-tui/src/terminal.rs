//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. While the keyboard simulation is
//! attached, key presses go to the shake capability first; everything else is
//! an app key binding.

use std::{
    io::{self, Stdout, stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use shakeguard_app::{App, AppEvent, Driver, KeyInput};
use shakeguard_core::{Environment, MotionInput, Platform};
use thiserror::Error;

use crate::{
    SystemEnv,
    platform::{self, TerminalKeys, TerminalShake},
    ui::{self, Screen},
};

/// Simulated latency of the logout backend call.
const LOGOUT_LATENCY: Duration = Duration::from_millis(300);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm) and rendering (ratatui). Keeps the last
/// rendered app state so a prompt can be drawn over it.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    env: SystemEnv,
    shake: TerminalShake,
    keys: TerminalKeys,
    platform: Platform,
    prompt: Option<String>,
    last_app: Option<App>,
}

impl TerminalDriver {
    /// Create a new terminal driver.
    pub fn new(
        env: SystemEnv,
        platform: Platform,
        shake: TerminalShake,
        keys: TerminalKeys,
    ) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self {
            terminal,
            event_stream,
            env,
            shake,
            keys,
            platform,
            prompt: None,
            last_app: None,
        })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Esc => Some(KeyInput::Esc),
            _ => None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Option<AppEvent> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(AppEvent::Quit);
        }

        if let KeyCode::Char(c) = key.code
            && self.keys.is_attached()
            && platform::feed(&self.shake, MotionInput::Key(c))
        {
            return None;
        }

        Self::convert_key(key.code).map(AppEvent::Key)
    }

    fn screen(&self) -> Screen {
        Screen {
            platform: Some(self.platform),
            keyboard_attached: self.keys.is_attached(),
            prompt: self.prompt.clone(),
        }
    }

    fn redraw(&mut self) -> Result<(), TerminalError> {
        let screen = self.screen();
        if let Some(app) = &self.last_app {
            self.terminal.draw(|frame| ui::render(frame, app, &screen))?;
        }
        Ok(())
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        match self.event_stream.next().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => Ok(self.handle_key(key)),
            Some(Ok(Event::Resize(..))) => {
                self.redraw()?;
                Ok(None)
            },
            Some(Ok(_)) => Ok(None),
            Some(Err(e)) => Err(TerminalError::Io(e)),
            None => Ok(Some(AppEvent::Quit)),
        }
    }

    async fn confirm(&mut self, prompt: &str) -> Result<bool, Self::Error> {
        self.prompt = Some(prompt.to_string());
        self.redraw()?;

        let answer = loop {
            match self.event_stream.next().await {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('y' | 'Y') | KeyCode::Enter => break Ok(true),
                    KeyCode::Char('n' | 'N') | KeyCode::Esc => break Ok(false),
                    _ => {},
                },
                Some(Ok(_)) => {},
                Some(Err(e)) => break Err(TerminalError::Io(e)),
                None => break Ok(false),
            }
        };

        self.prompt = None;
        answer
    }

    async fn logout(&mut self) -> Result<(), Self::Error> {
        tracing::info!("logging out");
        self.env.sleep(LOGOUT_LATENCY).await;
        Ok(())
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.last_app = Some(app.clone());
        self.redraw()
    }

    fn stop(&mut self) {
        self.prompt = None;
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
