//! Main Application
//!
//! The App owns the mounted engine pieces and the draw loop:
//! - Event loop (keyboard, resize) via `EventStream` inside `tokio::select!`
//! - A [`HeroHeadline`] whose watch channel wakes the loop on every update
//! - A one-shot greeting revealed by a [`TypingPresenter`]
//!
//! The caret blinks on wall-clock time, so the loop also wakes on a frame
//! timer. On exit the headline is unmounted and the greeting cancelled
//! before the terminal is restored.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tokio::time::Instant;
use tracing::{debug, warn};

use typecycle_core::{
    HeroHeadline, Presentation, TickScheduler, TokioScheduler, TypecycleConfig, TypingPresenter,
};

use crate::theme;
use crate::widgets::Headline;

/// Target ~10 FPS for the caret blink
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Greeting line state
enum Greeting {
    None,
    Revealing(Presentation),
    /// Shown in full when the reveal could not start
    Static(String),
}

impl Greeting {
    fn text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Revealing(presentation) => presentation.text(),
            Self::Static(text) => text.clone(),
        }
    }

    fn cancel(&self) {
        if let Self::Revealing(presentation) = self {
            presentation.cancel();
        }
    }
}

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// Animated role headline
    headline: HeroHeadline,
    /// One-shot greeting above the headline
    greeting: Greeting,
    /// Caret blink reference point
    mounted_at: Instant,
    /// Developer mode (status line)
    dev_mode: bool,
}

impl App {
    /// Mount the headline and start the greeting on the current runtime
    pub fn new(config: &TypecycleConfig, dev_mode: bool) -> anyhow::Result<Self> {
        let scheduler: Arc<dyn TickScheduler> = Arc::new(TokioScheduler::current()?);

        let headline = HeroHeadline::mount(config.headline_settings(), Arc::clone(&scheduler));

        let greeting = match &config.greeting {
            None => Greeting::None,
            Some(text) => {
                let presenter = TypingPresenter::new(scheduler);
                let speed = Duration::from_millis(config.greeting_speed_ms);
                match presenter.present(text.clone(), speed, |_| {}) {
                    Ok(presentation) => Greeting::Revealing(presentation),
                    Err(err) => {
                        warn!(error = %err, "Greeting reveal unavailable, showing it in full");
                        Greeting::Static(text.clone())
                    }
                }
            }
        };

        debug!(
            source = %config.source(),
            fallback = headline.is_fallback(),
            "App mounted"
        );

        Ok(Self {
            running: true,
            headline,
            greeting,
            mounted_at: Instant::now(),
            dev_mode,
        })
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut headline_rx = self.headline.watch();

        // Render initial frame immediately
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            self.shutdown();
                            return Err(e.into());
                        }
                        None => self.running = false,
                    }
                }

                // Headline text changed
                Ok(()) = headline_rx.changed() => {}

                // Frame tick for the caret and greeting
                _ = tokio::time::sleep(FRAME_INTERVAL) => {}
            }

            self.render(terminal)?;
        }

        self.shutdown();
        Ok(())
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            // Toggle dev mode
            KeyCode::F(12) => self.dev_mode = !self.dev_mode,

            _ => {}
        }
    }

    /// Whether the loop should keep going
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop every animation (idempotent)
    pub fn shutdown(&mut self) {
        self.running = false;
        self.headline.unmount();
        self.greeting.cancel();
    }

    /// Draw one frame
    pub fn render<B: Backend>(&self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        terminal.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let [main, status] = if self.dev_mode {
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area)
        } else {
            [area, Rect::new(area.x, area.bottom(), area.width, 0)]
        };

        let greeting = self.greeting.text();
        let text = self.headline.text();
        let caret = HeroHeadline::caret_visible(self.mounted_at.elapsed());

        let widget = Headline::new(&text)
            .greeting(&greeting, theme::greeting_style())
            .style(theme::headline_style(self.headline.is_fallback()))
            .caret(caret, theme::caret_style());
        frame.render_widget(widget, main);

        if self.dev_mode {
            frame.render_widget(
                Paragraph::new(Line::styled(self.status_line(), Style::default().fg(theme::DIM_GRAY))),
                status,
            );
        }
    }

    fn status_line(&self) -> String {
        match self.headline.snapshot() {
            Some(snapshot) => format!(
                "{:?} | role {} | revealed {} | {:?}",
                snapshot.phase,
                snapshot.role_index,
                snapshot.revealed,
                self.headline.settings().reveal
            ),
            None => "static fallback".to_string(),
        }
    }
}
