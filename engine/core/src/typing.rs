//! Typing Presenter
//!
//! One-shot typewriter reveal: given a string, emit successively longer
//! prefixes, one character per `speed`, and stop after the full text. No
//! loop, no hold.
//!
//! The presenter itself only holds a scheduler; every call to
//! [`TypingPresenter::present`] owns its own state in the returned
//! [`Presentation`]. When the text to show changes, cancel the presentation
//! and start a new one; nothing is carried over.

use std::cell::RefCell;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::ReentrantMutex;
use tracing::{error, trace};

use crate::error::{EngineError, InvalidConfig};
use crate::roles::char_prefix;
use crate::scheduler::{TickScheduler, TimerHandle, TokioScheduler};

/// Default reveal speed (ms per character)
pub const DEFAULT_TYPING_SPEED_MS: u64 = 100;

type PartialFn = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// Starts one-shot typewriter reveals
#[derive(Clone)]
pub struct TypingPresenter {
    scheduler: Arc<dyn TickScheduler>,
}

impl TypingPresenter {
    /// Create a presenter on the given scheduler
    #[must_use]
    pub fn new(scheduler: Arc<dyn TickScheduler>) -> Self {
        Self { scheduler }
    }

    /// Create a presenter on the current Tokio runtime
    pub fn tokio() -> Result<Self, EngineError> {
        Ok(Self::new(Arc::new(TokioScheduler::current()?)))
    }

    /// Reveal `text` one character per `speed`, calling `on_update` with each
    /// partial string
    ///
    /// Nothing is emitted for the initial empty string; the first call
    /// carries one character. Empty text finishes immediately without
    /// scheduling anything.
    pub fn present<F>(&self, text: impl Into<String>, speed: Duration, on_update: F) -> Result<Presentation, EngineError>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        if speed.is_zero() {
            return Err(InvalidConfig::NonPositiveSpeed.into());
        }

        let text = text.into();
        let total = text.chars().count();
        let shared = Arc::new(PresentationShared {
            scheduler: Arc::clone(&self.scheduler),
            state: ReentrantMutex::new(RefCell::new(PresentationState {
                text,
                total,
                revealed: 0,
                speed,
                timer: None,
                on_update: Arc::new(on_update),
                cancelled: false,
                failure: None,
            })),
        });

        if total > 0 {
            let guard = shared.state.lock();
            let first = schedule_tick(&shared, speed)?;
            guard.borrow_mut().timer = Some(first);
        }

        trace!(chars = total, speed_ms = speed.as_millis() as u64, "Presentation started");
        Ok(Presentation { shared })
    }
}

impl std::fmt::Debug for TypingPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingPresenter")
            .field("scheduler", &self.scheduler.name())
            .finish()
    }
}

struct PresentationState {
    text: String,
    total: usize,
    revealed: usize,
    speed: Duration,
    timer: Option<TimerHandle>,
    on_update: PartialFn,
    cancelled: bool,
    failure: Option<EngineError>,
}

struct PresentationShared {
    scheduler: Arc<dyn TickScheduler>,
    state: ReentrantMutex<RefCell<PresentationState>>,
}

/// A running (or finished) reveal
///
/// Dropping it cancels any pending tick, same as [`Presentation::cancel`].
#[must_use = "dropping a Presentation cancels it"]
pub struct Presentation {
    shared: Arc<PresentationShared>,
}

impl Presentation {
    /// Stop the reveal; no further updates are emitted
    ///
    /// A no-op after completion or a previous cancel.
    pub fn cancel(&self) {
        let guard = self.shared.state.lock();
        let timer = {
            let mut state = guard.borrow_mut();
            if state.cancelled || state.revealed == state.total {
                return;
            }
            state.cancelled = true;
            state.timer.take()
        };
        if let Some(timer) = timer {
            timer.cancel();
            trace!("Presentation cancelled mid-reveal");
        }
    }

    /// Whether the full text has been emitted
    #[must_use]
    pub fn is_finished(&self) -> bool {
        let guard = self.shared.state.lock();
        let state = guard.borrow();
        state.revealed == state.total
    }

    /// Whether the reveal was cancelled before finishing
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        let guard = self.shared.state.lock();
        let state = guard.borrow();
        state.cancelled
    }

    /// Text revealed so far
    #[must_use]
    pub fn text(&self) -> String {
        let guard = self.shared.state.lock();
        let state = guard.borrow();
        char_prefix(&state.text, state.revealed).to_string()
    }

    /// `Err` if a scheduling failure cut the reveal short
    pub fn status(&self) -> Result<(), EngineError> {
        match &self.shared.state.lock().borrow().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Drop for Presentation {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("text", &self.text())
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn schedule_tick(shared: &Arc<PresentationShared>, delay: Duration) -> Result<TimerHandle, EngineError> {
    let weak = Arc::downgrade(shared);
    shared
        .scheduler
        .schedule(delay, Box::new(move |fired| on_tick(&weak, fired)))
}

fn on_tick(weak: &Weak<PresentationShared>, fired: Result<(), EngineError>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let guard = shared.state.lock();

    let (partial, on_update) = {
        let mut state = guard.borrow_mut();
        if state.cancelled || state.revealed == state.total {
            return;
        }
        if let Some(spent) = state.timer.take() {
            spent.disarm();
        }
        if let Err(err) = fired {
            error!(error = %err, "Presentation stopped: tick was lost");
            state.failure = Some(err);
            state.cancelled = true;
            return;
        }

        state.revealed += 1;
        if state.revealed < state.total {
            match schedule_tick(&shared, state.speed) {
                Ok(timer) => state.timer = Some(timer),
                Err(err) => {
                    error!(error = %err, "Presentation stopped: could not schedule next tick");
                    state.failure = Some(err);
                    state.cancelled = true;
                }
            }
        }

        (
            char_prefix(&state.text, state.revealed).to_string(),
            Arc::clone(&state.on_update),
        )
    };

    on_update(&partial);
}
