//! Scheduled Ticks
//!
//! Every animation in this crate is driven by the same primitive: set a
//! single-shot timer, run a callback when it fires, and (maybe) schedule the
//! next one. [`TickScheduler`] is that primitive; [`TimerHandle`] is the
//! scoped resource it hands back.
//!
//! # Implementations
//!
//! - [`TokioScheduler`]: real timers on a Tokio runtime
//! - [`ManualScheduler`]: a virtual clock stepped by the caller, for tests
//!   and headless drivers
//!
//! # Cancellation
//!
//! A `TimerHandle` cancels its timer when dropped or when
//! [`TimerHandle::cancel`] is called. A handle whose callback already fired
//! should be released with [`TimerHandle::disarm`].
//!
//! # Lost Ticks
//!
//! A tick is called with `Err` when its scheduler drops the timer without
//! firing it and without being cancelled (e.g. the Tokio runtime shut
//! down). Engines treat that the same as a failed `schedule` call. A
//! cancelled tick is never called.

mod manual;
mod runtime;

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;

use std::fmt;
use std::time::Duration;

use crate::error::EngineError;

/// Callback run when a scheduled tick fires, or `Err` if the timer was lost
pub type Tick = Box<dyn FnOnce(Result<(), EngineError>) + Send + 'static>;

/// Source of single-shot timers
pub trait TickScheduler: Send + Sync + 'static {
    /// Scheduler name (for logging)
    fn name(&self) -> &str;

    /// Run `tick` once after `delay`
    ///
    /// Returns a handle that cancels the tick if it has not fired yet.
    fn schedule(&self, delay: Duration, tick: Tick) -> Result<TimerHandle, EngineError>;
}

/// Cancellation handle for one scheduled tick
#[must_use = "dropping a TimerHandle cancels the timer"]
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl TimerHandle {
    /// Wrap a cancellation action
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel the timer (no-op if it already fired)
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Release the handle without cancelling
    ///
    /// Used from inside the tick itself, once the timer has fired.
    pub fn disarm(mut self) {
        self.cancel = None;
    }

    /// Whether dropping this handle would cancel anything
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.is_armed())
            .finish()
    }
}
