//! Role Cycler
//!
//! Types a role one character per tick, holds the full text for a pause,
//! then clears and moves to the next role, forever. Subscribers receive every
//! new display text.
//!
//! # Lifecycle
//!
//! ```text
//! RoleCycler::start(config, scheduler)   first tick scheduled after char_delay
//!     │
//!     ├─ subscribe(cb)                    cb("<current text>") synchronously
//!     │      ... tick ... cb("F") ... cb("FU") ... cb("") ...
//!     │
//!     └─ dispose() / drop                 pending tick cancelled, no more callbacks
//! ```
//!
//! # Sequencing
//!
//! At most one timer is outstanding per cycler. The next tick is scheduled
//! from inside the current one, after the state transition is applied and
//! before subscribers are notified.
//!
//! State lives behind a reentrant lock. A tick holds it while notifying
//! subscribers, so a `dispose` from another thread waits for the emission
//! to finish, and a `dispose` from inside a callback re-enters and stops the
//! remaining callbacks.

mod machine;

pub use machine::{Phase, RoleMachine, Step};

use std::cell::RefCell;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::ReentrantMutex;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, trace};

use crate::error::{EngineError, InvalidConfig};
use crate::roles::{EngineConfig, RoleList};
use crate::scheduler::{TickScheduler, TimerHandle, TokioScheduler};

type UpdateFn = Arc<dyn Fn(&str) + Send + Sync + 'static>;
type FailureFn = Arc<dyn Fn(&EngineError) + Send + Sync + 'static>;

/// Identifier of one subscriber within a cycler
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SubscriberId(u64);

/// Point-in-time view of a cycler's state
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CyclerSnapshot {
    /// Index of the active role
    pub role_index: usize,
    /// Characters revealed
    pub revealed: usize,
    /// Current phase
    pub phase: Phase,
    /// Current display text
    pub text: String,
}

struct CyclerState {
    machine: RoleMachine,
    char_delay: Duration,
    pause: Duration,
    /// The single outstanding timer, if any
    timer: Option<TimerHandle>,
    subscribers: Vec<(SubscriberId, UpdateFn)>,
    next_subscriber: u64,
    on_failure: Option<FailureFn>,
    disposed: bool,
    failure: Option<EngineError>,
}

impl CyclerState {
    fn is_subscribed(&self, id: SubscriberId) -> bool {
        !self.disposed && self.subscribers.iter().any(|(sid, _)| *sid == id)
    }

    fn snapshot(&self) -> CyclerSnapshot {
        CyclerSnapshot {
            role_index: self.machine.role_index(),
            revealed: self.machine.revealed(),
            phase: self.machine.phase(),
            text: self.machine.display_text().to_string(),
        }
    }
}

struct CyclerShared {
    scheduler: Arc<dyn TickScheduler>,
    state: ReentrantMutex<RefCell<CyclerState>>,
}

/// Handle to a running role cycler
///
/// Dropping the handle disposes the cycler.
pub struct RoleCycler {
    shared: Arc<CyclerShared>,
}

impl RoleCycler {
    /// Create a cycler and schedule its first tick
    ///
    /// The cycler starts at the first role with nothing revealed. If the
    /// first tick cannot be scheduled the error is returned and nothing runs.
    pub fn start(config: EngineConfig, scheduler: Arc<dyn TickScheduler>) -> Result<Self, EngineError> {
        let char_delay = config.char_delay();
        let pause = config.pause();
        let role_count = config.roles().len();
        let machine = RoleMachine::new(config.roles().clone());

        let shared = Arc::new(CyclerShared {
            scheduler,
            state: ReentrantMutex::new(RefCell::new(CyclerState {
                machine,
                char_delay,
                pause,
                timer: None,
                subscribers: Vec::new(),
                next_subscriber: 0,
                on_failure: None,
                disposed: false,
                failure: None,
            })),
        });

        {
            // The handle must be stored before the first tick can run.
            let guard = shared.state.lock();
            let first = schedule_tick(&shared, char_delay)?;
            guard.borrow_mut().timer = Some(first);
        }

        debug!(
            scheduler = shared.scheduler.name(),
            roles = role_count,
            char_delay_ms = char_delay.as_millis() as u64,
            pause_ms = pause.as_millis() as u64,
            "Role cycler started"
        );

        Ok(Self { shared })
    }

    /// Validate raw parts and start
    ///
    /// Invalid input fails with [`EngineError::InvalidConfig`] before any
    /// timer is created.
    pub fn from_parts<I, S>(
        roles: I,
        char_delay: Duration,
        pause: Duration,
        scheduler: Arc<dyn TickScheduler>,
    ) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = EngineConfig::new(RoleList::new(roles)?, char_delay, pause)?;
        Self::start(config, scheduler)
    }

    /// Start on the Tokio runtime of the calling context
    pub fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        Self::start(config, Arc::new(TokioScheduler::current()?))
    }

    /// Register a callback for display text updates
    ///
    /// `on_update` is invoked once, synchronously, with the current text,
    /// then on every transition until unsubscribed or disposed. Subscribing
    /// to a disposed cycler returns an inert subscription.
    pub fn subscribe<F>(&self, on_update: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let callback: UpdateFn = Arc::new(on_update);
        let guard = self.shared.state.lock();

        let (id, text) = {
            let mut state = guard.borrow_mut();
            if state.disposed {
                return Subscription::inert();
            }
            let id = SubscriberId(state.next_subscriber);
            state.next_subscriber += 1;
            state.subscribers.push((id, Arc::clone(&callback)));
            (id, state.machine.display_text().to_string())
        };

        trace!(subscriber = id.0, "Subscriber added");
        callback(&text);

        Subscription {
            target: Some((Arc::downgrade(&self.shared), id)),
        }
    }

    /// Channel form of [`RoleCycler::subscribe`]
    ///
    /// The receiver is seeded with the current text and always holds the
    /// latest one. Updates stop when the subscription is dropped.
    pub fn watch(&self) -> (watch::Receiver<String>, Subscription) {
        let (tx, rx) = watch::channel(self.text());
        let subscription = self.subscribe(move |text| {
            tx.send_replace(text.to_string());
        });
        (rx, subscription)
    }

    /// Register a hook run once if the cycler dies from a scheduling failure
    pub fn on_failure<F>(&self, hook: F)
    where
        F: Fn(&EngineError) + Send + Sync + 'static,
    {
        let guard = self.shared.state.lock();
        guard.borrow_mut().on_failure = Some(Arc::new(hook));
    }

    /// Change the per-character delay without resetting the cycle
    ///
    /// The pending tick keeps its deadline; ticks scheduled after it use the
    /// new delay.
    pub fn set_char_delay(&self, char_delay: Duration) -> Result<(), EngineError> {
        if char_delay.is_zero() {
            return Err(InvalidConfig::NonPositiveCharDelay { millis: 0 }.into());
        }
        let guard = self.shared.state.lock();
        guard.borrow_mut().char_delay = char_delay;
        debug!(char_delay_ms = char_delay.as_millis() as u64, "Character delay changed");
        Ok(())
    }

    /// Stop the cycler
    ///
    /// Cancels the pending tick and drops all subscribers. Idempotent.
    pub fn dispose(&self) {
        let guard = self.shared.state.lock();
        let (timer, subscribers) = {
            let mut state = guard.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.on_failure = None;
            (state.timer.take(), std::mem::take(&mut state.subscribers))
        };

        if let Some(timer) = timer {
            timer.cancel();
        }
        drop(subscribers);
        debug!("Role cycler disposed");
    }

    /// Whether [`RoleCycler::dispose`] has run (or a fatal error stopped it)
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.state.lock().borrow().disposed
    }

    /// Current display text
    #[must_use]
    pub fn text(&self) -> String {
        self.shared.state.lock().borrow().machine.display_text().to_string()
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> CyclerSnapshot {
        self.shared.state.lock().borrow().snapshot()
    }

    /// `Err` if a scheduling failure stopped the cycler
    pub fn status(&self) -> Result<(), EngineError> {
        match &self.shared.state.lock().borrow().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Drop for RoleCycler {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for RoleCycler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleCycler")
            .field("snapshot", &self.snapshot())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

fn schedule_tick(shared: &Arc<CyclerShared>, delay: Duration) -> Result<TimerHandle, EngineError> {
    let weak = Arc::downgrade(shared);
    shared
        .scheduler
        .schedule(delay, Box::new(move |fired| on_tick(&weak, fired)))
}

fn on_tick(weak: &Weak<CyclerShared>, fired: Result<(), EngineError>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let guard = shared.state.lock();

    let (text, subscribers, failure) = {
        let mut state = guard.borrow_mut();
        if state.disposed {
            return;
        }
        if let Some(spent) = state.timer.take() {
            spent.disarm();
        }

        let next = fired.and_then(|()| {
            let step = state.machine.advance();
            let delay = state.machine.next_delay(state.char_delay, state.pause);
            trace!(
                ?step,
                role_index = state.machine.role_index(),
                revealed = state.machine.revealed(),
                "Role cycler tick"
            );
            schedule_tick(&shared, delay)
        });

        match next {
            Ok(timer) => {
                state.timer = Some(timer);
                (
                    state.machine.display_text().to_string(),
                    state.subscribers.clone(),
                    None,
                )
            }
            Err(err) => {
                error!(error = %err, "Role cycler stopped: tick could not be scheduled");
                state.disposed = true;
                state.failure = Some(err.clone());
                state.subscribers.clear();
                (String::new(), Vec::new(), state.on_failure.take().map(|hook| (hook, err)))
            }
        }
    };

    if let Some((hook, err)) = failure {
        hook(&err);
        return;
    }

    for (id, callback) in subscribers {
        // A callback may have disposed the cycler or unsubscribed others.
        if !guard.borrow().is_subscribed(id) {
            continue;
        }
        callback(&text);
    }
}

/// Registration returned by [`RoleCycler::subscribe`]
///
/// Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    target: Option<(Weak<CyclerShared>, SubscriberId)>,
}

impl Subscription {
    fn inert() -> Self {
        Self { target: None }
    }

    /// Stop receiving updates (idempotent)
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Whether this subscription still receives updates
    #[must_use]
    pub fn is_active(&self) -> bool {
        match &self.target {
            Some((weak, id)) => weak.upgrade().is_some_and(|shared| {
                let active = shared.state.lock().borrow().is_subscribed(*id);
                active
            }),
            None => false,
        }
    }

    fn release(&mut self) {
        let Some((weak, id)) = self.target.take() else {
            return;
        };
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let guard = shared.state.lock();
        let removed = {
            let mut state = guard.borrow_mut();
            state
                .subscribers
                .iter()
                .position(|(sid, _)| *sid == id)
                .map(|pos| state.subscribers.remove(pos))
        };
        drop(removed);
        trace!(subscriber = id.0, "Subscriber removed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
