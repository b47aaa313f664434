//! Tokio-backed scheduler
//!
//! Each tick is one spawned task that sleeps and then runs the callback.
//! Cancelling aborts the task through its `AbortHandle`.
//!
//! A task can also disappear without firing: spawning on a runtime that
//! has shut down yields a task that is cancelled on the spot, and a
//! runtime shutting down drops every pending task. The tick travels
//! inside a `TickGuard` so neither case is silent. A loss during
//! `schedule` becomes its `Err`; a later loss calls the tick with `Err`.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::warn;

use super::{Tick, TickScheduler, TimerHandle};
use crate::error::EngineError;

/// Scheduler that runs ticks on a Tokio runtime
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Use the runtime of the calling context
    ///
    /// Fails with [`EngineError::Schedule`] outside a Tokio runtime.
    pub fn current() -> Result<Self, EngineError> {
        Handle::try_current()
            .map(|handle| Self { handle })
            .map_err(|e| EngineError::schedule(e.to_string()))
    }

    /// Use an explicit runtime handle
    #[must_use]
    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl TickScheduler for TokioScheduler {
    fn name(&self) -> &str {
        "tokio"
    }

    fn schedule(&self, delay: Duration, tick: Tick) -> Result<TimerHandle, EngineError> {
        let slot = Arc::new(Mutex::new(Slot::Spawning));
        let guard = TickGuard {
            tick: Some(tick),
            slot: Arc::clone(&slot),
        };
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            guard.fire();
        });

        {
            let mut slot = slot.lock();
            match *slot {
                Slot::Lost => return Err(EngineError::schedule(RUNTIME_GONE)),
                Slot::Spawning => *slot = Slot::Armed,
                Slot::Armed | Slot::Fired | Slot::Cancelled => {}
            }
        }

        let abort = task.abort_handle();
        Ok(TimerHandle::new(move || {
            {
                let mut slot = slot.lock();
                if matches!(*slot, Slot::Spawning | Slot::Armed) {
                    *slot = Slot::Cancelled;
                }
            }
            abort.abort();
        }))
    }
}

const RUNTIME_GONE: &str = "Tokio runtime shut down before the tick fired";

/// Lifecycle of one spawned tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    /// `schedule` has not returned yet
    Spawning,
    /// Handed to the caller, waiting for its deadline
    Armed,
    Fired,
    Cancelled,
    /// Dropped by the runtime without firing
    Lost,
}

/// Owns the tick inside the spawned future
///
/// Reports the tick as lost if the future is dropped while still armed.
struct TickGuard {
    tick: Option<Tick>,
    slot: Arc<Mutex<Slot>>,
}

impl TickGuard {
    fn fire(mut self) {
        let Some(tick) = self.tick.take() else {
            return;
        };
        {
            let mut slot = self.slot.lock();
            if !matches!(*slot, Slot::Spawning | Slot::Armed) {
                return;
            }
            *slot = Slot::Fired;
        }
        tick(Ok(()));
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        let Some(tick) = self.tick.take() else {
            return;
        };
        let report = {
            let mut slot = self.slot.lock();
            let report = *slot == Slot::Armed;
            if matches!(*slot, Slot::Spawning | Slot::Armed) {
                *slot = Slot::Lost;
            }
            report
        };
        if report {
            warn!("Pending tick dropped by a shut-down runtime");
            tick(Err(EngineError::schedule(RUNTIME_GONE)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_current_outside_runtime_fails() {
        let err = TokioScheduler::current().unwrap_err();
        assert!(matches!(err, EngineError::Schedule { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_fires_after_delay() {
        let scheduler = TokioScheduler::current().unwrap();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let handle = scheduler
            .schedule(
                Duration::from_millis(50),
                Box::new(move |_| flag.store(true, Ordering::SeqCst)),
            )
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(fired.load(Ordering::SeqCst));
        handle.disarm();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_tick() {
        let scheduler = TokioScheduler::current().unwrap();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let handle = scheduler
            .schedule(
                Duration::from_millis(10),
                Box::new(move |_| flag.store(true, Ordering::SeqCst)),
            )
            .unwrap();
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    fn dead_runtime_handle() -> Handle {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let handle = runtime.handle().clone();
        drop(runtime);
        handle
    }

    #[test]
    fn test_schedule_on_shut_down_runtime_fails() {
        let scheduler = TokioScheduler::with_handle(dead_runtime_handle());
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let result = scheduler.schedule(
            Duration::from_millis(1),
            Box::new(move |_| flag.store(true, Ordering::SeqCst)),
        );

        assert!(matches!(result, Err(EngineError::Schedule { .. })));
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_runtime_shutdown_reports_pending_tick() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let scheduler = TokioScheduler::with_handle(runtime.handle().clone());
        let outcome = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&outcome);

        let handle = scheduler
            .schedule(
                Duration::from_secs(60),
                Box::new(move |result| *sink.lock() = Some(result)),
            )
            .unwrap();
        assert!(outcome.lock().is_none());

        drop(runtime);
        handle.disarm();

        let reported = outcome.lock().take();
        assert!(matches!(reported, Some(Err(EngineError::Schedule { .. }))));
    }

    #[test]
    fn test_cancel_then_shutdown_reports_nothing() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let scheduler = TokioScheduler::with_handle(runtime.handle().clone());
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);

        let handle = scheduler
            .schedule(
                Duration::from_secs(60),
                Box::new(move |_| flag.store(true, Ordering::SeqCst)),
            )
            .unwrap();
        handle.cancel();
        drop(runtime);

        assert!(!called.load(Ordering::SeqCst));
    }
}
