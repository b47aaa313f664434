//! Manual (virtual clock) scheduler
//!
//! Time only moves when the caller says so. `advance` fires due ticks in
//! deadline order; ticks with equal deadlines fire in scheduling order.
//! Ticks run without the clock lock held, so they may schedule further
//! ticks, and those fire in the same `advance` call if they come due.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use super::{Tick, TickScheduler, TimerHandle};
use crate::error::EngineError;

/// Key of a pending tick: deadline, then insertion sequence
type TimerKey = (Duration, u64);

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_seq: u64,
    pending: BTreeMap<TimerKey, Tick>,
}

/// Deterministic scheduler driven by explicit clock advances
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    /// Create a scheduler with the clock at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.lock().now
    }

    /// Number of ticks waiting to fire
    #[must_use]
    pub fn pending(&self) -> usize {
        self.clock.lock().pending.len()
    }

    /// Deadline of the earliest pending tick
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.clock.lock().pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Move the clock forward by `by`, firing every tick that comes due
    ///
    /// Returns the number of ticks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut fired = 0;

        while let Some(tick) = self.pop_due(target) {
            tick(Ok(()));
            fired += 1;
        }

        let mut clock = self.clock.lock();
        if clock.now < target {
            clock.now = target;
        }
        fired
    }

    /// Jump to the earliest pending deadline and fire that one tick
    ///
    /// Returns false when nothing is pending.
    pub fn fire_next(&self) -> bool {
        let Some(deadline) = self.next_deadline() else {
            return false;
        };
        match self.pop_due(deadline) {
            Some(tick) => {
                tick(Ok(()));
                true
            }
            None => false,
        }
    }

    fn pop_due(&self, target: Duration) -> Option<Tick> {
        let mut clock = self.clock.lock();
        let key = *clock.pending.keys().next()?;
        if key.0 > target {
            return None;
        }
        clock.now = key.0;
        clock.pending.remove(&key)
    }
}

impl TickScheduler for ManualScheduler {
    fn name(&self) -> &str {
        "manual"
    }

    fn schedule(&self, delay: Duration, tick: Tick) -> Result<TimerHandle, EngineError> {
        let key = {
            let mut clock = self.clock.lock();
            let key = (clock.now + delay, clock.next_seq);
            clock.next_seq += 1;
            clock.pending.insert(key, tick);
            key
        };

        let clock: Weak<Mutex<ManualClock>> = Arc::downgrade(&self.clock);
        Ok(TimerHandle::new(move || {
            if let Some(clock) = clock.upgrade() {
                // Drop the tick outside the lock; it may own handles that
                // cancel back into this clock.
                let removed = clock.lock().pending.remove(&key);
                drop(removed);
            }
        }))
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clock = self.clock.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &clock.now)
            .field("pending", &clock.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;

    fn recorder() -> (Arc<PlMutex<Vec<&'static str>>>, impl Fn(&'static str) -> Tick) {
        let log = Arc::new(PlMutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |label: &'static str| -> Tick {
            let sink = Arc::clone(&sink);
            Box::new(move |_| sink.lock().push(label))
        };
        (log, make)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let (log, tick) = recorder();

        let _late = scheduler.schedule(Duration::from_millis(30), tick("late")).unwrap();
        let _early = scheduler.schedule(Duration::from_millis(10), tick("early")).unwrap();
        let _tie = scheduler.schedule(Duration::from_millis(10), tick("tie")).unwrap();

        assert_eq!(scheduler.advance(Duration::from_millis(20)), 2);
        assert_eq!(*log.lock(), vec!["early", "tie"]);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.advance(Duration::from_millis(10)), 1);
        assert_eq!(*log.lock(), vec!["early", "tie", "late"]);
    }

    #[test]
    fn test_cancelled_tick_never_fires() {
        let scheduler = ManualScheduler::new();
        let (log, tick) = recorder();

        let handle = scheduler.schedule(Duration::from_millis(5), tick("x")).unwrap();
        handle.cancel();

        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(100)), 0);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_rescheduling_inside_tick_fires_in_same_advance() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(PlMutex::new(Vec::new()));
        let held: Arc<PlMutex<Option<TimerHandle>>> = Arc::new(PlMutex::new(None));

        let inner_scheduler = scheduler.clone();
        let inner_log = Arc::clone(&log);
        let inner_held = Arc::clone(&held);
        let first = scheduler
            .schedule(
                Duration::from_millis(10),
                Box::new(move |_| {
                    inner_log.lock().push(inner_scheduler.now());
                    let log = Arc::clone(&inner_log);
                    let clock = inner_scheduler.clone();
                    let next = inner_scheduler
                        .schedule(
                            Duration::from_millis(10),
                            Box::new(move |_| log.lock().push(clock.now())),
                        )
                        .unwrap();
                    *inner_held.lock() = Some(next);
                }),
            )
            .unwrap();

        scheduler.advance(Duration::from_millis(25));
        first.disarm();
        assert_eq!(
            *log.lock(),
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
        assert_eq!(scheduler.now(), Duration::from_millis(25));
    }

    #[test]
    fn test_fire_next_jumps_clock() {
        let scheduler = ManualScheduler::new();
        let (log, tick) = recorder();
        let _h = scheduler.schedule(Duration::from_millis(70), tick("only")).unwrap();

        assert!(scheduler.fire_next());
        assert_eq!(scheduler.now(), Duration::from_millis(70));
        assert_eq!(*log.lock(), vec!["only"]);
        assert!(!scheduler.fire_next());
    }
}
