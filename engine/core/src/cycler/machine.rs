//! Role cycling state machine
//!
//! Pure state, no timers. Each call to [`RoleMachine::advance`] is one tick.
//!
//! ```text
//!            revealed < len                 revealed == len
//!   TYPING ─────────────────► TYPING ─────────────────────► HOLDING
//!      ▲      (char_delay)                 (char_delay)         │
//!      │                                                        │
//!      └──────────── next role, revealed = 0 ◄──────────────────┘
//!                              (pause)
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::roles::{Role, RoleList};

/// Mode of the role cycler
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Revealing characters of the active role
    #[default]
    Typing,
    /// Full role shown, waiting out the pause
    Holding,
}

/// What a single tick did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// One more character revealed, still typing
    Revealed,
    /// Last character revealed; now holding
    Completed,
    /// Pause over; moved to the next role with nothing revealed
    Advanced,
}

/// Role cycling state: active role, revealed count, and phase
///
/// The display text is always derived from `revealed`, never stored.
#[derive(Clone, Debug)]
pub struct RoleMachine {
    roles: RoleList,
    role_index: usize,
    revealed: usize,
    phase: Phase,
}

impl RoleMachine {
    /// Start at the first role, nothing revealed, typing
    #[must_use]
    pub fn new(roles: RoleList) -> Self {
        Self {
            roles,
            role_index: 0,
            revealed: 0,
            phase: Phase::Typing,
        }
    }

    /// Apply one tick
    pub fn advance(&mut self) -> Step {
        match self.phase {
            Phase::Typing => {
                let len = self.active_role().len();
                debug_assert!(self.revealed < len);
                self.revealed = (self.revealed + 1).min(len);
                if self.revealed == len {
                    self.phase = Phase::Holding;
                    Step::Completed
                } else {
                    Step::Revealed
                }
            }
            Phase::Holding => {
                self.role_index = (self.role_index + 1) % self.roles.len();
                self.revealed = 0;
                self.phase = Phase::Typing;
                Step::Advanced
            }
        }
    }

    /// Delay before the next tick given the current phase
    #[must_use]
    pub fn next_delay(&self, char_delay: Duration, pause: Duration) -> Duration {
        match self.phase {
            Phase::Typing => char_delay,
            Phase::Holding => pause,
        }
    }

    /// The role being typed or held
    #[must_use]
    pub fn active_role(&self) -> &Role {
        self.roles.get_wrapped(self.role_index)
    }

    /// Index of the active role
    #[must_use]
    pub fn role_index(&self) -> usize {
        self.role_index
    }

    /// Characters currently revealed
    #[must_use]
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Text the renderer should show right now
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.active_role().prefix(self.revealed)
    }
}
