//! Hero Headline
//!
//! The composition the portfolio hero banner renders: a [`RoleCycler`]
//! producing role text, optionally re-typed through a [`TypingPresenter`],
//! followed by a blinking caret.
//!
//! # Reveal modes
//!
//! - [`RevealMode::Direct`]: the cycler's text is shown as-is.
//! - [`RevealMode::Retyped`]: every cycler update cancels the in-flight
//!   presentation and starts a fresh one from the empty string. Each
//!   presentation is tagged with a generation number; updates from an older
//!   generation are discarded, so a stale tick can never write characters of
//!   a previous role.
//!
//! # Fallback
//!
//! Mounting never fails. If the engine cannot be built (bad configuration,
//! no timer available) or dies later, the headline shows static text: the
//! first configured role in full, or [`HeadlineSettings::fallback_text`] when
//! there is none.
//!
//! # Locking
//!
//! Engine callbacks take the headline lock. Engine handles (cycler,
//! subscription, presentation) are always released after that lock is
//! dropped.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cycler::{CyclerSnapshot, RoleCycler, Subscription};
use crate::error::EngineError;
use crate::roles::{EngineConfig, DEFAULT_CHAR_DELAY_MS, DEFAULT_PAUSE_MS, DEFAULT_ROLES};
use crate::scheduler::TickScheduler;
use crate::typing::{Presentation, TypingPresenter};

/// Caret on/off half-period
pub const CARET_BLINK_MS: u64 = 500;

/// Re-typing speed used by the hero banner
pub const DEFAULT_RETYPE_SPEED_MS: u64 = 150;

/// Shown when no role is available at all
pub const DEFAULT_FALLBACK_TEXT: &str = "DEVELOPER";

/// How cycler text reaches the screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealMode {
    /// Show the cycler's text unchanged
    Direct,
    /// Re-type every cycler update from empty at `speed` per character
    Retyped {
        /// Delay between re-typed characters
        speed: Duration,
    },
}

impl RevealMode {
    /// `Direct` for 0, otherwise `Retyped` at that many milliseconds
    #[must_use]
    pub fn from_speed_ms(speed_ms: u64) -> Self {
        if speed_ms == 0 {
            Self::Direct
        } else {
            Self::Retyped {
                speed: Duration::from_millis(speed_ms),
            }
        }
    }
}

impl Default for RevealMode {
    fn default() -> Self {
        Self::from_speed_ms(DEFAULT_RETYPE_SPEED_MS)
    }
}

/// Raw headline settings as supplied by the renderer
///
/// Unvalidated. [`HeroHeadline::mount`] validates them and shows the fallback
/// text for a bad value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadlineSettings {
    /// Roles to cycle through
    pub roles: Vec<String>,
    /// Per-character typing delay (ms)
    pub char_delay_ms: i64,
    /// Hold time on a completed role (ms)
    pub pause_ms: i64,
    /// Reveal mode
    pub reveal: RevealMode,
    /// Static text when no role can be shown
    pub fallback_text: String,
}

impl Default for HeadlineSettings {
    fn default() -> Self {
        Self {
            roles: DEFAULT_ROLES.iter().map(|r| (*r).to_string()).collect(),
            char_delay_ms: DEFAULT_CHAR_DELAY_MS as i64,
            pause_ms: DEFAULT_PAUSE_MS as i64,
            reveal: RevealMode::default(),
            fallback_text: DEFAULT_FALLBACK_TEXT.to_string(),
        }
    }
}

impl HeadlineSettings {
    /// Static text used when the engine is unavailable
    #[must_use]
    pub fn fallback(&self) -> String {
        self.roles
            .iter()
            .find(|r| !r.is_empty())
            .cloned()
            .unwrap_or_else(|| self.fallback_text.clone())
    }
}

/// Engine handles detached from the headline state, released outside the lock
#[derive(Default)]
struct Detached {
    presentation: Option<Presentation>,
    subscription: Option<Subscription>,
    cycler: Option<Arc<RoleCycler>>,
}

impl Detached {
    fn release(self) {
        if let Some(presentation) = self.presentation {
            presentation.cancel();
        }
        drop(self.subscription);
        if let Some(cycler) = self.cycler {
            cycler.dispose();
        }
    }
}

#[derive(Default)]
struct HeadlineState {
    text: String,
    fallback: bool,
    generation: u64,
    presentation: Option<Presentation>,
    cycler: Option<Arc<RoleCycler>>,
    subscription: Option<Subscription>,
    unmounted: bool,
}

impl HeadlineState {
    fn set_text(&mut self, tx: &watch::Sender<String>, text: &str) {
        if self.text != text {
            self.text = text.to_string();
            tx.send_replace(self.text.clone());
        }
    }

    fn detach(&mut self) -> Detached {
        Detached {
            presentation: self.presentation.take(),
            subscription: self.subscription.take(),
            cycler: self.cycler.take(),
        }
    }
}

struct HeadlineShared {
    presenter: TypingPresenter,
    reveal: RevealMode,
    fallback_text: String,
    tx: Arc<watch::Sender<String>>,
    state: Mutex<HeadlineState>,
}

impl HeadlineShared {
    fn on_role_text(self: &Arc<Self>, text: &str) {
        let stale = {
            let mut state = self.state.lock();
            if state.unmounted || state.fallback {
                return;
            }
            match self.reveal {
                RevealMode::Direct => {
                    state.set_text(&self.tx, text);
                    Detached::default()
                }
                RevealMode::Retyped { speed } => {
                    state.generation += 1;
                    let generation = state.generation;
                    let stale = Detached {
                        presentation: state.presentation.take(),
                        ..Detached::default()
                    };
                    state.set_text(&self.tx, "");

                    let weak = Arc::downgrade(self);
                    let started = self.presenter.present(text, speed, move |partial| {
                        if let Some(shared) = weak.upgrade() {
                            shared.on_partial(generation, partial);
                        }
                    });
                    match started {
                        Ok(presentation) => {
                            state.presentation = Some(presentation);
                            stale
                        }
                        Err(err) => {
                            warn!(error = %err, "Headline re-typing unavailable, showing static text");
                            self.enter_fallback(&mut state);
                            let mut detached = state.detach();
                            detached.presentation = stale.presentation;
                            detached
                        }
                    }
                }
            }
        };
        stale.release();
    }

    fn on_partial(&self, generation: u64, partial: &str) {
        let mut state = self.state.lock();
        if state.unmounted || state.fallback || state.generation != generation {
            return;
        }
        state.set_text(&self.tx, partial);
    }

    fn on_engine_failure(&self, err: &EngineError) {
        let detached = {
            let mut state = self.state.lock();
            if state.unmounted || state.fallback {
                return;
            }
            warn!(error = %err, fallback = %self.fallback_text, "Headline engine stopped, showing static text");
            self.enter_fallback(&mut state);
            state.detach()
        };
        detached.release();
    }

    fn enter_fallback(&self, state: &mut HeadlineState) {
        state.fallback = true;
        state.set_text(&self.tx, &self.fallback_text);
    }

    fn unmount(&self) {
        let detached = {
            let mut state = self.state.lock();
            if state.unmounted {
                return;
            }
            state.unmounted = true;
            state.detach()
        };
        detached.release();
        debug!("Headline unmounted");
    }
}

/// Animated headline: role cycling, optional re-typing, static fallback
///
/// Dropping the headline unmounts it.
pub struct HeroHeadline {
    scheduler: Arc<dyn TickScheduler>,
    settings: HeadlineSettings,
    tx: Arc<watch::Sender<String>>,
    shared: Arc<HeadlineShared>,
}

impl HeroHeadline {
    /// Mount a headline; never fails (see module docs on fallback)
    pub fn mount(settings: HeadlineSettings, scheduler: Arc<dyn TickScheduler>) -> Self {
        let (tx, _rx) = watch::channel(String::new());
        let tx = Arc::new(tx);
        let shared = mount_shared(&settings, &scheduler, Arc::clone(&tx));
        Self {
            scheduler,
            settings,
            tx,
            shared,
        }
    }

    /// Replace the settings: full reset to the first role, nothing revealed
    ///
    /// Existing [`HeroHeadline::watch`] receivers keep receiving updates.
    pub fn reconfigure(&mut self, settings: HeadlineSettings) {
        self.shared.unmount();
        self.tx.send_replace(String::new());
        self.shared = mount_shared(&settings, &self.scheduler, Arc::clone(&self.tx));
        self.settings = settings;
        debug!("Headline reconfigured");
    }

    /// Current headline text (without caret)
    #[must_use]
    pub fn text(&self) -> String {
        self.shared.state.lock().text.clone()
    }

    /// Receiver that always holds the latest headline text
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    /// Whether the static fallback is being shown
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.shared.state.lock().fallback
    }

    /// State of the underlying cycler, if it is running
    #[must_use]
    pub fn snapshot(&self) -> Option<CyclerSnapshot> {
        let cycler = self.shared.state.lock().cycler.clone();
        cycler.map(|c| c.snapshot())
    }

    /// Settings this headline was mounted with
    #[must_use]
    pub fn settings(&self) -> &HeadlineSettings {
        &self.settings
    }

    /// Stop all animation (idempotent)
    pub fn unmount(&self) {
        self.shared.unmount();
    }

    /// Caret blink phase `elapsed` after mount
    #[must_use]
    pub fn caret_visible(elapsed: Duration) -> bool {
        (elapsed.as_millis() / u128::from(CARET_BLINK_MS)) % 2 == 0
    }
}

impl Drop for HeroHeadline {
    fn drop(&mut self) {
        self.shared.unmount();
    }
}

impl std::fmt::Debug for HeroHeadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeroHeadline")
            .field("text", &self.text())
            .field("fallback", &self.is_fallback())
            .field("reveal", &self.settings.reveal)
            .finish()
    }
}

fn mount_shared(
    settings: &HeadlineSettings,
    scheduler: &Arc<dyn TickScheduler>,
    tx: Arc<watch::Sender<String>>,
) -> Arc<HeadlineShared> {
    let shared = Arc::new(HeadlineShared {
        presenter: TypingPresenter::new(Arc::clone(scheduler)),
        reveal: settings.reveal,
        fallback_text: settings.fallback(),
        tx,
        state: Mutex::new(HeadlineState::default()),
    });

    let started = EngineConfig::from_millis(settings.roles.iter().cloned(), settings.char_delay_ms, settings.pause_ms)
        .map_err(EngineError::from)
        .and_then(|config| RoleCycler::start(config, Arc::clone(scheduler)));

    match started {
        Ok(cycler) => {
            let cycler = Arc::new(cycler);

            let weak = Arc::downgrade(&shared);
            cycler.on_failure(move |err| {
                if let Some(shared) = weak.upgrade() {
                    shared.on_engine_failure(err);
                }
            });

            let weak = Arc::downgrade(&shared);
            let subscription = cycler.subscribe(move |text| {
                if let Some(shared) = weak.upgrade() {
                    shared.on_role_text(text);
                }
            });

            let mut state = shared.state.lock();
            if state.fallback {
                drop(state);
                Detached {
                    subscription: Some(subscription),
                    cycler: Some(cycler),
                    ..Detached::default()
                }
                .release();
            } else {
                state.cycler = Some(cycler);
                state.subscription = Some(subscription);
                debug!(reveal = ?settings.reveal, "Headline mounted");
            }
        }
        Err(err) => {
            warn!(error = %err, fallback = %shared.fallback_text, "Headline engine unavailable, showing static text");
            let mut state = shared.state.lock();
            shared.enter_fallback(&mut state);
        }
    }

    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_blinks_every_half_second() {
        assert!(HeroHeadline::caret_visible(Duration::ZERO));
        assert!(HeroHeadline::caret_visible(Duration::from_millis(499)));
        assert!(!HeroHeadline::caret_visible(Duration::from_millis(500)));
        assert!(!HeroHeadline::caret_visible(Duration::from_millis(999)));
        assert!(HeroHeadline::caret_visible(Duration::from_millis(1000)));
    }

    #[test]
    fn test_reveal_mode_from_speed() {
        assert_eq!(RevealMode::from_speed_ms(0), RevealMode::Direct);
        assert_eq!(
            RevealMode::from_speed_ms(150),
            RevealMode::Retyped {
                speed: Duration::from_millis(150)
            }
        );
    }

    #[test]
    fn test_fallback_prefers_first_role() {
        let mut settings = HeadlineSettings::default();
        assert_eq!(settings.fallback(), "FULLSTACK DEVELOPER");

        settings.roles = vec![String::new(), "SRE".to_string()];
        assert_eq!(settings.fallback(), "SRE");

        settings.roles.clear();
        assert_eq!(settings.fallback(), DEFAULT_FALLBACK_TEXT);
    }
}
