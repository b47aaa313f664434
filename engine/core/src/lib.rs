//! Typecycle Core - Timer-Driven Text Animation
//!
//! This crate provides the text-animation engine behind an animated hero
//! headline: a role label typed out one character at a time, held, cleared,
//! and replaced by the next role, forever. It is independent of any
//! rendering surface; a renderer supplies the configuration once and redraws
//! whenever the engine hands it a new string.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Renderers (TUI, tests, ...)                │
//! │        re-render on every update, dispose on removal         │
//! └───────────────────────────┬──────────────────────────────────┘
//!                             │ subscribe / watch / dispose
//! ┌───────────────────────────┼──────────────────────────────────┐
//! │                     TYPECYCLE CORE                            │
//! │   ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐ │
//! │   │ HeroHeadline │──►│  RoleCycler  │   │ TypingPresenter  │ │
//! │   │  (fallback)  │──►│ (RoleMachine)│   │   (one-shot)     │ │
//! │   └──────────────┘   └──────┬───────┘   └────────┬─────────┘ │
//! │                             └───────┬────────────┘           │
//! │                              TickScheduler                    │
//! │                      (TokioScheduler / ManualScheduler)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`RoleCycler`]: infinite typing/holding cycle over a [`RoleList`]
//! - [`TypingPresenter`]: one-shot reveal of a single string
//! - [`HeroHeadline`]: the two combined, with a static fallback
//! - [`TickScheduler`]: single-shot timers with guaranteed cancellation
//!
//! # Quick Start
//!
//! ```ignore
//! use typecycle_core::{EngineConfig, RoleCycler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), typecycle_core::EngineError> {
//!     let cycler = RoleCycler::spawn(EngineConfig::default())?;
//!     let _sub = cycler.subscribe(|text| println!("{text}"));
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     cycler.dispose();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cycler;
pub mod error;
pub mod headline;
pub mod roles;
pub mod scheduler;
pub mod typing;

pub use config::{ConfigError, ConfigSource, TypecycleConfig};
pub use cycler::{CyclerSnapshot, Phase, RoleCycler, RoleMachine, Step, Subscription};
pub use error::{EngineError, InvalidConfig};
pub use headline::{HeadlineSettings, HeroHeadline, RevealMode};
pub use roles::{EngineConfig, Role, RoleList};
pub use scheduler::{ManualScheduler, Tick, TickScheduler, TimerHandle, TokioScheduler};
pub use typing::{Presentation, TypingPresenter};
