//! Typecycle TUI - Terminal renderer for the hero headline
//!
//! This crate mounts the `typecycle-core` engine and draws it full-screen:
//! a greeting typed out once, then the cycling role headline with a
//! blinking caret.
//!
//! # Architecture
//!
//! - **App**: event loop, engine lifecycle (mount on start, unmount on quit)
//! - **Widgets**: borderless centered headline
//! - **Cli**: flag layer over the file and environment configuration

pub mod app;
pub mod cli;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use cli::Args;
