//! Typecycle TUI Entry Point
//!
//! Launches the animated hero headline in the terminal.
//!
//! Usage:
//!   typecycle-tui [OPTIONS]
//!
//! Options:
//!   --roles <A,B,...>        Roles to cycle through
//!   --char-delay-ms <MS>     Delay between typed characters
//!   --pause-ms <MS>          Hold time on a completed role
//!   --retype-speed-ms <MS>   Re-typing speed (0 = direct)
//!   --greeting <TEXT>        Greeting revealed once
//!   --dev                    Show engine status line
//!
//! Logging goes to the file named by `TYPECYCLE_LOG`, filtered by `RUST_LOG`.

use std::fs::File;
use std::io;
use std::panic;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use typecycle_tui::{App, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging()?;

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: typecycle-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin or stdout is piped, or SSH ran without -t.");
        std::process::exit(1);
    }

    let config = args
        .load_config()
        .context("Failed to load configuration")?;
    if let Err(e) = config.validate() {
        warn!(error = %e, source = %config.source(), "Invalid configuration, headline will show static text");
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = match App::new(&config, args.dev) {
        Ok(mut app) => app.run(&mut terminal).await,
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Install the tracing subscriber
///
/// The TUI owns stdout, so the fmt layer only exists when `TYPECYCLE_LOG`
/// names a file to write to.
fn init_logging() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("typecycle_core=debug,typecycle_tui=debug"));

    let file_layer = match std::env::var_os("TYPECYCLE_LOG") {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file: {}", path.to_string_lossy()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .init();

    Ok(())
}
