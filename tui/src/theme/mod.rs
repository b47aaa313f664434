//! Theme and Colors
//!
//! Hero banner palette: a muted greeting above a bright headline, with the
//! caret in the accent color.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Headline Palette
// ============================================================================

/// Greeting line - soft gray
pub const GREETING: Color = Color::Rgb(170, 170, 180);

/// Role text - warm white
pub const HEADLINE: Color = Color::Rgb(245, 240, 230);

/// Caret - signature accent
pub const CARET: Color = Color::Magenta;

/// Fallback text - dimmer than a live headline
pub const FALLBACK: Color = Color::Rgb(200, 190, 180);

// ============================================================================
// UI Colors
// ============================================================================

/// Status/dev line
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Style for the greeting line
#[must_use]
pub fn greeting_style() -> Style {
    Style::default().fg(GREETING)
}

/// Style for the headline text
#[must_use]
pub fn headline_style(fallback: bool) -> Style {
    if fallback {
        Style::default().fg(FALLBACK)
    } else {
        Style::default().fg(HEADLINE).add_modifier(Modifier::BOLD)
    }
}

/// Style for the caret
#[must_use]
pub fn caret_style() -> Style {
    Style::default().fg(CARET).add_modifier(Modifier::BOLD)
}
