//! Widgets

mod headline;

pub use headline::{Headline, CARET};
