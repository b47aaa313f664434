//! Headline Widget
//!
//! A borderless, centered greeting plus headline with a trailing caret.
//! Long text wraps to the area width; lines that do not fit vertically are
//! dropped from the bottom.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

/// Caret glyph drawn after the headline text
pub const CARET: &str = "|";

/// Centered greeting and headline
pub struct Headline<'a> {
    greeting: &'a str,
    text: &'a str,
    caret: bool,
    greeting_style: Style,
    text_style: Style,
    caret_style: Style,
}

impl<'a> Headline<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            greeting: "",
            text,
            caret: true,
            greeting_style: Style::default(),
            text_style: Style::default(),
            caret_style: Style::default(),
        }
    }

    pub fn greeting(mut self, greeting: &'a str, style: Style) -> Self {
        self.greeting = greeting;
        self.greeting_style = style;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.text_style = style;
        self
    }

    /// Show or hide the caret (blink phase)
    pub fn caret(mut self, visible: bool, style: Style) -> Self {
        self.caret = visible;
        self.caret_style = style;
        self
    }
}

fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() || width == 0 {
        return vec![String::new()];
    }
    wrap(text, width).into_iter().map(|cow| cow.to_string()).collect()
}

impl Widget for Headline<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = area.width as usize;

        let greeting = if self.greeting.is_empty() {
            Vec::new()
        } else {
            wrap_lines(self.greeting, width)
        };
        // Leave a column for the caret
        let headline = wrap_lines(self.text, width.saturating_sub(1).max(1));

        let total = greeting.len() + headline.len();
        let top = area.y + (area.height as usize).saturating_sub(total) as u16 / 2;

        let rows = greeting
            .iter()
            .map(|line| (line, self.greeting_style))
            .chain(headline.iter().map(|line| (line, self.text_style)))
            .take(area.height as usize);

        let last_row = total.min(area.height as usize).saturating_sub(1);
        for (i, (line, style)) in rows.enumerate() {
            let is_last = i == last_row && i >= greeting.len();
            let caret_width = if is_last { CARET.width() } else { 0 };
            let line_width = line.width() + caret_width;
            let x = area.x + (width.saturating_sub(line_width) / 2) as u16;
            let y = top + i as u16;

            let (end_x, _) = buf.set_stringn(x, y, line, width, style);
            if is_last && self.caret && end_x < area.right() {
                buf.set_string(end_x, y, CARET, self.caret_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(buf: &Buffer) -> Vec<String> {
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    fn render(widget: Headline<'_>, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        rows(&buf)
    }

    #[test]
    fn test_centers_greeting_and_headline_with_caret() {
        let widget = Headline::new("DEV").greeting("Hi", Style::default());
        assert_eq!(
            render(widget, 10, 4),
            vec!["          ", "    Hi    ", "   DEV|   ", "          "]
        );
    }

    #[test]
    fn test_caret_hidden_without_shifting_text() {
        let widget = Headline::new("DEV").caret(false, Style::default());
        assert_eq!(render(widget, 8, 1), vec!["  DEV   "]);
    }

    #[test]
    fn test_empty_text_shows_only_caret() {
        let widget = Headline::new("");
        assert_eq!(render(widget, 5, 1), vec!["  |  "]);
    }

    #[test]
    fn test_long_text_wraps_and_caret_follows_last_line() {
        let widget = Headline::new("SOFTWARE ENGINEER");
        assert_eq!(
            render(widget, 10, 2),
            vec![" SOFTWARE ", "ENGINEER| "]
        );
    }

    #[test]
    fn test_zero_area_is_noop() {
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        Headline::new("DEV").render(area, &mut buf);
    }
}
