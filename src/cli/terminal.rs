//! Terminal capability detection and output styling

use owo_colors::{OwoColorize, colors::css};

/// Tables narrower than this drop everything but the code and id.
const NARROW_WIDTH: u16 = 80;

/// Whether stdout accepts colored output
fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Whether the terminal is too narrow for the full asset table
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < NARROW_WIDTH)
}

#[derive(Clone, Copy)]
enum Style {
    Success,
    Warning,
    Info,
    Dim,
}

fn paint(text: &str, style: Style) -> String {
    if !supports_color() {
        return text.to_string();
    }
    match style {
        Style::Success => text.fg::<css::Green>().to_string(),
        Style::Warning => text.fg::<css::Orange>().to_string(),
        Style::Info => text.fg::<css::LightBlue>().to_string(),
        Style::Dim => text.dimmed().to_string(),
    }
}

/// Extension trait for styling status output
pub trait Colorize {
    /// Green, for completed actions
    fn success(&self) -> String;
    /// Amber, for problems and refusals
    fn warning(&self) -> String;
    /// Blue, for codes and headings
    fn info(&self) -> String;
    /// Dimmed, for secondary detail
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Style::Success)
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), Style::Warning)
    }

    fn info(&self) -> String {
        paint(self.as_ref(), Style::Info)
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), Style::Dim)
    }
}
