//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Severity;

pub const CRITICAL_RED: Color = Color::Rgb(0xd9, 0x53, 0x4f);
pub const MAJOR_CORAL: Color = Color::Rgb(0xff, 0x7f, 0x50);
pub const MODERATE_AMBER: Color = Color::Rgb(0xff, 0xc1, 0x07);
pub const MINOR_TEAL: Color = Color::Rgb(0x17, 0xa2, 0xb8);
pub const LOW_GREY: Color = Color::Rgb(0x6c, 0x75, 0x7d);

/// Highlight for a grabbed card.
pub const GRAB_BLUE: Color = Color::Rgb(0x3d, 0x5a, 0xfe);
/// Status bar background.
pub const BAR_NAVY: Color = Color::Rgb(0x1f, 0x2a, 0x44);

/// Color of a task's severity; tasks without one count as minor.
pub fn severity_color(severity: Option<Severity>) -> Color {
    match Severity::effective(severity) {
        Severity::Critical => CRITICAL_RED,
        Severity::Major => MAJOR_CORAL,
        Severity::Moderate => MODERATE_AMBER,
        Severity::Minor => MINOR_TEAL,
        Severity::Low => LOW_GREY,
    }
}

/// Readable text color on top of a severity background.
pub fn text_on(background: Color) -> Color {
    match background {
        MODERATE_AMBER | MAJOR_CORAL => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}
