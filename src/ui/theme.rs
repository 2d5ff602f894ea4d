//! Color theme constants for the gatepass UI.
//!
//! Minimal dark palette, block borders in gray, status colors only where
//! state needs to stand out.

use ratatui::style::Color;

/// Primary border color - dark gray for minimal aesthetic
pub const COLOR_BORDER: Color = Color::DarkGray;

/// Accent color - white for highlights and important elements
pub const COLOR_ACCENT: Color = Color::White;

/// Dim text for less important info
pub const COLOR_DIM: Color = Color::DarkGray;

/// In-flight request indicator - yellow
pub const COLOR_BUSY: Color = Color::Yellow;

/// Success state - green
pub const COLOR_OK: Color = Color::Rgb(4, 181, 117); // green #04B575

/// Error state - red
pub const COLOR_ERROR: Color = Color::Red;

/// QR light modules. Drawn bright so the code reads dark-on-light
/// on dark terminals.
pub const COLOR_QR: Color = Color::White;
