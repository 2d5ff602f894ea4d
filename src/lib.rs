//! Gatepass TUI - a terminal client for refreshing a gate pass QR code
//!
//! This library exposes modules for use in integration tests.

pub mod api;
pub mod app;
pub mod prefs;
pub mod ui;
