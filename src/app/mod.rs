//! Application state and logic for the TUI.
//!
//! All mutable state lives in [`App`] and is only touched from the event-loop
//! task. The two HTTP operations run as spawned tokio tasks and report back
//! through an unbounded mpsc channel as [`AppMessage`]s.

mod messages;

pub use messages::AppMessage;

use crate::api::GateApiClient;
use crate::prefs::{clamp_scale, PrefStore, KEY_OPEN_ID, KEY_SATOKEN};
use chrono::{DateTime, Local};
use tokio::sync::mpsc;

/// Input handling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal keybinds active.
    Normal,
    /// Typing a new identifier into the inline input field.
    EditingIdentifier,
}

/// Transient status shown in the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Nothing has happened yet.
    Idle,
    /// Token exchange request in flight.
    ExchangingToken,
    /// Token exchange succeeded.
    TokenAcquired,
    /// Token exchange failed.
    ExchangeFailed(String),
    /// Pass code refresh in flight.
    RefreshingCode,
    /// Pass code refresh succeeded.
    CodeUpdated,
    /// Pass code refresh failed.
    RefreshFailed(String),
}

impl Status {
    /// Human-readable status line text.
    pub fn text(&self) -> String {
        match self {
            Status::Idle => "Waiting for input".to_string(),
            Status::ExchangingToken => "Requesting session token...".to_string(),
            Status::TokenAcquired => "Session token acquired".to_string(),
            Status::ExchangeFailed(detail) => {
                format!("Session token request failed: {}", detail)
            }
            Status::RefreshingCode => "Refreshing pass code...".to_string(),
            Status::CodeUpdated => "Pass code updated".to_string(),
            Status::RefreshFailed(detail) => format!("Pass code refresh failed: {}", detail),
        }
    }

    /// Whether a request is currently in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Status::ExchangingToken | Status::RefreshingCode)
    }

    /// Whether this status reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Status::ExchangeFailed(_) | Status::RefreshFailed(_))
    }
}

/// Main application state
pub struct App {
    /// Durable preference store (openId, satoken, scale).
    pub prefs: PrefStore,
    /// API client for the two HTTP operations.
    pub client: GateApiClient,
    /// Bound identifier, mirrored from the store.
    pub open_id: Option<String>,
    /// Session token. Present only if derived from the current identifier.
    pub satoken: Option<String>,
    /// Opaque pass-code payload to render as a QR code. Never persisted.
    pub pass_code: Option<String>,
    /// QR zoom level in [0.4, 1.0].
    pub scale: f64,
    /// Transient status line state.
    pub status: Status,
    /// Input handling mode.
    pub mode: Mode,
    /// Inline input buffer for the identifier editor.
    pub input: String,
    /// When the pass code was last successfully updated.
    pub updated_at: Option<DateTime<Local>>,
    /// Flag to track if the app should quit.
    pub should_quit: bool,
    /// Redraw gate for the event loop.
    pub needs_redraw: bool,
    /// Tick counter driving the spinner animation.
    pub tick_count: u64,
    /// Current spinner frame index.
    pub spinner_frame: usize,
    /// Sender cloned into spawned request tasks.
    pub message_tx: mpsc::UnboundedSender<AppMessage>,
    /// Receiver taken by the event loop.
    pub message_rx: Option<mpsc::UnboundedReceiver<AppMessage>>,
}

impl App {
    /// Create the application state from an opened store and API client.
    ///
    /// Empty persisted strings are treated the same as absent values; the
    /// upstream store format never distinguishes the two.
    pub fn new(prefs: PrefStore, client: GateApiClient) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        let open_id = prefs
            .open_id()
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let satoken = prefs
            .satoken()
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let scale = prefs.scale();

        Self {
            prefs,
            client,
            open_id,
            satoken,
            pass_code: None,
            scale,
            status: Status::Idle,
            mode: Mode::Normal,
            input: String::new(),
            updated_at: None,
            should_quit: false,
            needs_redraw: true,
            tick_count: 0,
            spinner_frame: 0,
            message_tx,
            message_rx: Some(message_rx),
        }
    }

    /// Kick off the startup requests from persisted state.
    ///
    /// Identifier present without a token starts an exchange; a persisted
    /// token starts a refresh directly. Presence is the only freshness check.
    pub fn initialize(&mut self) {
        if self.satoken.is_some() {
            self.refresh_action();
        } else if let Some(id) = self.open_id.clone() {
            self.spawn_exchange(id);
        }
    }

    // =========================================================
    // User actions
    // =========================================================

    /// Enter the inline identifier editor, pre-filled with the current value.
    pub fn begin_identifier_edit(&mut self) {
        self.mode = Mode::EditingIdentifier;
        self.input = self.open_id.clone().unwrap_or_default();
        self.mark_dirty();
    }

    /// Leave the editor without changing anything.
    pub fn cancel_identifier_edit(&mut self) {
        self.mode = Mode::Normal;
        self.input.clear();
        self.mark_dirty();
    }

    /// Append a character to the editor buffer.
    pub fn input_char(&mut self, c: char) {
        self.input.push(c);
        self.mark_dirty();
    }

    /// Delete the last character from the editor buffer.
    pub fn input_backspace(&mut self) {
        self.input.pop();
        self.mark_dirty();
    }

    /// Commit the editor buffer as the new identifier.
    ///
    /// Empty input is a no-op, matching the original prompt behavior.
    pub fn submit_identifier(&mut self) {
        let new_id = self.input.trim().to_string();
        self.mode = Mode::Normal;
        self.input.clear();
        self.mark_dirty();
        if new_id.is_empty() {
            return;
        }
        self.set_identifier(new_id);
    }

    /// Replace the bound identifier.
    ///
    /// The session token is invalidated (memory and store) before the new
    /// exchange starts, as is the displayed pass code; a code derived from the
    /// old identifier must never stay on screen.
    pub fn set_identifier(&mut self, identifier: String) {
        tracing::info!(identifier = %identifier, "identifier changed");
        self.prefs.set(KEY_OPEN_ID, &identifier);
        self.open_id = Some(identifier.clone());
        self.satoken = None;
        self.prefs.remove(KEY_SATOKEN);
        self.pass_code = None;
        self.updated_at = None;
        self.spawn_exchange(identifier);
    }

    /// Apply a zoom delta, clamped to the allowed range, and persist it.
    pub fn zoom(&mut self, delta: f64) {
        self.scale = clamp_scale(self.scale + delta);
        self.prefs.set_scale(self.scale);
        self.mark_dirty();
    }

    /// Refresh the pass code with the current token. No-op without a token.
    pub fn refresh_action(&mut self) {
        let Some(satoken) = self.satoken.clone() else {
            return;
        };
        self.status = Status::RefreshingCode;
        self.mark_dirty();

        let client = self.client.clone();
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_pass_code(&satoken).await;
            let _ = tx.send(AppMessage::RefreshComplete { result });
        });
    }

    fn spawn_exchange(&mut self, identifier: String) {
        self.status = Status::ExchangingToken;
        self.mark_dirty();

        let client = self.client.clone();
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            let result = client.exchange_token(&identifier).await;
            let _ = tx.send(AppMessage::ExchangeComplete { identifier, result });
        });
    }

    // =========================================================
    // Async results
    // =========================================================

    /// Apply a message from a finished request task.
    pub fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::ExchangeComplete { identifier, result } => {
                if self.open_id.as_deref() != Some(identifier.as_str()) {
                    // The identifier changed while this exchange was in
                    // flight; its token would pair with a stale identifier.
                    tracing::debug!(identifier = %identifier, "discarding stale exchange result");
                    return;
                }
                match result {
                    Ok(token) => {
                        self.prefs.set(KEY_SATOKEN, &token);
                        self.satoken = Some(token);
                        self.status = Status::TokenAcquired;
                        self.mark_dirty();
                        self.refresh_action();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "token exchange failed");
                        self.status = Status::ExchangeFailed(e.to_string());
                        self.mark_dirty();
                    }
                }
            }
            AppMessage::RefreshComplete { result } => match result {
                Ok(payload) => {
                    self.pass_code = Some(payload);
                    self.updated_at = Some(Local::now());
                    self.status = Status::CodeUpdated;
                    self.mark_dirty();
                }
                Err(e) => {
                    // Previous payload stays on screen until the next
                    // successful refresh.
                    tracing::warn!(error = %e, "pass code refresh failed");
                    self.status = Status::RefreshFailed(e.to_string());
                    self.mark_dirty();
                }
            },
        }
    }

    // =========================================================
    // Event-loop plumbing
    // =========================================================

    /// Advance animations. Called on every event-loop tick.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        // ~8 ticks per frame keeps the spinner readable at a 16ms tick rate
        if self.status.is_busy() && self.tick_count % 8 == 0 {
            self.spinner_frame = (self.spinner_frame + 1) % 4;
            self.mark_dirty();
        }
    }

    /// Request a redraw on the next loop iteration.
    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Signal the event loop to exit.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
