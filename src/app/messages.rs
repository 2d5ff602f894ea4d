//! AppMessage enum for async communication within the application.

use crate::api::{ExchangeError, RefreshError};

/// Messages received from spawned HTTP operations.
#[derive(Debug)]
pub enum AppMessage {
    /// Token exchange finished, successfully or not.
    ExchangeComplete {
        /// The identifier the exchange was requested for. Results for an
        /// identifier that is no longer current are discarded.
        identifier: String,
        result: Result<String, ExchangeError>,
    },
    /// Pass code refresh finished, successfully or not.
    RefreshComplete {
        result: Result<String, RefreshError>,
    },
}
