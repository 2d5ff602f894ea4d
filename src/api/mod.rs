//! HTTP client for the gate pass API.
//!
//! Two operations back the whole application: exchanging a bound identifier
//! (`openId`) for a session token (`satoken`), and trading that token for the
//! opaque pass-code string that gets rendered as a QR code.

use serde::Deserialize;
use thiserror::Error;

/// Default base URL for the gate pass API.
pub const DEFAULT_API_URL: &str = "https://api.215123.cn";

/// Environment variable that overrides the API base URL (dev/test use).
pub const API_URL_ENV: &str = "GATEPASS_API_URL";

/// Request header carrying the session token.
const SATOKEN_HEADER: &str = "satoken";

/// Errors from the identifier-to-token exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned status {status}")]
    Status { status: u16 },
    #[error("malformed response: {0}")]
    Parse(String),
    /// The server answered 200 but the token field was missing, empty, or the
    /// literal string "null". The upstream API uses that string as its own
    /// sentinel for a rejected identifier, so it is checked verbatim.
    #[error("identifier was not accepted")]
    InvalidIdentifier,
}

/// Errors from the pass-code refresh.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned status {status}")]
    Status { status: u16 },
    #[error("malformed response: {0}")]
    Parse(String),
    /// Payload field missing, empty, or the literal "null".
    #[error("no pass code in response")]
    EmptyPayload,
}

/// Response body of the certificate login endpoint: `{"data":{"token":...}}`.
#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    #[serde(default)]
    data: Option<ExchangeData>,
}

#[derive(Debug, Deserialize)]
struct ExchangeData {
    #[serde(default)]
    token: Option<String>,
}

/// Response body of the make-qrcode endpoint: `{"data":"..."}`.
#[derive(Debug, Deserialize)]
struct PassCodeResponse {
    #[serde(default)]
    data: Option<String>,
}

/// Returns true for the API's "no value" sentinels: empty string or "null".
fn is_sentinel(value: &str) -> bool {
    value.is_empty() || value == "null"
}

/// Client for the gate pass API.
#[derive(Debug, Clone)]
pub struct GateApiClient {
    /// Base URL for the API
    base_url: String,
    /// Reusable HTTP client
    client: reqwest::Client,
}

impl GateApiClient {
    /// Create a new client with the default base URL.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_URL.to_string())
    }

    /// Create a new client with a custom base URL.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Create a client honoring the `GATEPASS_API_URL` override.
    pub fn from_env() -> Self {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.is_empty() => Self::with_base_url(url),
            _ => Self::new(),
        }
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange a bound identifier for a session token.
    ///
    /// GET /web-app/auth/certificateLogin?openId={identifier}
    ///
    /// No auth header; the identifier travels as a query parameter.
    pub async fn exchange_token(&self, identifier: &str) -> Result<String, ExchangeError> {
        let url = format!(
            "{}/web-app/auth/certificateLogin?openId={}",
            self.base_url,
            urlencoding::encode(identifier)
        );
        tracing::debug!(identifier, "requesting session token");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "token exchange rejected");
            return Err(ExchangeError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: ExchangeResponse =
            serde_json::from_str(&body).map_err(|e| ExchangeError::Parse(e.to_string()))?;

        match parsed.data.and_then(|d| d.token) {
            Some(token) if !is_sentinel(&token) => {
                tracing::debug!("session token acquired");
                Ok(token)
            }
            _ => Err(ExchangeError::InvalidIdentifier),
        }
    }

    /// Fetch a fresh pass code using the session token.
    ///
    /// GET /pms/welcome/make-qrcode with the token in the `satoken` header.
    pub async fn fetch_pass_code(&self, satoken: &str) -> Result<String, RefreshError> {
        let url = format!("{}/pms/welcome/make-qrcode", self.base_url);
        tracing::debug!("requesting pass code");

        let response = self
            .client
            .get(&url)
            .header(SATOKEN_HEADER, satoken)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "pass code refresh rejected");
            return Err(RefreshError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: PassCodeResponse =
            serde_json::from_str(&body).map_err(|e| RefreshError::Parse(e.to_string()))?;

        match parsed.data {
            Some(payload) if !is_sentinel(&payload) => {
                tracing::debug!(len = payload.len(), "pass code updated");
                Ok(payload)
            }
            _ => Err(RefreshError::EmptyPayload),
        }
    }
}

impl Default for GateApiClient {
    fn default() -> Self {
        Self::new()
    }
}
