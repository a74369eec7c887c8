//! Error types for the Plaid SDK.

use serde_json::Value;

/// Result type for SDK operations.
pub type PlaidResult<T> = Result<T, PlaidError>;

/// Error types that can occur when calling Plaid.
///
/// Upstream failures are deliberately not classified: a rate limit, a bad
/// access token and a malformed request all surface as [`PlaidError::Transport`]
/// carrying whatever Plaid sent back.
#[derive(Debug, thiserror::Error)]
pub enum PlaidError {
    /// Credentials are missing or the session cannot produce a usable URL.
    /// Raised before any network I/O.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-2xx response or network-level failure.
    #[error("{}", transport_display(.status, .body, .message))]
    Transport {
        status: Option<u16>,
        body: Option<Value>,
        message: String,
        timeout: bool,
    },
}

fn transport_display(status: &Option<u16>, body: &Option<Value>, message: &str) -> String {
    match (status, body) {
        (Some(status), Some(body)) => format!("Plaid API error (status {}): {}", status, body),
        (Some(status), None) => format!("Plaid API error (status {}): {}", status, message),
        _ => format!("Network error: {}", message),
    }
}

impl PlaidError {
    /// The error raised when a call is attempted before credentials arrive.
    pub fn credentials_missing() -> Self {
        Self::Configuration(
            "Plaid credentials not configured. Please provide plaidClientId and plaidSecret in the session configuration."
                .to_string(),
        )
    }

    /// Build a transport error from an upstream non-2xx response.
    ///
    /// The body is kept as JSON when it parses, otherwise as a JSON string.
    /// An empty body is recorded as absent.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = if body.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
        };

        Self::Transport {
            status: Some(status),
            body: parsed,
            message: format!("Request failed with status code {}", status),
            timeout: false,
        }
    }

    /// HTTP status reported by Plaid, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Configuration(_) => None,
        }
    }

    /// Upstream response body, if one was received.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Transport { body, .. } => body.as_ref(),
            Self::Configuration(_) => None,
        }
    }

    /// Whether the call was cut short by its configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { timeout: true, .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<reqwest::Error> for PlaidError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            body: None,
            message: err.to_string(),
            timeout: err.is_timeout(),
        }
    }
}
