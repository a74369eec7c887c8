//! Catalogue of the Plaid endpoints this crate calls.

use std::fmt;
use std::time::Duration;

/// HTTP method used for a Plaid call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Static description of one Plaid operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Path appended to the session base URL.
    pub path: &'static str,
    pub method: HttpMethod,
    /// Per-call timeout in milliseconds; `None` means the call is unbounded.
    pub timeout_ms: Option<u64>,
}

impl Endpoint {
    const fn post(path: &'static str) -> Self {
        Self {
            path,
            method: HttpMethod::Post,
            timeout_ms: None,
        }
    }

    const fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        Self {
            timeout_ms: Some(timeout_ms),
            ..self
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Timeout applied to the transaction endpoints.
pub const TRANSACTIONS_TIMEOUT_MS: u64 = 30_000;

pub const ITEM_GET: Endpoint = Endpoint::post("/item/get");
pub const ITEM_REMOVE: Endpoint = Endpoint::post("/item/remove");
pub const ACCOUNTS_GET: Endpoint = Endpoint::post("/accounts/get");
pub const ACCOUNTS_BALANCE_GET: Endpoint = Endpoint::post("/accounts/balance/get");
pub const IDENTITY_GET: Endpoint = Endpoint::post("/identity/get");
pub const TRANSACTIONS_GET: Endpoint =
    Endpoint::post("/transactions/get").with_timeout_ms(TRANSACTIONS_TIMEOUT_MS);
pub const TRANSACTIONS_SYNC: Endpoint =
    Endpoint::post("/transactions/sync").with_timeout_ms(TRANSACTIONS_TIMEOUT_MS);
