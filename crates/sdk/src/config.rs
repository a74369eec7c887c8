//! Configuration types for the Plaid SDK.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SANDBOX_BASE_URL: &str = "https://sandbox.plaid.com";
pub const PRODUCTION_BASE_URL: &str = "https://production.plaid.com";

/// Number of leading `client_id` characters kept when logging request bodies.
const CLIENT_ID_LOG_PREFIX: usize = 10;

/// Plaid environment the session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaidEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl PlaidEnvironment {
    /// Resolve an environment name as delivered by the host.
    ///
    /// Names are case-insensitive. `sandbox` selects the sandbox and every
    /// other name selects production.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "sandbox" => Self::Sandbox,
            "production" => Self::Production,
            other => {
                tracing::warn!(env = %other, "Unrecognised Plaid environment, using production host");
                Self::Production
            }
        }
    }

    /// Default API host for this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for PlaidEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration payload delivered by the hosting environment.
///
/// Field names follow the host's camelCase keys. Every field is optional and
/// an empty string counts as absent.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    #[serde(default)]
    pub plaid_client_id: Option<String>,
    #[serde(default)]
    pub plaid_secret: Option<String>,
    #[serde(default)]
    pub plaid_env: Option<String>,
    #[serde(default)]
    pub plaid_base_url: Option<String>,
}

impl HostConfig {
    /// Whether the host supplied any field at all.
    pub fn is_empty(&self) -> bool {
        [
            &self.plaid_client_id,
            &self.plaid_secret,
            &self.plaid_env,
            &self.plaid_base_url,
        ]
        .iter()
        .all(|field| non_empty(field).is_none())
    }
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("plaid_client_id", &self.plaid_client_id.as_deref().map(truncate_client_id))
            .field("plaid_secret", &self.plaid_secret.as_ref().map(|_| REDACTED))
            .field("plaid_env", &self.plaid_env)
            .field("plaid_base_url", &self.plaid_base_url)
            .finish()
    }
}

/// Placeholder written in place of the secret wherever it would be displayed.
pub const REDACTED: &str = "[REDACTED]";

/// Shorten a client id to a prefix safe for logs.
pub fn truncate_client_id(client_id: &str) -> String {
    let prefix: String = client_id.chars().take(CLIENT_ID_LOG_PREFIX).collect();
    format!("{}...", prefix)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Effective session configuration used by every outbound call.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Active Plaid environment.
    pub environment: PlaidEnvironment,
    /// Base URL requests are sent to; paths are appended verbatim.
    pub base_url: String,
    /// Plaid client id, injected into every request body.
    pub client_id: Option<String>,
    /// Plaid secret, injected into every request body.
    pub secret: Option<String>,
}

impl SessionConfig {
    /// Derive a full session from a host payload.
    pub fn from_host(host: &HostConfig) -> Self {
        let environment = non_empty(&host.plaid_env)
            .map(|name| PlaidEnvironment::from_name(&name))
            .unwrap_or_default();
        let base_url = non_empty(&host.plaid_base_url)
            .unwrap_or_else(|| environment.base_url().to_string());

        Self {
            environment,
            base_url,
            client_id: non_empty(&host.plaid_client_id),
            secret: non_empty(&host.plaid_secret),
        }
    }

    /// Credentials as a pair, or `None` while either one is unset.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.client_id, &self.secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials().is_some()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_host(&HostConfig::default())
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id.as_deref().map(truncate_client_id))
            .field("secret", &self.secret.as_ref().map(|_| REDACTED))
            .finish()
    }
}
