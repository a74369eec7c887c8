//! Main client for the Plaid SDK.

use crate::api::*;
use crate::config::{HostConfig, PlaidEnvironment};
use crate::error::PlaidResult;
use crate::session::SessionConfigHolder;
use crate::transport::HttpTransport;
use std::sync::Arc;

/// Client for the Plaid endpoints this crate supports.
#[derive(Debug, Clone)]
pub struct PlaidClient {
    pub(crate) http: HttpTransport,
}

impl PlaidClient {
    /// Create a new client builder.
    pub fn builder() -> PlaidClientBuilder {
        PlaidClientBuilder::new()
    }

    /// Create a client that reads its configuration from a shared session.
    pub fn new(session: Arc<SessionConfigHolder>) -> PlaidResult<Self> {
        Ok(Self {
            http: HttpTransport::new(session)?,
        })
    }

    /// Underlying transport, for calls not covered by the typed APIs.
    pub fn transport(&self) -> &HttpTransport {
        &self.http
    }

    /// Get the items API.
    pub fn items(&self) -> ItemsApi<'_> {
        ItemsApi::new(self)
    }

    /// Get the accounts API.
    pub fn accounts(&self) -> AccountsApi<'_> {
        AccountsApi::new(self)
    }

    /// Get the identity API.
    pub fn identity(&self) -> IdentityApi<'_> {
        IdentityApi::new(self)
    }

    /// Get the transactions API.
    pub fn transactions(&self) -> TransactionsApi<'_> {
        TransactionsApi::new(self)
    }
}

/// Builder for creating a PlaidClient with its own session.
#[derive(Default)]
pub struct PlaidClientBuilder {
    host: HostConfig,
}

impl PlaidClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Plaid client id.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.host.plaid_client_id = Some(client_id.into());
        self
    }

    /// Set the Plaid secret.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.host.plaid_secret = Some(secret.into());
        self
    }

    /// Select the Plaid environment.
    pub fn environment(mut self, environment: PlaidEnvironment) -> Self {
        self.host.plaid_env = Some(environment.as_str().to_string());
        self
    }

    /// Override the base URL derived from the environment.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.host.plaid_base_url = Some(url.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> PlaidResult<PlaidClient> {
        PlaidClient::new(Arc::new(SessionConfigHolder::with_host_config(&self.host)))
    }
}
