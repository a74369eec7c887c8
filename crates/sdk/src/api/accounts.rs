//! Accounts API endpoints.

use super::access_token_body;
use crate::client::PlaidClient;
use crate::endpoints::{ACCOUNTS_BALANCE_GET, ACCOUNTS_GET};
use crate::error::PlaidResult;
use serde_json::Value;

/// Accounts API for account metadata and balances.
pub struct AccountsApi<'a> {
    client: &'a PlaidClient,
}

impl<'a> AccountsApi<'a> {
    pub(crate) fn new(client: &'a PlaidClient) -> Self {
        Self { client }
    }

    /// Retrieve an Item's accounts.
    pub async fn get(&self, access_token: &str) -> PlaidResult<Value> {
        self.client
            .http
            .call(&ACCOUNTS_GET, access_token_body(access_token))
            .await
    }

    /// Retrieve current balances for an Item's accounts.
    pub async fn balances(&self, access_token: &str) -> PlaidResult<Value> {
        self.client
            .http
            .call(&ACCOUNTS_BALANCE_GET, access_token_body(access_token))
            .await
    }
}
