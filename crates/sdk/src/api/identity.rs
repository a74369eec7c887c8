//! Identity API endpoints.

use super::access_token_body;
use crate::client::PlaidClient;
use crate::endpoints::IDENTITY_GET;
use crate::error::PlaidResult;
use serde_json::Value;

pub struct IdentityApi<'a> {
    client: &'a PlaidClient,
}

impl<'a> IdentityApi<'a> {
    pub(crate) fn new(client: &'a PlaidClient) -> Self {
        Self { client }
    }

    /// Retrieve identity data held by the institution.
    pub async fn get(&self, access_token: &str) -> PlaidResult<Value> {
        self.client
            .http
            .call(&IDENTITY_GET, access_token_body(access_token))
            .await
    }
}
