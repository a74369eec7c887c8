//! Item API endpoints.

use super::access_token_body;
use crate::client::PlaidClient;
use crate::endpoints::{ITEM_GET, ITEM_REMOVE};
use crate::error::PlaidResult;
use serde_json::Value;

/// Items API for inspecting and unlinking Items.
pub struct ItemsApi<'a> {
    client: &'a PlaidClient,
}

impl<'a> ItemsApi<'a> {
    pub(crate) fn new(client: &'a PlaidClient) -> Self {
        Self { client }
    }

    /// Get an Item.
    pub async fn get(&self, access_token: &str) -> PlaidResult<Value> {
        self.client
            .http
            .call(&ITEM_GET, access_token_body(access_token))
            .await
    }

    /// Remove an Item. The access token is invalid afterwards.
    pub async fn remove(&self, access_token: &str) -> PlaidResult<Value> {
        self.client
            .http
            .call(&ITEM_REMOVE, access_token_body(access_token))
            .await
    }
}
