//! Transactions API endpoints.

use crate::client::PlaidClient;
use crate::endpoints::{TRANSACTIONS_GET, TRANSACTIONS_SYNC};
use crate::error::PlaidResult;
use crate::transport::RequestBody;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Transactions API for date-range queries and cursor-based sync.
pub struct TransactionsApi<'a> {
    client: &'a PlaidClient,
}

impl<'a> TransactionsApi<'a> {
    pub(crate) fn new(client: &'a PlaidClient) -> Self {
        Self { client }
    }

    /// Retrieve transactions in a date range.
    pub async fn get(&self, request: GetTransactionsRequest) -> PlaidResult<Value> {
        self.client
            .http
            .call(&TRANSACTIONS_GET, request.into_body())
            .await
    }

    /// Sync transactions since the last cursor.
    pub async fn sync(&self, request: SyncTransactionsRequest) -> PlaidResult<Value> {
        self.client
            .http
            .call(&TRANSACTIONS_SYNC, request.into_body())
            .await
    }
}

/// Request for `/transactions/get`. Dates are `YYYY-MM-DD` strings and are
/// passed through unparsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetTransactionsRequest {
    pub access_token: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

impl GetTransactionsRequest {
    pub fn new(
        access_token: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = Some(options);
        self
    }

    fn into_body(self) -> RequestBody {
        let mut body = RequestBody::new();
        body.insert("access_token".to_string(), Value::String(self.access_token));
        body.insert("start_date".to_string(), Value::String(self.start_date));
        body.insert("end_date".to_string(), Value::String(self.end_date));
        if let Some(options) = self.options {
            body.insert("options".to_string(), Value::Object(options));
        }
        body
    }
}

/// Request for `/transactions/sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncTransactionsRequest {
    pub access_token: String,
    /// Cursor returned by the previous sync; omit to start from the beginning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl SyncTransactionsRequest {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            cursor: None,
            count: None,
        }
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    fn into_body(self) -> RequestBody {
        let mut body = RequestBody::new();
        body.insert("access_token".to_string(), Value::String(self.access_token));
        if let Some(cursor) = self.cursor {
            body.insert("cursor".to_string(), Value::String(cursor));
        }
        if let Some(count) = self.count {
            body.insert("count".to_string(), Value::from(count));
        }
        body
    }
}
