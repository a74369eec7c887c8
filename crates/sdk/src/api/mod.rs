//! Typed accessors for the supported Plaid endpoints.
//!
//! Responses are returned as opaque JSON; no schema is imposed on what Plaid
//! sends back.

pub mod accounts;
pub mod identity;
pub mod items;
pub mod transactions;

pub use accounts::AccountsApi;
pub use identity::IdentityApi;
pub use items::ItemsApi;
pub use transactions::{GetTransactionsRequest, SyncTransactionsRequest, TransactionsApi};

use crate::transport::RequestBody;
use serde_json::Value;

/// Body carrying only an access token.
pub(crate) fn access_token_body(access_token: &str) -> RequestBody {
    let mut body = RequestBody::new();
    body.insert(
        "access_token".to_string(),
        Value::String(access_token.to_string()),
    );
    body
}
