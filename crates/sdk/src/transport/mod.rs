//! Transport layer for the Plaid SDK.

pub mod http;

pub use http::{merge_credentials, redact_body, HttpTransport, RequestBody};
