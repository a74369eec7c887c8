//! # Plaid SDK
//!
//! Thin client for the subset of the Plaid API exposed by the MCP adapter.
//!
//! Credentials live in a shared [`SessionConfigHolder`] and are injected into
//! every JSON body by the [`HttpTransport`]. Responses are returned as opaque
//! [`serde_json::Value`]s.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plaid_sdk::{GetTransactionsRequest, PlaidClient, PlaidEnvironment, PlaidResult};
//!
//! #[tokio::main]
//! async fn main() -> PlaidResult<()> {
//!     let client = PlaidClient::builder()
//!         .client_id("your-client-id")
//!         .secret("your-secret")
//!         .environment(PlaidEnvironment::Sandbox)
//!         .build()?;
//!
//!     let accounts = client.accounts().get("access-sandbox-123").await?;
//!     println!("{:#}", accounts);
//!
//!     let transactions = client
//!         .transactions()
//!         .get(GetTransactionsRequest::new("access-sandbox-123", "2024-01-01", "2024-01-31"))
//!         .await?;
//!     println!("{}", transactions["total_transactions"]);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod session;
pub mod transport;

pub use api::{GetTransactionsRequest, SyncTransactionsRequest};
pub use client::{PlaidClient, PlaidClientBuilder};
pub use config::{HostConfig, PlaidEnvironment, SessionConfig};
pub use endpoints::{Endpoint, HttpMethod};
pub use error::{PlaidError, PlaidResult};
pub use session::SessionConfigHolder;
pub use transport::{HttpTransport, RequestBody};
