//! HTTP transport layer for the Plaid SDK.
//!
//! Every Plaid call goes through [`HttpTransport::send`]: credentials from the
//! current session are merged into the JSON body, the request and response are
//! logged with the secret redacted, and the response body comes back as an
//! opaque JSON value.

use crate::config::{truncate_client_id, REDACTED};
use crate::endpoints::{Endpoint, HttpMethod};
use crate::error::{PlaidError, PlaidResult};
use crate::session::SessionConfigHolder;
use reqwest::{header, Client};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

/// JSON object sent as a Plaid request body.
pub type RequestBody = Map<String, Value>;

/// HTTP transport for making Plaid API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    session: Arc<SessionConfigHolder>,
}

impl HttpTransport {
    /// Create a transport reading credentials from the given session.
    ///
    /// No client-wide timeout is set; only calls that pass one are bounded.
    pub fn new(session: Arc<SessionConfigHolder>) -> PlaidResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(concat!("plaid-sdk/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, session })
    }

    /// Session this transport reads its configuration from.
    pub fn session(&self) -> &Arc<SessionConfigHolder> {
        &self.session
    }

    /// Build the request URL. Paths are appended to the base URL as-is.
    fn build_url(base_url: &str, path: &str) -> PlaidResult<Url> {
        let raw = format!("{}{}", base_url, path);
        Url::parse(&raw)
            .map_err(|e| PlaidError::Configuration(format!("Invalid Plaid URL '{}': {}", raw, e)))
    }

    /// Send one request to Plaid.
    ///
    /// Fails with [`PlaidError::Configuration`] before touching the network if
    /// the session has no credentials. Makes exactly one attempt.
    pub async fn send(
        &self,
        path: &str,
        body: RequestBody,
        method: HttpMethod,
        timeout: Option<Duration>,
    ) -> PlaidResult<Value> {
        let call = self.session.begin_call().await;
        let (client_id, secret) = call
            .config
            .credentials()
            .ok_or_else(PlaidError::credentials_missing)?;

        let url = Self::build_url(&call.config.base_url, path)?;
        let payload = merge_credentials(body, client_id, secret);

        info!(method = %method, url = %url, "Plaid request");
        info!(body = %redact_body(&payload), "Plaid request body");

        let mut request = self
            .client
            .request(method.into(), url.clone())
            .json(&payload);
        // A zero timeout means unbounded, same as none.
        if let Some(timeout) = timeout.filter(|t| !t.is_zero()) {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(method = %method, url = %url, error = %e, "Plaid request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!(status = status.as_u16(), error = %e, "Failed to read Plaid response body");
                return Err(e.into());
            }
        };

        if !status.is_success() {
            error!(status = status.as_u16(), body = %text, "Plaid request failed");
            return Err(PlaidError::from_response(status.as_u16(), &text));
        }

        info!(status = status.as_u16(), "Plaid response");
        info!(body = %text, "Plaid response body");

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(text)),
        }
    }

    /// Send a request described by an [`Endpoint`].
    pub async fn call(&self, endpoint: &Endpoint, body: RequestBody) -> PlaidResult<Value> {
        self.send(endpoint.path, body, endpoint.method, endpoint.timeout())
            .await
    }

}

/// Merge credentials into a body. Credentials replace any caller-supplied
/// `client_id` or `secret`.
pub fn merge_credentials(mut body: RequestBody, client_id: &str, secret: &str) -> RequestBody {
    body.insert("client_id".to_string(), Value::String(client_id.to_string()));
    body.insert("secret".to_string(), Value::String(secret.to_string()));
    body
}

/// Copy of a request body that is safe to log.
pub fn redact_body(body: &RequestBody) -> Value {
    let mut redacted = body.clone();
    if redacted.contains_key("secret") {
        redacted.insert("secret".to_string(), Value::String(REDACTED.to_string()));
    }
    if let Some(Value::String(client_id)) = body.get("client_id") {
        redacted.insert(
            "client_id".to_string(),
            Value::String(truncate_client_id(client_id)),
        );
    }
    Value::Object(redacted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;
    use crate::endpoints::{ITEM_GET, TRANSACTIONS_GET};
    use serde_json::json;
    use std::io;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;
    use wiremock::matchers::{any, body_json, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CLIENT_ID: &str = "client_id_0123456789abcdef";
    const SECRET: &str = "sandbox-secret-do-not-log";

    fn configured_session(base_url: &str) -> Arc<SessionConfigHolder> {
        Arc::new(SessionConfigHolder::with_host_config(&HostConfig {
            plaid_client_id: Some(CLIENT_ID.to_string()),
            plaid_secret: Some(SECRET.to_string()),
            plaid_env: None,
            plaid_base_url: Some(base_url.to_string()),
        }))
    }

    fn create_transport(base_url: &str) -> HttpTransport {
        HttpTransport::new(configured_session(base_url)).unwrap()
    }

    fn body(value: Value) -> RequestBody {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_post_injects_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/item/get"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({
                "client_id": CLIENT_ID,
                "secret": SECRET,
                "access_token": "access-sandbox-1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "item": {"item_id": "item-1"},
                "request_id": "req-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = create_transport(&server.uri());
        let result = transport
            .call(&ITEM_GET, body(json!({"access_token": "access-sandbox-1"})))
            .await
            .unwrap();

        assert_eq!(result["item"]["item_id"], "item-1");
        assert_eq!(transport.session().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_credentials_win_on_collision() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts/get"))
            .and(body_partial_json(json!({"client_id": CLIENT_ID, "secret": SECRET})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accounts": []})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = create_transport(&server.uri());
        transport
            .send(
                "/accounts/get",
                body(json!({"client_id": "someone-else", "secret": "guess", "access_token": "t"})),
                HttpMethod::Post,
                None,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_network() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = Arc::new(SessionConfigHolder::with_host_config(&HostConfig {
            plaid_client_id: Some(CLIENT_ID.to_string()),
            plaid_secret: None,
            plaid_env: None,
            plaid_base_url: Some(server.uri()),
        }));
        let transport = HttpTransport::new(session).unwrap();

        let err = transport
            .call(&ITEM_GET, body(json!({"access_token": "t"})))
            .await
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("credentials not configured"));
        assert_eq!(transport.session().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_error_on_400_carries_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/item/get"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error_code": "INVALID_ACCESS_TOKEN"})),
            )
            .mount(&server)
            .await;

        let transport = create_transport(&server.uri());
        let err = transport
            .call(&ITEM_GET, body(json!({"access_token": "bad"})))
            .await
            .unwrap_err();

        match err {
            PlaidError::Transport { status, body, .. } => {
                assert_eq!(status, Some(400));
                assert_eq!(body, Some(json!({"error_code": "INVALID_ACCESS_TOKEN"})));
            }
            other => panic!("Expected Transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_attempt_on_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = create_transport(&server.uri());
        let err = transport
            .send("/item/get", RequestBody::new(), HttpMethod::Post, None)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(err.body(), Some(&json!("unavailable")));
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transactions/get"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"transactions": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let transport = create_transport(&server.uri());
        let err = transport
            .send(
                TRANSACTIONS_GET.path,
                RequestBody::new(),
                HttpMethod::Post,
                Some(Duration::from_millis(100)),
            )
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.status().is_none());
    }

    #[tokio::test]
    async fn test_zero_timeout_means_unbounded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transactions/sync"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"next_cursor": "c1"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = create_transport(&server.uri());
        let result = transport
            .send(
                "/transactions/sync",
                RequestBody::new(),
                HttpMethod::Post,
                Some(Duration::ZERO),
            )
            .await
            .unwrap();

        assert_eq!(result["next_cursor"], "c1");
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Nothing listens on port 9 on the loopback interface.
        let transport = create_transport("http://127.0.0.1:9");
        let err = transport
            .send(
                "/item/get",
                RequestBody::new(),
                HttpMethod::Post,
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PlaidError::Transport { status: None, body: None, .. }));
        assert!(err.to_string().starts_with("Network error"));
    }

    #[tokio::test]
    async fn test_non_json_success_body_returned_as_string() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let transport = create_transport(&server.uri());
        let result = transport
            .send("/item/remove", RequestBody::new(), HttpMethod::Post, None)
            .await
            .unwrap();

        assert_eq!(result, json!("ok"));
    }

    #[tokio::test]
    async fn test_other_methods() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/item/remove"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"removed": true})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = create_transport(&server.uri());
        let result = transport
            .send("/item/remove", RequestBody::new(), HttpMethod::Delete, None)
            .await
            .unwrap();

        assert_eq!(result["removed"], true);
    }

    #[tokio::test]
    async fn test_base_url_with_path_prefix() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/proxy/item/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = create_transport(&format!("{}/proxy", server.uri()));
        transport
            .call(&ITEM_GET, RequestBody::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_base_url_is_configuration_error() {
        let transport = create_transport("not a url");
        let err = transport
            .call(&ITEM_GET, RequestBody::new())
            .await
            .unwrap_err();

        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_logs_never_contain_secret() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_id": "req-9"})))
            .mount(&server)
            .await;

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let transport = create_transport(&server.uri());
        transport
            .call(&ITEM_GET, body(json!({"access_token": "access-sandbox-1"})))
            .await
            .unwrap();

        let output = logs.contents();
        assert!(output.contains("Plaid request"));
        assert!(output.contains("req-9"));
        assert!(output.contains(REDACTED));
        assert!(output.contains("client_id_..."));
        assert!(!output.contains(SECRET));
        assert!(!output.contains(CLIENT_ID));
    }

    #[test]
    fn test_redact_body() {
        let payload = merge_credentials(
            body(json!({"access_token": "tok"})),
            "abcdefghijklmnop",
            "s3cr3t",
        );

        let redacted = redact_body(&payload);
        assert_eq!(
            redacted,
            json!({
                "access_token": "tok",
                "client_id": "abcdefghij...",
                "secret": REDACTED
            })
        );
        // The original payload is untouched.
        assert_eq!(payload["secret"], "s3cr3t");
    }

    #[test]
    fn test_build_url_concatenates() {
        let url = HttpTransport::build_url("https://sandbox.plaid.com", "/item/get").unwrap();
        assert_eq!(url.as_str(), "https://sandbox.plaid.com/item/get");
    }
}
