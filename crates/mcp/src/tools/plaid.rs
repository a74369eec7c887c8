// Plaid tools: one declarative table, one generic handler.

use crate::error::{McpError, ToolError};
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    json_schema_number, json_schema_object, json_schema_record, json_schema_string, Tool,
    ToolRegistry,
};
use plaid_sdk::endpoints::{
    ACCOUNTS_BALANCE_GET, ACCOUNTS_GET, IDENTITY_GET, ITEM_GET, ITEM_REMOVE, TRANSACTIONS_GET,
    TRANSACTIONS_SYNC,
};
use plaid_sdk::{Endpoint, HttpTransport, RequestBody};
use serde_json::{Map, Value};
use std::sync::Arc;

/// JSON type accepted for an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    /// Free-form object, forwarded as-is.
    Object,
}

impl FieldKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Object => value.is_object(),
        }
    }

    fn schema(&self, description: &str) -> Value {
        match self {
            Self::String => json_schema_string(description),
            Self::Number => json_schema_number(description),
            Self::Object => json_schema_record(description),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Object => "object",
        }
    }
}

/// One input field of a Plaid tool.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSpec {
    const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// Name, description, input fields and upstream endpoint of one tool.
#[derive(Debug, Clone, Copy)]
pub struct PlaidToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub endpoint: Endpoint,
    pub fields: &'static [FieldSpec],
}

const ACCESS_TOKEN: FieldSpec =
    FieldSpec::required("access_token", FieldKind::String, "Plaid Item access token");

const ACCESS_TOKEN_ONLY: &[FieldSpec] = &[ACCESS_TOKEN];

/// Every tool the server exposes, in listing order.
pub const PLAID_TOOLS: &[PlaidToolSpec] = &[
    PlaidToolSpec {
        name: "get_item",
        description: "Get an Item",
        endpoint: ITEM_GET,
        fields: ACCESS_TOKEN_ONLY,
    },
    PlaidToolSpec {
        name: "remove_item",
        description: "Remove an Item",
        endpoint: ITEM_REMOVE,
        fields: ACCESS_TOKEN_ONLY,
    },
    PlaidToolSpec {
        name: "get_accounts",
        description: "Retrieve an Item's accounts",
        endpoint: ACCOUNTS_GET,
        fields: ACCESS_TOKEN_ONLY,
    },
    PlaidToolSpec {
        name: "get_balances",
        description: "Retrieve current balances for an Item's accounts",
        endpoint: ACCOUNTS_BALANCE_GET,
        fields: ACCESS_TOKEN_ONLY,
    },
    PlaidToolSpec {
        name: "get_identity",
        description: "Retrieve identity data",
        endpoint: IDENTITY_GET,
        fields: ACCESS_TOKEN_ONLY,
    },
    PlaidToolSpec {
        name: "get_transactions",
        description: "Retrieve transactions in a date range",
        endpoint: TRANSACTIONS_GET,
        fields: &[
            ACCESS_TOKEN,
            FieldSpec::required("start_date", FieldKind::String, "Start of date range, YYYY-MM-DD"),
            FieldSpec::required("end_date", FieldKind::String, "End of date range, YYYY-MM-DD"),
            FieldSpec::optional("options", FieldKind::Object, "Additional request options"),
        ],
    },
    PlaidToolSpec {
        name: "sync_transactions",
        description: "Sync transactions since last cursor",
        endpoint: TRANSACTIONS_SYNC,
        fields: &[
            ACCESS_TOKEN,
            FieldSpec::optional("cursor", FieldKind::String, "Cursor from previous sync"),
            FieldSpec::optional("count", FieldKind::Number, "Max number of transactions to return"),
        ],
    },
];

impl PlaidToolSpec {
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.kind.schema(f.description)))
            .collect();
        let required = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        json_schema_object(Value::Object(properties), required)
    }

    /// Check arguments against the declared fields and build the request body.
    ///
    /// Only declared fields are forwarded. Absent optional fields stay absent
    /// from the body; they are never sent as `null`.
    pub fn validate(&self, arguments: Value) -> Result<RequestBody, ToolError> {
        let mut arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ToolError::invalid_arguments(
                    self.name,
                    format!("expected an object, got {}", json_type(&other)),
                ))
            }
        };

        let mut body = RequestBody::new();
        for field in self.fields {
            match arguments.remove(field.name) {
                Some(value) if field.kind.matches(&value) => {
                    body.insert(field.name.to_string(), value);
                }
                Some(value) => {
                    return Err(ToolError::invalid_arguments(
                        self.name,
                        format!(
                            "field `{}` must be a {}, got {}",
                            field.name,
                            field.kind.name(),
                            json_type(&value)
                        ),
                    ))
                }
                None if field.required => {
                    return Err(ToolError::invalid_arguments(
                        self.name,
                        format!("missing required field `{}`", field.name),
                    ))
                }
                None => {}
            }
        }

        if !arguments.is_empty() {
            let ignored: Vec<&String> = arguments.keys().collect();
            tracing::debug!(tool = self.name, ?ignored, "Dropping undeclared arguments");
        }

        Ok(body)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Tool forwarding validated input to one Plaid endpoint.
pub struct PlaidTool {
    spec: &'static PlaidToolSpec,
    transport: HttpTransport,
}

impl PlaidTool {
    pub fn new(spec: &'static PlaidToolSpec, transport: HttpTransport) -> Self {
        Self { spec, transport }
    }
}

#[async_trait::async_trait]
impl Tool for PlaidTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.spec.name.to_string(),
            description: self.spec.description.to_string(),
            input_schema: self.spec.input_schema(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let body = self.spec.validate(arguments)?;
        let result = self.transport.call(&self.spec.endpoint, body).await?;
        Ok(CallToolResult::text(serde_json::to_string_pretty(&result)?))
    }
}

/// Register every entry of [`PLAID_TOOLS`], all sharing one transport.
pub fn register_plaid_tools(
    registry: &mut ToolRegistry,
    transport: &HttpTransport,
) -> Result<(), McpError> {
    for spec in PLAID_TOOLS {
        registry.register(Arc::new(PlaidTool::new(spec, transport.clone())))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaid_sdk::{HostConfig, SessionConfigHolder};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{any, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn spec(name: &str) -> &'static PlaidToolSpec {
        PLAID_TOOLS.iter().find(|s| s.name == name).unwrap()
    }

    fn transport_for(base_url: &str, configured: bool) -> HttpTransport {
        let host = HostConfig {
            plaid_client_id: configured.then(|| "client-abc".to_string()),
            plaid_secret: configured.then(|| "secret-xyz".to_string()),
            plaid_env: None,
            plaid_base_url: Some(base_url.to_string()),
        };
        HttpTransport::new(Arc::new(SessionConfigHolder::with_host_config(&host))).unwrap()
    }

    #[test]
    fn test_table_matches_endpoints() {
        let expected = [
            ("get_item", "/item/get", None),
            ("remove_item", "/item/remove", None),
            ("get_accounts", "/accounts/get", None),
            ("get_balances", "/accounts/balance/get", None),
            ("get_identity", "/identity/get", None),
            ("get_transactions", "/transactions/get", Some(Duration::from_millis(30_000))),
            ("sync_transactions", "/transactions/sync", Some(Duration::from_millis(30_000))),
        ];

        assert_eq!(PLAID_TOOLS.len(), expected.len());
        for (spec, (name, endpoint_path, timeout)) in PLAID_TOOLS.iter().zip(expected) {
            assert_eq!(spec.name, name);
            assert_eq!(spec.endpoint.path, endpoint_path);
            assert_eq!(spec.endpoint.timeout(), timeout);
        }
    }

    #[test]
    fn test_input_schema_for_transactions() {
        let schema = spec("get_transactions").input_schema();

        assert_eq!(
            schema["required"],
            json!(["access_token", "start_date", "end_date"])
        );
        assert_eq!(schema["properties"]["options"]["type"], "object");
        assert_eq!(
            schema["properties"]["start_date"]["description"],
            "Start of date range, YYYY-MM-DD"
        );

        let sync = spec("sync_transactions").input_schema();
        assert_eq!(sync["required"], json!(["access_token"]));
        assert_eq!(sync["properties"]["count"]["type"], "number");
    }

    #[test]
    fn test_validate_rejects_missing_required() {
        let err = spec("get_transactions")
            .validate(json!({"access_token": "tok", "start_date": "2024-01-01"}))
            .unwrap_err();

        assert!(err.to_string().contains("missing required field `end_date`"));
        assert!(err.to_rpc_error().is_some());
    }

    #[test]
    fn test_validate_rejects_wrong_types_and_null() {
        let err = spec("sync_transactions")
            .validate(json!({"access_token": "tok", "count": "ten"}))
            .unwrap_err();
        assert!(err.to_string().contains("field `count` must be a number, got string"));

        let err = spec("sync_transactions")
            .validate(json!({"access_token": "tok", "cursor": null}))
            .unwrap_err();
        assert!(err.to_string().contains("got null"));

        let err = spec("get_item").validate(json!(["tok"])).unwrap_err();
        assert!(err.to_string().contains("expected an object"));
    }

    #[test]
    fn test_validate_drops_undeclared_and_keeps_absent_optional_absent() {
        let body = spec("sync_transactions")
            .validate(json!({"access_token": "tok_2", "secret": "injected", "extra": 1}))
            .unwrap();

        assert_eq!(Value::Object(body), json!({"access_token": "tok_2"}));
    }

    #[test]
    fn test_validate_does_not_parse_dates() {
        let body = spec("get_transactions")
            .validate(json!({
                "access_token": "tok",
                "start_date": "not-a-date",
                "end_date": "2024-13-45"
            }))
            .unwrap();

        assert_eq!(body["start_date"], "not-a-date");
        assert_eq!(body["end_date"], "2024-13-45");
    }

    #[tokio::test]
    async fn test_execute_returns_pretty_printed_upstream_body() {
        let server = MockServer::start().await;
        let upstream = json!({
            "accounts": [{"account_id": "acc-1", "balances": {"available": 100.5, "current": 110}}],
            "item": {"item_id": "item-1"},
            "request_id": "req-42"
        });

        Mock::given(method("POST"))
            .and(path("/accounts/balance/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
            .mount(&server)
            .await;

        let tool = PlaidTool::new(spec("get_balances"), transport_for(&server.uri(), true));
        let result = tool.execute(json!({"access_token": "tok"})).await.unwrap();

        assert!(!result.is_error());
        assert_eq!(result.content.len(), 1);
        let text = result.content[0].as_text();
        assert_eq!(text, serde_json::to_string_pretty(&upstream).unwrap());
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), upstream);
    }

    #[tokio::test]
    async fn test_sync_transactions_omits_cursor_and_count() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transactions/sync"))
            .and(body_json(json!({
                "client_id": "client-abc",
                "secret": "secret-xyz",
                "access_token": "tok_2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"next_cursor": "c1"})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = PlaidTool::new(spec("sync_transactions"), transport_for(&server.uri(), true));
        tool.execute(json!({"access_token": "tok_2"})).await.unwrap();
    }

    #[tokio::test]
    async fn test_unconfigured_call_fails_without_request() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tool = PlaidTool::new(spec("get_item"), transport_for(&server.uri(), false));
        let err = tool.execute(json!({"access_token": "tok"})).await.unwrap_err();

        match err {
            ToolError::Plaid(plaid) => assert!(plaid.is_configuration()),
            other => panic!("Expected Plaid configuration error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upstream_error_propagates_unchanged() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/identity/get"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error_code": "INVALID_ACCESS_TOKEN"})),
            )
            .mount(&server)
            .await;

        let tool = PlaidTool::new(spec("get_identity"), transport_for(&server.uri(), true));
        let err = tool.execute(json!({"access_token": "bad"})).await.unwrap_err();

        match err {
            ToolError::Plaid(plaid) => {
                assert_eq!(plaid.status(), Some(400));
                assert_eq!(plaid.body(), Some(&json!({"error_code": "INVALID_ACCESS_TOKEN"})));
            }
            other => panic!("Expected Plaid transport error, got {:?}", other),
        }
    }

    #[test]
    fn test_register_all_tools() {
        let mut registry = ToolRegistry::new();
        register_plaid_tools(&mut registry, &transport_for("http://localhost", true)).unwrap();

        assert_eq!(registry.len(), 7);
        let names: Vec<String> = registry.list_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names[0], "get_item");
        assert_eq!(names[6], "sync_transactions");

        // Registering the table twice collides on names.
        assert!(register_plaid_tools(&mut registry, &transport_for("http://localhost", true)).is_err());
    }
}
