//! Operation Executor
//!
//! Maps catalog operations to engine REST calls: resolves the path template,
//! checks and encodes query parameters, attaches the body, and classifies
//! the engine's answer.

use super::operation::Operation;
use super::registry::{get_operation, template_placeholders, OperationDef, QueryType, ResponseKind};
use crate::engine::http::{sanitize_for_log, TransportRequest};
use crate::engine::EngineClient;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parameters for a single operation call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    pub path: BTreeMap<String, String>,
    pub query: Map<String, Value>,
    pub body: Option<Value>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a path placeholder value
    pub fn path(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path.insert(name.to_string(), value.into());
        self
    }

    /// Set a query parameter
    pub fn query(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.query.insert(name.to_string(), value.into());
        self
    }

    /// Set a query parameter only when a value is present
    pub fn query_opt<V: Into<Value>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Serialize and attach a request body
    pub fn body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// Execute a catalog operation
pub async fn execute(
    client: &EngineClient,
    op: Operation,
    params: RequestParams,
) -> Result<Option<Value>> {
    let def = get_operation(op)?;

    let path = resolve_path(op, def, &params.path)?;
    let query = encode_query(op, def, &params.query)?;
    if def.requires_body() && params.body.is_none() {
        return Err(Error::MissingParameter {
            operation: op.as_str(),
            name: "body".to_string(),
        });
    }

    let url = client.endpoint(&path);
    tracing::debug!("{} {} ({})", def.method, url, op);

    let response = client
        .transport()
        .request(TransportRequest {
            method: def.method.clone(),
            url,
            query,
            body: params.body,
        })
        .await?;

    if !response.is_success() {
        // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
        tracing::error!(
            "{} failed: {} - {}",
            op,
            response.status,
            sanitize_for_log(&response.body)
        );
        return Err(Error::Request {
            status: response.status,
            message: error_message(&response.body),
            body: response.body,
        });
    }

    decode_body(op, def.response, &response.body)
}

/// Execute an operation looked up by its engine name, e.g. `"NodeList"`
pub async fn execute_named(
    client: &EngineClient,
    name: &str,
    params: RequestParams,
) -> Result<Option<Value>> {
    let op: Operation = name.parse()?;
    execute(client, op, params).await
}

/// Execute an operation and deserialize its JSON answer
pub async fn execute_json<T: DeserializeOwned>(
    client: &EngineClient,
    op: Operation,
    params: RequestParams,
) -> Result<T> {
    let value = execute(client, op, params).await?.unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|source| Error::Decode {
        what: op.as_str(),
        source,
    })
}

/// Substitute every `{name}` placeholder with its percent-encoded value
pub(crate) fn resolve_path(
    op: Operation,
    def: &OperationDef,
    params: &BTreeMap<String, String>,
) -> Result<String> {
    for name in params.keys() {
        if !def.path_params.contains(name) {
            return Err(Error::InvalidParameter {
                operation: op.as_str(),
                name: name.clone(),
                reason: "not a path parameter of this operation".to_string(),
            });
        }
    }

    let placeholders = template_placeholders(&def.path).map_err(Error::Catalog)?;
    let mut path = def.path.clone();

    for name in placeholders {
        let value = params
            .get(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::MissingParameter {
                operation: op.as_str(),
                name: name.to_string(),
            })?;
        // Dot segments would be collapsed by URL normalization
        if value == "." || value == ".." {
            return Err(Error::InvalidParameter {
                operation: op.as_str(),
                name: name.to_string(),
                reason: format!("{:?} is not a valid identifier", value),
            });
        }
        path = path.replacen(
            &format!("{{{}}}", name),
            &urlencoding::encode(value),
            1,
        );
    }

    Ok(path)
}

/// Check query parameters against the descriptor and render them as strings,
/// in descriptor order
pub(crate) fn encode_query(
    op: Operation,
    def: &OperationDef,
    params: &Map<String, Value>,
) -> Result<Vec<(String, String)>> {
    let invalid = |name: &str, reason: String| Error::InvalidParameter {
        operation: op.as_str(),
        name: name.to_string(),
        reason,
    };

    for name in params.keys() {
        if def.query_param(name).is_none() {
            return Err(invalid(name, "unknown query parameter".to_string()));
        }
    }

    let mut pairs = Vec::new();

    for param in &def.query {
        let value = match params.get(&param.name) {
            None | Some(Value::Null) => {
                if param.required {
                    return Err(Error::MissingParameter {
                        operation: op.as_str(),
                        name: param.name.clone(),
                    });
                }
                continue;
            }
            Some(value) => value,
        };

        let rendered = match (param.kind, value) {
            (QueryType::Boolean, Value::Bool(b)) => b.to_string(),
            (QueryType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
            (QueryType::String, Value::String(s)) => s.clone(),
            (QueryType::Json, Value::String(s)) => s.clone(),
            (QueryType::Json, other) => serde_json::to_string(other)?,
            (kind, other) => {
                return Err(invalid(
                    &param.name,
                    format!("expected {:?}, got {}", kind, other),
                ))
            }
        };

        pairs.push((param.name.clone(), rendered));
    }

    Ok(pairs)
}

fn decode_body(op: Operation, kind: ResponseKind, body: &str) -> Result<Option<Value>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }

    match kind {
        ResponseKind::Json => serde_json::from_str(body)
            .map(Some)
            .map_err(|source| Error::Decode {
                what: op.as_str(),
                source,
            }),
        // Acknowledgements are usually empty; keep whatever came back
        ResponseKind::Empty => Ok(Some(
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())),
        )),
    }
}

/// Pull the engine's `{"message": ...}` out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Transport, TransportResponse};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Records every request and answers with a canned response
    struct RecordingTransport {
        requests: Mutex<Vec<TransportRequest>>,
        status: u16,
        body: String,
    }

    impl RecordingTransport {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                status,
                body: body.to_string(),
            })
        }

        fn requests(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn request(&self, request: TransportRequest) -> Result<TransportResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(TransportResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn client_with(transport: Arc<RecordingTransport>) -> EngineClient {
        EngineClient::builder()
            .host("tcp://engine.test:2375")
            .transport(transport)
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_path_encodes_values() {
        let def = get_operation(Operation::NodeInspect).unwrap();
        let params = RequestParams::new().path("id", "a b/c");
        let path = resolve_path(Operation::NodeInspect, def, &params.path).unwrap();
        assert_eq!(path, "/nodes/a%20b%2Fc");
    }

    #[test]
    fn test_resolve_path_missing_placeholder() {
        let def = get_operation(Operation::SecretDelete).unwrap();
        let err = resolve_path(Operation::SecretDelete, def, &BTreeMap::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingParameter { operation: "SecretDelete", ref name } if name == "id"
        ));

        let empty = RequestParams::new().path("id", "");
        assert!(resolve_path(Operation::SecretDelete, def, &empty.path).is_err());
    }

    #[test]
    fn test_dot_segment_ids_are_not_sent() {
        let transport = RecordingTransport::new(200, "");
        let client = client_with(transport.clone());

        for id in [".", ".."] {
            let err = tokio_test::block_on(execute(
                &client,
                Operation::SecretInspect,
                RequestParams::new().path("id", id),
            ))
            .unwrap_err();
            assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "id"));
        }
        assert!(transport.requests().is_empty());

        let def = get_operation(Operation::SecretInspect).unwrap();
        let dotted = RequestParams::new().path("id", "...");
        assert_eq!(
            resolve_path(Operation::SecretInspect, def, &dotted.path).unwrap(),
            "/secrets/..."
        );
    }

    #[test]
    fn test_resolve_path_rejects_unknown_placeholder() {
        let def = get_operation(Operation::NodeList).unwrap();
        let params = RequestParams::new().path("id", "x");
        let err = resolve_path(Operation::NodeList, def, &params.path).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_encode_query_follows_descriptor_order() {
        let def = get_operation(Operation::SwarmUpdate).unwrap();
        let params = RequestParams::new()
            .query("rotateManagerToken", true)
            .query("version", 42u64);
        let pairs = encode_query(Operation::SwarmUpdate, def, &params.query).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("version".to_string(), "42".to_string()),
                ("rotateManagerToken".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_encode_query_validation() {
        let def = get_operation(Operation::NodeUpdate).unwrap();

        let missing = encode_query(Operation::NodeUpdate, def, &Map::new()).unwrap_err();
        assert!(matches!(missing, Error::MissingParameter { ref name, .. } if name == "version"));

        let wrong_type = RequestParams::new().query("version", "seven");
        let err = encode_query(Operation::NodeUpdate, def, &wrong_type.query).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));

        let unknown = RequestParams::new().query("version", 1).query("force", true);
        let err = encode_query(Operation::NodeUpdate, def, &unknown.query).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "force"));
    }

    #[test]
    fn test_encode_query_serializes_json_filters() {
        let def = get_operation(Operation::SecretList).unwrap();
        let params = RequestParams::new().query("filters", json!({"name": ["s1"]}));
        let pairs = encode_query(Operation::SecretList, def, &params.query).unwrap();
        assert_eq!(pairs, vec![("filters".to_string(), r#"{"name":["s1"]}"#.to_string())]);
    }

    #[test]
    fn test_execute_builds_transport_request() {
        let transport = RecordingTransport::new(200, "");
        let client = client_with(transport.clone());

        let params = RequestParams::new()
            .path("id", "node-1")
            .query("version", 7)
            .body(&json!({"Availability": "pause"}))
            .unwrap();
        let ack = tokio_test::block_on(execute(&client, Operation::NodeUpdate, params)).unwrap();
        assert_eq!(ack, None);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, reqwest::Method::POST);
        assert_eq!(requests[0].url, "http://engine.test:2375/v1.41/nodes/node-1/update");
        assert_eq!(requests[0].query, vec![("version".to_string(), "7".to_string())]);
        assert_eq!(requests[0].body, Some(json!({"Availability": "pause"})));
    }

    #[test]
    fn test_missing_body_fails_before_network() {
        let transport = RecordingTransport::new(200, "");
        let client = client_with(transport.clone());

        let err = tokio_test::block_on(execute(
            &client,
            Operation::SecretCreate,
            RequestParams::new(),
        ))
        .unwrap_err();
        assert!(matches!(err, Error::MissingParameter { ref name, .. } if name == "body"));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_non_success_becomes_request_error() {
        let transport = RecordingTransport::new(
            409,
            r#"{"message":"update out of sequence"}"#,
        );
        let client = client_with(transport);

        let params = RequestParams::new()
            .query("version", 1)
            .body(&json!({}))
            .unwrap();
        let err = tokio_test::block_on(execute(&client, Operation::SwarmUpdate, params)).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.message(), Some("update out of sequence"));
        assert_eq!(err.to_string(), "Response code 409 (Conflict)");
    }

    #[test]
    fn test_execute_named_dispatches_by_name() {
        let transport = RecordingTransport::new(200, r#"[{"ID":"n1"}]"#);
        let client = client_with(transport.clone());

        let nodes =
            tokio_test::block_on(execute_named(&client, "NodeList", RequestParams::new())).unwrap();
        assert_eq!(nodes, Some(json!([{"ID": "n1"}])));
        assert!(transport.requests()[0].url.ends_with("/v1.41/nodes"));

        let err = tokio_test::block_on(execute_named(&client, "NodeReboot", RequestParams::new()))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(_)));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(Operation::NodeList, ResponseKind::Json, "  \n").unwrap(), None);
        assert_eq!(
            decode_body(Operation::SwarmInit, ResponseKind::Json, "\"abc\"\n").unwrap(),
            Some(json!("abc"))
        );
        assert!(matches!(
            decode_body(Operation::NodeList, ResponseKind::Json, "<html>"),
            Err(Error::Decode { what: "NodeList", .. })
        ));
        assert_eq!(
            decode_body(Operation::SwarmLeave, ResponseKind::Empty, "OK").unwrap(),
            Some(json!("OK"))
        );
    }

    #[test]
    fn test_error_message_prefers_engine_message() {
        assert_eq!(error_message(r#"{"message":"node is locked"}"#), "node is locked");
        assert_eq!(error_message("plain failure\n"), "plain failure");
    }
}
