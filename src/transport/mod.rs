//! Transport adapters
//!
//! Hosts (HTTP, stdio, proxy) decode bytes into JSON-RPC requests, hand them
//! to a [`RequestHandler`] and write back whatever it returns. A
//! [`TransportAdapter`] lets a host adjust requests, responses and error
//! envelopes without the dispatcher knowing which host it runs under.

pub mod http;
pub mod proxy;
pub mod stdio;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::error::{GatewayError, McpError};
use crate::mcp::types::{JsonRpcRequest, JsonRpcResponse, RequestId, JSONRPC_VERSION};

/// Per-request data supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    /// Provider selected by the transport (e.g. from the URL path)
    pub provider: Option<String>,

    /// Credential supplied with the request
    pub api_key: Option<String>,

    /// Raw request path, when the transport has one
    pub path: Option<String>,
}

/// Host-specific hooks around dispatch
pub trait TransportAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Adjust or reject a request before routing
    fn preprocess_request(
        &self,
        _request: &mut JsonRpcRequest,
        _meta: &mut RequestMeta,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    fn postprocess_response(&self, response: JsonRpcResponse, _meta: &RequestMeta) -> JsonRpcResponse {
        response
    }

    /// Build the error envelope for `error`
    fn format_error(&self, id: RequestId, error: &GatewayError, debug: bool) -> JsonRpcResponse {
        JsonRpcResponse::error(id, error.to_rpc_error(debug))
    }
}

/// Anything that answers JSON-RPC requests: the local dispatcher or a proxy
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// `None` for notifications
    async fn handle(&self, request: JsonRpcRequest, meta: RequestMeta) -> Option<JsonRpcResponse>;
}

/// Error envelope with transport fields merged into `data`
pub(crate) fn enriched_error(
    id: RequestId,
    error: &GatewayError,
    debug: bool,
    fields: Map<String, Value>,
) -> JsonRpcResponse {
    JsonRpcResponse::error(id, error.to_rpc_error(debug).with_data_fields(fields))
}

/// Decode one JSON-RPC request.
///
/// On failure returns the best recoverable id (or `null`) with a parse or
/// invalid-request error.
pub fn decode_request(bytes: &[u8]) -> Result<JsonRpcRequest, (RequestId, GatewayError)> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        let err: GatewayError = McpError::Parse {
            message: e.to_string(),
        }
        .into();
        (RequestId::Null, err)
    })?;

    let id = value
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok())
        .unwrap_or(RequestId::Null);

    let invalid = |message: String| -> (RequestId, GatewayError) {
        (id.clone(), McpError::InvalidRequest { message }.into())
    };

    if !value.is_object() {
        return Err(invalid("request must be a JSON object".into()));
    }
    if value.get("jsonrpc") != Some(&json!(JSONRPC_VERSION)) {
        return Err(invalid(format!("jsonrpc must be \"{}\"", JSONRPC_VERSION)));
    }
    if !value.get("method").is_some_and(Value::is_string) {
        return Err(invalid("method must be a string".into()));
    }

    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_decode_valid_request() {
        let request = decode_request(br#"{"jsonrpc":"2.0","id":"a","method":"ping"}"#).unwrap();
        assert_eq!(request.id, Some(RequestId::String("a".into())));
        assert_eq!(request.method, "ping");
    }

    #[test]
    fn test_decode_parse_error_has_null_id() {
        let (id, err) = decode_request(b"{not json").unwrap_err();
        assert_eq!(id, RequestId::Null);
        assert_eq!(err.code(), ErrorCode::ParseError);
    }

    #[test]
    fn test_decode_invalid_request_keeps_id() {
        let (id, err) = decode_request(br#"{"jsonrpc":"1.0","id":9,"method":"ping"}"#).unwrap_err();
        assert_eq!(id, RequestId::Number(9));
        assert_eq!(err.code(), ErrorCode::InvalidRequest);

        let (_, err) = decode_request(br#"[1,2]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);

        let (_, err) = decode_request(br#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_enriched_error_merges_fields() {
        let err: GatewayError = McpError::MethodNotFound {
            method: "nope".into(),
        }
        .into();
        let mut fields = Map::new();
        fields.insert("transport".into(), json!("stdio"));
        let response = enriched_error(RequestId::Number(1), &err, false, fields);
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.data.unwrap()["transport"], "stdio");
    }
}
