//! Integration tests for the Assistants MCP Gateway
//!
//! These tests drive the dispatcher and transports end to end. The
//! Assistants API is mocked with wiremock - no real API calls are made.

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use assistants_mcp_gateway::config::{Config, LegacyConfig, ProvidersConfig};
use assistants_mcp_gateway::mcp::server::McpServer;
use assistants_mcp_gateway::mcp::tools::ToolRegistry;
use assistants_mcp_gateway::mcp::types::{JsonRpcRequest, RequestId};
use assistants_mcp_gateway::providers::ProviderRegistry;
use assistants_mcp_gateway::transport::RequestMeta;

const KEY: &str = "sk-test-integration-00000000";

fn providers_for(backend: &MockServer, api_key: Option<&str>) -> ProvidersConfig {
    ProvidersConfig::from_legacy(LegacyConfig {
        api_key: api_key.map(str::to_string),
        base_url: Some(backend.uri()),
        organization: None,
    })
}

async fn server_for(backend: &MockServer) -> McpServer {
    let providers = ProviderRegistry::from_config(&providers_for(backend, Some(KEY))).await;
    let tools = Arc::new(ToolRegistry::with_default_tools().unwrap());
    McpServer::new(tools, Arc::new(providers))
}

/// Run `tools/call` and return (text, isError)
async fn call_tool(server: &McpServer, id: i64, name: &str, arguments: Value) -> (String, bool) {
    let request = JsonRpcRequest::new(
        RequestId::Number(id),
        "tools/call",
        Some(json!({"name": name, "arguments": arguments})),
    );
    let response = server
        .handle_request(request, RequestMeta::default())
        .await
        .expect("tools/call must be answered");
    assert_eq!(response.id, RequestId::Number(id));
    let result = response.result.expect("tools/call failures are in-band");
    let text = result["content"][0]["text"].as_str().unwrap_or_default().to_string();
    (text, result["isError"].as_bool().unwrap_or(false))
}

fn run_body(status: &str) -> Value {
    json!({
        "id": "run_abc123",
        "object": "thread.run",
        "thread_id": "thread_abc123",
        "assistant_id": "asst_abc123",
        "status": status
    })
}

mod backend_tests {
    use super::*;

    #[tokio::test]
    async fn test_assistant_create_forwards_request() {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistants"))
            .and(header("authorization", format!("Bearer {}", KEY).as_str()))
            .and(header("OpenAI-Beta", "assistants=v2"))
            .and(body_partial_json(json!({"model": "gpt-4o", "name": "Tutor"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "asst_abc123",
                "object": "assistant",
                "created_at": 1700000000,
                "model": "gpt-4o",
                "name": "Tutor",
                "tools": [{"type": "code_interpreter"}]
            })))
            .expect(1)
            .mount(&backend)
            .await;

        let server = server_for(&backend).await;
        let (text, is_error) = call_tool(
            &server,
            1,
            "assistant-create",
            json!({"model": "gpt-4o", "name": "Tutor", "tools": [{"type": "code_interpreter"}]}),
        )
        .await;

        assert!(!is_error, "{}", text);
        let assistant: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(assistant["id"], "asst_abc123");
        assert_eq!(assistant["tools"][0]["type"], "code_interpreter");
    }

    #[tokio::test]
    async fn test_backend_not_found_is_in_band() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assistants/asst_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "No assistant found with id 'asst_missing'."}
            })))
            .mount(&backend)
            .await;

        let server = server_for(&backend).await;
        let (text, is_error) =
            call_tool(&server, 2, "assistant-get", json!({"assistant_id": "asst_missing"})).await;

        assert!(is_error);
        assert!(text.starts_with("Error: "));
        assert!(text.contains("No assistant found"));
    }

    #[tokio::test]
    async fn test_backend_rejection_redacts_key() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_abc123"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": format!("Incorrect API key provided: {}", KEY)}
            })))
            .mount(&backend)
            .await;

        let server = server_for(&backend).await;
        let (text, is_error) =
            call_tool(&server, 3, "thread-get", json!({"thread_id": "thread_abc123"})).await;

        assert!(is_error);
        assert!(!text.contains(KEY));
        assert!(text.contains("sk-***"));
    }

    #[tokio::test]
    async fn test_list_parameters_reach_backend() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_abc123/messages"))
            .and(query_param("limit", "2"))
            .and(query_param("order", "asc"))
            .and(query_param("run_id", "run_abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [],
                "has_more": true,
                "first_id": "msg_a1",
                "last_id": "msg_a2"
            })))
            .expect(1)
            .mount(&backend)
            .await;

        let server = server_for(&backend).await;
        let (text, is_error) = call_tool(
            &server,
            4,
            "message-list",
            json!({"thread_id": "thread_abc123", "limit": 2, "order": "asc", "run_id": "run_abc123"}),
        )
        .await;

        assert!(!is_error, "{}", text);
        let page: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(page["has_more"], true);
        assert_eq!(page["last_id"], "msg_a2");
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_abc123/runs"))
            .and(body_partial_json(json!({"assistant_id": "asst_abc123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(run_body("queued")))
            .mount(&backend)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_abc123/runs/run_abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json({
                let mut run = run_body("requires_action");
                run["required_action"] = json!({
                    "type": "submit_tool_outputs",
                    "submit_tool_outputs": {"tool_calls": [{
                        "id": "call_abc123",
                        "type": "function",
                        "function": {"name": "add", "arguments": "{\"a\":40,\"b\":2}"}
                    }]}
                });
                run
            }))
            .mount(&backend)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_abc123/runs/run_abc123/submit_tool_outputs"))
            .and(body_partial_json(json!({
                "tool_outputs": [{"tool_call_id": "call_abc123", "output": "42"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(run_body("queued")))
            .expect(1)
            .mount(&backend)
            .await;

        let server = server_for(&backend).await;

        let (text, is_error) = call_tool(
            &server,
            10,
            "run-create",
            json!({"thread_id": "thread_abc123", "assistant_id": "asst_abc123"}),
        )
        .await;
        assert!(!is_error, "{}", text);

        let (text, _) = call_tool(
            &server,
            11,
            "run-get",
            json!({"thread_id": "thread_abc123", "run_id": "run_abc123"}),
        )
        .await;
        let run: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(run["status"], "requires_action");
        let call_id = run["required_action"]["submit_tool_outputs"]["tool_calls"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let (text, is_error) = call_tool(
            &server,
            12,
            "run-submit-tool-outputs",
            json!({
                "thread_id": "thread_abc123",
                "run_id": "run_abc123",
                "tool_outputs": [{"tool_call_id": call_id, "output": "42"}]
            }),
        )
        .await;
        assert!(!is_error, "{}", text);
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap()["status"], "queued");
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_backend() {
        let backend = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&backend)
            .await;

        let server = server_for(&backend).await;

        let (text, is_error) = call_tool(
            &server,
            20,
            "run-submit-tool-outputs",
            json!({
                "thread_id": "thread_abc123",
                "run_id": "run_abc123",
                "tool_outputs": [{"tool_call_id": "call_abc123"}]
            }),
        )
        .await;
        assert!(is_error);
        assert!(text.contains("tool_outputs[0].output"));

        let (text, is_error) = call_tool(&server, 21, "assistant-get", json!({})).await;
        assert!(is_error);
        assert!(text.contains("assistant_id"));

        let (text, is_error) =
            call_tool(&server, 22, "thread-get", json!({"thread_id": "asst_abc123"})).await;
        assert!(is_error);
        assert!(text.contains("thread_"));
    }
}

mod stdio_tests {
    use super::*;
    use assistants_mcp_gateway::transport::stdio::{serve_lines, StdioAdapter};
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_session_over_lines() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assistants/asst_abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "asst_abc123",
                "model": "gpt-4o"
            })))
            .mount(&backend)
            .await;

        let server = server_for(&backend).await.with_adapter(Arc::new(StdioAdapter));
        let input = [
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": "2024-11-05",
                "clientInfo": {"name": "test-client", "version": "1.0.0"},
                "capabilities": {}
            }}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
                "name": "assistant-get",
                "arguments": {"assistant_id": "asst_abc123"}
            }}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "nope"}),
        ]
        .iter()
        .map(|v| format!("{}\n", v))
        .collect::<String>();

        let (writer, mut output) = tokio::io::duplex(1 << 20);
        serve_lines(
            Arc::new(server),
            input.as_bytes(),
            writer,
            std::future::pending::<()>(),
            false,
        )
        .await
        .unwrap();

        let mut text = String::new();
        output.read_to_string(&mut text).await.unwrap();
        let mut responses: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        responses.sort_by_key(|r| r["id"].as_i64());

        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 22);
        // Successful calls omit isError
        assert!(responses[2]["result"].get("isError").is_none());
        assert!(responses[2]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("asst_abc123"));
        assert_eq!(responses[3]["error"]["code"], -32601);
        assert_eq!(responses[3]["error"]["data"]["transport"], "stdio");
    }
}

mod http_tests {
    use super::*;
    use assistants_mcp_gateway::transport::http::{router, HttpState};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_path_key_is_forwarded_to_backend() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assistants/asst_abc123"))
            .and(header("authorization", format!("Bearer {}", KEY).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "asst_abc123",
                "model": "gpt-4o"
            })))
            .expect(2)
            .mount(&backend)
            .await;

        let tools = Arc::new(ToolRegistry::with_default_tools().unwrap());
        let app = router(HttpState::new(tools, providers_for(&backend, None), false));
        let call = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "assistant-get", "arguments": {"assistant_id": "asst_abc123"}}
        });

        for uri in [format!("/mcp/{}", KEY), format!("/mcp/openai/{}", KEY)] {
            let (status, body) = post(app.clone(), &uri, call.clone()).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body["result"].get("isError").is_none(), "{}", body);
            assert!(body["result"]["content"][0]["text"].is_string(), "{}", body);
        }
    }

    #[tokio::test]
    async fn test_short_path_key_is_rejected_before_dispatch() {
        let backend = MockServer::start().await;
        let tools = Arc::new(ToolRegistry::with_default_tools().unwrap());
        let app = router(HttpState::new(tools, providers_for(&backend, None), false));

        let (status, body) = post(
            app,
            "/mcp/sk-short",
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], -32001);
        assert_eq!(body["error"]["data"]["transport"], "http");
    }
}

mod config_tests {
    use super::*;

    #[tokio::test]
    async fn test_providers_file_drives_resolution() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "thread_abc123",
                "object": "thread"
            })))
            .mount(&backend)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("providers.json");
        std::fs::write(
            &file,
            json!({
                "default_provider": "openai",
                "providers": {
                    "openai": {"type": "openai", "base_url": backend.uri()},
                    "sandbox": {"type": "declared", "capabilities": {"threads": true}}
                }
            })
            .to_string(),
        )
        .unwrap();

        let file_path = file.display().to_string();
        let config = Config::from_lookup(dir.path().to_path_buf(), |name| match name {
            "ASSISTANTS_MCP_PROVIDERS" => Some(file_path.clone()),
            "OPENAI_API_KEY" => Some(KEY.to_string()),
            _ => None,
        })
        .unwrap();

        let providers = ProviderRegistry::from_config(&config.providers_config().unwrap()).await;
        assert_eq!(providers.provider_names(), vec!["openai", "sandbox"]);
        let tools = Arc::new(ToolRegistry::with_default_tools().unwrap());
        let server = McpServer::new(tools, Arc::new(providers));

        // Default provider, key filled from the environment
        let (text, is_error) =
            call_tool(&server, 1, "thread-get", json!({"thread_id": "thread_abc123"})).await;
        assert!(!is_error, "{}", text);

        // Explicit provider without the assistants capability
        let request = JsonRpcRequest::new(
            RequestId::Number(2),
            "tools/call",
            Some(json!({
                "name": "assistant-get",
                "arguments": {"assistant_id": "asst_abc123"},
                "provider": "sandbox"
            })),
        );
        let result = server
            .handle_request(request, RequestMeta::default())
            .await
            .unwrap()
            .result
            .unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("does not support"));

        // Declared providers accept the call but implement nothing
        let request = JsonRpcRequest::new(
            RequestId::Number(3),
            "tools/call",
            Some(json!({
                "name": "thread-get",
                "arguments": {"thread_id": "thread_abc123"},
                "provider": "sandbox"
            })),
        );
        let result = server
            .handle_request(request, RequestMeta::default())
            .await
            .unwrap()
            .result
            .unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("not implemented"));
    }

    #[tokio::test]
    async fn test_initialize_advertises_providers() {
        let backend = MockServer::start().await;
        let server = server_for(&backend).await;

        let response = server
            .handle_request(
                JsonRpcRequest::new(RequestId::Number(1), "initialize", Some(json!({}))),
                RequestMeta::default(),
            )
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["capabilities"]["experimental"]["providers"]["default"], "openai");
        assert!(server.is_initialized());
    }
}
