//! `ToolInvocationAdapter`: the single place an agent reaches a tool
//! server through. Owns one connected `McpToolSource` per tool name and maps every failure
//! mode onto `AgentError` so agents never see a raw transport/json-rpc error.

use std::collections::HashMap;
use std::time::Duration;

use intake_config::ToolEndpoints;
use serde_json::Value;

use crate::error::AgentError;
use crate::tool_source::{McpToolSource, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Connects to every named tool server up front and serves `call` for the lifetime of one
/// pipeline run. Dropping the adapter drops every underlying HTTP session.
pub struct ToolInvocationAdapter {
    sources: HashMap<String, (McpToolSource, Duration)>,
    specs: Vec<ToolSpec>,
}

impl ToolInvocationAdapter {
    /// Opens a session to each tool name in `names`, resolving its URL/timeout from
    /// `endpoints`, and lists each server's advertised tools so the caller can hand them to
    /// the LLM client as function-calling definitions. Fails fast if any named tool has no
    /// configured endpoint or its initialize handshake fails. A server whose `tools/list`
    /// call fails is dropped from `specs` but its session is kept open — the schema is a
    /// convenience for the model, not a precondition for `call`.
    pub async fn open(names: &[&str], endpoints: &ToolEndpoints) -> Result<Self, AgentError> {
        let mut sources = HashMap::new();
        let mut specs = Vec::new();
        for &name in names {
            let endpoint = endpoints
                .resolve(name)
                .map_err(|e| AgentError::MissingToolConfig(e.to_string()))?;
            let source = McpToolSource::new_http(endpoint.url.clone(), Vec::<(String, String)>::new())
                .await
                .map_err(|e| AgentError::ToolUnavailable {
                    tool: name.to_string(),
                    detail: e.to_string(),
                })?;
            if let Ok(listed) = source.list_tools().await {
                specs.extend(listed);
            }
            sources.insert(name.to_string(), (source, endpoint.timeout));
        }
        Ok(Self { sources, specs })
    }

    /// Every tool advertised by the servers opened for this call, for passing to
    /// `LlmClient::invoke` as function-calling definitions.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Calls `name` with `arguments`, enforcing that tool's configured per-call timeout
    /// and mapping every failure mode onto the
    /// matching `AgentError` variant.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<ToolCallContent, AgentError> {
        let (source, timeout) = self.sources.get(name).ok_or_else(|| AgentError::ToolUnavailable {
            tool: name.to_string(),
            detail: "tool was not opened for this pipeline run".to_string(),
        })?;
        match tokio::time::timeout(*timeout, source.call_tool(name, arguments)).await {
            Ok(Ok(content)) => Ok(content),
            Ok(Err(ToolSourceError::Transport(detail))) => Err(AgentError::ToolUnavailable {
                tool: name.to_string(),
                detail,
            }),
            Ok(Err(ToolSourceError::JsonRpc(detail))) => Err(AgentError::ToolProtocolError {
                tool: name.to_string(),
                detail,
            }),
            Err(_) => Err(AgentError::ToolTimeout {
                tool: name.to_string(),
                elapsed_ms: timeout.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn jsonrpc_response(id: &str, result: Value) -> serde_json::Value {
        json!({"jsonrpc":"2.0","id":id,"result":result})
    }

    async fn endpoints_with(name: &str, url: &str) -> ToolEndpoints {
        std::env::set_var(format!("MCP_{}_URL", name.to_uppercase()), url);
        let endpoints = ToolEndpoints::load(None).unwrap();
        std::env::remove_var(format!("MCP_{}_URL", name.to_uppercase()));
        endpoints
    }

    #[tokio::test]
    async fn open_and_call_round_trips_through_a_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(move |req: &wiremock::Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap();
                let method = body["method"].as_str().unwrap_or("");
                match method {
                    "initialize" => ResponseTemplate::new(200)
                        .insert_header("MCP-Session-Id", "sess-1")
                        .set_body_json(jsonrpc_response(
                            "intake-mcp-initialize",
                            json!({"protocolVersion":"2025-11-25"}),
                        )),
                    "notifications/initialized" => ResponseTemplate::new(202),
                    "tools/list" => ResponseTemplate::new(200).set_body_json(jsonrpc_response(
                        "intake-list-application_verification",
                        json!({"tools":[{"name":"verify_identity","description":"cross-check applicant identity"}]}),
                    )),
                    "tools/call" => ResponseTemplate::new(200).set_body_json(jsonrpc_response(
                        "intake-call-application_verification",
                        json!({"content":[{"type":"text","text":"verified"}]}),
                    )),
                    other => panic!("unexpected method {other}"),
                }
            })
            .mount(&server)
            .await;

        let endpoints =
            endpoints_with("application_verification", &format!("{}/mcp", server.uri())).await;
        let adapter = ToolInvocationAdapter::open(&["application_verification"], &endpoints)
            .await
            .unwrap();
        assert_eq!(adapter.specs().len(), 1);
        assert_eq!(adapter.specs()[0].name, "verify_identity");
        let out = adapter
            .call("application_verification", json!({"name": "Tony Stark"}))
            .await
            .unwrap();
        assert_eq!(out.text, "verified");
    }

    #[tokio::test]
    async fn open_fails_with_missing_tool_config_when_unresolved() {
        let endpoints = ToolEndpoints::load(None).unwrap();
        let err = ToolInvocationAdapter::open(&["document_processing"], &endpoints)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MissingToolConfig(_)));
    }

    #[tokio::test]
    async fn call_maps_timeout_to_tool_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(move |req: &wiremock::Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap();
                match body["method"].as_str().unwrap_or("") {
                    "initialize" => ResponseTemplate::new(202),
                    "tools/list" => ResponseTemplate::new(200)
                        .set_body_json(jsonrpc_response("intake-list-document_processing", json!({"tools":[]}))),
                    "tools/call" => {
                        ResponseTemplate::new(200).set_delay(Duration::from_millis(500))
                    }
                    other => panic!("unexpected method {other}"),
                }
            })
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("tools.toml");
        std::fs::write(
            &config_path,
            format!(
                "[tools.document_processing]\nurl = \"{}/mcp\"\ntimeout_secs = 0\n",
                server.uri()
            ),
        )
        .unwrap();
        let endpoints = ToolEndpoints::load(Some(&config_path)).unwrap();

        let adapter = ToolInvocationAdapter::open(&["document_processing"], &endpoints)
            .await
            .unwrap();
        let err = adapter
            .call("document_processing", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolTimeout { .. }));
    }
}
