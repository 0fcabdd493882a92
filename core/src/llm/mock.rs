//! Mock LLM for agent unit tests: fixed or scripted responses, no network calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, ToolCall};
use crate::message::Message;
use crate::tool_source::ToolSpec;

/// Returns one fixed response, or steps through a scripted sequence of responses (one per
/// call, the last one repeating once exhausted) so a test can drive a multi-round tool-calling
/// agent without a real model.
pub struct MockLlm {
    responses: Vec<LlmResponse>,
    call_index: AtomicUsize,
    /// Every set of messages this mock was invoked with, for assertions on prompt assembly.
    seen_messages: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    pub fn with_content(content: impl Into<String>) -> Self {
        Self::scripted(vec![LlmResponse {
            content: content.into(),
            tool_calls: vec![],
            usage: None,
        }])
    }

    pub fn with_tool_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self::scripted(vec![LlmResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: Some("call-1".to_string()),
                name: name.into(),
                arguments: arguments.into(),
            }],
            usage: None,
        }])
    }

    /// A tool call followed by a final answer — the common two-round shape for the three
    /// tool-using specialists.
    pub fn tool_call_then_content(
        name: impl Into<String>,
        arguments: impl Into<String>,
        final_content: impl Into<String>,
    ) -> Self {
        Self::scripted(vec![
            LlmResponse {
                content: String::new(),
                tool_calls: vec![ToolCall {
                    id: Some("call-1".to_string()),
                    name: name.into(),
                    arguments: arguments.into(),
                }],
                usage: None,
            },
            LlmResponse {
                content: final_content.into(),
                tool_calls: vec![],
                usage: None,
            },
        ])
    }

    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses,
            call_index: AtomicUsize::new(0),
            seen_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.seen_messages.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolSpec]>,
    ) -> Result<LlmResponse, AgentError> {
        self.seen_messages.lock().unwrap().push(messages.to_vec());
        let n = self.call_index.fetch_add(1, Ordering::SeqCst);
        let idx = n.min(self.responses.len().saturating_sub(1));
        Ok(self.responses[idx].clone())
    }
}
