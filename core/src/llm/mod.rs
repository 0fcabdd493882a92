//! LLM client abstraction used by every agent: given a conversation thread and an
//! optional tool list, return assistant text and any tool calls the model wants to make.
//!
//! Every agent in this backend is single-shot — one `invoke()` per turn, looped by the caller
//! only until the model stops calling tools — so unlike a think/act/observe graph there is no
//! separate streaming-chunk machinery here.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::message::Message;
use crate::tool_source::ToolSpec;

/// Tool choice mode for chat completions: when tools are present, controls whether the model
/// may choose (auto), must not use (none), or must use (required) a tool before responding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    #[default]
    Auto,
    None,
    Required,
}

/// A single function-style tool call the model asked to make, keyed by the provider's call id
/// so the result can be threaded back as the matching tool-response message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: Option<String>,
    pub name: String,
    /// Raw JSON-encoded arguments, exactly as the model produced them.
    pub arguments: String,
}

/// Token usage for one LLM call, surfaced for logging only — nothing in the pipeline branches
/// on it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from one completion call: assistant text and any tool calls, either of which may
/// be empty depending on whether the model answered directly or reached for a tool.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<LlmUsage>,
}

/// An LLM client: given a conversation thread and an optional tool list, produce the next
/// assistant turn. Implementations: `MockLlm` (tests), `ChatOpenAI`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
    ) -> Result<LlmResponse, AgentError>;
}
