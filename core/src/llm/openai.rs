//! OpenAI Chat Completions client implementing `LlmClient`.
//!
//! Requires `OPENAI_API_KEY` in the environment, or an explicit `OpenAIConfig`. Optional tools
//! enable function/tool calling for the three specialists that consult a tool server before
//! answering.

use async_trait::async_trait;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage, ToolCall, ToolChoiceMode};
use crate::message::Message;
use crate::tool_source::ToolSpec;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCalls, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        ChatCompletionResponseFormat, ChatCompletionTool, ChatCompletionToolChoiceOption,
        ChatCompletionTools, CreateChatCompletionRequestArgs, FunctionObject, ToolChoiceOptions,
    },
    Client,
};

/// OpenAI Chat Completions client (aligns with LangChain's `ChatOpenAI`).
///
/// Uses `OPENAI_API_KEY` by default, or an explicit `OpenAIConfig` via `with_config`. Each
/// agent owns its own `ChatOpenAI`, configured once at startup with that agent's persona
/// already folded into the first system message rather than into this client.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    tool_choice: Option<ToolChoiceMode>,
    /// Ask the model to emit a JSON object. Off by default since the tool-calling round-trip still needs free text.
    json_mode: bool,
}

impl ChatOpenAI {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
            temperature: None,
            tool_choice: None,
            json_mode: false,
        }
    }

    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
            tool_choice: None,
            json_mode: false,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = Some(mode);
        self
    }

    /// Requires the final response to be a JSON object. Has no effect on rounds where the model chooses to call a tool instead.
    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    fn messages_to_request(messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m {
                Message::System(s) => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(s.as_str()),
                ),
                Message::User(s) => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(s.as_str()),
                ),
                Message::Assistant(s) => {
                    ChatCompletionRequestMessage::Assistant((s.as_str()).into())
                }
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
    ) -> Result<LlmResponse, AgentError> {
        let trace_id = Uuid::new_v4().to_string();
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(messages));

        if let Some(tools) = tools {
            if !tools.is_empty() {
                let chat_tools: Vec<ChatCompletionTools> = tools
                    .iter()
                    .map(|t| {
                        ChatCompletionTools::Function(ChatCompletionTool {
                            function: FunctionObject {
                                name: t.name.clone(),
                                description: t.description.clone(),
                                parameters: Some(t.input_schema.clone()),
                                ..Default::default()
                            },
                        })
                    })
                    .collect();
                args.tools(chat_tools);
            }
        }

        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        if let Some(mode) = self.tool_choice {
            let opt = match mode {
                ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
                ToolChoiceMode::None => ToolChoiceOptions::None,
                ToolChoiceMode::Required => ToolChoiceOptions::Required,
            };
            args.tool_choice(ChatCompletionToolChoiceOption::Mode(opt));
        }

        if self.json_mode {
            args.response_format(ChatCompletionResponseFormat::JsonObject);
        }

        let request = args.build().map_err(|e| AgentError::ModelCallFailed {
            agent: self.model.clone(),
            detail: format!("request build failed: {e}"),
        })?;

        debug!(
            trace_id = %trace_id,
            model = %self.model,
            message_count = messages.len(),
            tools_count = tools.map(<[_]>::len).unwrap_or(0),
            "openai chat create"
        );
        if let Ok(js) = serde_json::to_string(&request) {
            trace!(trace_id = %trace_id, request = %js, "openai request body");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ModelCallFailed {
                agent: self.model.clone(),
                detail: e.to_string(),
            })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::ModelCallFailed {
                agent: self.model.clone(),
                detail: "no choices in response".to_string(),
            })?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| {
                if let ChatCompletionMessageToolCalls::Function(f) = tc {
                    Some(ToolCall {
                        id: Some(f.id),
                        name: f.function.name,
                        arguments: f.function.arguments,
                    })
                } else {
                    None
                }
            })
            .collect();

        let usage = response.usage.map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(LlmResponse {
            content,
            tool_calls,
            usage,
        })
    }
}
