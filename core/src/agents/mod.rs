//! The five agents (coordinator + four specialists) and the shared machinery they all run on.
//!
//! Every agent here is single-shot: one call to [`run_structured_agent`] per turn, looped
//! internally only until the model stops requesting tools. This is a free function rather
//! than a shared trait — each agent's input shape differs enough (the coordinator takes a
//! raw user utterance and a partial application; the specialists take a complete application
//! plus whatever prior assessments exist) that a trait would need an associated `Input` type
//! for no real benefit over five structs that each call the same function.

pub mod coordinator;
pub mod credit;
pub mod income;
pub mod intake;
pub mod risk;

pub use coordinator::CoordinatorAgent;
pub use credit::CreditAgent;
pub use income::IncomeAgent;
pub use intake::IntakeAgent;
pub use risk::RiskAgent;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::AgentError;
use crate::message::{ConversationThread, Message};
use crate::tool_source::{ToolInvocationAdapter, ToolSpec};

/// Per-agent target wall times (spec §4.4/§5): coordinator 30s, intake 10s, credit 90s,
/// income 60s, risk 90s.
pub const COORDINATOR_TIMEOUT: Duration = Duration::from_secs(30);
pub const INTAKE_TIMEOUT: Duration = Duration::from_secs(10);
pub const CREDIT_TIMEOUT: Duration = Duration::from_secs(90);
pub const INCOME_TIMEOUT: Duration = Duration::from_secs(60);
pub const RISK_TIMEOUT: Duration = Duration::from_secs(90);

/// A tool round-trip never loops more than this many times before the agent gives up and
/// surfaces a schema error — guards against a model that never stops calling tools.
const MAX_TOOL_ROUNDS: u32 = 4;

/// The fixed shape every agent owns: persona text, model parameters, timeout, and the tool
/// servers it is allowed to reach. Built once at startup from a `PersonaSet` and
/// `ToolEndpoints` and reused for every turn/run.
#[derive(Clone)]
pub struct AgentSpec {
    pub name: &'static str,
    pub persona: Arc<str>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
    pub tool_names: &'static [&'static str],
}

impl AgentSpec {
    pub fn new(
        name: &'static str,
        persona: impl Into<Arc<str>>,
        temperature: f32,
        max_output_tokens: u32,
        timeout: Duration,
        tool_names: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            persona: persona.into(),
            temperature,
            max_output_tokens,
            timeout,
            tool_names,
        }
    }
}

/// Runs one agent turn: assembles `[persona, ...thread, user_prompt]`, lets the model call
/// tools through `tools` until it settles on a final answer (or `MAX_TOOL_ROUNDS` is
/// exceeded), parses that answer into `T`, and appends the user/assistant exchange to
/// `thread` for the next specialist to see. Enforces `spec.timeout` around the whole
/// exchange, including every tool round-trip.
///
/// `tools` is `None` for the coordinator (never calls tools) and `Some` for any specialist
/// that was opened with a non-empty `tool_names` list for this run.
pub async fn run_structured_agent<T: DeserializeOwned>(
    spec: &AgentSpec,
    llm: &dyn crate::llm::LlmClient,
    tools: Option<&ToolInvocationAdapter>,
    thread: &mut ConversationThread,
    user_prompt: impl Into<String>,
) -> Result<T, AgentError> {
    let user_prompt = user_prompt.into();
    let mut messages: Vec<Message> = Vec::with_capacity(thread.len() + 2);
    messages.push(Message::system(spec.persona.as_ref()));
    messages.extend(thread.iter().cloned());
    messages.push(Message::user(user_prompt.clone()));

    let tool_specs: &[ToolSpec] = tools.map(ToolInvocationAdapter::specs).unwrap_or(&[]);

    let run = tool_loop(spec, llm, tools, tool_specs, &mut messages);
    let outcome = tokio::time::timeout(spec.timeout, run).await;

    thread.push(Message::user(user_prompt));

    let content = match outcome {
        Ok(Ok(content)) => content,
        Ok(Err(e)) => return Err(e),
        Err(_) => {
            return Err(AgentError::ModelCallFailed {
                agent: spec.name.to_string(),
                detail: format!("run exceeded {}s timeout", spec.timeout.as_secs()),
            })
        }
    };

    thread.push(Message::assistant(content.clone()));

    serde_json::from_str(&content).map_err(|e| AgentError::AgentSchemaError {
        agent: spec.name.to_string(),
        detail: e.to_string(),
    })
}

/// Drives the model through `tools/call` round-trips until it stops asking for tools and
/// returns final assistant text, or `MAX_TOOL_ROUNDS` is exceeded.
async fn tool_loop(
    spec: &AgentSpec,
    llm: &dyn crate::llm::LlmClient,
    tools: Option<&ToolInvocationAdapter>,
    tool_specs: &[ToolSpec],
    messages: &mut Vec<Message>,
) -> Result<String, AgentError> {
    let tools_arg = if tool_specs.is_empty() {
        None
    } else {
        Some(tool_specs)
    };

    for _ in 0..MAX_TOOL_ROUNDS {
        let response = llm.invoke(messages.as_slice(), tools_arg).await?;
        if response.tool_calls.is_empty() {
            return Ok(response.content);
        }
        let adapter = tools.ok_or_else(|| AgentError::ToolProtocolError {
            tool: response
                .tool_calls
                .first()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            detail: "model requested a tool call but this agent has no tool adapter".into(),
        })?;

        messages.push(Message::assistant(format!(
            "requesting tool call(s): {}",
            response
                .tool_calls
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));

        for call in &response.tool_calls {
            let args: serde_json::Value =
                serde_json::from_str(&call.arguments).unwrap_or(serde_json::Value::Null);
            let result = adapter.call(&call.name, args).await?;
            messages.push(Message::user(format!(
                "tool '{}' result: {}",
                call.name, result.text
            )));
        }
    }

    Err(AgentError::AgentSchemaError {
        agent: spec.name.to_string(),
        detail: format!("exceeded {MAX_TOOL_ROUNDS} tool-call rounds without a final answer"),
    })
}
