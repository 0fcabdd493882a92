//! Error taxonomy for the conversation and assessment engine.
//!
//! Each variant maps to exactly one of the surfacing paths this backend uses: a structured
//! reply (`need_clarification` / `error` action), a `PipelineEvent` with phase `error`, or an
//! HTTP status at the `serve` boundary. Nothing here panics its way out of the orchestrator —
//! `AgentError` is the return type of every fallible agent/tool/session operation.

use thiserror::Error;

/// Failure of an agent run, a tool call, or the data it was fed.
///
/// **Propagation policy**: validation and session-not-found errors are handled
/// locally and turned into structured replies; everything else surfaces as an error-shaped
/// event on the same channel as normal events and never escapes the orchestrator as a panic.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Model-layer construction/validation failure. Never logged as an incident.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required persona file was absent at startup (fatal for that agent).
    #[error("missing persona: {0}")]
    MissingPersona(String),

    /// A required tool-server endpoint had no URL from either env or config (fatal for that
    /// agent's construction).
    #[error("missing tool config: {0}")]
    MissingToolConfig(String),

    /// Tool-server connection could not be established, or dropped mid-call.
    #[error("tool '{tool}' unavailable: {detail}")]
    ToolUnavailable { tool: String, detail: String },

    /// Tool call exceeded its per-call deadline.
    #[error("tool '{tool}' timed out after {elapsed_ms}ms")]
    ToolTimeout { tool: String, elapsed_ms: u64 },

    /// Tool server returned a malformed or unparseable response.
    #[error("tool '{tool}' returned a malformed response: {detail}")]
    ToolProtocolError { tool: String, detail: String },

    /// An agent's output failed to parse into its response schema.
    #[error("agent '{agent}' schema validation failed: {detail}")]
    AgentSchemaError { agent: String, detail: String },

    /// The underlying language-model call itself failed (network, auth, rate limit, ...).
    #[error("agent '{agent}' model call failed: {detail}")]
    ModelCallFailed { agent: String, detail: String },

    /// Session id was not found (admin endpoints only — `POST /api/chat` never raises this,
    /// it creates a new session instead).
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The caller disconnected mid-run; the in-flight agent/pipeline was stopped.
    #[error("cancelled")]
    Cancelled,
}

impl AgentError {
    /// Stage/tool name this error should be attributed to in a surfaced message, when known.
    pub fn subject(&self) -> Option<&str> {
        match self {
            AgentError::ToolUnavailable { tool, .. }
            | AgentError::ToolTimeout { tool, .. }
            | AgentError::ToolProtocolError { tool, .. } => Some(tool),
            AgentError::AgentSchemaError { agent, .. }
            | AgentError::ModelCallFailed { agent, .. } => Some(agent),
            _ => None,
        }
    }

    /// True for errors that are recoverable/local (never an incident, never a 500).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgentError::Validation(_) | AgentError::SessionNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_extracts_tool_name() {
        let err = AgentError::ToolTimeout {
            tool: "financial_calculations".into(),
            elapsed_ms: 60_000,
        };
        assert_eq!(err.subject(), Some("financial_calculations"));
    }

    #[test]
    fn subject_is_none_for_validation() {
        let err = AgentError::Validation("bad email".into());
        assert_eq!(err.subject(), None);
    }

    #[test]
    fn recoverable_flags_validation_and_session_not_found_only() {
        assert!(AgentError::Validation("x".into()).is_recoverable());
        assert!(AgentError::SessionNotFound("s1".into()).is_recoverable());
        assert!(!AgentError::Cancelled.is_recoverable());
        assert!(!AgentError::ToolTimeout {
            tool: "t".into(),
            elapsed_ms: 1
        }
        .is_recoverable());
    }
}
