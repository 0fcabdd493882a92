//! # intake-core
//!
//! Conversation and assessment engine for the loan-intake backend: a coordinator that
//! collects an application one field at a time, four specialist agents that assess it
//! (intake validation, credit estimation, income/DTI, risk decisioning), and the session
//! store and orchestrator that tie a conversation's turns to a background assessment run.
//!
//! ## Main modules
//!
//! - [`message`]: [`Message`], [`ConversationThread`] — the LLM-facing conversation log.
//! - [`llm`]: [`LlmClient`] trait, [`MockLlm`], [`ChatOpenAI`].
//! - [`tool_source`]: [`ToolSource`] trait, MCP-backed [`McpToolSource`], and
//!   [`ToolInvocationAdapter`], which scopes a set of named tools to one agent call.
//! - [`model`]: wire and domain types — the loan application, coordinator reply, the four
//!   specialist assessments, pipeline events, and session state.
//! - [`agents`]: [`CoordinatorAgent`] and the four specialists built on the shared
//!   [`agents::run_structured_agent`] helper.
//! - [`pipeline`]: [`Pipeline`] — runs the four specialists in order for one application.
//! - [`session`]: [`SessionStore`] — the sharded, per-session-locked conversation registry.
//! - [`orchestrator`]: [`Orchestrator`] — drives one turn end to end and launches the
//!   pipeline in the background once a turn completes collection.
//! - [`error`]: [`AgentError`] — the single error type threaded through every layer above.

pub mod agents;
pub mod error;
pub mod llm;
pub mod message;
pub mod model;
pub mod orchestrator;
pub mod pipeline;
pub mod session;
pub mod tool_source;

pub use agents::{CoordinatorAgent, CreditAgent, IncomeAgent, IntakeAgent, RiskAgent};
pub use error::AgentError;
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm, ToolChoiceMode};
pub use message::{ConversationThread, Message};
pub use orchestrator::{Orchestrator, TurnOutcome};
pub use pipeline::{Pipeline, SharedState};
pub use session::{SessionEntry, SessionStore};
pub use tool_source::{McpToolSource, ToolCallContent, ToolInvocationAdapter, ToolSource, ToolSourceError, ToolSpec};

/// When running `cargo test -p intake-core`, initializes tracing from `RUST_LOG` so that
/// unit tests across `src/**` can print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
