//! Minimal message types for the conversation thread.
//!
//! Kept to a three-role shape — System / User / Assistant — since the agents here never need
//! a separate Tool role: tool call/result text is folded into the assistant message the
//! specialist produces after its tool round-trip completes.

/// A single message in a session's thread.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Message {
    /// Persona/system prompt; placed first when building a model request.
    System(String),
    /// User input (the intake conversation) or, within a pipeline run, the prior stage's
    /// structured output rendered as context for the next specialist.
    User(String),
    /// Model/agent reply.
    Assistant(String),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }
}

/// The ordered message history backing one session.
///
/// Owned exclusively by the session store; never serialized outside the process.
pub type ConversationThread = Vec<Message>;
