//! Envelope (session_id, event_id) injected around each streamed event.
//!
//! `EnvelopeState` tracks the running sequence number for one session's event
//! stream and injects it into each event as it is serialized to JSON.

use serde::Serialize;
use serde_json::Value;

/// Envelope fields attached to every streamed event.
#[derive(Clone, Debug, Default)]
pub struct Envelope {
    /// Session ID; constant within a session's event stream.
    pub session_id: Option<String>,
    /// Per-event sequence number; monotonically increasing within a stream.
    pub event_id: Option<u64>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn with_event_id(mut self, id: u64) -> Self {
        self.event_id = Some(id);
        self
    }

    /// Merges envelope fields into the given JSON object (top-level only).
    /// Does not overwrite existing keys.
    pub fn inject_into(&self, obj: &mut Value) {
        let Some(obj) = obj.as_object_mut() else {
            return;
        };
        if let Some(ref id) = self.session_id {
            obj.entry("session_id")
                .or_insert_with(|| Value::String(id.clone()));
        }
        if let Some(id) = self.event_id {
            obj.entry("event_id")
                .or_insert_with(|| Value::Number(serde_json::Number::from(id)));
        }
    }
}

/// Envelope state for one session's event stream: session id and next sequence number.
pub struct EnvelopeState {
    pub session_id: String,
    pub next_event_id: u64,
}

impl EnvelopeState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            next_event_id: 1,
        }
    }

    /// Injects envelope fields into the event value and advances the sequence number.
    pub fn inject_into(&mut self, value: &mut Value) {
        let env = Envelope::new()
            .with_session_id(&self.session_id)
            .with_event_id(self.next_event_id);
        self.next_event_id += 1;
        env.inject_into(value);
    }
}

/// Serializes `event` to JSON and injects the session/sequence envelope using `state`.
pub fn to_envelope_json<T: Serialize>(
    event: &T,
    state: &mut EnvelopeState,
) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(event)?;
    state.inject_into(&mut value);
    Ok(value)
}
