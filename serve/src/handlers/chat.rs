//! `POST /api/chat` — the one endpoint that can stream.
//!
//! The response is always a chunked NDJSON body (spec §6 / SPEC_FULL §8's wire-form
//! decision): the coordinator's reply line first, then — only when that turn advanced the
//! session to `ready_for_processing` — one envelope-wrapped `PipelineEvent` line per stage as
//! the background pipeline run produces them, ending with its terminal `complete` or `error`
//! line. A turn that does not trigger the pipeline is a one-line body.

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::http::header;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;

use intake_core::model::{CoordinatorReply, PipelineEvent};
use stream_event::EnvelopeState;

use crate::error::{bad_request, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
struct ChatRequest {
    user_message: String,
    #[serde(default)]
    session_id: Option<String>,
    /// Accepted for wire compatibility; never consulted. The coordinator's 8-step turn
    /// algorithm (spec §4.5.2) only ever reads the session's own accumulated
    /// `collected_data` — a client-supplied snapshot would just be stale by the time it's
    /// read back, so this field is parsed and discarded. See DESIGN.md.
    #[serde(default)]
    #[allow(dead_code)]
    current_data: Option<serde_json::Value>,
}

/// The first NDJSON line: the coordinator's reply with `session_id` attached.
#[derive(Serialize)]
struct ChatReplyLine<'a> {
    #[serde(flatten)]
    reply: &'a CoordinatorReply,
    session_id: &'a str,
}

pub async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return bad_request(e),
    };

    let outcome = match state
        .orchestrator
        .handle_turn(request.session_id.as_deref(), &request.user_message)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let reply_line = ChatReplyLine {
        reply: &outcome.reply,
        session_id: &outcome.session_id,
    };
    let mut reply_json = serde_json::to_vec(&reply_line).expect("ChatReplyLine always serializes");
    reply_json.push(b'\n');
    let reply_chunk = stream::once(async move { Ok::<_, Infallible>(Bytes::from(reply_json)) });

    let body = match outcome.pipeline_events {
        Some(rx) => {
            let mut envelope = EnvelopeState::new(outcome.session_id.clone());
            let event_lines = ReceiverStream::new(rx).map(move |event: PipelineEvent| {
                let mut value = serde_json::to_value(&event).expect("PipelineEvent always serializes");
                envelope.inject_into(&mut value);
                let mut line = serde_json::to_vec(&value).expect("Value always serializes");
                line.push(b'\n');
                Ok::<_, Infallible>(Bytes::from(line))
            });
            Body::from_stream(reply_chunk.chain(event_lines))
        }
        None => Body::from_stream(reply_chunk),
    };

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        body,
    )
        .into_response()
}
