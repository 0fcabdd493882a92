//! Stream event envelope protocol: session/sequence metadata wrapped around a payload.
//!
//! This crate defines the wire shape used to deliver an ordered sequence of
//! domain events to a caller (e.g. NDJSON chunks over a chunked HTTP response).
//! It is deliberately generic over the payload type so that any `Serialize`
//! event (a pipeline stage event, a coordinator reply, ...) can be wrapped the
//! same way. It does not depend on the assessment engine crate.

pub mod envelope;

pub use envelope::{to_envelope_json, Envelope, EnvelopeState};
