//! `ConversationSession`: per-user persistent state, owned exclusively by the
//! session store. Pure data — no locking, no I/O; see `crate::session` for the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::loan_application::PartialLoanApplication;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Collecting,
    Ready,
    Processing,
    Completed,
    Error,
}

/// Per-user persistent conversational state. Does not include the message thread —
/// the thread lives alongside this struct in the session store (`crate::session::SessionEntry`)
/// rather than embedded here, since it must never be serialized to the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub status: SessionStatus,
    pub collected_data: PartialLoanApplication,
    pub completion_percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ConversationSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            created_at: now,
            last_activity: now,
            status: SessionStatus::Collecting,
            collected_data: PartialLoanApplication::new(),
            completion_percentage: 0,
            error_detail: None,
        }
    }

    /// Invariant: `status == completed ⇒ completion == 100`;
    /// `status == collecting ⇒ completion < 100`.
    pub fn invariant_holds(&self) -> bool {
        match self.status {
            SessionStatus::Completed => self.completion_percentage == 100,
            SessionStatus::Collecting => self.completion_percentage < 100,
            _ => true,
        }
    }

    pub fn mark_error(&mut self, detail: impl Into<String>) {
        self.status = SessionStatus::Error;
        self.error_detail = Some(detail.into());
        self.last_activity = Utc::now();
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_collecting_at_zero_percent() {
        let s = ConversationSession::new("sess-1");
        assert_eq!(s.status, SessionStatus::Collecting);
        assert_eq!(s.completion_percentage, 0);
        assert!(s.invariant_holds());
    }

    #[test]
    fn invariant_rejects_completed_below_100() {
        let mut s = ConversationSession::new("sess-1");
        s.status = SessionStatus::Completed;
        s.completion_percentage = 75;
        assert!(!s.invariant_holds());
    }

    #[test]
    fn mark_error_sets_status_and_detail() {
        let mut s = ConversationSession::new("sess-1");
        s.mark_error("cancelled");
        assert_eq!(s.status, SessionStatus::Error);
        assert_eq!(s.error_detail.as_deref(), Some("cancelled"));
    }
}
