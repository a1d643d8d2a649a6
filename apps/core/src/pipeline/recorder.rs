//! Conversation recording.
//!
//! Appends every processed interaction to the sender's bounded history via
//! the preference store. Recording is strictly best-effort: a store problem
//! is logged and skipped, never allowed to block the response path.

use chrono::Utc;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::padding::PaddingLevel;
use super::preference::{ConversationEntry, UserPreferenceStore};

pub struct ConversationRecorder {
    store: Arc<UserPreferenceStore>,
}

impl ConversationRecorder {
    pub fn new(store: Arc<UserPreferenceStore>) -> Self {
        Self { store }
    }

    /// Record one completed interaction. Never fails; store errors are
    /// logged and the interaction is dropped.
    pub fn record(
        &self,
        user_id: &str,
        input_text: &str,
        output_text: &str,
        level_used: PaddingLevel,
        specialized_domain: bool,
        latency_ms: u64,
    ) {
        let entry = ConversationEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            input_text: input_text.to_string(),
            output_text: output_text.to_string(),
            level_used,
            specialized_domain,
            satisfaction: None,
            latency_ms,
        };

        if let Err(e) = self.store.record_interaction(user_id, entry) {
            warn!(user_id, error = %e, "skipping conversation recording");
        }
    }
}
