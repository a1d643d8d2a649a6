//! Per-sender preference store.
//!
//! Holds one record per sender: preferred padding level, inferred
//! communication style, context-specific overrides, a bounded conversation
//! history and a running effectiveness score updated by feedback. The store
//! is process-wide shared state behind a single mutex; per-sender updates
//! are therefore serialized. State is in-memory only by design.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::domain::Domain;
use super::padding::PaddingLevel;
use crate::error::AppError;

/// Smoothing factor for the effectiveness moving average.
const EFFECTIVENESS_ALPHA: f32 = 0.2;
/// Fraction of records evicted when the store exceeds its capacity.
const EVICTION_FRACTION: usize = 10;

/// Explicit feedback on a delivered response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Satisfaction {
    Positive,
    Neutral,
    Negative,
}

impl Satisfaction {
    fn target_effectiveness(&self) -> f32 {
        match self {
            Satisfaction::Positive => 1.0,
            Satisfaction::Neutral => 0.5,
            Satisfaction::Negative => 0.0,
        }
    }
}

/// Communication style learned from feedback direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Unknown,
    Direct,
    Supportive,
    Analytical,
    Formal,
}

impl CommunicationStyle {
    pub fn label(&self) -> &'static str {
        match self {
            CommunicationStyle::Unknown => "unknown",
            CommunicationStyle::Direct => "direct",
            CommunicationStyle::Supportive => "supportive",
            CommunicationStyle::Analytical => "analytical",
            CommunicationStyle::Formal => "formal",
        }
    }
}

/// One processed interaction, appended to the sender's bounded history.
/// Used only for pattern inference, never as a classification cache key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub input_text: String,
    pub output_text: String,
    pub level_used: PaddingLevel,
    pub specialized_domain: bool,
    pub satisfaction: Option<Satisfaction>,
    pub latency_ms: u64,
}

/// Learned preferences for one sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferenceRecord {
    pub user_id: String,
    pub preferred_padding: PaddingLevel,
    pub communication_style: CommunicationStyle,
    pub domain_affinity: Option<Domain>,
    pub neurodiversity_aware: bool,
    pub context_overrides: HashMap<String, PaddingLevel>,
    pub last_updated: DateTime<Utc>,
    pub total_interactions: u64,
    /// Running score in [0, 1]; 0.5 until feedback arrives.
    pub effectiveness: f32,
    pub history: VecDeque<ConversationEntry>,
}

impl UserPreferenceRecord {
    /// Conservative defaults for a sender we have never seen.
    pub fn with_defaults(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            preferred_padding: PaddingLevel::Medium,
            communication_style: CommunicationStyle::Unknown,
            domain_affinity: None,
            neurodiversity_aware: false,
            context_overrides: HashMap::new(),
            last_updated: Utc::now(),
            total_interactions: 0,
            effectiveness: 0.5,
            history: VecDeque::new(),
        }
    }
}

/// Mutex-guarded map of preference records with capacity-based eviction.
pub struct UserPreferenceStore {
    records: Mutex<HashMap<String, UserPreferenceRecord>>,
    profile_capacity: usize,
    history_capacity: usize,
}

impl UserPreferenceStore {
    pub fn new(profile_capacity: usize, history_capacity: usize) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            profile_capacity: profile_capacity.max(1),
            history_capacity: history_capacity.max(1),
        }
    }

    /// Fetch the sender's record, lazily creating it with defaults.
    ///
    /// A poisoned lock degrades to a fresh default record so that response
    /// generation never blocks on the store.
    pub fn get(&self, user_id: &str) -> UserPreferenceRecord {
        let Ok(mut records) = self.records.lock() else {
            return UserPreferenceRecord::with_defaults(user_id);
        };

        if !records.contains_key(user_id) {
            Self::evict_if_needed(&mut records, self.profile_capacity);
            records.insert(
                user_id.to_string(),
                UserPreferenceRecord::with_defaults(user_id),
            );
            debug!(user_id, "created default preference record");
        }
        records[user_id].clone()
    }

    /// Append an interaction to the sender's bounded history and bump the
    /// interaction counters.
    pub fn record_interaction(
        &self,
        user_id: &str,
        entry: ConversationEntry,
    ) -> Result<(), AppError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::Store("preference store lock poisoned".to_string()))?;

        if !records.contains_key(user_id) {
            Self::evict_if_needed(&mut records, self.profile_capacity);
        }
        let record = records
            .entry(user_id.to_string())
            .or_insert_with(|| UserPreferenceRecord::with_defaults(user_id));

        record.history.push_back(entry);
        while record.history.len() > self.history_capacity {
            record.history.pop_front();
        }
        record.total_interactions += 1;
        record.last_updated = Utc::now();
        Ok(())
    }

    /// Apply explicit feedback: effectiveness moves by exponential moving
    /// average; an explicitly requested level is adopted as the preferred
    /// level, and its direction relative to the previous preference feeds
    /// the communication-style inference.
    pub fn apply_feedback(
        &self,
        user_id: &str,
        satisfaction: Satisfaction,
        requested_level: Option<PaddingLevel>,
    ) -> Result<(), AppError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::Store("preference store lock poisoned".to_string()))?;

        if !records.contains_key(user_id) {
            Self::evict_if_needed(&mut records, self.profile_capacity);
        }
        let record = records
            .entry(user_id.to_string())
            .or_insert_with(|| UserPreferenceRecord::with_defaults(user_id));

        let target = satisfaction.target_effectiveness();
        record.effectiveness =
            (1.0 - EFFECTIVENESS_ALPHA) * record.effectiveness + EFFECTIVENESS_ALPHA * target;

        if let Some(requested) = requested_level {
            if requested < record.preferred_padding {
                record.communication_style = CommunicationStyle::Direct;
            } else if requested > record.preferred_padding {
                record.communication_style = CommunicationStyle::Supportive;
            }
            record.preferred_padding = requested;
        }

        // Mark the most recent history entry with the verdict it earned.
        if let Some(last) = record.history.back_mut() {
            if last.satisfaction.is_none() {
                last.satisfaction = Some(satisfaction);
            }
        }

        record.last_updated = Utc::now();
        info!(
            user_id,
            effectiveness = record.effectiveness,
            preferred = record.preferred_padding.label(),
            "applied feedback"
        );
        Ok(())
    }

    /// Install a context-specific padding override for a sender.
    pub fn set_context_override(
        &self,
        user_id: &str,
        context_key: &str,
        level: PaddingLevel,
    ) -> Result<(), AppError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::Store("preference store lock poisoned".to_string()))?;

        let record = records
            .entry(user_id.to_string())
            .or_insert_with(|| UserPreferenceRecord::with_defaults(user_id));
        record
            .context_overrides
            .insert(context_key.to_string(), level);
        if context_key == Domain::Neurodiversity.label() {
            record.neurodiversity_aware = true;
        }
        record.last_updated = Utc::now();
        Ok(())
    }

    /// Mean effectiveness across all records; 0.5 when the store is empty.
    pub fn aggregate_effectiveness(&self) -> f32 {
        let Ok(records) = self.records.lock() else {
            return 0.5;
        };
        if records.is_empty() {
            return 0.5;
        }
        records.values().map(|r| r.effectiveness).sum::<f32>() / records.len() as f32
    }

    pub fn profile_count(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Drop the least-recently-updated ~10% when the capacity is reached.
    fn evict_if_needed(records: &mut HashMap<String, UserPreferenceRecord>, capacity: usize) {
        if records.len() < capacity {
            return;
        }

        let evict = (capacity / EVICTION_FRACTION).max(1);
        let mut by_age: Vec<(String, DateTime<Utc>)> = records
            .iter()
            .map(|(id, r)| (id.clone(), r.last_updated))
            .collect();
        by_age.sort_by_key(|(_, updated)| *updated);

        for (id, _) in by_age.into_iter().take(evict) {
            records.remove(&id);
        }
        debug!(evicted = evict, "preference store evicted stale records");
    }
}
