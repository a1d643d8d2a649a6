//! Pipeline engine - main orchestrator for the calibration core.
//!
//! Wires the stages together in order: normalize, lexical filter, structural
//! classification, domain classification, emotional indicators, padding
//! selection (reading the preference store), response composition, and
//! conversation recording (writing the preference store). The alignment
//! self-check runs once at construction and on explicit reconfiguration.
//!
//! Every stage fails open; the worst observable outcome of any internal
//! problem is the trimmed input text returned unchanged.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::{AlignmentConfig, EngineConfig};
use crate::error::AppError;

use super::alignment::{self, AlignmentReport};
use super::composer::ResponseComposer;
use super::domain::DomainClassifier;
use super::emotion::EmotionalIndicatorDetector;
use super::lexical_filter::LexicalFilter;
use super::normalizer::normalize;
use super::padding::{PaddingLevel, PaddingSelector};
use super::preference::{Satisfaction, UserPreferenceStore};
use super::recorder::ConversationRecorder;
use super::structural::StructuralClassifier;

/// Read-only counters for external observability tooling.
#[derive(Debug, Clone, Serialize)]
pub struct EngineMetrics {
    pub messages_processed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub filter_activations: u64,
    pub profile_count: usize,
    pub aggregate_effectiveness: f32,
    pub degraded: bool,
}

/// The adaptive calibration engine. Shared mutable state is exactly the
/// domain cache and the preference store, each behind its own lock; the
/// engine itself can be shared across tasks behind an `Arc`.
pub struct AdaptiveEngine {
    alignment: Mutex<AlignmentConfig>,
    degraded: AtomicBool,
    filter: LexicalFilter,
    structural: StructuralClassifier,
    domains: DomainClassifier,
    emotions: EmotionalIndicatorDetector,
    selector: PaddingSelector,
    composer: ResponseComposer,
    store: Arc<UserPreferenceStore>,
    recorder: ConversationRecorder,
    processed: AtomicU64,
}

impl AdaptiveEngine {
    /// Build an engine from configuration. An alignment violation puts the
    /// engine into degraded mode on last-known-good defaults instead of
    /// failing construction.
    pub fn new(config: &EngineConfig) -> Self {
        let report = alignment::validate(&config.alignment);
        let (alignment_in_use, degraded) = if report.valid {
            (config.alignment, false)
        } else {
            (AlignmentConfig::default(), true)
        };

        let store = Arc::new(UserPreferenceStore::new(
            config.profile_capacity,
            config.history_capacity,
        ));

        Self {
            alignment: Mutex::new(alignment_in_use),
            degraded: AtomicBool::new(degraded),
            filter: LexicalFilter::new(),
            structural: StructuralClassifier::new(),
            domains: DomainClassifier::new(config.cache_capacity),
            emotions: EmotionalIndicatorDetector::new(),
            selector: PaddingSelector::new(),
            composer: ResponseComposer::new(),
            recorder: ConversationRecorder::new(store.clone()),
            store,
            processed: AtomicU64::new(0),
        }
    }

    /// Process one message and produce the calibrated response.
    pub fn process(&self, text: &str, sender_id: &str) -> String {
        self.process_with_context(text, sender_id, None)
    }

    /// Process one message with an optional cultural/situational context tag
    /// used for preference-override lookup.
    #[instrument(skip(self, text), fields(sender_id = %sender_id))]
    pub fn process_with_context(
        &self,
        text: &str,
        sender_id: &str,
        context_tag: Option<&str>,
    ) -> String {
        let start = Instant::now();
        let raw = text.trim();

        let normalized = normalize(text);
        let (filtered, _was_filtered) = self.filter.filter(&normalized);

        let report = self.structural.classify(&filtered);
        let classification = self.domains.classify(&filtered);
        let emotion = self.emotions.detect(&filtered);
        let record = self.store.get(sender_id);

        let decision = self
            .selector
            .select(&classification, &emotion, &record, context_tag);

        let output = self.composer.compose(
            raw,
            decision.level,
            classification.primary_domain,
            report.top_priority(),
        );

        let latency_ms = start.elapsed().as_millis() as u64;
        self.recorder.record(
            sender_id,
            raw,
            &output,
            decision.level,
            classification.is_specialized,
            latency_ms,
        );
        self.processed.fetch_add(1, Ordering::Relaxed);

        info!(
            domain = classification.primary_domain.label(),
            level = decision.level.label(),
            confidence = decision.confidence,
            latency_ms,
            "processed message"
        );

        output
    }

    /// Apply explicit sender feedback to the preference store.
    pub fn apply_feedback(
        &self,
        sender_id: &str,
        satisfaction: Satisfaction,
        requested_level: Option<PaddingLevel>,
    ) -> Result<(), AppError> {
        self.store
            .apply_feedback(sender_id, satisfaction, requested_level)
    }

    /// Install a context-specific padding override for a sender.
    pub fn set_context_override(
        &self,
        sender_id: &str,
        context_key: &str,
        level: PaddingLevel,
    ) -> Result<(), AppError> {
        self.store.set_context_override(sender_id, context_key, level)
    }

    /// Re-run the alignment self-check with new constants. Valid constants
    /// are adopted; invalid ones leave the last-known-good set in place and
    /// flag the engine as degraded.
    pub fn reconfigure_alignment(&self, config: AlignmentConfig) -> AlignmentReport {
        let report = alignment::validate(&config);
        if report.valid {
            if let Ok(mut current) = self.alignment.lock() {
                *current = config;
            }
            self.degraded.store(false, Ordering::Relaxed);
        } else {
            self.degraded.store(true, Ordering::Relaxed);
        }
        report
    }

    /// True while operating on last-known-good defaults after an alignment
    /// violation.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    pub fn metrics(&self) -> EngineMetrics {
        EngineMetrics {
            messages_processed: self.processed.load(Ordering::Relaxed),
            cache_hits: self.domains.cache_hits(),
            cache_misses: self.domains.cache_misses(),
            filter_activations: self.filter.activation_count(),
            profile_count: self.store.profile_count(),
            aggregate_effectiveness: self.store.aggregate_effectiveness(),
            degraded: self.is_degraded(),
        }
    }
}
