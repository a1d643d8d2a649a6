//! # Calibration Pipeline
//!
//! Adaptive text-processing core: ingests a short message and produces a
//! response calibrated to the inferred domain, emotional tone and the
//! sender's learned preferences.
//!
//! ## Components
//! - `normalizer`: lowercase/trim canonicalization
//! - `lexical_filter`: filler/hedging/meta phrase stripping
//! - `structural`: sentence segmentation and ordered rule classification
//! - `alignment`: configuration-drift self-check
//! - `domain`: weighted-keyword domain scoring with a bounded cache
//! - `emotion`: emotional-indicator keyword families
//! - `preference`: per-sender preference records and feedback learning
//! - `padding`: padding-level decision ladder
//! - `composer`: level-driven text transforms
//! - `recorder`: bounded per-sender conversation history
//! - `engine`: main orchestrator

pub mod alignment;
pub mod composer;
pub mod domain;
pub mod emotion;
pub mod engine;
pub mod lexical_filter;
pub mod normalizer;
pub mod padding;
pub mod preference;
pub mod recorder;
pub mod structural;

// Re-export main types for convenience
#[allow(unused_imports)]
pub use domain::{Domain, DomainClassification, DomainClassifier, Formality};
#[allow(unused_imports)]
pub use emotion::{EmotionalIndicatorDetector, EmotionalProfile, EmotionalTone};
#[allow(unused_imports)]
pub use engine::{AdaptiveEngine, EngineMetrics};
#[allow(unused_imports)]
pub use padding::{LearningSource, PaddingDecision, PaddingLevel, PaddingSelector};
#[allow(unused_imports)]
pub use preference::{
    CommunicationStyle, ConversationEntry, Satisfaction, UserPreferenceRecord, UserPreferenceStore,
};
#[allow(unused_imports)]
pub use structural::{SentenceKind, StructuralClassifier, StructuralReport};
