//! Padding level selection.
//!
//! Fuses the domain classification, emotional profile and the sender's
//! learned preferences into one recommended padding level, with a confidence
//! and a human-readable rationale. Decision rules apply in a fixed order and
//! the first applicable rule wins.

use serde::{Deserialize, Serialize};

use super::domain::{Domain, DomainClassification};
use super::emotion::EmotionalProfile;
use super::preference::{CommunicationStyle, UserPreferenceRecord};

/// Degree of conversational elaboration added to an otherwise literal
/// response, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingLevel {
    None,
    Light,
    Medium,
    Enhanced,
}

impl PaddingLevel {
    pub fn label(&self) -> &'static str {
        match self {
            PaddingLevel::None => "none",
            PaddingLevel::Light => "light",
            PaddingLevel::Medium => "medium",
            PaddingLevel::Enhanced => "enhanced",
        }
    }

    fn index(&self) -> u8 {
        match self {
            PaddingLevel::None => 0,
            PaddingLevel::Light => 1,
            PaddingLevel::Medium => 2,
            PaddingLevel::Enhanced => 3,
        }
    }

    fn from_index(index: u8) -> Self {
        match index {
            0 => PaddingLevel::None,
            1 => PaddingLevel::Light,
            2 => PaddingLevel::Medium,
            _ => PaddingLevel::Enhanced,
        }
    }

    /// One step more elaborate, clamped at Enhanced.
    pub fn step_up(&self) -> Self {
        Self::from_index((self.index() + 1).min(3))
    }

    /// One step more literal, clamped at None.
    pub fn step_down(&self) -> Self {
        Self::from_index(self.index().saturating_sub(1))
    }
}

/// Which rule produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningSource {
    EmotionalOverride,
    ContextOverride,
    SensitiveDomain,
    DomainDefault,
    StyleFallback,
}

/// Outcome of padding selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaddingDecision {
    pub level: PaddingLevel,
    pub confidence: f32,
    pub reasoning: String,
    pub factors: Vec<String>,
    pub source: LearningSource,
}

/// Stateless rule ladder over the upstream classifier outputs.
#[derive(Debug, Default)]
pub struct PaddingSelector;

impl PaddingSelector {
    pub fn new() -> Self {
        Self
    }

    /// Select a padding level. `context_tag` optionally names a cultural or
    /// situational context used for override lookup; it defaults to the
    /// primary domain label.
    pub fn select(
        &self,
        domain: &DomainClassification,
        emotion: &EmotionalProfile,
        record: &UserPreferenceRecord,
        context_tag: Option<&str>,
    ) -> PaddingDecision {
        let mut decision = self.decide(domain, emotion, record, context_tag);

        // Hard cap: sensitive domains never exceed Light, whatever rule fired.
        if domain.touches_sensitive() && decision.level > PaddingLevel::Light {
            decision.level = PaddingLevel::Light;
            decision
                .factors
                .push("sensitive_domain_clamp".to_string());
        }

        decision
    }

    fn decide(
        &self,
        domain: &DomainClassification,
        emotion: &EmotionalProfile,
        record: &UserPreferenceRecord,
        context_tag: Option<&str>,
    ) -> PaddingDecision {
        // 1. Emotional override
        if !emotion.is_neutral() {
            return self.emotional_override(domain, emotion, record);
        }

        // 2. Explicit contextual override
        let context_key = context_tag.unwrap_or(domain.primary_domain.label());
        if let Some(level) = record.context_overrides.get(context_key) {
            return PaddingDecision {
                level: *level,
                confidence: 0.9,
                reasoning: format!(
                    "sender has an explicit {} override for the {} context",
                    level.label(),
                    context_key
                ),
                factors: vec![format!("override:{}", context_key)],
                source: LearningSource::ContextOverride,
            };
        }

        // 3. Sensitive-domain detection
        if domain.touches_sensitive() {
            return PaddingDecision {
                level: PaddingLevel::Light,
                confidence: 0.85,
                reasoning: "sensitive domain detected; padding capped at light".to_string(),
                factors: vec![format!("domain:{}", domain.primary_domain.label())],
                source: LearningSource::SensitiveDomain,
            };
        }

        // 4. Domain-specific default
        if domain.is_specialized {
            let base = Self::domain_default(domain.primary_domain);
            let level = Self::shift_for_style(base, record.communication_style);
            return PaddingDecision {
                level,
                confidence: 0.75,
                reasoning: format!(
                    "{} domain default, adjusted for {} style",
                    domain.primary_domain.label(),
                    record.communication_style.label()
                ),
                factors: vec![
                    format!("domain:{}", domain.primary_domain.label()),
                    format!("style:{}", record.communication_style.label()),
                ],
                source: LearningSource::DomainDefault,
            };
        }

        // 5. Style-based fallback
        let level = Self::style_fallback(record);
        let experience_bonus: f32 = if record.total_interactions > 10 {
            0.15
        } else {
            0.0
        };
        PaddingDecision {
            level,
            confidence: (0.6 + experience_bonus).min(0.75),
            reasoning: format!(
                "no stronger signal; falling back to the sender's {} style",
                record.communication_style.label()
            ),
            factors: vec![
                format!("style:{}", record.communication_style.label()),
                format!("interactions:{}", record.total_interactions),
            ],
            source: LearningSource::StyleFallback,
        }
    }

    fn emotional_override(
        &self,
        domain: &DomainClassification,
        emotion: &EmotionalProfile,
        record: &UserPreferenceRecord,
    ) -> PaddingDecision {
        let base = record.preferred_padding;
        let influence = emotion.combined_influence;

        let (level, confidence) = if influence <= 0.4 {
            (PaddingLevel::Light, 0.9)
        } else if influence <= 0.8 {
            (base.step_down(), 0.8)
        } else if influence <= 1.2 {
            (base, 0.7)
        } else {
            (base.step_up(), 0.8)
        };

        let level = if domain.touches_sensitive() {
            level.min(PaddingLevel::Light)
        } else {
            level
        };

        let mut factors: Vec<String> = emotion
            .indicators
            .iter()
            .map(|t| format!("emotional:{}", t.label()))
            .collect();
        factors.push(format!("influence:{:.2}", influence));

        PaddingDecision {
            level,
            confidence,
            reasoning: format!(
                "emotional indicators present (combined influence {:.2})",
                influence
            ),
            factors,
            source: LearningSource::EmotionalOverride,
        }
    }

    fn domain_default(domain: Domain) -> PaddingLevel {
        match domain {
            Domain::Academic => PaddingLevel::Medium,
            Domain::Technical => PaddingLevel::Light,
            Domain::Business => PaddingLevel::Medium,
            Domain::Neurodiversity => PaddingLevel::Light,
            Domain::General => PaddingLevel::Medium,
        }
    }

    fn shift_for_style(base: PaddingLevel, style: CommunicationStyle) -> PaddingLevel {
        match style {
            CommunicationStyle::Direct => base.step_down(),
            CommunicationStyle::Supportive => base.step_up(),
            _ => base,
        }
    }

    fn style_fallback(record: &UserPreferenceRecord) -> PaddingLevel {
        match record.communication_style {
            CommunicationStyle::Direct => PaddingLevel::Light,
            CommunicationStyle::Supportive => PaddingLevel::Enhanced,
            CommunicationStyle::Analytical => PaddingLevel::Medium,
            CommunicationStyle::Formal => PaddingLevel::Medium,
            // Nothing learned yet: trust the stored preference.
            CommunicationStyle::Unknown => record.preferred_padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::domain::DomainClassifier;
    use crate::pipeline::emotion::EmotionalIndicatorDetector;
    use crate::pipeline::preference::UserPreferenceRecord;

    fn default_record() -> UserPreferenceRecord {
        UserPreferenceRecord::with_defaults("tester")
    }

    fn classify(text: &str) -> DomainClassification {
        DomainClassifier::new(16).classify(text)
    }

    #[test]
    fn test_level_ordering_and_steps() {
        assert!(PaddingLevel::None < PaddingLevel::Enhanced);
        assert_eq!(PaddingLevel::Medium.step_up(), PaddingLevel::Enhanced);
        assert_eq!(PaddingLevel::Enhanced.step_up(), PaddingLevel::Enhanced);
        assert_eq!(PaddingLevel::Light.step_down(), PaddingLevel::None);
        assert_eq!(PaddingLevel::None.step_down(), PaddingLevel::None);
    }

    #[test]
    fn test_default_user_falls_back_to_medium() {
        let selector = PaddingSelector::new();
        let decision = selector.select(
            &DomainClassification::general(),
            &EmotionalProfile::neutral(),
            &default_record(),
            None,
        );
        assert_eq!(decision.level, PaddingLevel::Medium);
        assert_eq!(decision.source, LearningSource::StyleFallback);
        assert!((decision.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_fallback_confidence_grows_with_experience() {
        let selector = PaddingSelector::new();
        let mut record = default_record();
        record.total_interactions = 25;
        let decision = selector.select(
            &DomainClassification::general(),
            &EmotionalProfile::neutral(),
            &record,
            None,
        );
        assert!((decision.confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_low_influence_forces_light() {
        let selector = PaddingSelector::new();
        let emotion = EmotionalIndicatorDetector::new().detect("just tell me, yes or no");
        assert!(emotion.combined_influence <= 0.4);

        let decision = selector.select(
            &DomainClassification::general(),
            &emotion,
            &default_record(),
            None,
        );
        assert_eq!(decision.level, PaddingLevel::Light);
        assert_eq!(decision.source, LearningSource::EmotionalOverride);
        assert!((decision.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_high_influence_steps_up_from_base() {
        let selector = PaddingSelector::new();
        let emotion =
            EmotionalIndicatorDetector::new().detect("awesome, i really appreciate it");
        assert!(emotion.combined_influence > 1.2);

        let decision = selector.select(
            &DomainClassification::general(),
            &emotion,
            &default_record(),
            None,
        );
        assert_eq!(decision.level, PaddingLevel::Enhanced);
    }

    #[test]
    fn test_context_override_wins_without_emotion() {
        let selector = PaddingSelector::new();
        let mut record = default_record();
        record
            .context_overrides
            .insert("technical".to_string(), PaddingLevel::None);

        let domain = classify("deploy the api to the server");
        let decision = selector.select(&domain, &EmotionalProfile::neutral(), &record, None);
        assert_eq!(decision.level, PaddingLevel::None);
        assert_eq!(decision.source, LearningSource::ContextOverride);
        assert!((decision.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_sensitive_domain_never_enhanced() {
        let selector = PaddingSelector::new();
        let domain = classify("feeling sensory overload, adhd day");

        // Even with strongly positive emotion the clamp holds.
        let emotion = EmotionalIndicatorDetector::new().detect("awesome, i appreciate it");
        let decision = selector.select(&domain, &emotion, &default_record(), None);
        assert!(decision.level <= PaddingLevel::Light);

        // And without emotion, the sensitive rule fires directly.
        let decision = selector.select(&domain, &EmotionalProfile::neutral(), &default_record(), None);
        assert_eq!(decision.level, PaddingLevel::Light);
        assert_eq!(decision.source, LearningSource::SensitiveDomain);
        assert!((decision.confidence - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_sensitive_markers_clamp_even_under_another_primary() {
        let selector = PaddingSelector::new();
        let text = "awesome methodology and hypothesis for my adhd study";
        let domain = classify(text);
        assert_eq!(domain.primary_domain, Domain::Academic);
        assert!(domain.touches_sensitive());

        // Strong positive emotion would otherwise step the level up.
        let emotion = EmotionalIndicatorDetector::new().detect(text);
        assert!(emotion.combined_influence > 1.2);

        let decision = selector.select(&domain, &emotion, &default_record(), None);
        assert!(decision.level <= PaddingLevel::Light);
    }

    #[test]
    fn test_domain_default_shifted_by_style() {
        let selector = PaddingSelector::new();
        let domain = classify("the research methodology and hypothesis need work");
        assert!(domain.is_specialized);

        let mut record = default_record();
        record.communication_style = CommunicationStyle::Direct;
        let decision = selector.select(&domain, &EmotionalProfile::neutral(), &record, None);
        assert_eq!(decision.level, PaddingLevel::Light);
        assert_eq!(decision.source, LearningSource::DomainDefault);

        record.communication_style = CommunicationStyle::Supportive;
        let decision = selector.select(&domain, &EmotionalProfile::neutral(), &record, None);
        assert_eq!(decision.level, PaddingLevel::Enhanced);
    }

    #[test]
    fn test_decision_always_in_level_set() {
        let selector = PaddingSelector::new();
        let detector = EmotionalIndicatorDetector::new();
        let texts = [
            "just tell me now",
            "awesome work, can't wait",
            "my adhd is acting up",
            "peer-review methodology hypothesis",
            "",
            "random plain message",
        ];
        for text in texts {
            let decision = selector.select(
                &classify(text),
                &detector.detect(text),
                &default_record(),
                None,
            );
            assert!(matches!(
                decision.level,
                PaddingLevel::None
                    | PaddingLevel::Light
                    | PaddingLevel::Medium
                    | PaddingLevel::Enhanced
            ));
            assert!(decision.confidence > 0.0 && decision.confidence <= 1.0);
            assert!(!decision.reasoning.is_empty());
        }
    }
}
