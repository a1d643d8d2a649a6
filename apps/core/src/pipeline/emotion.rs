//! Emotional indicator detection.
//!
//! Scans normalized text against eight fixed keyword families, each mapped
//! to an emotional tone with a fixed influence weight. Multiple matched
//! tones combine into one influence value via a weighted average scaled by
//! the (capped) match count. No matches means neutral influence (1.0),
//! which the padding selector treats as "no override."

use serde::{Deserialize, Serialize};

/// Emotional tone family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalTone {
    Enthusiastic,
    Supportive,
    Analytical,
    Formal,
    Confused,
    Anxious,
    Frustrated,
    Direct,
}

impl EmotionalTone {
    /// Fixed influence weight in [0.2, 1.3]. Above 1.0 pushes padding up,
    /// below 1.0 pushes it down.
    pub fn influence_weight(&self) -> f32 {
        match self {
            EmotionalTone::Enthusiastic => 1.3,
            EmotionalTone::Supportive => 1.2,
            EmotionalTone::Analytical => 1.0,
            EmotionalTone::Formal => 0.9,
            EmotionalTone::Confused => 0.8,
            EmotionalTone::Anxious => 0.5,
            EmotionalTone::Frustrated => 0.4,
            EmotionalTone::Direct => 0.3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmotionalTone::Enthusiastic => "enthusiastic",
            EmotionalTone::Supportive => "supportive",
            EmotionalTone::Analytical => "analytical",
            EmotionalTone::Formal => "formal",
            EmotionalTone::Confused => "confused",
            EmotionalTone::Anxious => "anxious",
            EmotionalTone::Frustrated => "frustrated",
            EmotionalTone::Direct => "direct",
        }
    }
}

const FAMILIES: &[(EmotionalTone, &[&str])] = &[
    (
        EmotionalTone::Enthusiastic,
        &[
            "awesome",
            "excited",
            "amazing",
            "fantastic",
            "great news",
            "can't wait",
            "love it",
        ],
    ),
    (
        EmotionalTone::Supportive,
        &[
            "happy to help",
            "no worries",
            "take your time",
            "appreciate",
            "thank you so much",
        ],
    ),
    (
        EmotionalTone::Analytical,
        &[
            "analysis",
            "evaluate",
            "tradeoff",
            "compare",
            "metrics",
            "the data suggests",
        ],
    ),
    (
        EmotionalTone::Formal,
        &[
            "per our discussion",
            "as requested",
            "pursuant",
            "regarding",
            "hereby",
        ],
    ),
    (
        EmotionalTone::Confused,
        &[
            "confused",
            "don't understand",
            "unclear",
            "you lost me",
            "what do you mean",
        ],
    ),
    (
        EmotionalTone::Anxious,
        &[
            "worried",
            "nervous",
            "anxious",
            "stressed",
            "afraid",
            "running out of time",
        ],
    ),
    (
        EmotionalTone::Frustrated,
        &[
            "frustrated",
            "annoyed",
            "fed up",
            "this is broken",
            "sick of",
            "still not working",
        ],
    ),
    (
        EmotionalTone::Direct,
        &[
            "just tell me",
            "bottom line",
            "get to the point",
            "short answer",
            "yes or no",
        ],
    ),
];

/// Matched tones plus the combined influence value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalProfile {
    pub indicators: Vec<EmotionalTone>,
    /// 1.0 when no indicator matched.
    pub combined_influence: f32,
}

impl EmotionalProfile {
    pub fn neutral() -> Self {
        Self {
            indicators: vec![],
            combined_influence: 1.0,
        }
    }

    /// No indicators matched: the selector skips the emotional override.
    pub fn is_neutral(&self) -> bool {
        self.indicators.is_empty()
    }
}

/// Keyword-family scanner producing an [`EmotionalProfile`].
#[derive(Debug, Default)]
pub struct EmotionalIndicatorDetector;

impl EmotionalIndicatorDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect emotional indicators in normalized text.
    pub fn detect(&self, normalized: &str) -> EmotionalProfile {
        let text = normalized.trim();
        if text.is_empty() {
            return EmotionalProfile::neutral();
        }

        let mut indicators = Vec::new();
        for (tone, keywords) in FAMILIES {
            if keywords.iter().any(|k| text.contains(k)) && !indicators.contains(tone) {
                indicators.push(*tone);
            }
        }

        if indicators.is_empty() {
            return EmotionalProfile::neutral();
        }

        let mean: f32 = indicators
            .iter()
            .map(|t| t.influence_weight())
            .sum::<f32>()
            / indicators.len() as f32;
        let scale = (0.7 + 0.3 * indicators.len() as f32).min(1.5);

        EmotionalProfile {
            combined_influence: mean * scale,
            indicators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_stay_in_range() {
        for (tone, _) in FAMILIES {
            let w = tone.influence_weight();
            assert!((0.2..=1.3).contains(&w), "{:?} out of range", tone);
        }
    }

    #[test]
    fn test_no_match_is_neutral() {
        let detector = EmotionalIndicatorDetector::new();
        let profile = detector.detect("the meeting moved to tuesday");
        assert!(profile.is_neutral());
        assert_eq!(profile.combined_influence, 1.0);
    }

    #[test]
    fn test_single_frustrated_match() {
        let detector = EmotionalIndicatorDetector::new();
        let profile = detector.detect("i am so frustrated with this");
        assert_eq!(profile.indicators, vec![EmotionalTone::Frustrated]);
        // 0.4 * (0.7 + 0.3 * 1) = 0.4
        assert!((profile.combined_influence - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_multiple_matches_scale_influence() {
        let detector = EmotionalIndicatorDetector::new();
        let profile = detector.detect("awesome work, i really appreciate it");
        assert_eq!(profile.indicators.len(), 2);
        // mean(1.3, 1.2) * (0.7 + 0.3 * 2) = 1.25 * 1.3 = 1.625
        assert!((profile.combined_influence - 1.625).abs() < 1e-4);
    }

    #[test]
    fn test_scale_cap_at_many_matches() {
        let detector = EmotionalIndicatorDetector::new();
        let profile = detector.detect(
            "awesome analysis, appreciate it, but i'm confused, worried and frustrated, just tell me",
        );
        assert!(profile.indicators.len() >= 4);
        let mean: f32 = profile
            .indicators
            .iter()
            .map(|t| t.influence_weight())
            .sum::<f32>()
            / profile.indicators.len() as f32;
        // Scale is capped at 1.5 regardless of the match count.
        assert!((profile.combined_influence - mean * 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_indicators_are_deduplicated() {
        let detector = EmotionalIndicatorDetector::new();
        let profile = detector.detect("frustrated and annoyed and fed up");
        assert_eq!(profile.indicators, vec![EmotionalTone::Frustrated]);
    }

    #[test]
    fn test_empty_input_is_neutral() {
        let detector = EmotionalIndicatorDetector::new();
        assert!(detector.detect("").is_neutral());
    }
}
