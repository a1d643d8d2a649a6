//! Structural classification.
//!
//! Segments a message into sentences and tags each one as Question,
//! Directive, Conditional or Statement using an explicit ordered rule list
//! (first match wins, in that order), then computes message-level metrics:
//! complexity, directness and logical density.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Sentence category, in rule-precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceKind {
    Question,
    Directive,
    Conditional,
    Statement,
}

/// Question subtype: open questions start with an interrogative word,
/// yes-no questions start with an auxiliary verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSubtype {
    Open,
    YesNo,
}

/// One classified sentence with its retained sub-attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub kind: SentenceKind,
    /// Present for questions only.
    pub question_subtype: Option<QuestionSubtype>,
    /// Priority keyword found in a directive ("urgent", "asap", ...).
    pub priority_marker: Option<String>,
    /// Antecedent clause of a conditional.
    pub antecedent: Option<String>,
    /// Consequent clause of a conditional.
    pub consequent: Option<String>,
}

/// Message-level scalar metrics, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StructuralMetrics {
    /// min(1, chars / 100)
    pub complexity: f32,
    /// max(0, 1 - 0.1 * hedge-marker count)
    pub directness: f32,
    /// min(1, connective count / word count)
    pub logical_density: f32,
}

/// Classified sentence buckets plus metrics. One per message, read-only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StructuralReport {
    pub questions: Vec<Sentence>,
    pub directives: Vec<Sentence>,
    pub conditionals: Vec<Sentence>,
    pub statements: Vec<Sentence>,
    pub metrics: StructuralMetrics,
}

impl StructuralReport {
    /// The sentence that drives response generation: first question, else
    /// first directive, else first conditional, else first statement.
    pub fn top_priority(&self) -> Option<&Sentence> {
        self.questions
            .first()
            .or_else(|| self.directives.first())
            .or_else(|| self.conditionals.first())
            .or_else(|| self.statements.first())
    }
}

static INTERROGATIVE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(what|why|how|when|where|who|which|whose)\b")
        .expect("Invalid regex: interrogative words")
});

static AUXILIARY_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(can|could|would|will|shall|should|is|are|do|does|did|have|has)\b")
        .expect("Invalid regex: auxiliary verbs")
});

static IMPERATIVE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(please\s+)?(do|make|create|send|stop|start|run|check|review|update|add|remove|write|fix|schedule|share|finish|prepare)\b",
    )
    .expect("Invalid regex: imperative verbs")
});

static CONDITIONAL_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(if|when|unless|provided|assuming)\b")
        .expect("Invalid regex: conditional markers")
});

/// Softeners the lexical filter deliberately leaves in place; they lower the
/// directness metric instead of being removed.
const HEDGE_MARKERS: &[&str] = &[
    "maybe",
    "possibly",
    "probably",
    "somewhat",
    "fairly",
    "quite",
    "rather",
    "apparently",
];

/// Boolean connective words counted for logical density.
const CONNECTIVES: &[&str] = &[
    "and",
    "or",
    "but",
    "if",
    "then",
    "because",
    "so",
    "unless",
    "although",
    "however",
    "therefore",
    "while",
    "since",
];

/// Sentence segmentation and classification. Deterministic and infallible:
/// empty input yields empty buckets and zero metrics.
#[derive(Debug, Default)]
pub struct StructuralClassifier;

impl StructuralClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Split on sentence terminators, keeping each fragment's terminator.
    fn segment(text: &str) -> Vec<(String, Option<char>)> {
        let mut fragments = Vec::new();
        let mut current = String::new();
        for c in text.chars() {
            if c == '.' || c == '!' || c == '?' {
                let fragment = current.trim().to_string();
                if !fragment.is_empty() {
                    fragments.push((fragment, Some(c)));
                }
                current.clear();
            } else {
                current.push(c);
            }
        }
        let tail = current.trim().to_string();
        if !tail.is_empty() {
            fragments.push((tail, None));
        }
        fragments
    }

    fn classify_sentence(fragment: &str, terminator: Option<char>) -> Sentence {
        // Ordered rules: Question -> Directive -> Conditional -> Statement.
        if terminator == Some('?') || INTERROGATIVE_START.is_match(fragment) {
            let subtype = if INTERROGATIVE_START.is_match(fragment) {
                QuestionSubtype::Open
            } else if AUXILIARY_START.is_match(fragment) {
                QuestionSubtype::YesNo
            } else {
                QuestionSubtype::Open
            };
            return Sentence {
                text: fragment.to_string(),
                kind: SentenceKind::Question,
                question_subtype: Some(subtype),
                priority_marker: None,
                antecedent: None,
                consequent: None,
            };
        }

        if IMPERATIVE_START.is_match(fragment) {
            let lower = fragment.to_lowercase();
            let priority_marker = ["urgent", "urgently", "immediately", "asap", "now", "today"]
                .iter()
                .find(|m| lower.split_whitespace().any(|w| w.trim_matches(',') == **m))
                .map(|m| m.to_string());
            return Sentence {
                text: fragment.to_string(),
                kind: SentenceKind::Directive,
                question_subtype: None,
                priority_marker,
                antecedent: None,
                consequent: None,
            };
        }

        if CONDITIONAL_MARKER.is_match(fragment) {
            let (antecedent, consequent) = Self::split_conditional(fragment);
            return Sentence {
                text: fragment.to_string(),
                kind: SentenceKind::Conditional,
                question_subtype: None,
                priority_marker: None,
                antecedent,
                consequent,
            };
        }

        Sentence {
            text: fragment.to_string(),
            kind: SentenceKind::Statement,
            question_subtype: None,
            priority_marker: None,
            antecedent: None,
            consequent: None,
        }
    }

    /// Best-effort antecedent/consequent extraction: split on ", " or " then ".
    fn split_conditional(fragment: &str) -> (Option<String>, Option<String>) {
        let lower = fragment.to_lowercase();
        let split_at = lower
            .find(" then ")
            .map(|i| (i, " then ".len()))
            .or_else(|| lower.find(", ").map(|i| (i, ", ".len())));

        match split_at {
            Some((index, sep_len)) => {
                let antecedent = fragment[..index].trim().to_string();
                let consequent = fragment[index + sep_len..].trim().to_string();
                (
                    Some(antecedent),
                    if consequent.is_empty() {
                        None
                    } else {
                        Some(consequent)
                    },
                )
            }
            None => (Some(fragment.trim().to_string()), None),
        }
    }

    fn compute_metrics(text: &str) -> StructuralMetrics {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return StructuralMetrics::default();
        }

        let complexity = (trimmed.chars().count() as f32 / 100.0).min(1.0);

        let words: Vec<&str> = trimmed
            .split(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
            .filter(|w| !w.is_empty())
            .collect();

        let hedge_count = words
            .iter()
            .filter(|w| HEDGE_MARKERS.contains(&w.to_lowercase().as_str()))
            .count();
        let directness = (1.0 - 0.1 * hedge_count as f32).max(0.0);

        let connective_count = words
            .iter()
            .filter(|w| CONNECTIVES.contains(&w.to_lowercase().as_str()))
            .count();
        let logical_density = if words.is_empty() {
            0.0
        } else {
            (connective_count as f32 / words.len() as f32).min(1.0)
        };

        StructuralMetrics {
            complexity,
            directness,
            logical_density,
        }
    }

    /// Classify a message into sentence buckets and compute metrics.
    pub fn classify(&self, text: &str) -> StructuralReport {
        let mut report = StructuralReport {
            metrics: Self::compute_metrics(text),
            ..Default::default()
        };

        for (fragment, terminator) in Self::segment(text) {
            let sentence = Self::classify_sentence(&fragment, terminator);
            match sentence.kind {
                SentenceKind::Question => report.questions.push(sentence),
                SentenceKind::Directive => report.directives.push(sentence),
                SentenceKind::Conditional => report.conditionals.push(sentence),
                SentenceKind::Statement => report.statements.push(sentence),
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_by_terminator() {
        let classifier = StructuralClassifier::new();
        let report = classifier.classify("can you check the deploy logs?");
        assert_eq!(report.questions.len(), 1);
        assert_eq!(
            report.questions[0].question_subtype,
            Some(QuestionSubtype::YesNo)
        );
    }

    #[test]
    fn test_open_question_by_interrogative() {
        let classifier = StructuralClassifier::new();
        let report = classifier.classify("what happened to the build");
        assert_eq!(report.questions.len(), 1);
        assert_eq!(
            report.questions[0].question_subtype,
            Some(QuestionSubtype::Open)
        );
    }

    #[test]
    fn test_directive_with_priority_marker() {
        let classifier = StructuralClassifier::new();
        let report = classifier.classify("please review the patch asap.");
        assert_eq!(report.directives.len(), 1);
        assert_eq!(report.directives[0].priority_marker.as_deref(), Some("asap"));
    }

    #[test]
    fn test_conditional_extraction() {
        let classifier = StructuralClassifier::new();
        let report = classifier.classify("the tests pass if you rerun them, so relax.");
        assert_eq!(report.conditionals.len(), 1);
        let sentence = &report.conditionals[0];
        assert_eq!(
            sentence.antecedent.as_deref(),
            Some("the tests pass if you rerun them")
        );
        assert_eq!(sentence.consequent.as_deref(), Some("so relax"));
    }

    #[test]
    fn test_question_wins_over_conditional() {
        let classifier = StructuralClassifier::new();
        // Contains "if" but terminates with '?': the question rule fires first.
        let report = classifier.classify("would it break if we upgraded?");
        assert_eq!(report.questions.len(), 1);
        assert!(report.conditionals.is_empty());
    }

    #[test]
    fn test_top_priority_prefers_question() {
        let classifier = StructuralClassifier::new();
        let report =
            classifier.classify("the report is done. send it out. when is the review?");
        let top = report.top_priority().unwrap();
        assert_eq!(top.kind, SentenceKind::Question);
    }

    #[test]
    fn test_top_priority_falls_back_to_statement() {
        let classifier = StructuralClassifier::new();
        let report = classifier.classify("the report is done.");
        assert_eq!(report.top_priority().unwrap().kind, SentenceKind::Statement);
    }

    #[test]
    fn test_empty_input_yields_zero_metrics() {
        let classifier = StructuralClassifier::new();
        let report = classifier.classify("");
        assert!(report.questions.is_empty());
        assert!(report.statements.is_empty());
        assert!(report.top_priority().is_none());
        assert_eq!(report.metrics.complexity, 0.0);
        assert_eq!(report.metrics.directness, 0.0);
        assert_eq!(report.metrics.logical_density, 0.0);
    }

    #[test]
    fn test_metrics_ranges() {
        let classifier = StructuralClassifier::new();
        let report = classifier.classify(
            "maybe we should possibly try this and that, because it probably works if we wait.",
        );
        let m = report.metrics;
        assert!(m.complexity > 0.0 && m.complexity <= 1.0);
        assert!(m.directness < 1.0, "hedge markers must lower directness");
        assert!(m.logical_density > 0.0 && m.logical_density <= 1.0);
    }

    #[test]
    fn test_long_text_caps_complexity() {
        let classifier = StructuralClassifier::new();
        let report = classifier.classify(&"a ".repeat(200));
        assert_eq!(report.metrics.complexity, 1.0);
    }
}
