//! Response composition.
//!
//! Applies the chosen padding level's text-transform rules to the original
//! (case-preserved, trimmed) message text. Deterministic given the text, the
//! level, the domain and the top-priority structural item.

use super::domain::Domain;
use super::padding::PaddingLevel;
use super::structural::{Sentence, SentenceKind};

#[derive(Debug, Default)]
pub struct ResponseComposer;

impl ResponseComposer {
    pub fn new() -> Self {
        Self
    }

    /// Compose the final response text.
    pub fn compose(
        &self,
        text: &str,
        level: PaddingLevel,
        domain: Domain,
        top: Option<&Sentence>,
    ) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        match level {
            PaddingLevel::None => trimmed.to_string(),
            PaddingLevel::Light => Self::light(trimmed, top),
            PaddingLevel::Medium => Self::medium(trimmed, domain, top),
            PaddingLevel::Enhanced => Self::enhanced(trimmed, domain),
        }
    }

    fn is_request_like(top: Option<&Sentence>) -> bool {
        matches!(
            top.map(|s| s.kind),
            Some(SentenceKind::Question) | Some(SentenceKind::Directive)
        )
    }

    fn ensure_terminal(text: &str) -> String {
        match text.chars().last() {
            Some('.') | Some('!') | Some('?') => text.to_string(),
            _ => format!("{}.", text),
        }
    }

    /// Terminal punctuation plus a minimal politeness marker for requests.
    fn light(text: &str, top: Option<&Sentence>) -> String {
        let mut out = Self::ensure_terminal(text);
        if Self::is_request_like(top) {
            out.push_str(" Please.");
        }
        out
    }

    /// Question acknowledgment and domain lead-in on top of the Light rules.
    fn medium(text: &str, domain: Domain, top: Option<&Sentence>) -> String {
        let mut prefix = String::new();
        if matches!(top.map(|s| s.kind), Some(SentenceKind::Question)) {
            prefix.push_str("I understand you're asking about this. ");
        }
        if let Some(lead_in) = Self::domain_lead_in(domain) {
            prefix.push_str(lead_in);
        }
        format!("{}{}", prefix, Self::light(text, top))
    }

    fn domain_lead_in(domain: Domain) -> Option<&'static str> {
        match domain {
            Domain::General => None,
            Domain::Academic => Some("On the research side: "),
            Domain::Technical => Some("On the technical side: "),
            Domain::Business => Some("From the business angle: "),
            Domain::Neurodiversity => None,
        }
    }

    /// Empathetic opener and a closing offer of further help, with
    /// domain-specific wording.
    fn enhanced(text: &str, domain: Domain) -> String {
        let body = Self::ensure_terminal(text);
        let (opener, closer) = match domain {
            Domain::Academic => (
                "Thanks for raising this so carefully.",
                "I'm glad to dig into the details further if that would help.",
            ),
            Domain::Technical => (
                "Thanks for flagging this.",
                "Happy to go through the details together if that helps.",
            ),
            Domain::Business => (
                "Thank you for bringing this up.",
                "Do let me know how else I can support this.",
            ),
            Domain::Neurodiversity | Domain::General => (
                "I really appreciate you reaching out.",
                "Please let me know if there's anything else I can help with.",
            ),
        };
        format!("{} {} {}", opener, body, closer)
    }
}
