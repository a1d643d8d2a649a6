//! Lexical filtering ("heat shield").
//!
//! Strips three fixed phrase families from incoming text before any
//! classification runs: filler words, hedging phrases, and meta-commentary.
//! Matching is case-insensitive and whole-phrase; surviving text keeps its
//! original case. The filter never fails: on any internal problem it returns
//! the input unchanged.

use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

/// Filler words that add no content.
const FILLER_WORDS: &[&str] = &[
    "um",
    "uh",
    "erm",
    "hmm",
    "you know",
    "basically",
    "literally",
];

/// Hedging phrases that soften the actual request.
const HEDGING_PHRASES: &[&str] = &[
    "i think",
    "i guess",
    "i suppose",
    "sort of",
    "kind of",
    "if that makes sense",
    "or something",
];

/// Meta-commentary about the message itself.
const META_PHRASES: &[&str] = &[
    "to be honest",
    "just saying",
    "no offense but",
    "as i said",
    "for what it's worth",
    "not gonna lie",
];

fn family_pattern(phrases: &[&str]) -> String {
    let escaped: Vec<String> = phrases.iter().map(|p| regex::escape(p)).collect();
    format!(r"(?i)\b(?:{})\b", escaped.join("|"))
}

// Compile patterns once at startup; a bad pattern is a programming error.
static FILLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&family_pattern(FILLER_WORDS)).expect("Invalid regex: filler words")
});
static HEDGING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&family_pattern(HEDGING_PHRASES)).expect("Invalid regex: hedging phrases")
});
static META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&family_pattern(META_PHRASES)).expect("Invalid regex: meta phrases")
});

/// Phrase-stripping filter with a diagnostic activation counter.
#[derive(Debug, Default)]
pub struct LexicalFilter {
    /// Number of messages the filter has modified. Diagnostics only.
    activations: AtomicU64,
}

impl LexicalFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all phrase-family occurrences, collapse whitespace and trim.
    ///
    /// Returns the filtered text and whether any phrase was removed.
    /// Removal reruns until a fixed point: deleting one phrase can splice
    /// its neighbors into a new removable phrase ("i sort of think" leaves
    /// "i think"), and a single call must already yield the stable output.
    pub fn filter(&self, text: &str) -> (String, bool) {
        let mut current = Self::tidy(text);
        let mut removed = false;

        loop {
            let mut pass = current.clone();
            for re in [&*FILLER_RE, &*HEDGING_RE, &*META_RE] {
                pass = re.replace_all(&pass, "").into_owned();
            }
            let cleaned = Self::tidy(&pass);
            if cleaned == current {
                break;
            }
            removed = true;
            current = cleaned;
        }

        if removed {
            self.activations.fetch_add(1, Ordering::Relaxed);
        }
        (current, removed)
    }

    /// Collapse whitespace runs and strip separators stranded at the front
    /// by a removal ("I think, we should ..."). Whitespace tidying alone is
    /// not a removal and does not count as an activation.
    fn tidy(text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed
            .trim_start_matches(|c: char| c == ',' || c == ';' || c == ':' || c.is_whitespace())
            .trim()
            .to_string()
    }

    /// Number of messages modified so far.
    pub fn activation_count(&self) -> u64 {
        self.activations.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_filler_words() {
        let filter = LexicalFilter::new();
        let (out, modified) = filter.filter("um can you basically check this");
        assert_eq!(out, "can you check this");
        assert!(modified);
    }

    #[test]
    fn test_removes_hedging_case_insensitive() {
        let filter = LexicalFilter::new();
        let (out, modified) = filter.filter("I think we should ship it");
        assert_eq!(out, "we should ship it");
        assert!(modified);
    }

    #[test]
    fn test_removes_meta_commentary() {
        let filter = LexicalFilter::new();
        let (out, _) = filter.filter("To be honest the report is late");
        assert_eq!(out, "the report is late");
    }

    #[test]
    fn test_clean_text_untouched() {
        let filter = LexicalFilter::new();
        let (out, modified) = filter.filter("Please review the document");
        assert_eq!(out, "Please review the document");
        assert!(!modified);
        assert_eq!(filter.activation_count(), 0);
    }

    #[test]
    fn test_whole_phrase_matching_only() {
        let filter = LexicalFilter::new();
        // "um" inside "album" and "summary" must survive
        let (out, modified) = filter.filter("the album summary is ready");
        assert_eq!(out, "the album summary is ready");
        assert!(!modified);
    }

    #[test]
    fn test_idempotent() {
        let filter = LexicalFilter::new();
        let inputs = [
            "um I think you know we should sort of try",
            "To be honest, uh, the build is broken",
            "Plain message with nothing to strip.",
            "",
        ];
        for input in inputs {
            let (once, _) = filter.filter(input);
            let (twice, modified_again) = filter.filter(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
            assert!(!modified_again);
        }
    }

    #[test]
    fn test_spliced_phrase_removed_in_one_call() {
        let filter = LexicalFilter::new();
        // Removing "sort of" splices "i" and "think" into a removable phrase;
        // one call must already strip it.
        let (once, modified) = filter.filter("i sort of think we should ship");
        assert_eq!(once, "we should ship");
        assert!(modified);

        let (twice, modified_again) = filter.filter(&once);
        assert_eq!(twice, once);
        assert!(!modified_again);
    }

    #[test]
    fn test_whitespace_collapse_alone_is_not_an_activation() {
        let filter = LexicalFilter::new();
        let (out, modified) = filter.filter("a  b");
        assert_eq!(out, "a b");
        assert!(!modified);
        assert_eq!(filter.activation_count(), 0);
    }

    #[test]
    fn test_counts_activations() {
        let filter = LexicalFilter::new();
        filter.filter("um hello");
        filter.filter("clean text");
        filter.filter("i guess fine");
        assert_eq!(filter.activation_count(), 2);
    }
}
