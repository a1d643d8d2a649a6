//! Domain classification.
//!
//! Scores normalized text against weighted keyword tables per domain and
//! derives a formality register. Results are cached by exact normalized-text
//! key in a bounded cache that drops the oldest ~20% of entries when full.
//! Classification never fails; unknown or empty input falls back to the
//! general domain at neutral confidence.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Coarse subject-matter domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Everyday / personal conversation. The non-specialized baseline.
    General,
    /// Academic and research writing.
    Academic,
    /// Software and infrastructure.
    Technical,
    /// Commercial and organizational.
    Business,
    /// Neurodiversity-related conversation. Sensitive: padding is capped
    /// at Light regardless of other signals.
    Neurodiversity,
}

impl Domain {
    pub fn label(&self) -> &'static str {
        match self {
            Domain::General => "general",
            Domain::Academic => "academic",
            Domain::Technical => "technical",
            Domain::Business => "business",
            Domain::Neurodiversity => "neurodiversity",
        }
    }

    /// Sensitive domains cap padding at Light.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Domain::Neurodiversity)
    }
}

/// Formality register inferred alongside the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formality {
    Casual,
    Standard,
    Formal,
    /// Academic peer register.
    Peer,
}

/// Weighted keyword table for one specialized domain.
struct KeywordTable {
    domain: Domain,
    keywords: &'static [(&'static str, f32)],
}

const ACADEMIC_KEYWORDS: &[(&str, f32)] = &[
    ("peer-review", 2.5),
    ("peer review", 2.5),
    ("methodology", 2.0),
    ("hypothesis", 2.0),
    ("citation", 1.8),
    ("thesis", 1.8),
    ("research", 1.5),
    ("literature review", 1.5),
    ("journal", 1.2),
    ("experiment", 1.2),
    ("dataset", 1.2),
    ("abstract", 1.0),
];

const TECHNICAL_KEYWORDS: &[(&str, f32)] = &[
    ("stack trace", 2.0),
    ("merge request", 1.8),
    ("refactor", 1.8),
    ("kernel", 1.8),
    ("deploy", 1.5),
    ("compile", 1.5),
    ("database", 1.5),
    ("api", 1.5),
    ("server", 1.2),
    ("repository", 1.2),
    ("bug", 1.2),
    ("latency", 1.2),
];

const BUSINESS_KEYWORDS: &[(&str, f32)] = &[
    ("stakeholder", 1.8),
    ("invoice", 1.8),
    ("quarterly", 1.5),
    ("revenue", 1.5),
    ("contract", 1.5),
    ("budget", 1.5),
    ("proposal", 1.2),
    ("client", 1.2),
    ("deadline", 1.0),
    ("meeting", 1.0),
];

const NEURODIVERSITY_KEYWORDS: &[(&str, f32)] = &[
    ("neurodiversity", 2.5),
    ("neurodivergent", 2.5),
    ("sensory overload", 2.2),
    ("autism", 2.0),
    ("autistic", 2.0),
    ("adhd", 2.0),
    ("stimming", 2.0),
    ("executive function", 1.8),
    ("meltdown", 1.8),
    ("masking", 1.5),
];

/// Baseline set for everyday conversation; competes against the specialized
/// tables to decide `is_specialized`.
const PERSONAL_KEYWORDS: &[(&str, f32)] = &[
    ("weekend", 1.0),
    ("family", 1.0),
    ("dinner", 1.0),
    ("holiday", 1.0),
    ("birthday", 1.0),
    ("movie", 0.8),
    ("weather", 0.8),
    ("lunch", 0.8),
    ("friend", 0.8),
    ("game", 0.6),
    ("hello", 0.5),
    ("thanks", 0.5),
    ("help", 0.4),
];

const FORMAL_MARKERS: &[&str] = &["dear", "regards", "sincerely", "pursuant", "kindly"];
const CASUAL_MARKERS: &[&str] = &["hey", "lol", "gonna", "wanna", "btw", "haha"];

/// Secondary domains must score above this fraction of the primary's score.
const SECONDARY_FRACTION: f32 = 0.6;
/// Absolute weight floor below which nothing counts as specialized.
const SPECIALIZED_FLOOR: f32 = 1.0;

fn tables() -> [KeywordTable; 4] {
    [
        KeywordTable {
            domain: Domain::Academic,
            keywords: ACADEMIC_KEYWORDS,
        },
        KeywordTable {
            domain: Domain::Technical,
            keywords: TECHNICAL_KEYWORDS,
        },
        KeywordTable {
            domain: Domain::Business,
            keywords: BUSINESS_KEYWORDS,
        },
        KeywordTable {
            domain: Domain::Neurodiversity,
            keywords: NEURODIVERSITY_KEYWORDS,
        },
    ]
}

/// Result of domain classification. Cached by normalized-text key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainClassification {
    pub is_specialized: bool,
    pub primary_domain: Domain,
    pub secondary_domains: Vec<Domain>,
    /// [0, 1]; 0.5 means no signal either way.
    pub confidence: f32,
    /// Summed keyword weight of the primary domain.
    pub weighted_score: f32,
    pub matched_keywords: Vec<String>,
    /// True when any sensitive-domain keyword matched, even if another
    /// domain won the primary slot.
    pub sensitive_markers: bool,
    pub formality: Formality,
}

impl DomainClassification {
    /// Neutral fallback for unknown or empty input.
    pub fn general() -> Self {
        Self {
            is_specialized: false,
            primary_domain: Domain::General,
            secondary_domains: vec![],
            confidence: 0.5,
            weighted_score: 0.0,
            matched_keywords: vec![],
            sensitive_markers: false,
            formality: Formality::Standard,
        }
    }

    /// True when the sensitive domain appears as primary or secondary, or
    /// any of its markers matched the text at all.
    pub fn touches_sensitive(&self) -> bool {
        self.primary_domain.is_sensitive()
            || self.secondary_domains.iter().any(|d| d.is_sensitive())
            || self.sensitive_markers
    }
}

/// Insertion-ordered bounded cache. When full, the oldest ~20% of entries
/// are evicted in one batch before the new entry is inserted.
struct ClassificationCache {
    map: HashMap<String, DomainClassification>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ClassificationCache {
    fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&self, key: &str) -> Option<DomainClassification> {
        self.map.get(key).cloned()
    }

    fn insert(&mut self, key: String, value: DomainClassification) {
        if self.map.contains_key(&key) {
            self.map.insert(key, value);
            return;
        }

        if self.map.len() >= self.capacity {
            let evict = (self.capacity / 5).max(1);
            for _ in 0..evict {
                if let Some(oldest) = self.order.pop_front() {
                    self.map.remove(&oldest);
                }
            }
            debug!(evicted = evict, "domain cache evicted oldest entries");
        }

        self.order.push_back(key.clone());
        self.map.insert(key, value);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Weighted-keyword domain classifier with a bounded classification cache.
pub struct DomainClassifier {
    cache: Mutex<ClassificationCache>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DomainClassifier {
    /// Create a classifier with the given cache capacity. Keyword tables are
    /// checked once here; a non-positive weight is a build-time defect.
    pub fn new(cache_capacity: usize) -> Self {
        for table in tables() {
            for (keyword, weight) in table.keywords {
                assert!(
                    *weight > 0.0,
                    "keyword table for {:?} has non-positive weight for {:?}",
                    table.domain,
                    keyword
                );
            }
        }

        Self {
            cache: Mutex::new(ClassificationCache::new(cache_capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Classify normalized text, consulting the cache first.
    ///
    /// Fail-open: if the cache lock is poisoned the classification is simply
    /// recomputed without caching.
    pub fn classify(&self, normalized: &str) -> DomainClassification {
        let Ok(mut cache) = self.cache.lock() else {
            return Self::score(normalized);
        };

        if let Some(cached) = cache.get(normalized) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = Self::score(normalized);
        cache.insert(normalized.to_string(), result.clone());
        result
    }

    fn score(normalized: &str) -> DomainClassification {
        let text = normalized.trim();
        if text.is_empty() {
            return DomainClassification::general();
        }

        let mut domain_scores: Vec<(Domain, f32, Vec<String>)> = Vec::new();
        for table in tables() {
            let mut sum = 0.0;
            let mut matched = Vec::new();
            for (keyword, weight) in table.keywords {
                if text.contains(keyword) {
                    sum += weight;
                    matched.push((*keyword).to_string());
                }
            }
            domain_scores.push((table.domain, sum, matched));
        }

        let sensitive_markers = domain_scores
            .iter()
            .any(|(domain, score, _)| domain.is_sensitive() && *score > 0.0);

        let personal_weight: f32 = PERSONAL_KEYWORDS
            .iter()
            .filter(|(keyword, _)| text.contains(keyword))
            .map(|(_, weight)| weight)
            .sum();

        let (primary_domain, primary_score, matched_keywords) = domain_scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(d, s, m)| (*d, *s, m.clone()))
            .unwrap_or((Domain::General, 0.0, vec![]));

        if primary_score <= 0.0 {
            let mut result = DomainClassification::general();
            // Same ratio as below: zero domain weight against a personal
            // baseline is zero confidence, against nothing stays neutral.
            if personal_weight > 0.0 {
                result.confidence = 0.0;
            }
            result.formality = Self::detect_formality(text, Domain::General);
            return result;
        }

        let secondary_domains: Vec<Domain> = domain_scores
            .iter()
            .filter(|(d, s, _)| *d != primary_domain && *s > primary_score * SECONDARY_FRACTION)
            .map(|(d, _, _)| *d)
            .collect();

        let is_specialized = primary_score > personal_weight && primary_score > SPECIALIZED_FLOOR;
        let confidence = if primary_score + personal_weight > 0.0 {
            primary_score / (primary_score + personal_weight)
        } else {
            0.5
        };

        let primary = if is_specialized {
            primary_domain
        } else {
            Domain::General
        };

        DomainClassification {
            is_specialized,
            primary_domain: primary,
            secondary_domains,
            confidence,
            weighted_score: primary_score,
            matched_keywords,
            sensitive_markers,
            formality: Self::detect_formality(text, primary),
        }
    }

    fn detect_formality(text: &str, domain: Domain) -> Formality {
        let has_marker = |markers: &[&str]| {
            markers
                .iter()
                .any(|m| text.split_whitespace().any(|w| w.trim_matches(|c: char| !c.is_alphanumeric()) == *m))
        };

        if has_marker(FORMAL_MARKERS) {
            return Formality::Formal;
        }
        if has_marker(CASUAL_MARKERS) {
            return Formality::Casual;
        }

        // Domain default when no marker phrase is present.
        match domain {
            Domain::Academic => Formality::Peer,
            Domain::Business => Formality::Formal,
            _ => Formality::Standard,
        }
    }

    pub fn cache_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}
