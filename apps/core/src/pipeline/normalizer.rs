//! Text normalization.
//!
//! First stage of the pipeline: lowercases and trims raw input so every
//! downstream matcher works on a canonical form. Pure, infallible.

/// Normalize raw message text for matching: lowercase and trim whitespace.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
