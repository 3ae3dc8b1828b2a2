//! Topic screening applied before any quiz is generated.

use anyhow::Result;

/// Terms that may not appear anywhere in a topic (matched case-insensitively).
const DISALLOWED_TERMS: [&str; 8] = [
    "teror",
    "terror",
    "rasis",
    "racis",
    "rape",
    "seks",
    "porn",
    "sex abuse",
];

/// Validate a requested topic, returning it trimmed.
pub fn check_topic(topic: &str) -> Result<&str> {
    let topic = topic.trim();
    anyhow::ensure!(!topic.is_empty(), "topic is required");

    let lowered = topic.to_lowercase();
    if let Some(term) = DISALLOWED_TERMS.iter().find(|t| lowered.contains(*t)) {
        tracing::warn!(term, "rejected topic");
        anyhow::bail!("topic '{topic}' is not allowed");
    }
    Ok(topic)
}
