//! Placeholder questions used to pad a quiz up to the requested count.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::NormalizedQuestion;

/// Prefix carried by every generated placeholder question.
pub const FILLER_PREFIX: &str = "[Fallback]";

/// Options offered by placeholder questions.
pub const PLACEHOLDER_OPTIONS: [&str; 4] = ["Option A", "Option B", "Option C", "Option D"];

/// Generate `count` placeholder questions numbered from `start_index`.
pub fn fill(topic: &str, count: usize, start_index: usize) -> Vec<NormalizedQuestion> {
    fill_with_rng(topic, count, start_index, &mut rand::thread_rng())
}

/// Like [`fill`], drawing the designated answers from `rng`.
pub fn fill_with_rng<R: Rng + ?Sized>(
    topic: &str,
    count: usize,
    start_index: usize,
    rng: &mut R,
) -> Vec<NormalizedQuestion> {
    (start_index..start_index + count)
        .map(|index| {
            let options: Vec<String> = PLACEHOLDER_OPTIONS.iter().map(|o| o.to_string()).collect();
            let answer = options
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| options[0].clone());
            NormalizedQuestion {
                index,
                question_text: format!(
                    "{FILLER_PREFIX} Sample question {} for topic '{topic}'. Choose the most appropriate answer.",
                    index + 1
                ),
                options,
                answer,
            }
        })
        .collect()
}
