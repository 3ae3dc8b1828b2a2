//! Quiz assembly: raw model output in, exactly `total` questions out.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::answer::normalize_answer;
use crate::error::QuizError;
use crate::extract::extract_candidates;
use crate::filler::fill_with_rng;
use crate::model::{Candidate, NormalizedQuestion};

/// Options substituted when a candidate arrives with none usable.
pub const GENERIC_OPTIONS: [&str; 4] = ["True", "False", "Not sure", "Maybe"];

/// Turns raw model output into a fixed-size list of normalized questions.
///
/// Holds no state besides an optional seed for the filler answers, so one
/// assembler can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizAssembler {
    seed: Option<u64>,
}

impl QuizAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make filler answers reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Assemble `total` questions, rejecting a negative count.
    pub fn assemble(
        &self,
        raw_text: &str,
        topic: &str,
        total: i64,
    ) -> Result<Vec<NormalizedQuestion>, QuizError> {
        let total = usize::try_from(total).map_err(|_| {
            QuizError::InvalidRequest(format!("total must not be negative, got {total}"))
        })?;
        Ok(self.assemble_count(raw_text, topic, total))
    }

    /// Assemble exactly `total` questions.
    ///
    /// Extraction failures are absorbed; whatever the model did not supply
    /// is padded with filler questions.
    pub fn assemble_count(
        &self,
        raw_text: &str,
        topic: &str,
        total: usize,
    ) -> Vec<NormalizedQuestion> {
        if total == 0 {
            return Vec::new();
        }

        let candidates = extract_candidates(raw_text).unwrap_or_else(|e| {
            tracing::warn!("could not extract questions: {e}");
            Vec::new()
        });

        let mut questions: Vec<NormalizedQuestion> = Vec::with_capacity(total);
        for candidate in candidates {
            if questions.len() == total {
                break;
            }
            if let Some(question) = normalize_candidate(candidate, questions.len()) {
                questions.push(question);
            }
        }

        let extracted = questions.len();
        if extracted < total {
            let mut rng: Box<dyn RngCore> = match self.seed {
                Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
                None => Box::new(rand::thread_rng()),
            };
            questions.extend(fill_with_rng(topic, total - extracted, extracted, &mut *rng));
        }

        tracing::debug!(
            extracted,
            filler = total - extracted,
            "assembled quiz for topic '{topic}'"
        );
        debug_assert_eq!(questions.len(), total);
        questions
    }
}

/// Assemble with a default assembler.
pub fn assemble(
    raw_text: &str,
    topic: &str,
    total: i64,
) -> Result<Vec<NormalizedQuestion>, QuizError> {
    QuizAssembler::new().assemble(raw_text, topic, total)
}

/// Repair one candidate. Returns `None` when it has no question text.
fn normalize_candidate(candidate: Candidate, index: usize) -> Option<NormalizedQuestion> {
    let question_text = candidate.question_text.trim();
    if question_text.is_empty() {
        return None;
    }

    let mut options: Vec<String> = candidate
        .options
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();
    if options.is_empty() {
        options = GENERIC_OPTIONS.iter().map(|o| o.to_string()).collect();
    }

    let answer = normalize_answer(&candidate.raw_answer, &options);

    Some(NormalizedQuestion {
        index,
        question_text: question_text.to_string(),
        options,
        answer,
    })
}
