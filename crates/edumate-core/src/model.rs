//! Core data model types for edumate.
//!
//! These are the types that flow between extraction, assembly, and grading.
//! Questions are persisted through [`crate::record`]; submissions are read
//! from JSON files here.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filler::FILLER_PREFIX;

/// Question count used when the caller does not ask for a specific number.
pub const DEFAULT_TOTAL: usize = 15;

/// A loosely validated question recovered from raw model output.
///
/// Options may contain blanks and duplicates, and `raw_answer` may be a
/// letter label, free text, or empty. The assembler repairs all of that.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Candidate {
    pub question_text: String,
    pub options: Vec<String>,
    pub raw_answer: String,
}

/// A canonical, user-facing multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedQuestion {
    /// 0-based position, dense within a quiz.
    pub index: usize,
    /// The question prompt shown to the learner.
    #[serde(rename = "question", alias = "q")]
    pub question_text: String,
    /// Trimmed, non-blank options in display order.
    pub options: Vec<String>,
    /// The canonical answer, one of `options`.
    pub answer: String,
}

impl NormalizedQuestion {
    /// Whether this question was produced by the filler generator rather
    /// than authored by the model.
    pub fn is_filler(&self) -> bool {
        self.question_text.starts_with(FILLER_PREFIX)
    }
}

/// A learner's answers keyed by question index (as a string).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

impl Submission {
    pub fn new(answers: HashMap<String, String>) -> Self {
        Self { answers }
    }

    /// The submitted text for a question index, or `""` if none was given.
    pub fn answer_for(&self, index: usize) -> &str {
        self.answers
            .get(&index.to_string())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Parse a submission from JSON.
    ///
    /// Accepts `{"answers": {"0": "Paris"}}` or the bare map. Numeric and
    /// boolean answers are taken as their JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).context("failed to parse answers JSON")?;
        let map = match value {
            Value::Object(mut obj) => match obj.remove("answers") {
                Some(Value::Object(answers)) => answers,
                Some(other) => anyhow::bail!("\"answers\" must be an object, got {other}"),
                None => obj,
            },
            other => anyhow::bail!("answers must be a JSON object, got {other}"),
        };

        let answers: HashMap<String, String> = map
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect();

        Ok(Submission { answers })
    }

    /// Load a submission from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answers from {}", path.display()))?;
        Self::from_json_str(&content)
    }
}

impl FromIterator<(usize, String)> for Submission {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        Self {
            answers: iter
                .into_iter()
                .map(|(index, answer)| (index.to_string(), answer))
                .collect(),
        }
    }
}

/// Per-question grading outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingDetail {
    pub index: usize,
    #[serde(rename = "question")]
    pub question_text: String,
    pub options: Vec<String>,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Aggregate score for a graded quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingSummary {
    pub correct: usize,
    pub wrong: usize,
    pub total: usize,
    /// Percentage in `0..=100`; `0` for an empty quiz.
    pub score_percent: u32,
}

/// Full result of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeReport {
    pub summary: GradingSummary,
    pub details: Vec<GradingDetail>,
}

/// How a fractional score percentage is turned into an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreRounding {
    /// Drop the fractional part (1/3 scores 33, 2/3 scores 66).
    #[default]
    Truncate,
    /// Round half up (2/3 scores 67, 1/8 scores 13).
    Round,
}

impl ScoreRounding {
    /// Percentage of `correct` out of `total`.
    pub fn percent(self, correct: usize, total: usize) -> u32 {
        if total == 0 {
            return 0;
        }
        let correct = correct.min(total);
        // Integer arithmetic keeps exact percentages exact (29/50 is 58, not 57).
        let percent = match self {
            ScoreRounding::Truncate => correct * 100 / total,
            ScoreRounding::Round => (correct * 200 + total) / (2 * total),
        };
        percent as u32
    }
}

impl fmt::Display for ScoreRounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreRounding::Truncate => write!(f, "truncate"),
            ScoreRounding::Round => write!(f, "round"),
        }
    }
}

impl FromStr for ScoreRounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "truncate" | "floor" => Ok(ScoreRounding::Truncate),
            "round" | "nearest" => Ok(ScoreRounding::Round),
            other => Err(format!("unknown score rounding: {other}")),
        }
    }
}
