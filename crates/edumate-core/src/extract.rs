//! Candidate extraction from raw model output.
//!
//! Model replies are supposed to be a JSON array of question objects, but in
//! practice they arrive wrapped in prose or markdown fences, with curly
//! quotes, trailing commas, or a truncated last object. Extraction runs in
//! two phases:
//!
//! 1. A whole-region parse of the text between the first `[` and last `]`.
//! 2. Salvage: every brace span without nested braces is parsed on its own
//!    and kept if it carries all three question fields.
//!
//! If both phases come up empty a single generic placeholder candidate is
//! returned, so callers never see an empty success.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ExtractError;
use crate::filler::PLACEHOLDER_OPTIONS;
use crate::model::Candidate;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```[a-z0-9_+\-]*").expect("valid fence pattern"));

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").expect("valid trailing comma pattern"));

static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("valid object span pattern"));

const PLACEHOLDER_QUESTION: &str =
    "[Fallback] Sample question 1 for a general topic. Choose the most appropriate answer.";

/// Accepted JSON field names for each logical question field.
///
/// Names are checked in order; the first one present with a non-null value
/// wins.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub question: &'static [&'static str],
    pub options: &'static [&'static str],
    pub answer: &'static [&'static str],
}

/// The aliases the generation prompt and known model variants produce.
pub const FIELD_ALIASES: FieldAliases = FieldAliases {
    question: &["q", "question"],
    options: &["options", "choices"],
    answer: &["answer", "correct"],
};

impl FieldAliases {
    fn lookup<'a>(names: &[&str], obj: &'a Map<String, Value>) -> Option<&'a Value> {
        names
            .iter()
            .find_map(|name| obj.get(*name).filter(|value| !value.is_null()))
    }

    pub fn question<'a>(&self, obj: &'a Map<String, Value>) -> Option<&'a Value> {
        Self::lookup(self.question, obj)
    }

    pub fn options<'a>(&self, obj: &'a Map<String, Value>) -> Option<&'a Value> {
        Self::lookup(self.options, obj)
    }

    pub fn answer<'a>(&self, obj: &'a Map<String, Value>) -> Option<&'a Value> {
        Self::lookup(self.answer, obj)
    }

    /// Whether `obj` carries all three logical fields.
    pub fn is_complete(&self, obj: &Map<String, Value>) -> bool {
        self.question(obj).is_some() && self.options(obj).is_some() && self.answer(obj).is_some()
    }

    /// Build a candidate from an object, leaving missing fields empty.
    pub fn candidate(&self, obj: &Map<String, Value>) -> Candidate {
        let options = match self.options(obj) {
            Some(Value::Array(items)) => items.iter().map(value_text).collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        };

        Candidate {
            question_text: self.question(obj).map(value_text).unwrap_or_default(),
            options,
            raw_answer: self.answer(obj).map(value_text).unwrap_or_default(),
        }
    }
}

/// Render a JSON scalar as the text a learner would see.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Locate and clean the `[ ... ]` region of a model reply.
///
/// Strips code fences, replaces smart quotes, flattens newlines, and drops
/// trailing commas before a closing bracket or brace.
pub fn repair_region(raw_text: &str) -> Result<String, ExtractError> {
    if raw_text.trim().is_empty() {
        return Err(ExtractError::EmptyInput);
    }

    let unfenced = CODE_FENCE.replace_all(raw_text, "");
    let text = unfenced.trim();

    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return Err(ExtractError::NoStructureFound);
    };
    if end < start {
        return Err(ExtractError::NoStructureFound);
    }

    let region = text[start..=end]
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\r', '\n'], " ");

    Ok(TRAILING_COMMA.replace_all(&region, "$1").into_owned())
}

/// Extract question candidates from raw model output.
///
/// Fails only when the text is empty or contains no array at all. Once a
/// region is found the result is never empty.
pub fn extract_candidates(raw_text: &str) -> Result<Vec<Candidate>, ExtractError> {
    let region = repair_region(raw_text)?;

    if let Some(candidates) = parse_whole_region(&region) {
        tracing::debug!(count = candidates.len(), "parsed model output as a whole");
        return Ok(candidates);
    }

    let salvaged = salvage_objects(&region);
    if !salvaged.is_empty() {
        tracing::info!("salvaged {} parsable questions from malformed output", salvaged.len());
        return Ok(salvaged);
    }

    tracing::warn!("no valid questions in model output, using placeholder");
    Ok(vec![placeholder_candidate()])
}

/// Fast path: the region is a well-formed array whose elements all carry
/// question text. An empty array parses to no candidates.
fn parse_whole_region(region: &str) -> Option<Vec<Candidate>> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(region) else {
        return None;
    };
    items
        .iter()
        .map(|item| {
            let obj = item.as_object()?;
            FIELD_ALIASES.question(obj)?;
            Some(FIELD_ALIASES.candidate(obj))
        })
        .collect()
}

/// Salvage path: parse each innermost `{ ... }` span on its own.
fn salvage_objects(region: &str) -> Vec<Candidate> {
    OBJECT_SPAN
        .find_iter(region)
        .filter_map(|span| match serde_json::from_str::<Value>(span.as_str()) {
            Ok(Value::Object(obj)) if FIELD_ALIASES.is_complete(&obj) => {
                Some(FIELD_ALIASES.candidate(&obj))
            }
            Ok(_) => {
                tracing::debug!("dropping span without required fields");
                None
            }
            Err(e) => {
                tracing::debug!("dropping unparsable span: {e}");
                None
            }
        })
        .collect()
}

fn placeholder_candidate() -> Candidate {
    Candidate {
        question_text: PLACEHOLDER_QUESTION.to_string(),
        options: PLACEHOLDER_OPTIONS.iter().map(|o| o.to_string()).collect(),
        raw_answer: "A".to_string(),
    }
}
