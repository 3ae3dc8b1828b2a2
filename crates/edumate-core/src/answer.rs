//! Answer normalization shared by extraction and grading.
//!
//! [`norm`] is the single equality basis for answers anywhere in edumate.
//! Extraction resolves a model's raw answer into one of the question's own
//! options with [`normalize_answer`]; grading compares a learner's text with
//! [`answers_match`] and falls back to [`resolve_letter`] for records whose
//! answer was stored as a bare letter.

/// Letter labels a model may use instead of the option text, in option order.
const ANSWER_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Trim and case-fold a piece of answer text.
pub fn norm(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether two answers are equal after normalization.
pub fn answers_match(a: &str, b: &str) -> bool {
    norm(a) == norm(b)
}

/// Map a single-letter label (`"a"`, `" C "`) to a 0-based option index.
///
/// Returns `None` for anything that is not exactly one letter in `A..=D`.
pub fn letter_index(raw: &str) -> Option<usize> {
    let mut chars = raw.trim().chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let upper = c.to_ascii_uppercase();
    ANSWER_LETTERS.iter().position(|&letter| letter == upper)
}

/// Resolve a letter label against `options`, if it names an existing option.
pub fn resolve_letter<'a>(raw: &str, options: &'a [String]) -> Option<&'a str> {
    letter_index(raw)
        .and_then(|idx| options.get(idx))
        .map(String::as_str)
}

/// Resolve a raw answer into the canonical option text.
///
/// Priority: a letter label that names an option, then the first option
/// whose normalized text contains (or is contained in) the normalized
/// answer, then `options[0]`. Returns an empty string only when `options`
/// is empty.
pub fn normalize_answer(raw_answer: &str, options: &[String]) -> String {
    if let Some(option) = resolve_letter(raw_answer, options) {
        return option.to_string();
    }

    let wanted = norm(raw_answer);
    options
        .iter()
        .find(|option| {
            let candidate = norm(option);
            wanted.contains(&candidate) || candidate.contains(&wanted)
        })
        .or_else(|| options.first())
        .cloned()
        .unwrap_or_default()
}
