//! Grading of submitted answers against stored questions.

use crate::answer::{answers_match, resolve_letter};
use crate::model::{
    GradeReport, GradingDetail, GradingSummary, NormalizedQuestion, ScoreRounding, Submission,
};

/// Grade a submission with the default (truncating) score policy.
pub fn grade(questions: &[NormalizedQuestion], submission: &Submission) -> GradeReport {
    grade_with(questions, submission, ScoreRounding::default())
}

/// Grade a submission, converting the percentage with `rounding`.
pub fn grade_with(
    questions: &[NormalizedQuestion],
    submission: &Submission,
    rounding: ScoreRounding,
) -> GradeReport {
    let details: Vec<GradingDetail> = questions
        .iter()
        .map(|question| {
            let user_answer = submission.answer_for(question.index).trim();
            GradingDetail {
                index: question.index,
                question_text: question.question_text.clone(),
                options: question.options.clone(),
                user_answer: user_answer.to_string(),
                correct_answer: question.answer.trim().to_string(),
                is_correct: is_correct(question, user_answer),
            }
        })
        .collect();

    let total = details.len();
    let correct = details.iter().filter(|d| d.is_correct).count();

    GradeReport {
        summary: GradingSummary {
            correct,
            wrong: total - correct,
            total,
            score_percent: rounding.percent(correct, total),
        },
        details,
    }
}

/// Decide whether `submitted` answers `question`.
///
/// A record whose answer is still a bare letter (written by an older
/// generator) also accepts the text of the option that letter names.
pub fn is_correct(question: &NormalizedQuestion, submitted: &str) -> bool {
    if submitted.trim().is_empty() {
        return false;
    }
    if answers_match(submitted, &question.answer) {
        return true;
    }
    resolve_letter(&question.answer, &question.options)
        .is_some_and(|option| answers_match(submitted, option))
}
