//! edumate-core: Quiz extraction, answer normalization, and grading.
//!
//! This crate turns noisy model output into a fixed-size list of
//! multiple-choice questions and grades learner submissions against them.
//! Everything except [`engine`] is synchronous and free of shared state.

pub mod answer;
pub mod assemble;
pub mod engine;
pub mod error;
pub mod extract;
pub mod filler;
pub mod grading;
pub mod model;
pub mod record;
pub mod traits;

pub use assemble::{assemble, QuizAssembler};
pub use error::{ExtractError, ProviderError, QuizError};
pub use grading::{grade, grade_with};
pub use model::{
    Candidate, GradeReport, GradingDetail, GradingSummary, NormalizedQuestion, ScoreRounding,
    Submission, DEFAULT_TOTAL,
};
