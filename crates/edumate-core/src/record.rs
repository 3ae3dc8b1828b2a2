//! Persisted quiz records with JSON persistence.
//!
//! A record is what the storage side keeps between generation and grading:
//! the questions exactly as assembled, under a unique quiz id.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grading::grade_with;
use crate::model::{GradeReport, NormalizedQuestion, ScoreRounding, Submission};

/// A stored quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRecord {
    /// Unique quiz identifier.
    pub id: Uuid,
    /// Topic the quiz was generated for.
    pub topic: String,
    /// When the quiz was created.
    pub created_at: DateTime<Utc>,
    /// Requested question count.
    pub total: usize,
    /// Model that authored the questions, if any.
    #[serde(default)]
    pub model: Option<String>,
    /// Questions in index order.
    pub questions: Vec<NormalizedQuestion>,
}

impl QuizRecord {
    /// Create a record with a fresh id.
    pub fn new(topic: &str, questions: Vec<NormalizedQuestion>, model: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            created_at: Utc::now(),
            total: questions.len(),
            model,
            questions,
        }
    }

    /// Default file name for this record inside an output directory.
    pub fn file_name(&self) -> String {
        format!("quiz-{}.json", self.id)
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize quiz")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write quiz to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read quiz from {}", path.display()))?;
        let mut record: QuizRecord =
            serde_json::from_str(&content).context("failed to parse quiz JSON")?;
        record.questions.sort_by_key(|q| q.index);
        Ok(record)
    }

    /// Grade a submission against this quiz.
    pub fn grade(&self, submission: &Submission, rounding: ScoreRounding) -> GradeReport {
        grade_with(&self.questions, submission, rounding)
    }
}
