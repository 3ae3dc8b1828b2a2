//! End-to-end pipeline tests: provider reply -> assembled quiz -> stored record -> grade.

use std::collections::HashMap;
use std::sync::Arc;

use edumate_core::engine::{QuizEngine, QuizEngineConfig};
use edumate_core::model::{ScoreRounding, Submission};
use edumate_core::record::QuizRecord;
use edumate_providers::mock::MockProvider;

fn engine_with(reply: &str) -> (Arc<MockProvider>, QuizEngine) {
    let mut responses = HashMap::new();
    responses.insert("'Oceans'".to_string(), reply.to_string());
    let provider = Arc::new(MockProvider::new(responses));
    let engine = QuizEngine::new(
        provider.clone(),
        QuizEngineConfig {
            seed: Some(11),
            ..Default::default()
        },
    );
    (provider, engine)
}

#[tokio::test]
async fn malformed_reply_is_salvaged_stored_and_graded() {
    // Second item is broken JSON; the other two survive salvage.
    let reply = r#"```json
[
  {"q": "Largest ocean?", "options": ["Atlantic", "Pacific", "Indian", "Arctic"], "answer": "B"},
  {"q": "Saltiest sea?", "options": ["Dead Sea" "Red Sea"], "answer": "A"},
  {"q": "Deepest trench?", "options": ["Mariana", "Tonga"], "answer": "the mariana trench"}
]
```"#;
    let (provider, engine) = engine_with(reply);

    let quiz = engine.generate("Oceans", 4).await.unwrap();
    assert_eq!(provider.call_count(), 1);
    assert_eq!(quiz.questions.len(), 4);
    assert_eq!(quiz.authored, 2);
    assert_eq!(quiz.filler, 2);
    assert_eq!(quiz.questions[0].answer, "Pacific");
    assert_eq!(quiz.questions[1].answer, "Mariana");
    for (i, q) in quiz.questions.iter().enumerate() {
        assert_eq!(q.index, i);
        assert!(q.options.contains(&q.answer));
    }

    let dir = tempfile::tempdir().unwrap();
    let record = QuizRecord::new(&quiz.topic, quiz.questions, quiz.model);
    let path = dir.path().join(record.file_name());
    record.save_json(&path).unwrap();
    let loaded = QuizRecord::load_json(&path).unwrap();
    assert_eq!(loaded.id, record.id);
    assert_eq!(loaded.questions, record.questions);

    let submission: Submission = [(0, "pacific".to_string()), (1, "Tonga".to_string())]
        .into_iter()
        .collect();
    let report = loaded.grade(&submission, ScoreRounding::Truncate);
    assert_eq!(report.summary.correct, 1);
    assert_eq!(report.summary.wrong, 3);
    assert_eq!(report.summary.score_percent, 25);
    assert!(report.details[0].is_correct);
    assert!(!report.details[1].is_correct);
}

#[tokio::test]
async fn unparsable_reply_degrades_to_placeholder_and_filler() {
    let (_, engine) = engine_with("Sorry, [no questions] about 'Oceans' today.");

    let quiz = engine.generate("Oceans", 3).await.unwrap();
    assert_eq!(quiz.questions.len(), 3);
    assert!(quiz.questions.iter().all(|q| q.is_filler()));
    assert!(quiz.questions[0].question_text.contains("general topic"));
    assert!(quiz.questions[1].question_text.contains("topic 'Oceans'"));
}

#[tokio::test]
async fn surplus_questions_are_cut_to_the_requested_count() {
    let items: Vec<String> = (0..6)
        .map(|i| format!(r#"{{"q": "Q{i}", "options": ["x{i}", "y{i}"], "answer": "y{i}"}}"#))
        .collect();
    let (_, engine) = engine_with(&format!("[{}]", items.join(",")));

    let quiz = engine.generate("Oceans", 2).await.unwrap();
    assert_eq!(quiz.questions.len(), 2);
    assert_eq!(quiz.filler, 0);
    assert_eq!(quiz.questions[1].question_text, "Q1");
    assert_eq!(quiz.questions[1].answer, "y1");
}
