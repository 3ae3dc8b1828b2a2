//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RAW_REPLY: &str = r#"Here you go:
```json
[
  {"q": "Capital of France?", "options": ["Paris", "Rome", "Berlin", "Madrid"], "answer": "A"},
  {"question": "2 + 2 = ?", "choices": ["3", "4", "5", "22"], "correct": "4"},
]
```"#;

/// A command isolated from the user's config and API keys.
fn edumate(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("edumate").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("EDUMATE_GEMINI_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn only_quiz_file(dir: &Path) -> PathBuf {
    let entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1, "expected one quiz in {}", dir.display());
    entries.into_iter().next().unwrap()
}

fn generate_offline(dir: &TempDir, total: &str) -> PathBuf {
    let raw = dir.path().join("reply.txt");
    std::fs::write(&raw, RAW_REPLY).unwrap();
    let out = dir.path().join("quizzes");

    edumate(dir.path())
        .args(["generate", "--topic", "Mixed trivia", "--total", total, "--seed", "7"])
        .arg("--raw")
        .arg(&raw)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Quiz saved to:"));

    only_quiz_file(&out)
}

#[test]
fn generate_from_raw_reply_pads_with_filler() {
    let dir = TempDir::new().unwrap();
    let quiz_path = generate_offline(&dir, "3");

    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&quiz_path).unwrap()).unwrap();
    let questions = record["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0]["question"], "Capital of France?");
    assert_eq!(questions[0]["answer"], "Paris");
    assert_eq!(questions[1]["answer"], "4");
    assert!(questions[2]["question"]
        .as_str()
        .unwrap()
        .starts_with("[Fallback] Sample question 3 for topic 'Mixed trivia'"));
    assert_eq!(record["topic"], "Mixed trivia");
}

#[test]
fn generate_zero_questions() {
    let dir = TempDir::new().unwrap();
    let quiz_path = generate_offline(&dir, "0");

    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&quiz_path).unwrap()).unwrap();
    assert_eq!(record["questions"].as_array().unwrap().len(), 0);
}

#[test]
fn generate_rejects_negative_total() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("reply.txt");
    std::fs::write(&raw, RAW_REPLY).unwrap();

    edumate(dir.path())
        .args(["generate", "--topic", "Biology", "--total", "-2"])
        .arg("--raw")
        .arg(&raw)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));
}

#[test]
fn generate_rejects_disallowed_topic() {
    let dir = TempDir::new().unwrap();

    edumate(dir.path())
        .args(["generate", "--topic", "Terrorism tactics", "--raw", "unused.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed"));
}

#[test]
fn generate_without_provider_config_fails() {
    let dir = TempDir::new().unwrap();

    edumate(dir.path())
        .args(["generate", "--topic", "Biology"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in config"));
}

#[test]
fn generate_with_mock_provider_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("edumate.toml"),
        r#"default_provider = "offline"
output_dir = "out"

[providers.offline]
type = "mock"
response = '[{"q": "Largest planet?", "options": ["Mars", "Jupiter"], "answer": "b"}]'
"#,
    )
    .unwrap();

    edumate(dir.path())
        .args(["generate", "--topic", "Astronomy", "--total", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("mock-model"));

    let quiz_path = only_quiz_file(&dir.path().join("out"));
    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(quiz_path).unwrap()).unwrap();
    assert_eq!(record["model"], "mock-model");
    assert_eq!(record["questions"][0]["answer"], "Jupiter");
    assert_eq!(record["questions"].as_array().unwrap().len(), 2);
}

#[test]
fn grade_text_report() {
    let dir = TempDir::new().unwrap();
    let quiz_path = generate_offline(&dir, "3");
    let answers = dir.path().join("answers.json");
    std::fs::write(&answers, r#"{"answers": {"0": "  paris ", "1": "5"}}"#).unwrap();

    edumate(dir.path())
        .arg("grade")
        .arg("--quiz")
        .arg(&quiz_path)
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 1/3 correct, 2 wrong (33%)"))
        .stdout(predicate::str::contains("Capital of France?"));
}

#[test]
fn grade_json_with_rounding() {
    let dir = TempDir::new().unwrap();
    let quiz_path = generate_offline(&dir, "3");
    let answers = dir.path().join("answers.json");
    std::fs::write(&answers, r#"{"0": "Paris", "1": "4"}"#).unwrap();

    let run = |rounding: &str| -> serde_json::Value {
        let output = edumate(dir.path())
            .arg("grade")
            .arg("--quiz")
            .arg(&quiz_path)
            .arg("--answers")
            .arg(&answers)
            .args(["--format", "json", "--rounding", rounding])
            .output()
            .unwrap();
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).unwrap()
    };

    let truncated = run("truncate");
    assert_eq!(truncated["summary"]["correct"], 2);
    assert_eq!(truncated["summary"]["score_percent"], 66);
    assert_eq!(truncated["details"][2]["is_correct"], false);

    let rounded = run("round");
    assert_eq!(rounded["summary"]["score_percent"], 67);
}

#[test]
fn grade_missing_quiz_file() {
    let dir = TempDir::new().unwrap();

    edumate(dir.path())
        .args(["grade", "--quiz", "no_such_quiz.json", "--answers", "no_answers.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    edumate(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created edumate.toml"));

    assert!(dir.path().join("edumate.toml").exists());

    edumate(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn list_models_without_config() {
    let dir = TempDir::new().unwrap();

    edumate(dir.path())
        .arg("list-models")
        .assert()
        .success()
        .stdout(predicate::str::contains("No providers configured"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();

    edumate(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("quiz generator and grader"));
}
