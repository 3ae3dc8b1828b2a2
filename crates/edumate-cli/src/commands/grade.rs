//! The `edumate grade` command.

use std::path::PathBuf;

use anyhow::Result;

use edumate_core::model::{GradeReport, ScoreRounding, Submission};
use edumate_core::record::QuizRecord;
use edumate_providers::config::load_config_from;

pub fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    rounding: Option<ScoreRounding>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let rounding = match rounding {
        Some(r) => r,
        None => load_config_from(config_path.as_deref())?.score_rounding,
    };

    let record = QuizRecord::load_json(&quiz_path)?;
    let submission = Submission::load_json(&answers_path)?;
    let report = record.grade(&submission, rounding);

    tracing::info!(
        quiz = %record.id,
        correct = report.summary.correct,
        total = report.summary.total,
        "graded submission"
    );

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => print_report(&record, &report),
        other => anyhow::bail!("unknown format '{other}', expected text or json"),
    }

    Ok(())
}

fn print_report(record: &QuizRecord, report: &GradeReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct answer", ""]);

    for detail in &report.details {
        let user_answer = if detail.user_answer.trim().is_empty() {
            "-"
        } else {
            detail.user_answer.as_str()
        };
        table.add_row(vec![
            Cell::new(detail.index + 1),
            Cell::new(&detail.question_text),
            Cell::new(user_answer),
            Cell::new(&detail.correct_answer),
            Cell::new(if detail.is_correct { "OK" } else { "WRONG" }),
        ]);
    }

    println!(
        "Quiz: {} ({}, created {})",
        record.topic,
        record.id,
        record.created_at.format("%Y-%m-%d %H:%M")
    );
    println!("{table}");
    println!(
        "Score: {}/{} correct, {} wrong ({}%)",
        report.summary.correct,
        report.summary.total,
        report.summary.wrong,
        report.summary.score_percent
    );
}
