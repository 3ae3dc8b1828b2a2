//! The `edumate generate` command.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use edumate_core::assemble::QuizAssembler;
use edumate_core::engine::{GeneratedQuiz, QuizEngine};
use edumate_core::record::QuizRecord;
use edumate_providers::config::load_config_from;
use edumate_providers::create_provider;

use crate::topic::check_topic;

pub async fn execute(
    topic: String,
    total: Option<i64>,
    raw: Option<PathBuf>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let topic = check_topic(&topic)?;
    let config = load_config_from(config_path.as_deref())?;
    let total = total.unwrap_or(config.default_total as i64);

    let quiz = match raw {
        Some(path) => {
            let start = Instant::now();
            let raw_text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read model reply from {}", path.display()))?;
            let assembler = match seed {
                Some(seed) => QuizAssembler::with_seed(seed),
                None => QuizAssembler::new(),
            };
            let questions = assembler.assemble(&raw_text, topic, total)?;
            GeneratedQuiz::new(topic, questions, None, start.elapsed().as_millis() as u64)
        }
        None => {
            let name = &config.default_provider;
            let provider_config = config.providers.get(name).with_context(|| {
                format!(
                    "provider '{name}' not found in config. Run `edumate init` or pass --raw"
                )
            })?;
            let provider = create_provider(name, provider_config).await?;
            eprintln!("Generating {total} questions on '{topic}' with {}", provider.model());

            let engine = QuizEngine::new(provider, config.engine_config(seed));
            engine.generate(topic, total).await?
        }
    };

    print_quiz(&quiz);
    eprintln!(
        "{} authored, {} filler ({}ms)",
        quiz.authored, quiz.filler, quiz.duration_ms
    );

    let record = QuizRecord::new(&quiz.topic, quiz.questions, quiz.model);
    let dir = output.unwrap_or(config.output_dir);
    let path = dir.join(record.file_name());
    record.save_json(&path)?;
    println!("Quiz saved to: {}", path.display());

    Ok(())
}

fn print_quiz(quiz: &GeneratedQuiz) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Options", "Answer"]);

    for question in &quiz.questions {
        table.add_row(vec![
            Cell::new(question.index + 1),
            Cell::new(&question.question_text),
            Cell::new(question.options.join("\n")),
            Cell::new(&question.answer),
        ]);
    }

    eprintln!("\n{table}");
}
