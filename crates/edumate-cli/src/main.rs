//! edumate CLI: generate and grade multiple-choice quizzes.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use edumate_core::model::ScoreRounding;

mod commands;
mod topic;

#[derive(Parser)]
#[command(
    name = "edumate",
    version,
    about = "AI-assisted multiple-choice quiz generator and grader"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a quiz for a topic
    Generate {
        /// Quiz topic
        #[arg(long)]
        topic: String,

        /// Number of questions (default: from config, 15)
        #[arg(long, allow_negative_numbers = true)]
        total: Option<i64>,

        /// Read the model reply from a file instead of calling a provider
        #[arg(long)]
        raw: Option<PathBuf>,

        /// Output directory for the quiz record
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for filler answers
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Grade a submission against a saved quiz
    Grade {
        /// Quiz record JSON
        #[arg(long)]
        quiz: PathBuf,

        /// Submission JSON (`{"answers": {"0": "..."}}` or a bare map)
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Score rounding: truncate, round (default: from config)
        #[arg(long)]
        rounding: Option<ScoreRounding>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List models available to the configured providers
    ListModels {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("edumate=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            topic,
            total,
            raw,
            output,
            config,
            seed,
        } => commands::generate::execute(topic, total, raw, output, config, seed).await,
        Commands::Grade {
            quiz,
            answers,
            format,
            rounding,
            config,
        } => commands::grade::execute(quiz, answers, format, rounding, config),
        Commands::ListModels { config } => commands::list_models::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
