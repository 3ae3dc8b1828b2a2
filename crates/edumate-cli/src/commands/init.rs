//! The `edumate init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("edumate.toml").exists() {
        println!("edumate.toml already exists, skipping.");
    } else {
        std::fs::write("edumate.toml", SAMPLE_CONFIG)?;
        println!("Created edumate.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY (or edit edumate.toml)");
    println!("  2. Run: edumate generate --topic \"Photosynthesis\" --total 5");
    println!("  3. Run: edumate grade --quiz <quiz.json> --answers <answers.json>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# edumate configuration

default_provider = "gemini"
default_total = 15
max_output_tokens = 8192
temperature = 0.7
max_attempts = 2
retry_delay_ms = 1000
score_rounding = "truncate"
output_dir = "./edumate-quizzes"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"
# Pin a model to skip discovery:
# model = "gemini-2.5-flash"

[providers.offline]
type = "mock"
response = "[]"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_parses() {
        let config = edumate_providers::config::parse_config(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.providers.len(), 2);
    }
}
