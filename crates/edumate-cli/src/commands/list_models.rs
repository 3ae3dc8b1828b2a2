//! The `edumate list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use edumate_providers::config::{load_config_from, ProviderConfig};
use edumate_providers::create_provider;
use edumate_providers::gemini::GeminiProvider;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    if config.providers.is_empty() {
        println!("No providers configured. Run `edumate init` to create a config file.");
        return Ok(());
    }

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    for name in names {
        let provider_config = &config.providers[name];
        let default_marker = if *name == config.default_provider {
            " (default)"
        } else {
            ""
        };
        println!("Provider: {name}{default_marker}");

        match provider_config {
            ProviderConfig::Gemini {
                api_key, base_url, ..
            } => {
                // Query the live catalogue rather than the resolved model only.
                let client = GeminiProvider::new(api_key, base_url.clone(), "");
                match client.list_models().await {
                    Ok(models) if !models.is_empty() => {
                        for model in models {
                            println!("  {model}");
                        }
                    }
                    Ok(_) => println!("  (no models reported)"),
                    Err(e) => println!("  unavailable: {e:#}"),
                }
            }
            ProviderConfig::Mock { .. } => {
                let provider = create_provider(name, provider_config).await?;
                for model in provider.available_models() {
                    println!("  {} ({})", model.id, model.name);
                }
            }
        }
        println!();
    }

    Ok(())
}
