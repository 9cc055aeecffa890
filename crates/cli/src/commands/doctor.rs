//! `ragchat doctor` — Diagnose configuration and provider health.

use ragchat_config::AppConfig;
use ragchat_core::Provider;
use ragchat_providers::OpenAiCompatProvider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("ragchat doctor");
    println!("==============\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file — defaults in use (see `ragchat config`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  1 issue found. Fix the config and run again.");
            return Ok(());
        }
    };

    println!("  Model:     {}", config.agent.model);
    println!("  Endpoint:  {}", config.provider.base_url);

    for doc in &config.memory.documents {
        if !doc.exists() {
            println!("  ⚠️  Context document missing: {}", doc.display());
            issues += 1;
        }
    }

    match OpenAiCompatProvider::from_config(&config) {
        Ok(provider) => {
            println!("  ✅ API key configured");
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider reachable"),
                Ok(false) => {
                    println!("  ❌ Provider rejected the request (check the API key)");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider unreachable: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ {e} — set api_key in config.toml or GROQ_API_KEY");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
