//! `ragchat config` — Print the default configuration.

use ragchat_config::AppConfig;

pub fn run(path_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = AppConfig::config_path();

    if path_only {
        println!("{}", path.display());
        return Ok(());
    }

    println!("# Save as {}", path.display());
    println!("# api_key may also come from RAGCHAT_API_KEY or GROQ_API_KEY.");
    println!();
    print!("{}", AppConfig::default_toml());
    Ok(())
}
