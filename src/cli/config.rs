use podplay::config::Config;
use std::error::Error;
use std::process::Command;

pub fn handle_config_view() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    println!("Current podplay configuration:");
    println!(
        "  episodes_source: {}",
        config.episodes_source.as_deref().unwrap_or("(not set)")
    );
    println!("  date_locale: {}", config.date_locale);
    println!("  volume: {}", config.volume);
    println!("  seek_step_secs: {}", config.seek_step_secs);
    println!("  log_file: {}", config.log_file);

    Ok(())
}

pub fn handle_config_set(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;

    config.set_value(key, value)?;
    config.save()?;

    println!("Configuration updated: {key} = {value}");

    Ok(())
}

pub fn handle_config_edit() -> Result<(), Box<dyn Error>> {
    if !Config::exists()? {
        return Err("podplay not initialized. Run 'podplay init' first.".into());
    }

    let config_path = Config::config_path()?;
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    println!("Opening {} in {}", config_path.display(), editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                format!("Editor '{editor}' not found. Set $EDITOR to a valid editor path.")
            } else {
                format!("Failed to launch editor '{editor}': {e}")
            }
        })?;

    if !status.success() {
        return Err(format!("Editor '{editor}' exited with error").into());
    }

    // Validate the config after editing
    let config = Config::load().map_err(|e| format!("Configuration validation failed: {e}"))?;
    podplay::utils::time::parse_locale(&config.date_locale)
        .map_err(|e| format!("Configuration validation failed: {e}"))?;
    println!("Configuration saved successfully");

    Ok(())
}
