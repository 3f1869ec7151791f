use owo_colors::OwoColorize;
use podplay::config::Config;
use std::error::Error;

pub fn handle_init(source: Option<&str>) -> Result<(), Box<dyn Error>> {
    if Config::exists()? {
        return Err(
            "podplay is already initialized. Use 'podplay config set <key> <value>' to change settings."
                .into(),
        );
    }

    let mut config = Config::new();
    if let Some(source) = source {
        config.set_value("episodes_source", source)?;
    }
    config.save()?;

    println!("{} podplay initialized", "✓".green());
    if let Some(source) = &config.episodes_source {
        println!("Episode listing: {source}");
    }
    println!(
        "Configuration saved to: {}",
        Config::config_path()?.display()
    );

    Ok(())
}
