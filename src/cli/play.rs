use podplay::config::Config;
use std::error::Error;

pub fn handle_play(
    source: Option<&str>,
    index: Option<usize>,
    single: bool,
) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let source = config.resolve_source(source)?;

    if single && index.is_none() {
        return Err("--single needs an episode to start from. Pass --index <N>".into());
    }

    #[cfg(feature = "player")]
    {
        crate::player::run(&source, index, single)
    }

    #[cfg(not(feature = "player"))]
    {
        let _ = (source, index, single);
        use owo_colors::OwoColorize;
        println!("{} {}", "🎧".cyan(), "Podcast Player".bold());
        println!();
        println!(
            "{} The player requires the 'player' feature to be enabled.",
            "Note:".yellow()
        );
        println!();
        println!("To enable it, install with:");
        println!("  {}", "cargo install podplay --features player".cyan());
        println!();
        println!("Or if building from source:");
        println!("  {}", "cargo build --release --features player".cyan());

        Ok(())
    }
}
