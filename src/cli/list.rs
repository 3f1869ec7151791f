use owo_colors::OwoColorize;
use podplay::config::Config;
use podplay::episode::load_episodes;
use podplay::utils::time::{episode_date, format_seconds, parse_locale};
use std::error::Error;

pub fn handle_list(source: Option<&str>) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let source = config.resolve_source(source)?;
    let locale = parse_locale(&config.date_locale)?;

    let episodes = load_episodes(&source)?;
    if episodes.is_empty() {
        println!("{} No episodes in {source}", "Note:".yellow());
        return Ok(());
    }

    println!("{} {}", "🎙".cyan(), source.bold());
    println!();

    for (index, episode) in episodes.iter().enumerate() {
        println!(
            "{:>3}  {}",
            index.to_string().dimmed(),
            episode.title.bold()
        );
        println!(
            "     {} · {} · {}",
            episode.members,
            episode_date(episode.published_at.date(), locale).dimmed(),
            format_seconds(episode.duration).green()
        );
    }

    println!();
    println!(
        "{} episodes. Play one with {}",
        episodes.len(),
        "podplay play --index <N>".cyan()
    );

    Ok(())
}
