//! podplay - a terminal podcast player.
//!
//! Reads an episode listing (a JSON file or URL), shows it as a browsable list
//! and plays episodes through a shared queue with previous/next, shuffle and
//! loop controls. The player lives behind the `player` feature; listing and
//! configuration commands work without it.

use clap::{CommandFactory, Parser, Subcommand, builder::PossibleValuesParser};
use clap_complete::{Generator, Shell, generate};
use podplay::config::CONFIG_KEYS;
use std::error::Error;
use std::io;

mod cli;

#[cfg(feature = "player")]
mod player;

#[derive(Parser)]
#[command(name = "podplay")]
#[command(about = "Terminal podcast player with a shared episode queue")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the player on an episode listing
    Play {
        /// Path or URL of the episode listing (defaults to episodes_source)
        source: Option<String>,
        /// Start playing the listing from this episode
        #[arg(short, long)]
        index: Option<usize>,
        /// Play only the episode given by --index
        #[arg(short, long)]
        single: bool,
    },
    /// Print the episodes in a listing
    List {
        /// Path or URL of the episode listing (defaults to episodes_source)
        source: Option<String>,
    },
    /// Initialize podplay configuration
    Init {
        /// Episode listing to remember as the default source
        source: Option<String>,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// View current configuration
    View,
    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_parser = PossibleValuesParser::new(CONFIG_KEYS.iter().copied()))]
        key: String,
        /// Configuration value
        value: String,
    },
    /// Edit configuration file in your editor
    Edit,
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            source,
            index,
            single,
        } => {
            cli::play::handle_play(source.as_deref(), index, single)?;
        }
        Commands::List { source } => {
            cli::list::handle_list(source.as_deref())?;
        }
        Commands::Init { source } => {
            cli::init::handle_init(source.as_deref())?;
        }
        Commands::Config { action } => match action {
            ConfigAction::View => {
                cli::config::handle_config_view()?;
            }
            ConfigAction::Set { key, value } => {
                cli::config::handle_config_set(&key, &value)?;
            }
            ConfigAction::Edit => {
                cli::config::handle_config_edit()?;
            }
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
    }

    Ok(())
}
