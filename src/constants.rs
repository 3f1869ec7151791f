//! Project-wide constants used across multiple modules.
//!
//! This module centralizes constant definitions to avoid duplication and ensure
//! consistency across the codebase.

/// Directory name used under the user's config directory
pub const CONFIG_DIR_NAME: &str = "podplay";

/// Product name shown in the header
pub const APP_TITLE: &str = "Podcastr";

/// Tagline shown next to the product name
pub const TAGLINE: &str = "O melhor para você ouvir, sempre";

/// Player panel title
pub const NOW_PLAYING: &str = "Tocando agora";

/// Prompt shown while no episode is selected
pub const EMPTY_PLAYER_PROMPT: &str = "Selecione um podcast para ouvir";

/// Header date pattern (weekday abbreviation, day, full month)
pub const HEADER_DATE_FORMAT: &str = "%a, %-d %B";

/// Publication date pattern used in episode rows
pub const EPISODE_DATE_FORMAT: &str = "%-d %b %y";

/// URL schemes fetched over HTTP instead of read from disk
pub const REMOTE_SCHEMES: &[&str] = &["http://", "https://"];

/// Upper bound for a downloaded episode file
pub const MAX_DOWNLOAD_BYTES: u64 = 512 * 1024 * 1024;
