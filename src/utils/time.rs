//! Time and date formatting for the player and the header.

use crate::constants::{EPISODE_DATE_FORMAT, HEADER_DATE_FORMAT};
use chrono::{Locale, NaiveDate};
use std::error::Error;

/// Format a number of seconds as `MM:SS`, or `HH:MM:SS` from one hour on.
pub fn format_seconds(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

pub fn parse_locale(name: &str) -> Result<Locale, Box<dyn Error>> {
    Locale::try_from(name.trim()).map_err(|_| format!("Unknown locale: {name}").into())
}

/// Date line shown in the header, e.g. `seg, 19 outubro` for pt_BR.
pub fn header_date(date: NaiveDate, locale: Locale) -> String {
    date.format_localized(HEADER_DATE_FORMAT, locale).to_string()
}

/// Short publication date used in episode rows, e.g. `8 jan 21`.
pub fn episode_date(date: NaiveDate, locale: Locale) -> String {
    date.format_localized(EPISODE_DATE_FORMAT, locale).to_string()
}
