//! Episode records and the episode listing loader.
//!
//! Listings use the podcast API shape: an object with an `episodes` array (a
//! bare array is accepted too) where each entry nests its audio details under
//! `file`. Records are flattened into [`Episode`] on deserialization and the
//! listing is ordered newest first.

use crate::utils::http;
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::error::Error;
use std::fs;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "EpisodeRecord")]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub members: String,
    pub thumbnail: String,
    pub description: Option<String>,
    pub url: String,
    pub mime_type: Option<String>,
    /// Length in seconds
    pub duration: u64,
    pub published_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct EpisodeFile {
    url: String,
    #[serde(rename = "type", default)]
    mime_type: Option<String>,
    #[serde(default)]
    duration: u64,
}

#[derive(Debug, Deserialize)]
struct EpisodeRecord {
    id: String,
    title: String,
    #[serde(default)]
    members: String,
    #[serde(default)]
    thumbnail: String,
    #[serde(default)]
    description: Option<String>,
    published_at: String,
    file: EpisodeFile,
}

impl TryFrom<EpisodeRecord> for Episode {
    type Error = String;

    fn try_from(record: EpisodeRecord) -> Result<Self, Self::Error> {
        if record.file.url.trim().is_empty() {
            return Err(format!("Episode {} has an empty audio URL", record.id));
        }

        let published_at = parse_published_at(&record.published_at)
            .ok_or_else(|| format!("Episode {} has an invalid published_at", record.id))?;

        Ok(Self {
            id: record.id,
            title: record.title,
            members: record.members,
            thumbnail: record.thumbnail,
            description: record.description,
            url: record.file.url,
            mime_type: record.file.mime_type,
            duration: record.file.duration,
            published_at,
        })
    }
}

fn parse_published_at(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

/// Parse an episode listing, newest episode first.
pub fn parse_episodes(json: &str) -> Result<Vec<Episode>, Box<dyn Error>> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let list = match value {
        serde_json::Value::Object(mut map) => map
            .remove("episodes")
            .ok_or("Episode listing has no \"episodes\" array")?,
        other => other,
    };

    let mut episodes: Vec<Episode> = serde_json::from_value(list)?;
    episodes.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    Ok(episodes)
}

/// Load an episode listing from a file path (`~` is expanded) or an HTTP(S) URL.
pub fn load_episodes(source: &str) -> Result<Vec<Episode>, Box<dyn Error>> {
    let body = if http::is_remote(source) {
        http::fetch_text(source)?
    } else {
        let path = shellexpand::tilde(source);
        fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Could not read episode listing {source}: {e}"))?
    };

    let episodes = parse_episodes(&body)?;
    log::info!("Loaded {} episodes from {source}", episodes.len());
    Ok(episodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LISTING: &str = r#"{
        "episodes": [
            {
                "id": "a-importancia-da-contribuicao-em-open-source",
                "title": "Faladev #30 | A importância da contribuição em Open Source",
                "members": "Diego Fernandes, João Pedro, Diego Haz e Bruno Lemos",
                "published_at": "2021-01-22 12:00:00",
                "thumbnail": "https://example.com/opensource.jpg",
                "description": "<p>Nesse episódio...</p>",
                "file": {
                    "url": "https://example.com/opensource.m4a",
                    "type": "audio/x-m4a",
                    "duration": 3981
                }
            },
            {
                "id": "uma-conversa-sobre-programacao-funcional",
                "title": "Uma conversa sobre programação funcional",
                "members": "Diego Fernandes e Tiago",
                "published_at": "2021-01-24 12:00:00",
                "thumbnail": "https://example.com/funcional.jpg",
                "file": {
                    "url": "https://example.com/funcional.m4a",
                    "duration": 2211
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_wrapped_listing_sorted_newest_first() {
        let episodes = parse_episodes(LISTING).unwrap();

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].id, "uma-conversa-sobre-programacao-funcional");
        assert_eq!(episodes[0].duration, 2211);
        assert_eq!(episodes[0].mime_type, None);
        assert_eq!(episodes[0].description, None);

        assert_eq!(episodes[1].url, "https://example.com/opensource.m4a");
        assert_eq!(episodes[1].mime_type.as_deref(), Some("audio/x-m4a"));
        assert_eq!(episodes[1].duration, 3981);
        assert_eq!(
            episodes[1].published_at.format("%Y-%m-%d").to_string(),
            "2021-01-22"
        );
    }

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[{
            "id": "one", "title": "One", "published_at": "2021-02-01T08:30:00",
            "file": { "url": "one.mp3", "duration": 10 }
        }]"#;

        let episodes = parse_episodes(json).unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].members, "");
        assert_eq!(episodes[0].thumbnail, "");
    }

    #[test]
    fn test_parse_rfc3339_date() {
        assert!(parse_published_at("2021-02-01T08:30:00Z").is_some());
        assert!(parse_published_at("2021-02-01T08:30:00-03:00").is_some());
        assert!(parse_published_at("yesterday").is_none());
    }

    #[test]
    fn test_parse_rejects_missing_episodes_key() {
        let result = parse_episodes(r#"{ "items": [] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_empty_url() {
        let json = r#"[{
            "id": "broken", "title": "Broken", "published_at": "2021-02-01 08:30:00",
            "file": { "url": "  " }
        }]"#;

        let err = parse_episodes(json).unwrap_err();
        assert!(err.to_string().contains("empty audio URL"));
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let json = r#"[{
            "id": "late", "title": "Late", "published_at": "soon",
            "file": { "url": "late.mp3" }
        }]"#;

        assert!(parse_episodes(json).is_err());
    }

    #[test]
    fn test_load_episodes_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(LISTING.as_bytes()).unwrap();

        let episodes = load_episodes(file.path().to_str().unwrap()).unwrap();
        assert_eq!(episodes.len(), 2);
    }

    #[test]
    fn test_load_episodes_missing_file() {
        let result = load_episodes("/nonexistent/podplay/episodes.json");
        assert!(result.is_err());
    }
}
