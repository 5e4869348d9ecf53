use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::LyricsSettings;
use crate::error::LyricsError;
use crate::library::PlayableTrack;

use super::cache::LyricsKey;

/// Artist and title of one lyrics request, both trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsQuery {
    pub artist: String,
    pub title: String,
}

impl LyricsQuery {
    /// `None` when the track has no usable artist or title.
    pub fn from_track(track: &PlayableTrack) -> Option<Self> {
        let artist = track.artist.as_deref().map(str::trim).unwrap_or_default();
        let title = track.display_title.trim();
        if artist.is_empty() || title.is_empty() {
            return None;
        }
        Some(Self {
            artist: artist.to_string(),
            title: title.to_string(),
        })
    }

    pub fn key(&self) -> LyricsKey {
        LyricsKey::new(&self.artist, &self.title)
    }
}

/// A source of song lyrics.
#[async_trait]
pub trait LyricsLookup: Send + Sync {
    /// `Ok(None)` when the service has no lyrics for the song.
    async fn find_lyrics(&self, query: &LyricsQuery) -> Result<Option<String>, LyricsError>;
}

/// Client for an LRCLIB-compatible lyrics service.
pub struct LrclibClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LrclibRecord {
    plain_lyrics: Option<String>,
    synced_lyrics: Option<String>,
}

impl LrclibRecord {
    fn into_text(self) -> Option<String> {
        let plain = self
            .plain_lyrics
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        plain.or_else(|| {
            self.synced_lyrics
                .map(|synced| strip_timestamps(&synced))
                .filter(|text| !text.is_empty())
        })
    }
}

impl LrclibClient {
    pub fn new(settings: &LyricsSettings) -> Result<Self, LyricsError> {
        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LyricsLookup for LrclibClient {
    async fn find_lyrics(&self, query: &LyricsQuery) -> Result<Option<String>, LyricsError> {
        let url = format!("{}/api/get", self.base_url);
        debug!(artist = %query.artist, title = %query.title, "requesting lyrics");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("artist_name", query.artist.as_str()),
                ("track_name", query.title.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LyricsError::Status(status));
        }

        let record: LrclibRecord = response.json().await?;
        Ok(record.into_text())
    }
}

/// Drop the `[mm:ss.xx]` (and `[tag:value]`) prefixes from LRC text.
pub(super) fn strip_timestamps(synced: &str) -> String {
    synced
        .lines()
        .map(|line| {
            let mut rest = line.trim_start();
            while let Some(tail) = rest.strip_prefix('[') {
                match tail.split_once(']') {
                    Some((_, after)) => rest = after.trim_start(),
                    None => break,
                }
            }
            rest.trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
