use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ArtworkSettings;
use crate::error::ArtworkError;

use super::throttle::Throttle;

/// How many search hits (and releases per hit) the recording fallback checks.
const FALLBACK_FANOUT: usize = 3;

/// A source of cover art urls.
#[async_trait]
pub trait CoverArtLookup: Send + Sync {
    /// `Ok(None)` when no cover could be found.
    async fn find_cover_art(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<String>, ArtworkError>;
}

/// Finds covers by searching MusicBrainz and probing the Cover Art Archive.
pub struct MusicBrainzClient {
    http: Client,
    musicbrainz_url: String,
    cover_art_url: String,
    throttle: Throttle,
}

#[derive(Debug, Deserialize)]
struct ReleaseRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseSearch {
    #[serde(default)]
    releases: Vec<ReleaseRef>,
}

#[derive(Debug, Deserialize)]
struct Recording {
    #[serde(default)]
    releases: Vec<ReleaseRef>,
}

#[derive(Debug, Deserialize)]
struct RecordingSearch {
    #[serde(default)]
    recordings: Vec<Recording>,
}

/// Lucene query matching `artist` and `title` against the `field` of an entity.
pub(super) fn search_query(field: &str, artist: &str, title: &str) -> String {
    fn quoted(value: &str) -> String {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
    format!("artist:{} AND {field}:{}", quoted(artist), quoted(title))
}

impl MusicBrainzClient {
    pub fn new(settings: &ArtworkSettings) -> Result<Self, ArtworkError> {
        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            musicbrainz_url: settings.musicbrainz_url.trim_end_matches('/').to_string(),
            cover_art_url: settings.cover_art_url.trim_end_matches('/').to_string(),
            throttle: Throttle::new(Duration::from_millis(settings.min_request_interval_ms)),
        })
    }

    async fn search<T: DeserializeOwned>(
        &self,
        entity: &str,
        query: String,
    ) -> Result<T, ArtworkError> {
        self.throttle.wait().await;

        let url = format!("{}/ws/2/{entity}/", self.musicbrainz_url);
        debug!(entity, query = %query, "musicbrainz search");
        let response = self
            .http
            .get(&url)
            .query(&[("query", query.as_str()), ("fmt", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArtworkError::Status(status));
        }
        Ok(response.json().await?)
    }

    /// Url of the release's front cover, if the archive has one.
    async fn front_cover(&self, mbid: &str) -> Option<String> {
        let url = format!("{}/release/{mbid}/front-500", self.cover_art_url);
        match self.http.head(&url).send().await {
            Ok(response) if response.status().is_success() => Some(url),
            Ok(response) => {
                debug!(mbid, status = %response.status(), "no front cover");
                None
            }
            Err(err) => {
                debug!(mbid, %err, "front cover check failed");
                None
            }
        }
    }
}

#[async_trait]
impl CoverArtLookup for MusicBrainzClient {
    async fn find_cover_art(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<String>, ArtworkError> {
        let (artist, title) = (artist.trim(), title.trim());
        if artist.is_empty() || title.is_empty() {
            return Ok(None);
        }

        let found: ReleaseSearch = self
            .search("release", search_query("release", artist, title))
            .await?;
        if let Some(release) = found.releases.first() {
            if let Some(url) = self.front_cover(&release.id).await {
                return Ok(Some(url));
            }
        }

        let found: RecordingSearch = self
            .search("recording", search_query("recording", artist, title))
            .await?;
        let candidates = found
            .recordings
            .iter()
            .take(FALLBACK_FANOUT)
            .flat_map(|recording| recording.releases.iter().take(FALLBACK_FANOUT));
        for release in candidates {
            self.throttle.wait().await;
            if let Some(url) = self.front_cover(&release.id).await {
                return Ok(Some(url));
            }
        }

        debug!(artist, title, "no cover art found");
        Ok(None)
    }
}
