use std::time::Duration;

/// A playable audio item, whether it comes from the personal library or a playlist.
///
/// This is the only shape the player core consumes. `id` is unique within its
/// source collection and never reused for a different audio resource.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayableTrack {
    pub id: String,
    /// Local path, `file://` url or `http(s)://` url of the audio bytes.
    pub source_uri: String,
    pub display_title: String,
    pub artist: Option<String>,
    /// Advisory only; never negative.
    pub duration_seconds: f64,
    pub cover_art_url: Option<String>,
}

impl PlayableTrack {
    #[cfg(test)]
    pub fn new(
        id: impl Into<String>,
        source_uri: impl Into<String>,
        display_title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_uri: source_uri.into(),
            display_title: display_title.into(),
            artist: None,
            duration_seconds: 0.0,
            cover_art_url: None,
        }
    }

    /// Build a track from a library record: a blank `title` falls back to `filename`,
    /// blank optional strings become `None`.
    pub fn from_record(
        id: impl Into<String>,
        source_uri: impl Into<String>,
        filename: &str,
        title: Option<&str>,
        artist: Option<&str>,
        duration_seconds: f64,
        cover_art_url: Option<&str>,
    ) -> Self {
        let display_title = non_blank(title).unwrap_or_else(|| filename.to_string());
        Self {
            id: id.into(),
            source_uri: source_uri.into(),
            display_title,
            artist: non_blank(artist),
            duration_seconds: clamp_duration(duration_seconds),
            cover_art_url: non_blank(cover_art_url),
        }
    }

    #[cfg(test)]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = non_blank(Some(&artist.into()));
        self
    }

    #[cfg(test)]
    pub fn with_duration_seconds(mut self, seconds: f64) -> Self {
        self.duration_seconds = clamp_duration(seconds);
        self
    }

    /// Store a cover url. Blank urls are ignored; returns whether it was stored.
    pub fn set_cover_art(&mut self, url: &str) -> bool {
        match non_blank(Some(url)) {
            Some(url) => {
                self.cover_art_url = Some(url);
                true
            }
            None => false,
        }
    }

    /// Letter shown in place of missing cover art.
    pub fn placeholder_letter(&self) -> char {
        self.display_title
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('?')
    }

    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_seconds).unwrap_or(Duration::ZERO)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn clamp_duration(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
