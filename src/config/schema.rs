use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/encore/config.toml` or `~/.config/encore/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ENCORE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub lyrics: LyricsSettings,
    pub artwork: ArtworkSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration applied to the active sound on shutdown (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// How often the audio worker polls the active sound for status changes (milliseconds).
    pub poll_interval_ms: u64,
    /// Timeout for downloading remote (`http(s)://`) sources (milliseconds).
    pub request_timeout_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 300,
            poll_interval_ms: 200,
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LyricsSettings {
    /// Whether the now-playing view fetches lyrics at all.
    pub enabled: bool,
    /// Base url of the LRCLIB-compatible lyrics service.
    pub base_url: String,
    /// Maximum number of lyrics kept in memory.
    pub cache_capacity: usize,
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for LyricsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://lrclib.net".to_string(),
            cache_capacity: 128,
            request_timeout_ms: 10_000,
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtworkSettings {
    /// Whether `c` in the library view looks up cover art.
    pub enabled: bool,
    pub musicbrainz_url: String,
    pub cover_art_url: String,
    /// Minimum spacing between two MusicBrainz requests (milliseconds).
    ///
    /// MusicBrainz asks clients to stay at or below one request per second.
    pub min_request_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ArtworkSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            musicbrainz_url: "https://musicbrainz.org".to_string(),
            cover_art_url: "https://coverartarchive.org".to_string(),
            min_request_interval_ms: 1_100,
            request_timeout_ms: 10_000,
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// Derive title/artist from `Artist - Title.ext` style filenames when tags are missing.
    pub infer_from_filename: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
            infer_from_filename: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether library rows read `Artist - Title` instead of just the title.
    pub show_artist_in_list: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ encore ~ ".to_string(),
            show_artist_in_list: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub enabled: bool,
    /// Log file; defaults to `$XDG_STATE_HOME/encore/encore.log`.
    pub file: Option<PathBuf>,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            file: None,
            filter: "info".to_string(),
        }
    }
}

fn default_user_agent() -> String {
    format!("encore/{}", env!("CARGO_PKG_VERSION"))
}
