//! Error types shared across the player core and its outbound clients.

use thiserror::Error;

/// Failures of the sound session and its resources.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The output device could not be opened.
    #[error("no audio output device: {0}")]
    OutputDevice(String),

    /// The audio worker thread could not be started.
    #[error("failed to start audio worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// A local source could not be opened.
    #[error("failed to open {uri}: {source}")]
    Open {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    /// A remote source could not be downloaded.
    #[error("failed to fetch {uri}: {reason}")]
    Fetch { uri: String, reason: String },

    /// The bytes behind a source are not decodable audio.
    #[error("failed to decode {uri}: {reason}")]
    Decode { uri: String, reason: String },

    /// The source uri uses a scheme we cannot load.
    #[error("unsupported source uri: {0}")]
    UnsupportedUri(String),

    /// The worker thread has exited and no longer accepts commands.
    #[error("audio worker is no longer running")]
    WorkerGone,
}

/// Failures of the lyrics lookup service.
#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("lyrics request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lyrics service responded with {0}")]
    Status(reqwest::StatusCode),
}

/// Failures of the cover art lookup service.
#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("cover art request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metadata service responded with {0}")]
    Status(reqwest::StatusCode),
}
