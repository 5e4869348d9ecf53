//! rodio-backed sound resources.
//!
//! A `RodioSound` is one `Sink` holding one decoded source. Local files are
//! streamed from disk; `http(s)` sources are downloaded into memory first.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::debug;

use crate::config::AudioSettings;
use crate::error::AudioError;

use super::backend::{SoundBackend, SoundResource};

/// Where the bytes behind a source uri live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum SourceLocation {
    File(PathBuf),
    Remote(Url),
}

/// Classify `uri` as a local path, a `file://` url or an `http(s)://` url.
pub(super) fn locate(uri: &str) -> Result<SourceLocation, AudioError> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(AudioError::UnsupportedUri(String::new()));
    }

    match Url::parse(uri) {
        Ok(url) => match url.scheme() {
            "file" => url
                .to_file_path()
                .map(SourceLocation::File)
                .map_err(|_| AudioError::UnsupportedUri(uri.to_string())),
            "http" | "https" => Ok(SourceLocation::Remote(url)),
            // `C:\music\a.mp3` parses with a one-letter scheme.
            scheme if scheme.len() == 1 => Ok(SourceLocation::File(PathBuf::from(uri))),
            _ => Err(AudioError::UnsupportedUri(uri.to_string())),
        },
        // Plain paths are relative urls without a base.
        Err(_) => Ok(SourceLocation::File(PathBuf::from(uri))),
    }
}

pub struct RodioBackend {
    stream: OutputStream,
    http: Option<reqwest::blocking::Client>,
    request_timeout: Duration,
}

impl RodioBackend {
    /// Open the default output device. Must run on the thread that will own the backend.
    pub fn open_default(settings: &AudioSettings) -> Result<Self, AudioError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| AudioError::OutputDevice(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which garbles the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            http: None,
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
        })
    }

    fn fetch(&mut self, uri: &str, url: Url) -> Result<Vec<u8>, AudioError> {
        let fetch_err = |reason: String| AudioError::Fetch {
            uri: uri.to_string(),
            reason,
        };

        let client = match self.http.take() {
            Some(client) => client,
            None => reqwest::blocking::Client::builder()
                .timeout(self.request_timeout)
                .build()
                .map_err(|e| fetch_err(e.to_string()))?,
        };
        let client = self.http.insert(client);

        debug!(%url, "downloading remote source");
        let response = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_err(e.to_string()))?;
        let bytes = response.bytes().map_err(|e| fetch_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn sink_for<R>(&self, uri: &str, reader: R) -> Result<Sink, AudioError>
    where
        R: std::io::Read + std::io::Seek + Send + Sync + 'static,
    {
        let source = Decoder::new(reader).map_err(|e| AudioError::Decode {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        let sink = Sink::connect_new(self.stream.mixer());
        sink.pause();
        sink.append(source);
        Ok(sink)
    }
}

impl SoundBackend for RodioBackend {
    type Resource = RodioSound;

    fn open(&mut self, uri: &str) -> Result<RodioSound, AudioError> {
        let sink = match locate(uri)? {
            SourceLocation::File(path) => {
                let file = File::open(&path).map_err(|source| AudioError::Open {
                    uri: uri.to_string(),
                    source,
                })?;
                self.sink_for(uri, BufReader::new(file))?
            }
            SourceLocation::Remote(url) => {
                let bytes = self.fetch(uri, url)?;
                self.sink_for(uri, Cursor::new(bytes))?
            }
        };
        Ok(RodioSound { sink })
    }
}

pub struct RodioSound {
    sink: Sink,
}

impl SoundResource for RodioSound {
    fn play(&self) {
        self.sink.play();
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn is_playing(&self) -> bool {
        !self.sink.is_paused() && !self.sink.empty()
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn release(self) {
        self.sink.stop();
    }
}
