//! In-memory sound backend for tests.

use std::cell::Cell;
use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};

use crate::config::AudioSettings;
use crate::error::AudioError;

use super::backend::{SoundBackend, SoundResource};
use super::session::SoundSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FakeEvent {
    Opened(String),
    Released(String),
}

#[derive(Default)]
struct FakeState {
    log: Vec<FakeEvent>,
    live: usize,
    max_live: usize,
    finished: HashSet<String>,
}

/// Shared view of everything the fake backend did. Uris containing `missing`
/// fail to open.
#[derive(Clone, Default)]
pub(crate) struct FakeAudio {
    state: Arc<Mutex<FakeState>>,
}

impl FakeAudio {
    pub(crate) fn spawn_session(&self, settings: &AudioSettings) -> SoundSession {
        let audio = self.clone();
        SoundSession::spawn(move || Ok(FakeBackend::new(audio)), settings)
            .expect("fake backend always starts")
    }

    pub(crate) fn log(&self) -> Vec<FakeEvent> {
        self.state.lock().unwrap().log.clone()
    }

    pub(crate) fn live(&self) -> usize {
        self.state.lock().unwrap().live
    }

    pub(crate) fn max_live(&self) -> usize {
        self.state.lock().unwrap().max_live
    }

    /// Make the sound for `uri` report that it reached its end.
    pub(crate) fn finish(&self, uri: &str) {
        self.state.lock().unwrap().finished.insert(uri.to_string());
    }

    fn is_finished(&self, uri: &str) -> bool {
        self.state.lock().unwrap().finished.contains(uri)
    }
}

/// Settings that keep the worker responsive in tests.
pub(crate) fn test_settings() -> AudioSettings {
    AudioSettings {
        quit_fade_out_ms: 0,
        poll_interval_ms: 5,
        ..AudioSettings::default()
    }
}

pub(crate) struct FakeBackend {
    audio: FakeAudio,
}

impl FakeBackend {
    pub(crate) fn new(audio: FakeAudio) -> Self {
        Self { audio }
    }
}

impl SoundBackend for FakeBackend {
    type Resource = FakeSound;

    fn open(&mut self, uri: &str) -> Result<FakeSound, AudioError> {
        if uri.contains("missing") {
            return Err(AudioError::Open {
                uri: uri.to_string(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }

        let mut state = self.audio.state.lock().unwrap();
        state.log.push(FakeEvent::Opened(uri.to_string()));
        state.live += 1;
        state.max_live = state.max_live.max(state.live);

        Ok(FakeSound {
            uri: uri.to_string(),
            audio: self.audio.clone(),
            playing: Cell::new(false),
            volume: Cell::new(1.0),
        })
    }
}

pub(crate) struct FakeSound {
    uri: String,
    audio: FakeAudio,
    playing: Cell<bool>,
    volume: Cell<f32>,
}

impl SoundResource for FakeSound {
    fn play(&self) {
        self.playing.set(true);
    }

    fn pause(&self) {
        self.playing.set(false);
    }

    fn set_volume(&self, volume: f32) {
        self.volume.set(volume);
    }

    fn is_playing(&self) -> bool {
        self.playing.get() && !self.is_finished()
    }

    fn is_finished(&self) -> bool {
        self.audio.is_finished(&self.uri)
    }

    fn release(self) {
        let mut state = self.audio.state.lock().unwrap();
        state.log.push(FakeEvent::Released(self.uri));
        state.live -= 1;
    }
}
