use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::audio::{Generation, SessionStatus, SoundSession};
use crate::error::AudioError;
use crate::library::PlayableTrack;

use super::visibility::Visibility;

/// What screens see of the player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    pub current_song: Option<PlayableTrack>,
    /// Follows the sound's own reports, so it lags transport calls slightly.
    pub is_playing: bool,
    pub visibility: Visibility,
    /// Load generation bound to `current_song`.
    pub(crate) generation: Option<Generation>,
}

impl PlayerState {
    /// Returns whether anything changed.
    fn clear(&mut self) -> bool {
        let cleared = Self {
            visibility: self.visibility.on_stopped(),
            ..Self::default()
        };
        if *self == cleared {
            return false;
        }
        *self = cleared;
        true
    }

    /// Fold the session's status into the state. Only the sound bound to
    /// `current_song` may change it.
    fn apply_session_status(&mut self, status: SessionStatus) -> bool {
        match status {
            SessionStatus::Active {
                generation,
                playing,
            } if self.generation == Some(generation) => {
                if self.is_playing == playing {
                    return false;
                }
                self.is_playing = playing;
                true
            }
            SessionStatus::Idle if self.is_playing => {
                self.is_playing = false;
                true
            }
            SessionStatus::Ended { generation } if self.generation == Some(generation) => {
                debug!(generation, "track ended");
                self.clear()
            }
            _ => false,
        }
    }
}

/// Process-wide playback state and the only way to drive the sound session.
///
/// Create one per process, share it as `Arc<PlaybackContext>`, and call
/// [`PlaybackContext::shutdown`] on exit.
pub struct PlaybackContext {
    session: SoundSession,
    state: Arc<watch::Sender<PlayerState>>,
    // Serializes play/stop/toggle so state commits follow load order.
    transport: Mutex<()>,
    mirror: JoinHandle<()>,
}

impl PlaybackContext {
    /// Must be called from within a tokio runtime.
    pub fn new(session: SoundSession) -> Self {
        let (state, _) = watch::channel(PlayerState::default());
        let state = Arc::new(state);
        let mirror = tokio::spawn(mirror_session(session.subscribe(), Arc::clone(&state)));

        Self {
            session,
            state,
            transport: Mutex::new(()),
            mirror,
        }
    }

    /// Replace the current track with `track` and start playing it.
    ///
    /// On failure nothing is loaded, the player is hidden and the error is
    /// returned so the caller can tell the user.
    pub async fn play_audio(&self, track: PlayableTrack) -> Result<(), AudioError> {
        let _transport = self.transport.lock().await;

        match self.session.play(&track).await {
            Ok(generation) => {
                info!(
                    generation,
                    id = %track.id,
                    title = %track.display_title,
                    "now playing"
                );
                // The mirror may already have skipped reports for this generation.
                let status = self.session.status();
                self.state.send_modify(|state| {
                    state.current_song = Some(track);
                    state.generation = Some(generation);
                    state.is_playing = false;
                    state.visibility = state.visibility.on_track_started();
                    state.apply_session_status(status);
                });
                Ok(())
            }
            Err(err) => {
                warn!(id = %track.id, uri = %track.source_uri, %err, "playback failed");
                self.state.send_if_modified(PlayerState::clear);
                Err(err)
            }
        }
    }

    /// Stop and unload the current track. Does nothing if nothing is loaded.
    pub async fn stop_audio(&self) {
        let _transport = self.transport.lock().await;

        if let Err(err) = self.session.stop().await {
            warn!(%err, "stop failed");
        }
        if self.state.send_if_modified(PlayerState::clear) {
            info!("playback stopped");
        }
    }

    pub async fn toggle_play_pause(&self) {
        let _transport = self.transport.lock().await;

        match self.session.toggle_play_pause().await {
            Ok(true) => {}
            Ok(false) => debug!("toggle ignored, nothing loaded"),
            Err(err) => warn!(%err, "toggle play/pause failed"),
        }
    }

    pub fn show_now_playing(&self) {
        self.update_visibility(Visibility::show_full);
    }

    pub fn hide_now_playing(&self) {
        self.update_visibility(Visibility::dismiss_full);
    }

    fn update_visibility(&self, transition: impl FnOnce(Visibility) -> Visibility) {
        self.state.send_if_modified(|state| {
            if state.current_song.is_none() {
                return false;
            }
            let next = transition(state.visibility);
            if next == state.visibility {
                return false;
            }
            state.visibility = next;
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<PlayerState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PlayerState {
        self.state.borrow().clone()
    }

    /// Release the sound and stop the worker. Blocks for the fade-out.
    pub fn shutdown(&self) {
        self.mirror.abort();
        self.session.shutdown();
        self.state.send_if_modified(PlayerState::clear);
    }
}

impl Drop for PlaybackContext {
    fn drop(&mut self) {
        self.mirror.abort();
    }
}

async fn mirror_session(
    mut status: watch::Receiver<SessionStatus>,
    state: Arc<watch::Sender<PlayerState>>,
) {
    loop {
        let current = *status.borrow_and_update();
        state.send_if_modified(|state| state.apply_session_status(current));
        if status.changed().await.is_err() {
            break;
        }
    }
}
