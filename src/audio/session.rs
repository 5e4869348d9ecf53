use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::sync::{oneshot, watch};
use tracing::{debug, trace};

use crate::config::AudioSettings;
use crate::error::AudioError;
use crate::library::PlayableTrack;

use super::backend::SoundBackend;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, Generation, ResourceEvent, SessionStatus};

struct Commands {
    tx: Sender<AudioCmd>,
    next_generation: Generation,
}

/// Async handle to the audio worker.
///
/// There is exactly one worker per session and the worker holds at most one
/// sound. Status is published through a `watch` channel fed by a pump task.
pub struct SoundSession {
    // Generation allocation and send happen under the same lock, so the worker
    // sees loads in generation order.
    commands: Mutex<Commands>,
    status: watch::Receiver<SessionStatus>,
    worker: Mutex<Option<JoinHandle<()>>>,
    fade_out_ms: u64,
}

impl SoundSession {
    /// Start the worker thread and the status pump.
    ///
    /// Must be called from within a tokio runtime. Blocks the calling thread
    /// until `make_backend` has run on the worker, so call it before handing
    /// control to async code. Fails if the backend cannot be built, e.g. when
    /// there is no output device.
    pub fn spawn<B, F>(make_backend: F, settings: &AudioSettings) -> Result<Self, AudioError>
    where
        B: SoundBackend + 'static,
        F: FnOnce() -> Result<B, AudioError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (events_tx, events_rx) = unbounded_channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let worker = spawn_audio_thread(make_backend, rx, events_tx, ready_tx, settings.clone())?;

        // Blocks until the worker has built its backend.
        let ready = ready_rx.recv().unwrap_or(Err(AudioError::WorkerGone));
        if let Err(err) = ready {
            let _ = worker.join();
            return Err(err);
        }

        let (status_tx, status_rx) = watch::channel(SessionStatus::Idle);
        tokio::spawn(pump(events_rx, status_tx));

        Ok(Self {
            commands: Mutex::new(Commands {
                tx,
                next_generation: 0,
            }),
            status: status_rx,
            worker: Mutex::new(Some(worker)),
            fade_out_ms: settings.quit_fade_out_ms,
        })
    }

    fn commands(&self) -> MutexGuard<'_, Commands> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), AudioError> {
        self.commands()
            .tx
            .send(cmd)
            .map_err(|_| AudioError::WorkerGone)
    }

    /// Replace whatever is loaded with `track` and start it.
    ///
    /// Resolves once the worker has opened the new sound; the returned
    /// generation identifies it in status updates.
    pub async fn play(&self, track: &PlayableTrack) -> Result<Generation, AudioError> {
        let (reply, done) = oneshot::channel();
        let generation = {
            let mut commands = self.commands();
            commands.next_generation += 1;
            let generation = commands.next_generation;
            commands
                .tx
                .send(AudioCmd::Load {
                    generation,
                    uri: track.source_uri.clone(),
                    reply,
                })
                .map_err(|_| AudioError::WorkerGone)?;
            generation
        };

        debug!(generation, id = %track.id, "load requested");
        done.await.map_err(|_| AudioError::WorkerGone)??;
        Ok(generation)
    }

    async fn request(
        &self,
        cmd: impl FnOnce(oneshot::Sender<bool>) -> AudioCmd,
    ) -> Result<bool, AudioError> {
        let (reply, done) = oneshot::channel();
        self.send(cmd(reply))?;
        done.await.map_err(|_| AudioError::WorkerGone)
    }

    /// Returns whether a sound was loaded.
    pub async fn pause(&self) -> Result<bool, AudioError> {
        self.request(|reply| AudioCmd::Pause { reply }).await
    }

    /// Returns whether a sound was loaded.
    pub async fn resume(&self) -> Result<bool, AudioError> {
        self.request(|reply| AudioCmd::Resume { reply }).await
    }

    /// Stop and release the loaded sound. Returns whether there was one.
    pub async fn stop(&self) -> Result<bool, AudioError> {
        self.request(|reply| AudioCmd::Stop { reply }).await
    }

    pub async fn toggle_play_pause(&self) -> Result<bool, AudioError> {
        let status = self.status();
        match status {
            SessionStatus::Active { playing: true, .. } => self.pause().await,
            SessionStatus::Active { playing: false, .. } => self.resume().await,
            SessionStatus::Idle | SessionStatus::Ended { .. } => Ok(false),
        }
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Fade out and release the loaded sound, then stop the worker.
    ///
    /// Blocks until the worker thread has exited. Calling it twice is harmless.
    pub fn shutdown(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(worker) = worker else {
            return;
        };

        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: self.fade_out_ms,
        });
        if worker.join().is_err() {
            debug!("audio worker panicked");
        }
    }
}

impl Drop for SoundSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sole consumer of worker events. Folds them into the published status.
async fn pump(mut events: UnboundedReceiver<ResourceEvent>, status: watch::Sender<SessionStatus>) {
    while let Some(event) = events.recv().await {
        let changed = status.send_if_modified(|current| current.apply(event));
        trace!(?event, changed, "resource event");
    }
    status.send_replace(SessionStatus::Idle);
}
