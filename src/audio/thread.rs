use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::AudioSettings;
use crate::error::AudioError;

use super::backend::{SoundBackend, SoundResource};
use super::types::{AudioCmd, Generation, ResourceEvent};

/// The sound currently owned by the worker.
struct ActiveSound<R> {
    generation: Generation,
    resource: R,
    reported_playing: Option<bool>,
}

/// Sole owner of the backend and of the (at most one) live sound resource.
///
/// Commands are handled strictly one at a time, so releasing the old sound
/// always completes before the next one is opened.
struct Worker<B: SoundBackend> {
    backend: B,
    active: Option<ActiveSound<B::Resource>>,
    events: UnboundedSender<ResourceEvent>,
}

impl<B: SoundBackend> Worker<B> {
    fn emit(&self, event: ResourceEvent) {
        // The pump only goes away together with the session.
        let _ = self.events.send(event);
    }

    fn load(&mut self, generation: Generation, uri: &str) -> Result<(), AudioError> {
        self.release_active();

        let resource = self.backend.open(uri)?;
        resource.set_volume(1.0);
        resource.play();
        self.active = Some(ActiveSound {
            generation,
            resource,
            reported_playing: None,
        });

        info!(generation, uri, "sound loaded");
        self.emit(ResourceEvent::Loaded(generation));
        self.report_status();
        Ok(())
    }

    fn release_active(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };

        active.resource.pause();
        active.resource.release();
        debug!(generation = active.generation, "sound released");
        self.emit(ResourceEvent::Released(active.generation));
        true
    }

    fn pause(&mut self) -> bool {
        let Some(active) = self.active.as_ref() else {
            debug!("pause ignored, nothing loaded");
            return false;
        };
        active.resource.pause();
        self.report_status();
        true
    }

    fn resume(&mut self) -> bool {
        let Some(active) = self.active.as_ref() else {
            debug!("resume ignored, nothing loaded");
            return false;
        };
        active.resource.play();
        self.report_status();
        true
    }

    /// Mirror the resource's own view of its state into events.
    fn report_status(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let playing = active.resource.is_playing();
        if active.reported_playing != Some(playing) {
            active.reported_playing = Some(playing);
            let generation = active.generation;
            self.emit(ResourceEvent::Status {
                generation,
                playing,
            });
        }
    }

    fn poll(&mut self) {
        let finished = self
            .active
            .as_ref()
            .is_some_and(|active| active.resource.is_finished());
        if !finished {
            self.report_status();
            return;
        }

        if let Some(active) = self.active.take() {
            active.resource.release();
            info!(generation = active.generation, "sound finished");
            self.emit(ResourceEvent::Finished(active.generation));
        }
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(active) = self.active.as_ref() {
            fade_out(&active.resource, fade_out_ms);
        }
        self.release_active();
    }

    /// Returns `false` once the worker should exit.
    fn handle(&mut self, cmd: AudioCmd) -> bool {
        match cmd {
            AudioCmd::Load {
                generation,
                uri,
                reply,
            } => {
                let result = self.load(generation, &uri);
                if let Err(err) = &result {
                    warn!(generation, uri = %uri, %err, "failed to load sound");
                }
                let _ = reply.send(result);
            }
            AudioCmd::Pause { reply } => {
                let _ = reply.send(self.pause());
            }
            AudioCmd::Resume { reply } => {
                let _ = reply.send(self.resume());
            }
            AudioCmd::Stop { reply } => {
                let _ = reply.send(self.release_active());
            }
            AudioCmd::Quit { fade_out_ms } => {
                self.quit(fade_out_ms);
                return false;
            }
        }
        true
    }
}

fn fade_out<R: SoundResource>(resource: &R, fade_out_ms: u64) {
    if fade_out_ms == 0 || !resource.is_playing() {
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        resource.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    resource.set_volume(0.0);
}

/// Start the audio worker thread.
///
/// `make_backend` runs on the new thread (rodio's output stream cannot move
/// between threads); its outcome is reported once through `ready`.
pub(super) fn spawn_audio_thread<B, F>(
    make_backend: F,
    rx: Receiver<AudioCmd>,
    events: UnboundedSender<ResourceEvent>,
    ready: SyncSender<Result<(), AudioError>>,
    settings: AudioSettings,
) -> Result<JoinHandle<()>, AudioError>
where
    B: SoundBackend + 'static,
    F: FnOnce() -> Result<B, AudioError> + Send + 'static,
{
    let poll_interval = Duration::from_millis(settings.poll_interval_ms.max(1));

    thread::Builder::new()
        .name("audio".to_string())
        .spawn(move || {
            let backend = match make_backend() {
                Ok(backend) => {
                    let _ = ready.send(Ok(()));
                    backend
                }
                Err(err) => {
                    let _ = ready.send(Err(err));
                    return;
                }
            };

            let mut worker = Worker {
                backend,
                active: None,
                events,
            };

            loop {
                match rx.recv_timeout(poll_interval) {
                    Ok(cmd) => {
                        if !worker.handle(cmd) {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => worker.poll(),
                    Err(RecvTimeoutError::Disconnected) => {
                        worker.release_active();
                        break;
                    }
                }
            }
            debug!("audio worker exited");
        })
        .map_err(AudioError::Spawn)
}
