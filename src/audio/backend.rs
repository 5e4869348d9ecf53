//! Seams between the audio worker and whatever actually produces sound.
//!
//! The worker is generic over a `SoundBackend`; the real one is rodio
//! (`sink::RodioBackend`), tests use an in-memory fake.

use crate::error::AudioError;

/// Opens sound resources. Lives on the audio worker thread for its whole life.
pub trait SoundBackend {
    type Resource: SoundResource;

    /// Create a resource for `uri`, loaded and paused.
    fn open(&mut self, uri: &str) -> Result<Self::Resource, AudioError>;
}

/// One loaded, possibly playing sound.
pub trait SoundResource {
    fn play(&self);
    fn pause(&self);
    fn set_volume(&self, volume: f32);
    fn is_playing(&self) -> bool;
    /// The sound has played to its end.
    fn is_finished(&self) -> bool;
    /// Stop output and free the underlying handle.
    fn release(self);
}
