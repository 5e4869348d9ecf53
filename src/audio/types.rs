//! Audio-related small types.
//!
//! This module defines the commands accepted by the audio worker, the events it
//! reports about the active sound, and the status published to observers.

use tokio::sync::oneshot;

use crate::error::AudioError;

/// Identifies one loaded sound. Every load gets a fresh, strictly increasing value.
pub type Generation = u64;

#[derive(Debug)]
pub(super) enum AudioCmd {
    /// Release the active sound (if any), then open and start `uri`.
    Load {
        generation: Generation,
        uri: String,
        reply: oneshot::Sender<Result<(), AudioError>>,
    },
    /// Pause the active sound. Replies whether a sound was active.
    Pause { reply: oneshot::Sender<bool> },
    /// Resume the active sound. Replies whether a sound was active.
    Resume { reply: oneshot::Sender<bool> },
    /// Pause and release the active sound. Replies whether a sound was active.
    Stop { reply: oneshot::Sender<bool> },
    /// Release everything and exit the worker, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// What the worker reports about the sound it owns.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum ResourceEvent {
    Loaded(Generation),
    Status { generation: Generation, playing: bool },
    /// The sound played to its end and has been released.
    Finished(Generation),
    /// The sound was released by `Stop`, `Quit` or a replacing `Load`.
    Released(Generation),
}

/// Status of the session as seen by observers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Idle,
    Active {
        generation: Generation,
        playing: bool,
    },
    /// The sound bound to `generation` reached its end.
    Ended { generation: Generation },
}

impl SessionStatus {
    #[cfg(test)]
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Active { playing: true, .. })
    }

    #[cfg(test)]
    pub fn active_generation(self) -> Option<Generation> {
        match self {
            Self::Active { generation, .. } => Some(generation),
            _ => None,
        }
    }

    /// Fold one worker event into the status.
    ///
    /// Events about any sound other than the active one are ignored. Returns
    /// whether the status changed.
    pub(super) fn apply(&mut self, event: ResourceEvent) -> bool {
        let next = match (event, *self) {
            (ResourceEvent::Loaded(generation), _) => Self::Active {
                generation,
                playing: false,
            },
            (
                ResourceEvent::Status {
                    generation,
                    playing,
                },
                Self::Active {
                    generation: active, ..
                },
            ) if generation == active => Self::Active {
                generation,
                playing,
            },
            (ResourceEvent::Finished(generation), Self::Active { generation: active, .. })
                if generation == active =>
            {
                Self::Ended { generation }
            }
            (ResourceEvent::Released(generation), Self::Active { generation: active, .. })
                if generation == active =>
            {
                Self::Idle
            }
            _ => return false,
        };

        if next == *self {
            return false;
        }
        *self = next;
        true
    }
}
