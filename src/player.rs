//! Playback context and now-playing presentation state.
//!
//! Screens never touch the sound session directly: they call into the shared
//! `PlaybackContext` and render what `PlayerState` says.

mod context;
mod now_playing;
mod visibility;

pub use context::{PlaybackContext, PlayerState};
pub use now_playing::bind_lyrics;
