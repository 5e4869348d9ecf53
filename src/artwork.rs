//! Cover art lookup for library records.
//!
//! Looked up on demand from the library view; the player only renders the
//! url stored on the track.

mod client;
mod throttle;

pub use client::{CoverArtLookup, MusicBrainzClient};
