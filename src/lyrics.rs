//! Lyrics for the now-playing view.
//!
//! `LyricsPipeline` owns the cache and the stale-result guard; the network
//! side sits behind the `LyricsLookup` trait.

mod cache;
mod client;
mod pipeline;

pub use client::LrclibClient;
#[cfg(test)]
pub(crate) use client::{LyricsLookup, LyricsQuery};
pub use pipeline::{LyricsPipeline, LyricsState, LyricsView};

#[cfg(test)]
mod tests;
