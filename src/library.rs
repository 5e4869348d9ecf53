//! Local library store.
//!
//! Scans a music directory into `PlayableTrack`s, the shape every screen hands
//! to the playback context.

mod infer;
mod model;
mod scan;

pub use model::PlayableTrack;
pub use scan::scan;

#[cfg(test)]
mod tests;
