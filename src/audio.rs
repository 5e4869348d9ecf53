//! Sound session management.
//!
//! A dedicated worker thread owns the output backend and at most one loaded
//! sound. `SoundSession` is the async handle the rest of the app talks to; it
//! publishes the worker's view of the sound as a `SessionStatus`.

mod backend;
mod session;
mod sink;
mod thread;
mod types;

pub use session::SoundSession;
pub use sink::RodioBackend;
pub use types::{Generation, SessionStatus};

#[cfg(test)]
pub(crate) mod fake;
