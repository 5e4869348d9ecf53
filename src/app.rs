//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the scanned library,
//! the selection and the pending playback alert.

mod model;

pub use model::*;
