//! Application model: the scanned library, the cursor and the alert popup.
//!
//! Playback state is not kept here; screens read it from the playback context.

use crate::library::PlayableTrack;

/// The main application model.
pub struct App {
    pub tracks: Vec<PlayableTrack>,
    pub selected: usize,
    pub current_dir: Option<String>,
    alert: Option<String>,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<PlayableTrack>) -> Self {
        Self {
            tracks,
            selected: 0,
            current_dir: None,
            alert: None,
        }
    }

    /// Record the current directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Return true if the library contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&PlayableTrack> {
        self.tracks.get(self.selected)
    }

    pub fn track_by_id(&self, id: &str) -> Option<&PlayableTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Set the selected track index, clamped to the library.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx.min(self.tracks.len().saturating_sub(1));
    }

    /// Move selection to the next track, wrapping to the first.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.tracks.len();
        }
    }

    /// Move selection to the previous track, wrapping to the last.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.tracks.len() - 1);
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.set_selected(usize::MAX);
    }

    /// Store a looked-up cover on the library record. Returns false if the
    /// track is gone.
    pub fn set_cover_art(&mut self, id: &str, url: String) -> bool {
        self.tracks
            .iter_mut()
            .find(|t| t.id == id)
            .is_some_and(|track| track.set_cover_art(&url))
    }

    /// Show a blocking alert; a newer alert replaces an older one.
    pub fn show_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }
}
