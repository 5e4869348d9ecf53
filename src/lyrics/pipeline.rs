use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::library::PlayableTrack;

use super::cache::{LyricsCache, LyricsKey};
use super::client::{LyricsLookup, LyricsQuery};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LyricsState {
    /// No track is bound.
    #[default]
    Idle,
    Loading,
    Found(String),
    NotFound,
}

/// Lyrics for the song currently bound to the now-playing view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricsView {
    /// Song the view belongs to. Results for any other song are dropped.
    pub subject: Option<LyricsKey>,
    pub state: LyricsState,
}

/// Fetches lyrics in the background, caches hits and publishes a `LyricsView`.
///
/// Only the most recently bound song may update the view; a slow answer for a
/// song that is no longer shown still lands in the cache.
pub struct LyricsPipeline {
    lookup: Arc<dyn LyricsLookup>,
    cache: LyricsCache,
    in_flight: Mutex<HashSet<LyricsKey>>,
    view: watch::Sender<LyricsView>,
}

impl LyricsPipeline {
    pub fn new(lookup: Arc<dyn LyricsLookup>, cache_capacity: usize) -> Arc<Self> {
        let (view, _) = watch::channel(LyricsView::default());
        Arc::new(Self {
            lookup,
            cache: LyricsCache::new(cache_capacity),
            in_flight: Mutex::new(HashSet::new()),
            view,
        })
    }

    fn in_flight(&self) -> MutexGuard<'_, HashSet<LyricsKey>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind the view to `track`. Must be called from within a tokio runtime.
    pub fn track_changed(self: &Arc<Self>, track: Option<&PlayableTrack>) {
        let Some(track) = track else {
            self.view.send_replace(LyricsView::default());
            return;
        };

        let Some(query) = LyricsQuery::from_track(track) else {
            debug!(id = %track.id, "track has no artist or title, skipping lyrics");
            self.view.send_replace(LyricsView {
                subject: None,
                state: LyricsState::NotFound,
            });
            return;
        };

        let key = query.key();
        if let Some(lyrics) = self.cache.get(&key) {
            debug!(artist = %query.artist, title = %query.title, "lyrics cache hit");
            self.view.send_replace(LyricsView {
                subject: Some(key),
                state: LyricsState::Found(lyrics),
            });
            return;
        }

        self.view.send_replace(LyricsView {
            subject: Some(key.clone()),
            state: LyricsState::Loading,
        });

        if !self.in_flight().insert(key.clone()) {
            debug!(artist = %query.artist, title = %query.title, "lyrics already requested");
            return;
        }

        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline.resolve(query, key).await;
        });
    }

    async fn resolve(&self, query: LyricsQuery, key: LyricsKey) {
        let state = match self.lookup.find_lyrics(&query).await {
            Ok(Some(lyrics)) if !lyrics.trim().is_empty() => {
                self.cache.insert(key.clone(), &lyrics);
                LyricsState::Found(lyrics)
            }
            Ok(_) => {
                debug!(artist = %query.artist, title = %query.title, "no lyrics found");
                LyricsState::NotFound
            }
            Err(err) => {
                warn!(artist = %query.artist, title = %query.title, %err, "lyrics lookup failed");
                LyricsState::NotFound
            }
        };
        self.in_flight().remove(&key);

        let committed = self.view.send_if_modified(|view| {
            if view.subject.as_ref() != Some(&key) {
                return false;
            }
            view.state = state;
            true
        });
        if !committed {
            debug!(artist = %query.artist, title = %query.title, "dropping stale lyrics");
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<LyricsView> {
        self.view.subscribe()
    }

    pub fn snapshot(&self) -> LyricsView {
        self.view.borrow().clone()
    }

    #[cfg(test)]
    pub(crate) fn is_cached(&self, artist: &str, title: &str) -> bool {
        self.cache.contains(&LyricsKey::new(artist, title))
    }
}
