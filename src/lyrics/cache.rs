use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;

/// Case-insensitive identity of a song for lyrics purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LyricsKey {
    artist: String,
    title: String,
}

impl LyricsKey {
    pub fn new(artist: &str, title: &str) -> Self {
        Self {
            artist: artist.trim().to_lowercase(),
            title: title.trim().to_lowercase(),
        }
    }
}

/// Bounded store of lyrics that were actually found.
pub(super) struct LyricsCache {
    entries: Mutex<LruCache<LyricsKey, String>>,
}

impl LyricsCache {
    pub(super) fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<LyricsKey, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn get(&self, key: &LyricsKey) -> Option<String> {
        self.entries().get(key).cloned()
    }

    /// Blank lyrics are not worth remembering.
    pub(super) fn insert(&self, key: LyricsKey, lyrics: &str) {
        if lyrics.trim().is_empty() {
            return;
        }
        self.entries().put(key, lyrics.to_string());
    }

    #[cfg(test)]
    pub(super) fn contains(&self, key: &LyricsKey) -> bool {
        self.entries().contains(key)
    }

    pub(super) fn clear(&self) {
        self.entries().clear();
    }
}
