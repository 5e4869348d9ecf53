use std::path::Path;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::infer::infer_from_filename;
use super::model::PlayableTrack;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            settings
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .any(|e| !e.is_empty() && e == ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[derive(Default)]
struct FileTags {
    title: Option<String>,
    artist: Option<String>,
    duration_seconds: f64,
}

fn read_tags(path: &Path) -> FileTags {
    let mut tags = FileTags::default();

    let tagged = match lofty::read_from_path(path) {
        Ok(tagged) => tagged,
        Err(err) => {
            debug!(path = %path.display(), %err, "no readable tags");
            return tags;
        }
    };

    tags.duration_seconds = tagged.properties().duration().as_secs_f64();
    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        tags.title = tag.title().map(|v| v.into_owned());
        tags.artist = tag.artist().map(|v| v.into_owned());
    }
    tags
}

/// Walk `dir` and turn every audio file into a `PlayableTrack`.
///
/// Track ids are paths relative to `dir`, so they stay stable across rescans.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<PlayableTrack> {
    let mut tracks: Vec<PlayableTrack> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let id = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();

        let mut tags = read_tags(path);
        if tags.title.as_deref().is_none_or(|t| t.trim().is_empty())
            && settings.infer_from_filename
        {
            if let Some(inferred) = infer_from_filename(&filename) {
                tags.title = Some(inferred.title);
                if tags.artist.is_none() {
                    tags.artist = inferred.artist;
                }
            }
        }

        tracks.push(PlayableTrack::from_record(
            id,
            path.to_string_lossy(),
            &filename,
            tags.title.as_deref(),
            tags.artist.as_deref(),
            tags.duration_seconds,
            None,
        ));
    }

    tracks.sort_by_cached_key(|t| {
        (
            t.artist.as_deref().unwrap_or_default().to_lowercase(),
            t.display_title.to_lowercase(),
        )
    });
    tracks
}
