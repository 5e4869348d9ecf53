//! Local title/artist inference for files that carry no tags.

/// Title and optional artist derived from a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredMetadata {
    pub title: String,
    pub artist: Option<String>,
}

/// Derive metadata from names like `03 - Artist - Title.mp3` or `Artist_-_Title.flac`.
///
/// Returns `None` when nothing but whitespace remains after cleanup.
pub fn infer_from_filename(filename: &str) -> Option<InferredMetadata> {
    let stem = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains(' ') => stem,
        _ => filename,
    };

    let cleaned = stem.replace('_', " ");
    let cleaned = strip_track_number(cleaned.trim());

    let (artist, title) = match cleaned.split_once(" - ") {
        Some((artist, title)) if !artist.trim().is_empty() && !title.trim().is_empty() => {
            (Some(artist.trim().to_string()), title.trim().to_string())
        }
        _ => (None, cleaned.trim().trim_matches('-').trim().to_string()),
    };

    if title.is_empty() {
        return None;
    }
    Some(InferredMetadata { title, artist })
}

/// Drop a leading `01 - `, `01. ` or `01 ` track number.
fn strip_track_number(s: &str) -> &str {
    let digits = s.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 3 {
        return s;
    }

    let rest = &s[digits..];
    for sep in [" - ", ". ", " "] {
        if let Some(after) = rest.strip_prefix(sep) {
            if !after.trim().is_empty() {
                return after.trim_start();
            }
        }
    }
    s
}
