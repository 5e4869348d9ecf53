use super::PlayableTrack;
use super::infer::infer_from_filename;

#[test]
fn from_record_prefers_title_and_falls_back_to_filename() {
    let titled = PlayableTrack::from_record(
        "1",
        "/music/a.mp3",
        "a.mp3",
        Some("  Song A "),
        Some("Artist A"),
        180.0,
        None,
    );
    assert_eq!(titled.display_title, "Song A");
    assert_eq!(titled.artist.as_deref(), Some("Artist A"));

    let untitled =
        PlayableTrack::from_record("2", "/music/b.mp3", "b.mp3", Some("   "), Some(""), 0.0, Some(""));
    assert_eq!(untitled.display_title, "b.mp3");
    assert_eq!(untitled.artist, None);
    assert_eq!(untitled.cover_art_url, None);
}

#[test]
fn duration_is_clamped_to_non_negative() {
    let t = PlayableTrack::new("1", "a.mp3", "A").with_duration_seconds(-3.0);
    assert_eq!(t.duration_seconds, 0.0);

    let t = PlayableTrack::new("1", "a.mp3", "A").with_duration_seconds(f64::NAN);
    assert_eq!(t.duration_seconds, 0.0);

    let t = PlayableTrack::new("1", "a.mp3", "A").with_duration_seconds(90.5);
    assert_eq!(t.duration().as_millis(), 90_500);
}

#[test]
fn placeholder_letter_uses_first_character_of_title() {
    assert_eq!(PlayableTrack::new("1", "x", "song a").placeholder_letter(), 'S');
    assert_eq!(PlayableTrack::new("1", "x", "  éclair").placeholder_letter(), 'É');
    assert_eq!(PlayableTrack::new("1", "x", "").placeholder_letter(), '?');
}

#[test]
fn set_cover_art_ignores_blank_urls() {
    let mut t = PlayableTrack::new("1", "x", "A");
    assert!(!t.set_cover_art(" "));
    assert_eq!(t.cover_art_url, None);

    assert!(t.set_cover_art("https://img/1.jpg"));
    assert_eq!(t.cover_art_url.as_deref(), Some("https://img/1.jpg"));
}

#[test]
fn infer_splits_artist_and_title() {
    let m = infer_from_filename("Artist - Title.mp3").unwrap();
    assert_eq!(m.artist.as_deref(), Some("Artist"));
    assert_eq!(m.title, "Title");

    let m = infer_from_filename("Daft_Punk_-_One_More_Time.flac").unwrap();
    assert_eq!(m.artist.as_deref(), Some("Daft Punk"));
    assert_eq!(m.title, "One More Time");
}

#[test]
fn infer_strips_leading_track_numbers() {
    let m = infer_from_filename("03 - Artist - Title.mp3").unwrap();
    assert_eq!(m.artist.as_deref(), Some("Artist"));
    assert_eq!(m.title, "Title");

    let m = infer_from_filename("01. Intro.ogg").unwrap();
    assert_eq!(m.artist, None);
    assert_eq!(m.title, "Intro");

    // A leading number that is part of the name stays.
    let m = infer_from_filename("2Pac - Changes.mp3").unwrap();
    assert_eq!(m.artist.as_deref(), Some("2Pac"));

    let m = infer_from_filename("1999.mp3").unwrap();
    assert_eq!(m.title, "1999");
}

#[test]
fn infer_returns_none_for_empty_names() {
    assert_eq!(infer_from_filename(" .mp3"), None);
    assert_eq!(infer_from_filename("___.wav"), None);
}
