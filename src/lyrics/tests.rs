use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use tokio::sync::{oneshot, watch};
use tokio::time::timeout;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::cache::LyricsKey;
use super::client::strip_timestamps;
use super::{LrclibClient, LyricsLookup, LyricsPipeline, LyricsQuery, LyricsState, LyricsView};
use crate::config::LyricsSettings;
use crate::error::LyricsError;
use crate::library::PlayableTrack;

/// Lookup whose answers are released by the test, per title.
///
/// Titles without a gate answer immediately with `lyrics for <title>`;
/// titles containing `broken` fail.
#[derive(Default)]
struct GatedLookup {
    calls: Mutex<Vec<(String, String)>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<Option<String>>>>,
}

impl GatedLookup {
    fn gate(&self, title: &str) -> oneshot::Sender<Option<String>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(title.to_string(), rx);
        tx
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LyricsLookup for GatedLookup {
    async fn find_lyrics(&self, query: &LyricsQuery) -> Result<Option<String>, LyricsError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.artist.clone(), query.title.clone()));

        if query.title.contains("broken") {
            return Err(LyricsError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }

        let gate = self.gates.lock().unwrap().remove(&query.title);
        match gate {
            Some(gate) => Ok(gate.await.unwrap_or(None)),
            None => Ok(Some(format!("lyrics for {}", query.title))),
        }
    }
}

fn song(artist: &str, title: &str) -> PlayableTrack {
    PlayableTrack::new(title, format!("{title}.mp3"), title).with_artist(artist)
}

fn pipeline(lookup: &Arc<GatedLookup>) -> Arc<LyricsPipeline> {
    LyricsPipeline::new(lookup.clone(), 16)
}

async fn wait_view(
    rx: &mut watch::Receiver<LyricsView>,
    pred: impl FnMut(&LyricsView) -> bool,
) -> LyricsView {
    timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("lyrics view did not settle in time")
        .expect("lyrics pipeline dropped")
        .clone()
}

#[tokio::test]
async fn late_result_for_previous_song_is_discarded() {
    let lookup = Arc::new(GatedLookup::default());
    let release_a = lookup.gate("Song A");
    let release_b = lookup.gate("Song B");
    let pipeline = pipeline(&lookup);
    let mut rx = pipeline.subscribe();

    pipeline.track_changed(Some(&song("Artist A", "Song A")));
    pipeline.track_changed(Some(&song("Artist B", "Song B")));
    assert_eq!(pipeline.snapshot().state, LyricsState::Loading);

    release_b.send(Some("words of B".into())).unwrap();
    wait_view(&mut rx, |v| v.state == LyricsState::Found("words of B".into())).await;

    release_a.send(Some("words of A".into())).unwrap();
    timeout(Duration::from_secs(2), async {
        while !pipeline.is_cached("Artist A", "Song A") {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("late result was not cached");

    let view = pipeline.snapshot();
    assert_eq!(view.subject, Some(LyricsKey::new("Artist B", "Song B")));
    assert_eq!(view.state, LyricsState::Found("words of B".into()));
}

#[tokio::test]
async fn same_song_is_looked_up_once() {
    let lookup = Arc::new(GatedLookup::default());
    let pipeline = pipeline(&lookup);
    let mut rx = pipeline.subscribe();

    pipeline.track_changed(Some(&song("Artist A", "Song A")));
    wait_view(&mut rx, |v| matches!(v.state, LyricsState::Found(_))).await;

    pipeline.track_changed(Some(&song("Artist B", "Song B")));
    wait_view(&mut rx, |v| v.state == LyricsState::Found("lyrics for Song B".into())).await;

    // Different case and padding still hit the cache.
    pipeline.track_changed(Some(&song(" artist a ", "SONG A")));
    assert_eq!(
        pipeline.snapshot().state,
        LyricsState::Found("lyrics for Song A".into())
    );

    assert_eq!(lookup.calls().len(), 2);
}

#[tokio::test]
async fn repeated_requests_while_in_flight_share_one_lookup() {
    let lookup = Arc::new(GatedLookup::default());
    let release = lookup.gate("Song A");
    let pipeline = pipeline(&lookup);
    let mut rx = pipeline.subscribe();

    pipeline.track_changed(Some(&song("Artist A", "Song A")));
    tokio::task::yield_now().await;
    pipeline.track_changed(Some(&song("Artist A", "Song A")));

    release.send(Some("words".into())).unwrap();
    wait_view(&mut rx, |v| v.state == LyricsState::Found("words".into())).await;
    assert_eq!(lookup.calls().len(), 1);
}

#[tokio::test]
async fn missing_artist_or_title_skips_the_lookup() {
    let lookup = Arc::new(GatedLookup::default());
    let pipeline = pipeline(&lookup);

    pipeline.track_changed(Some(&PlayableTrack::new("1", "a.mp3", "Song A")));
    assert_eq!(pipeline.snapshot().state, LyricsState::NotFound);

    pipeline.track_changed(Some(&song("Artist A", "   ")));
    assert_eq!(pipeline.snapshot().state, LyricsState::NotFound);

    pipeline.track_changed(None);
    assert_eq!(pipeline.snapshot(), LyricsView::default());

    tokio::task::yield_now().await;
    assert!(lookup.calls().is_empty());
}

#[tokio::test]
async fn failures_and_misses_are_not_cached() {
    let lookup = Arc::new(GatedLookup::default());
    let pipeline = pipeline(&lookup);
    let mut rx = pipeline.subscribe();

    pipeline.track_changed(Some(&song("Artist", "broken song")));
    wait_view(&mut rx, |v| v.state == LyricsState::NotFound).await;
    assert!(!pipeline.is_cached("Artist", "broken song"));

    let release = lookup.gate("Silence");
    pipeline.track_changed(Some(&song("Artist", "Silence")));
    release.send(None).unwrap();
    wait_view(&mut rx, |v| {
        v.subject == Some(LyricsKey::new("Artist", "Silence")) && v.state == LyricsState::NotFound
    })
    .await;
    assert!(!pipeline.is_cached("Artist", "Silence"));

    // Both are retried on the next view.
    pipeline.track_changed(Some(&song("Artist", "Silence")));
    wait_view(&mut rx, |v| matches!(v.state, LyricsState::Found(_))).await;
    assert_eq!(lookup.calls().len(), 3);
}

#[tokio::test]
async fn clear_cache_forces_a_new_lookup() {
    let lookup = Arc::new(GatedLookup::default());
    let pipeline = pipeline(&lookup);
    let mut rx = pipeline.subscribe();

    pipeline.track_changed(Some(&song("Artist A", "Song A")));
    wait_view(&mut rx, |v| matches!(v.state, LyricsState::Found(_))).await;
    assert!(pipeline.is_cached("Artist A", "Song A"));

    pipeline.clear_cache();
    assert!(!pipeline.is_cached("Artist A", "Song A"));

    pipeline.track_changed(Some(&song("Artist A", "Song A")));
    assert_eq!(pipeline.snapshot().state, LyricsState::Loading);
    wait_view(&mut rx, |v| matches!(v.state, LyricsState::Found(_))).await;
    assert_eq!(lookup.calls().len(), 2);
}

#[test]
fn query_from_track_trims_and_requires_both_fields() {
    let query = LyricsQuery::from_track(&song("  Nina Simone ", " Sinnerman ")).unwrap();
    assert_eq!(query.artist, "Nina Simone");
    assert_eq!(query.title, "Sinnerman");
    assert_eq!(query.key(), LyricsKey::new("nina simone", "SINNERMAN"));

    assert!(LyricsQuery::from_track(&PlayableTrack::new("1", "a.mp3", "Sinnerman")).is_none());
    assert!(LyricsQuery::from_track(&song(" ", "Sinnerman")).is_none());
}

#[test]
fn strip_timestamps_keeps_only_the_words() {
    let synced = "[ar:Someone]\n[00:01.00]First line\n[00:05.20][00:30.00] Second line \n\n[00:09.99]";
    assert_eq!(strip_timestamps(synced), "First line\nSecond line");
    assert_eq!(strip_timestamps("no tags here"), "no tags here");
    assert_eq!(strip_timestamps("[broken tag"), "[broken tag");
}

fn lrclib_settings(server: &MockServer) -> LyricsSettings {
    LyricsSettings {
        base_url: format!("{}/", server.uri()),
        ..LyricsSettings::default()
    }
}

fn query(artist: &str, title: &str) -> LyricsQuery {
    LyricsQuery {
        artist: artist.into(),
        title: title.into(),
    }
}

#[tokio::test]
async fn lrclib_returns_plain_lyrics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get"))
        .and(query_param("artist_name", "Nina Simone"))
        .and(query_param("track_name", "Sinnerman"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "trackName": "Sinnerman",
            "artistName": "Nina Simone",
            "plainLyrics": "Oh sinnerman\nwhere you gonna run to\n",
            "syncedLyrics": "[00:01.00]ignored"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = LrclibClient::new(&lrclib_settings(&server)).unwrap();
    let lyrics = client
        .find_lyrics(&query("Nina Simone", "Sinnerman"))
        .await
        .unwrap();
    assert_eq!(lyrics.as_deref(), Some("Oh sinnerman\nwhere you gonna run to"));
}

#[tokio::test]
async fn lrclib_falls_back_to_synced_lyrics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plainLyrics": null,
            "syncedLyrics": "[00:01.00]la\n[00:02.00]la la"
        })))
        .mount(&server)
        .await;

    let client = LrclibClient::new(&lrclib_settings(&server)).unwrap();
    let lyrics = client.find_lyrics(&query("A", "B")).await.unwrap();
    assert_eq!(lyrics.as_deref(), Some("la\nla la"));
}

#[tokio::test]
async fn lrclib_maps_404_to_none_and_errors_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get"))
        .and(query_param("track_name", "Unknown"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/get"))
        .and(query_param("track_name", "Down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = LrclibClient::new(&lrclib_settings(&server)).unwrap();
    assert_eq!(client.find_lyrics(&query("A", "Unknown")).await.unwrap(), None);

    let err = client.find_lyrics(&query("A", "Down")).await.unwrap_err();
    assert!(matches!(err, LyricsError::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));
}
