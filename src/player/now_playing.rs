use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::library::PlayableTrack;
use crate::lyrics::LyricsPipeline;

use super::context::PlaybackContext;

/// Feed the track shown in the full player into the lyrics pipeline.
///
/// The pipeline is told whenever the full view opens or its track changes.
/// The task ends when the context is dropped.
pub fn bind_lyrics(context: &PlaybackContext, pipeline: Arc<LyricsPipeline>) -> JoinHandle<()> {
    let mut state = context.subscribe();

    tokio::spawn(async move {
        let mut bound: Option<PlayableTrack> = None;
        loop {
            let shown = {
                let state = state.borrow_and_update();
                if state.visibility.shows_full_player() {
                    state.current_song.clone()
                } else {
                    None
                }
            };

            if shown.is_none() {
                bound = None;
            } else if shown != bound {
                pipeline.track_changed(shown.as_ref());
                bound = shown;
            }

            if state.changed().await.is_err() {
                break;
            }
        }
    })
}
