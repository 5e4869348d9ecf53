use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::app::App;
use crate::artwork::CoverArtLookup;
use crate::config;
use crate::library::PlayableTrack;
use crate::lyrics::LyricsPipeline;
use crate::player::{PlaybackContext, PlayerState};
use crate::ui;

/// Results of background work, delivered back to the UI thread.
#[derive(Debug)]
pub enum UiEvent {
    PlaybackFailed {
        title: String,
        error: String,
    },
    CoverArt {
        id: String,
        result: Result<Option<String>, String>,
    },
}

/// Transport requests from the keyboard, run strictly in the order they were made.
#[derive(Debug)]
enum PlayerCommand {
    Play(PlayableTrack),
    TogglePlayPause,
    Stop,
}

/// Everything the event loop dispatches to.
pub struct Services {
    handle: Handle,
    player: Arc<PlaybackContext>,
    lyrics: Option<Arc<LyricsPipeline>>,
    artwork: Option<Arc<dyn CoverArtLookup>>,
    events: mpsc::Sender<UiEvent>,
    commands: UnboundedSender<PlayerCommand>,
}

impl Services {
    /// Starts the transport dispatcher on `handle`. It stops once `Services` is dropped.
    pub fn new(
        handle: Handle,
        player: Arc<PlaybackContext>,
        lyrics: Option<Arc<LyricsPipeline>>,
        artwork: Option<Arc<dyn CoverArtLookup>>,
        events: mpsc::Sender<UiEvent>,
    ) -> Self {
        let (commands, rx) = unbounded_channel();
        handle.spawn(dispatch_player_commands(
            rx,
            Arc::clone(&player),
            events.clone(),
        ));

        Self {
            handle,
            player,
            lyrics,
            artwork,
            events,
            commands,
        }
    }

    fn send(&self, cmd: PlayerCommand) {
        if self.commands.send(cmd).is_err() {
            warn!("player dispatcher is gone, dropping transport request");
        }
    }

    fn play(&self, track: PlayableTrack) {
        self.send(PlayerCommand::Play(track));
    }

    fn toggle_play_pause(&self) {
        self.send(PlayerCommand::TogglePlayPause);
    }

    fn stop(&self) {
        self.send(PlayerCommand::Stop);
    }

    /// Drop cached lyrics and look the shown track up again.
    fn reload_lyrics(&self, track: Option<&PlayableTrack>) {
        let Some(lyrics) = self.lyrics.as_ref() else {
            return;
        };
        let _runtime = self.handle.enter();
        lyrics.clear_cache();
        lyrics.track_changed(track);
    }

    fn find_cover_art(&self, track: &PlayableTrack) {
        let Some(artwork) = self.artwork.clone() else {
            debug!("cover art lookup is disabled");
            return;
        };
        let Some(artist) = track.artist.clone() else {
            debug!(id = %track.id, "no artist, skipping cover art lookup");
            return;
        };

        let id = track.id.clone();
        let title = track.display_title.clone();
        let events = self.events.clone();
        self.handle.spawn(async move {
            let result = artwork
                .find_cover_art(&artist, &title)
                .await
                .map_err(|err| err.to_string());
            let _ = events.send(UiEvent::CoverArt { id, result });
        });
    }
}

/// Awaits each transport call before taking the next request.
async fn dispatch_player_commands(
    mut commands: UnboundedReceiver<PlayerCommand>,
    player: Arc<PlaybackContext>,
    events: mpsc::Sender<UiEvent>,
) {
    while let Some(cmd) = commands.recv().await {
        match cmd {
            PlayerCommand::Play(track) => {
                let title = track.display_title.clone();
                if let Err(err) = player.play_audio(track).await {
                    let _ = events.send(UiEvent::PlaybackFailed {
                        title,
                        error: err.to_string(),
                    });
                }
            }
            PlayerCommand::TogglePlayPause => player.toggle_play_pause().await,
            PlayerCommand::Stop => player.stop_audio().await,
        }
    }
    debug!("player dispatcher stopped");
}

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

fn handle_ui_event(event: UiEvent, app: &mut App) {
    match event {
        UiEvent::PlaybackFailed { title, error } => {
            app.show_alert(format!("Could not play \"{title}\".\n{error}"));
        }
        UiEvent::CoverArt { id, result } => match result {
            Ok(Some(url)) => {
                info!(id = %id, url = %url, "cover art found");
                app.set_cover_art(&id, url);
            }
            Ok(None) => info!(id = %id, "no cover art found"),
            Err(error) => warn!(id = %id, %error, "cover art lookup failed"),
        },
    }
}

/// Main terminal event loop: handles input, background results and drawing.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    services: &Services,
    events: &mpsc::Receiver<UiEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(event) = events.try_recv() {
            handle_ui_event(event, app);
        }

        let player = services.player.snapshot();
        let lyrics = services.lyrics.as_ref().map(|p| p.snapshot());
        terminal.draw(|f| ui::draw(f, app, &player, lyrics.as_ref(), &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, &player, services, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    player: &PlayerState,
    services: &Services,
    state: &mut EventLoopState,
) -> bool {
    // The alert blocks everything else until dismissed.
    if app.alert().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_alert();
        }
        return false;
    }

    if player.visibility.shows_full_player() {
        state.pending_gg = false;
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc | KeyCode::Char('o') => services.player.hide_now_playing(),
            KeyCode::Char('p') | KeyCode::Char(' ') => services.toggle_play_pause(),
            KeyCode::Char('x') => services.stop(),
            KeyCode::Char('r') => services.reload_lyrics(player.current_song.as_ref()),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
            return false;
        }
        KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            if let Some(track) = app.selected_track() {
                services.play(track.clone());
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => services.toggle_play_pause(),
        KeyCode::Char('x') => services.stop(),
        KeyCode::Char('o') => services.player.show_now_playing(),
        KeyCode::Char('c') => {
            if let Some(track) = app.selected_track() {
                services.find_cover_art(track);
            }
        }
        _ => {}
    }

    // g pending should clear on any other key
    state.pending_gg = false;
    false
}
