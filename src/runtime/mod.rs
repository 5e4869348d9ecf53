use std::env;
use std::path::Path;
use std::sync::{Arc, mpsc};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::artwork::{CoverArtLookup, MusicBrainzClient};
use crate::audio::{RodioBackend, SoundSession};
use crate::config::Settings;
use crate::library::scan;
use crate::lyrics::{LrclibClient, LyricsPipeline};
use crate::player::{PlaybackContext, bind_lyrics};

mod event_loop;
mod logging;
mod settings;

use event_loop::{EventLoopState, Services, UiEvent};

fn lyrics_pipeline(settings: &Settings) -> Option<Arc<LyricsPipeline>> {
    if !settings.lyrics.enabled {
        return None;
    }
    match LrclibClient::new(&settings.lyrics) {
        Ok(client) => Some(LyricsPipeline::new(
            Arc::new(client),
            settings.lyrics.cache_capacity,
        )),
        Err(err) => {
            warn!(%err, "lyrics client unavailable, lyrics disabled");
            None
        }
    }
}

fn artwork_lookup(settings: &Settings) -> Option<Arc<dyn CoverArtLookup>> {
    if !settings.artwork.enabled {
        return None;
    }
    match MusicBrainzClient::new(&settings.artwork) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            warn!(%err, "cover art client unavailable, lookups disabled");
            None
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let arg = env::args().nth(1);
    if arg.as_deref() == Some("--print-config") {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    if let Some(path) = logging::init(&settings.logging) {
        info!(log = %path.display(), "encore starting");
    }

    let dir = arg.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("encore-rt")
        .build()?;
    let _rt_guard = rt.enter();

    let tracks = scan(Path::new(&dir), &settings.library);
    info!(dir = %dir, tracks = tracks.len(), "library scanned");

    let audio_settings = settings.audio.clone();
    let session = SoundSession::spawn(
        move || RodioBackend::open_default(&audio_settings),
        &settings.audio,
    )?;
    let player = Arc::new(PlaybackContext::new(session));

    let lyrics = lyrics_pipeline(&settings);
    let _lyrics_binding = lyrics
        .as_ref()
        .map(|pipeline| bind_lyrics(&player, Arc::clone(pipeline)));

    let mut app = App::new(tracks);
    app.set_current_dir(dir.clone());

    let (events_tx, events_rx) = mpsc::channel::<UiEvent>();
    let services = Services::new(
        rt.handle().clone(),
        Arc::clone(&player),
        lyrics,
        artwork_lookup(&settings),
        events_tx,
    );

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = EventLoopState::default();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &services,
            &events_rx,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player.shutdown();
    info!("encore stopped");

    run_result
}
