//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. Which
//! player chrome is drawn follows `Visibility` exactly: the mini bar only when
//! `Mini`, the full view only when `Full`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::config::UiSettings;
use crate::library::PlayableTrack;
use crate::lyrics::{LyricsState, LyricsView};
use crate::player::PlayerState;

const LIBRARY_CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("gg/G", "top/bottom"),
    ("enter", "play selected song"),
    ("space/p", "play/pause"),
    ("x", "stop"),
    ("o", "now playing"),
    ("c", "find cover art"),
    ("q", "quit"),
];

const NOW_PLAYING_CONTROLS: &[(&str, &str)] = &[
    ("esc/o", "back to library"),
    ("space/p", "play/pause"),
    ("x", "stop"),
    ("r", "reload lyrics"),
    ("q", "quit"),
];

const ALERT_CONTROLS: &[(&str, &str)] = &[("enter/esc", "dismiss")];

fn controls_text(controls: &[(&str, &str)]) -> String {
    controls
        .iter()
        .map(|(key, action)| format!("[{key}] {action}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn play_state_text(player: &PlayerState) -> &'static str {
    if player.is_playing { "Playing" } else { "Paused" }
}

fn track_line(track: &PlayableTrack, ui: &UiSettings) -> String {
    let mut line = match track.artist.as_deref() {
        Some(artist) if ui.show_artist_in_list => format!("{artist} - {}", track.display_title),
        _ => track.display_title.clone(),
    };
    if track.duration_seconds > 0.0 {
        line.push_str(&format!("  [{}]", format_mmss(track.duration())));
    }
    line
}

/// Text shown in the lyrics pane. `None` means lyrics are turned off.
fn lyrics_text(view: Option<&LyricsView>) -> &str {
    match view.map(|v| &v.state) {
        None => "Lyrics are turned off.",
        Some(LyricsState::Idle) => "",
        Some(LyricsState::Loading) => "Loading lyrics...",
        Some(LyricsState::Found(text)) => text.as_str(),
        Some(LyricsState::NotFound) => "No lyrics found for this song.",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn left_padded() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    player: &PlayerState,
    lyrics: Option<&LyricsView>,
    ui_settings: &UiSettings,
) {
    let mini = player.visibility.shows_mini_player() && player.current_song.is_some();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(if mini { 3 } else { 0 }),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let full_song = player
        .current_song
        .as_ref()
        .filter(|_| player.visibility.shows_full_player());
    let controls = match full_song {
        Some(song) => {
            draw_now_playing(frame, chunks[1], app, player, song, lyrics);
            NOW_PLAYING_CONTROLS
        }
        None => {
            draw_library(frame, chunks[1], app, player, ui_settings);
            LIBRARY_CONTROLS
        }
    };

    if mini {
        if let Some(song) = &player.current_song {
            draw_mini_player(frame, chunks[2], player, song);
        }
    }

    let controls = if app.alert().is_some() {
        ALERT_CONTROLS
    } else {
        controls
    };
    let footer = Paragraph::new(controls_text(controls))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_padded()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);

    if let Some(message) = app.alert() {
        let popup_area = centered_rect_sized(60, 7, chunks[1]);
        frame.render_widget(Clear, popup_area);
        let popup = Paragraph::new(message)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" playback error ")
                    .padding(left_padded()),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(popup, popup_area);
    }
}

fn draw_library(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    player: &PlayerState,
    ui_settings: &UiSettings,
) {
    let playing_id = player.current_song.as_ref().map(|s| s.id.as_str());

    // Center the selected item when possible by creating a visible window.
    // Only build ListItems for the visible window.
    let total = app.tracks.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = app.selected.min(total.saturating_sub(1));
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let visible_items: Vec<ListItem> = app.tracks[start..end]
        .iter()
        .map(|track| {
            let line = track_line(track, ui_settings);
            if Some(track.id.as_str()) == playing_id {
                ListItem::new(format!("* {line}")).bold()
            } else {
                ListItem::new(format!("  {line}"))
            }
        })
        .collect();

    let title = match &app.current_dir {
        Some(dir) => format!(" tracks ({dir}) "),
        None => " tracks ".to_string(),
    };
    let list = List::new(visible_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if total > 0 {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_mini_player(frame: &mut Frame, area: Rect, player: &PlayerState, song: &PlayableTrack) {
    let artist = song.artist.as_deref().unwrap_or("Unknown artist");
    let text = format!(
        "{}  {} - {}",
        play_state_text(player),
        song.display_title,
        artist
    );
    let bar = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" now playing (o expands) ")
            .padding(left_padded()),
    );
    frame.render_widget(bar, area);
}

fn draw_now_playing(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    player: &PlayerState,
    song: &PlayableTrack,
    lyrics: Option<&LyricsView>,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(1)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(16), Constraint::Min(1)])
        .split(rows[0]);

    // Covers found after the song started live on the library record.
    let cover_url = app
        .track_by_id(&song.id)
        .and_then(|t| t.cover_art_url.as_deref())
        .or(song.cover_art_url.as_deref());
    let cover = match cover_url {
        Some(_) => Paragraph::new("\n[ cover ]").alignment(Alignment::Center),
        None => Paragraph::new(format!("\n\n{}", song.placeholder_letter()))
            .alignment(Alignment::Center)
            .bold(),
    };
    frame.render_widget(cover.block(Block::bordered()), top[0]);

    let mut details = vec![
        song.display_title.clone(),
        song.artist
            .clone()
            .unwrap_or_else(|| "Unknown artist".to_string()),
    ];
    let mut status = play_state_text(player).to_string();
    if song.duration_seconds > 0.0 {
        status.push_str(&format!(" • {}", format_mmss(song.duration())));
    }
    details.push(status);
    if let Some(url) = cover_url {
        details.push(format!("Cover: {url}"));
    }
    let details = Paragraph::new(details.join("\n"))
        .block(
            Block::bordered()
                .title(" now playing ")
                .padding(left_padded()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(details, top[1]);

    let lyrics = Paragraph::new(lyrics_text(lyrics))
        .block(Block::bordered().title(" lyrics ").padding(left_padded()))
        .wrap(Wrap { trim: false });
    frame.render_widget(lyrics, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lyrics_text_covers_every_state() {
        let view = |state| LyricsView {
            subject: None,
            state,
        };
        assert_eq!(lyrics_text(None), "Lyrics are turned off.");
        assert_eq!(lyrics_text(Some(&view(LyricsState::Idle))), "");
        assert_eq!(
            lyrics_text(Some(&view(LyricsState::Loading))),
            "Loading lyrics..."
        );
        assert_eq!(
            lyrics_text(Some(&view(LyricsState::NotFound))),
            "No lyrics found for this song."
        );
        assert_eq!(
            lyrics_text(Some(&view(LyricsState::Found("la la".into())))),
            "la la"
        );
    }

    #[test]
    fn track_line_shows_artist_and_duration() {
        let ui = UiSettings::default();
        let track = PlayableTrack::new("1", "/a.mp3", "Sinnerman")
            .with_artist("Nina Simone")
            .with_duration_seconds(622.4);
        assert_eq!(track_line(&track, &ui), "Nina Simone - Sinnerman  [10:22]");

        let plain = UiSettings {
            show_artist_in_list: false,
            ..UiSettings::default()
        };
        let untimed = PlayableTrack::new("2", "/b.mp3", "Untitled");
        assert_eq!(track_line(&untimed, &plain), "Untitled");
    }

    #[test]
    fn format_mmss_pads() {
        assert_eq!(format_mmss(Duration::from_secs(5)), "00:05");
        assert_eq!(format_mmss(Duration::from_secs(3600)), "60:00");
    }
}
