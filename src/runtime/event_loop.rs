use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use crate::app::{App, Screen, TrackAction};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle, apply_control};
use crate::player::{AudioOutput, PlaybackEngine, load_album};
use crate::runtime::mpris_sync::update_mpris;
use crate::runtime::worker::{CatalogReply, CatalogRequest, CatalogWorker};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: handles input, catalog replies, device events,
/// drawing and MPRIS. Returns `Ok(())` when shutdown is requested.
#[allow(clippy::too_many_arguments)]
pub fn run<O: AudioOutput>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    engine: &mut PlaybackEngine<O>,
    worker: &CatalogWorker,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<()> {
    request_search(app, worker);

    loop {
        apply_replies(app, worker);

        while let Ok(cmd) = control_rx.try_recv() {
            if apply_control(cmd, engine) {
                info!("quit requested over MPRIS");
                return Ok(());
            }
        }

        engine.pump_events();
        let snapshot = engine.snapshot();
        app.follow(snapshot.index);
        update_mpris(mpris, &snapshot);

        terminal.draw(|f| ui::draw(f, app, &snapshot, settings))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, engine, worker, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn apply_replies(app: &mut App, worker: &CatalogWorker) {
    for reply in worker.replies() {
        match reply {
            CatalogReply::Search { seq, result } => {
                if !app.finish_search(seq, result) {
                    debug!(seq, "dropping superseded artist search");
                }
            }
            CatalogReply::Album { id, result } => {
                if !app.finish_album(id, result) {
                    debug!(id, "dropping stale album lookup");
                }
            }
        }
    }
}

fn request_search(app: &mut App, worker: &CatalogWorker) {
    let (seq, term) = app.begin_search();
    worker.request(CatalogRequest::Search { seq, term });
}

/// Returns true when the app should quit.
pub(crate) fn handle_key_event<O: AudioOutput>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    engine: &mut PlaybackEngine<O>,
    worker: &CatalogWorker,
    state: &mut EventLoopState,
) -> bool {
    if app.filter_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Enter => app.exit_filter_mode(),
            KeyCode::Down => app.next_album(),
            KeyCode::Up => app.prev_album(),
            KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c),
            _ => {}
        }
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match app.screen {
        Screen::Albums => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('/') => app.enter_filter_mode(),
            KeyCode::Char('r') => request_search(app, worker),
            KeyCode::Char('g') => {
                if state.pending_gg {
                    state.pending_gg = false;
                    app.first_album();
                } else {
                    state.pending_gg = true;
                }
            }
            KeyCode::Char('G') => app.last_album(),
            KeyCode::Char('j') | KeyCode::Down => app.next_album(),
            KeyCode::Char('k') | KeyCode::Up => app.prev_album(),
            KeyCode::Tab => {
                app.open_songs();
            }
            KeyCode::Enter => {
                if let Some(id) = app.open_selected_album() {
                    worker.request(CatalogRequest::Album(id));
                }
            }
            _ => {}
        },
        Screen::Songs | Screen::Album => {
            return handle_track_key(key, settings, app, engine, worker, state);
        }
    }
    false
}

fn handle_track_key<O: AudioOutput>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    engine: &mut PlaybackEngine<O>,
    worker: &CatalogWorker,
    state: &mut EventLoopState,
) -> bool {
    let playback = &settings.playback;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc | KeyCode::Backspace => {
            // Stop and forget this page's queue so nothing plays behind the album list.
            engine.load_queue(Vec::new(), None);
            app.back();
        }
        KeyCode::Char('r') => {
            if let Some(id) = app.retry_album() {
                worker.request(CatalogRequest::Album(id));
            }
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.first_track();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.last_track();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback_off();
            app.next_track();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback_off();
            app.prev_track();
        }
        KeyCode::Enter => activate_selected(app, engine),
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            if app.queue_on_screen() {
                engine.toggle();
            } else {
                activate_selected(app, engine);
            }
        }
        KeyCode::Char('l') if app.queue_on_screen() => {
            app.follow_playback_on();
            engine.next();
        }
        KeyCode::Char('h') if app.queue_on_screen() => {
            app.follow_playback_on();
            engine.prev();
        }
        KeyCode::Char('L') => seek_by(engine, playback.seek_step_seconds as f64),
        KeyCode::Char('H') => seek_by(engine, -(playback.seek_step_seconds as f64)),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            engine.set_volume(engine.volume() + playback.volume_step);
        }
        KeyCode::Char('-') => engine.set_volume(engine.volume() - playback.volume_step),
        KeyCode::Char('m') => {
            if engine.volume() > 0.0 {
                engine.set_volume(0.0);
            } else {
                engine.set_volume(playback.unmute_volume);
            }
        }
        KeyCode::Char('s') => engine.stop(),
        KeyCode::Char('K') => app.toggle_details_window(),
        _ => {}
    }
    false
}

fn activate_selected<O: AudioOutput>(app: &mut App, engine: &mut PlaybackEngine<O>) {
    let Some(action) = app.activate_selected(engine.index()) else {
        return;
    };
    app.follow_playback_on();
    match action {
        TrackAction::Toggle => engine.toggle(),
        TrackAction::PlayAt(i) => engine.play_at(i),
        TrackAction::Load(i) => {
            match app.album.ready() {
                Some(detail) if app.screen == Screen::Album => load_album(engine, detail, Some(i)),
                _ => engine.load_queue(app.tracks.clone(), Some(i)),
            }
            app.mark_queue_loaded();
        }
    }
}

/// Seek `delta` seconds from the current position, as a ratio of the known duration.
fn seek_by<O: AudioOutput>(engine: &mut PlaybackEngine<O>, delta: f64) {
    let snap = engine.snapshot();
    if snap.duration_seconds <= 0.0 {
        return;
    }
    engine.seek((snap.current_time_seconds + delta) / snap.duration_seconds);
}
