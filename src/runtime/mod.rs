use std::env;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioOutput;
use crate::catalog::CatalogClient;
use crate::logging;
use crate::mpris::ControlCmd;
use crate::player::PlaybackEngine;

mod event_loop;
mod mpris_sync;
mod settings;
mod worker;

pub fn run() -> Result<()> {
    let (settings, warning) = settings::load_settings();

    // Keep the guard alive for the whole session so buffered lines get flushed.
    let _log_guard = match logging::init(&settings.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("encore: logging disabled: {e:#}");
            None
        }
    };
    if let Some(warning) = warning {
        warn!("{warning}");
    }

    let artist = settings::resolve_artist(env::args().skip(1), &settings.catalog.artist);
    info!(%artist, "starting encore");

    let (output, events) =
        RodioOutput::open(&settings.audio).context("failed to open audio output")?;
    let mut engine = PlaybackEngine::new(output, events, settings.playback.default_volume);

    let client = CatalogClient::new(&settings.catalog).context("failed to build catalog client")?;
    let worker = worker::CatalogWorker::spawn(client);

    let mut app = App::new(artist);
    app.follow_playback = settings.ui.follow_playback;

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut engine,
        &worker,
        &mpris,
        &control_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    engine.stop();
    info!("encore exiting");
    run_result
}
