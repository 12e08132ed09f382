use std::sync::{Arc, mpsc};

use anyhow::Context;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::config;
use crate::engine::{EngineOptions, spawn_engine};
use crate::gateway::{CatalogueGateway, NeteaseClient};
use crate::lyrics::spawn_lyric_loader;
use crate::mpris::ControlCmd;

mod cli;
mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub use cli::Cli;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let (settings, config_problem) = settings::load_settings(cli.config.as_deref());
    logging::init(&settings.log)?;
    if let Some(problem) = config_problem {
        warn!("{problem}");
    }
    info!(base_url = %settings.gateway.base_url, "Starting muse");

    let client = NeteaseClient::new(&settings.gateway).context("building HTTP client")?;
    let source = startup::ListSource::from_cli(&cli);
    let (title, tracks) = startup::load_tracks(&client, &source).await?;
    let gateway: Arc<dyn CatalogueGateway> = Arc::new(client);

    let (audio_player, media_events) = AudioPlayer::new(&settings.audio);
    let quit = audio_player.quit_handle();
    let (engine, engine_task) = spawn_engine(
        audio_player,
        media_events,
        Arc::clone(&gateway),
        EngineOptions::from(&settings),
    );
    let (lyrics, lyric_task) = spawn_lyric_loader(gateway, engine.subscribe());

    let app = App::new(tracks, title, &settings.ui);
    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());
    let mut wiring = event_loop::Wiring {
        engine: engine.clone(),
        playback: engine.subscribe(),
        lyrics,
        quit: quit.clone(),
        mpris,
        control_tx,
        control_rx,
    };

    let ui_result = tokio::task::spawn_blocking(move || run_terminal(&settings, app, &mut wiring))
        .await
        .context("UI thread panicked");

    // Also reached when the UI failed before the user quit.
    let stop_audio = tokio::task::spawn_blocking(move || quit.quit_softly());
    engine.shutdown();
    let _ = engine_task.await;
    lyric_task.abort();
    let _ = stop_audio.await;
    info!("Bye");

    ui_result?
}

fn run_terminal(
    settings: &config::Settings,
    mut app: App,
    wiring: &mut event_loop::Wiring,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(&mut terminal, settings, &mut app, wiring, &mut state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
