use std::env;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::GuildError;
use crate::logging;
use crate::preview::{BrowserOpener, Notice, PreviewPlayer};

mod event_loop;
mod settings;
mod startup;
mod workers;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();

    let post_id = env::args()
        .nth(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GuildError::InvalidInput("usage: guild <post-id>".to_string()))?;

    match logging::init(&settings.log) {
        Ok(path) => info!("guild starting, logging to {}", path.display()),
        // Not fatal; the TUI works without a log file.
        Err(e) => eprintln!("guild: logging disabled: {e}"),
    }
    if let Some(w) = &config_warning {
        warn!("{w}");
    }

    let client = ApiClient::new(&settings.api);
    let (events_tx, events_rx) = mpsc::channel::<workers::UiEvent>();
    let (notice_tx, notice_rx) = mpsc::channel::<Notice>();

    let mut app = startup::open_post(&client, &post_id, &settings, &events_tx);
    if let Some(w) = config_warning {
        app.push_notice(w);
    }

    let player = PreviewPlayer::new(
        client.clone(),
        BrowserOpener,
        notice_tx,
        settings.preview.clone(),
    );
    app.set_preview_handle(player.preview_handle());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &client,
        &player,
        &notice_rx,
        &events_tx,
        &events_rx,
    );

    player.quit();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("guild exiting");
    run_result
}
