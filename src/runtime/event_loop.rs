use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::api::ApiClient;
use crate::app::{App, Pane};
use crate::config;
use crate::preview::{Notice, PreviewPlayer};
use crate::ui;

use super::workers::{self, UiEvent};

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pending_gg: bool,
    /// Query of the newest search; older results are dropped.
    pending_search: Option<String>,
}

/// Main terminal event loop: handles input, worker results and preview
/// notices, and redraws. Returns `Ok(())` when the user quits.
#[allow(clippy::too_many_arguments)]
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    client: &ApiClient,
    player: &PreviewPlayer,
    notice_rx: &Receiver<Notice>,
    events_tx: &Sender<UiEvent>,
    events_rx: &Receiver<UiEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = EventLoopState::default();

    loop {
        while let Ok(notice) = notice_rx.try_recv() {
            app.push_notice(notice.to_string());
        }
        while let Ok(ev) = events_rx.try_recv() {
            handle_ui_event(ev, app, &mut state);
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.comments))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, client, player, events_tx, &mut state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_ui_event(ev: UiEvent, app: &mut App, state: &mut EventLoopState) {
    match ev {
        UiEvent::CommentsLoaded {
            seq,
            result: Ok(comments),
        } => {
            if app.accept_comments(seq, comments) {
                debug!("loaded comments (fetch {seq})");
            } else {
                debug!("dropping comments from superseded fetch {seq}");
            }
        }
        UiEvent::CommentsLoaded {
            seq,
            result: Err(e),
        } => {
            if !app.comments_load_failed(seq) {
                return;
            }
            app.push_notice(
                Notice::LoadFailed {
                    what: "comments".to_string(),
                    reason: e.to_string(),
                }
                .to_string(),
            );
        }
        UiEvent::LikeSettled { ticket, result } => {
            let rolled_back = app.settle_like(ticket, result.is_ok());
            if let (true, Err(e)) = (rolled_back, result) {
                app.push_notice(
                    Notice::LikeFailed {
                        reason: e.to_string(),
                    }
                    .to_string(),
                );
            }
        }
        UiEvent::SearchFinished { query, result } => {
            if state.pending_search.as_deref() != Some(query.as_str()) {
                debug!("dropping results of superseded search '{query}'");
                return;
            }
            state.pending_search = None;
            match result {
                Ok(tracks) if tracks.is_empty() => {
                    app.push_notice(format!("No tracks match '{query}'"));
                }
                Ok(tracks) => app.show_search_results(query, tracks),
                Err(e) => app.push_notice(
                    Notice::LoadFailed {
                        what: format!("search results for '{query}'"),
                        reason: e.to_string(),
                    }
                    .to_string(),
                ),
            }
        }
    }
}

/// Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    client: &ApiClient,
    player: &PreviewPlayer,
    events_tx: &Sender<UiEvent>,
    state: &mut EventLoopState,
) -> bool {
    if app.search_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.search_mode = false,
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Enter => {
                if let Some(query) = app.submit_search() {
                    app.push_notice(format!("Searching for '{query}'…"));
                    state.pending_search = Some(query.clone());
                    workers::search_tracks(client, query, events_tx);
                }
            }
            KeyCode::Char(c) if !c.is_control() => app.push_search_char(c),
            _ => {}
        }
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                app.select_first();
                state.pending_gg = false;
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.select_last(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('o') => app.cycle_sort(),
        KeyCode::Enter | KeyCode::Char(' ') => match app.selected_track() {
            Some(track) => player.request(track.clone()),
            None => app.push_notice("No track selected"),
        },
        KeyCode::Char('x') => player.stop(),
        KeyCode::Char('f') if app.focus == Pane::Comments => {
            if let Some((ticket, comment_id, liked)) = app.begin_like_toggle() {
                workers::send_like(client, ticket, comment_id, liked, events_tx);
            }
        }
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Esc => {
            if app.search_results_for.is_some() {
                state.pending_search = None;
                app.clear_search();
            }
        }
        KeyCode::Char('R') => {
            let seq = app.begin_comments_load();
            workers::fetch_comments(client, &app.post.id, seq, events_tx);
        }
        _ => {}
    }

    false
}
