//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, Pane};
use crate::comments::{ThreadLine, relative_age, snippet};
use crate::config::{CommentSettings, UiSettings};
use crate::preview::{PreviewState, Track};

const CONTROLS: [(&str, &str); 10] = [
    ("j/k", "up/down"),
    ("gg/G", "top/bottom"),
    ("tab", "switch pane"),
    ("o", "sort"),
    ("enter/space", "play/pause preview"),
    ("x", "stop"),
    ("f", "like"),
    ("/", "search tracks"),
    ("R", "reload"),
    ("q", "quit"),
];

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Visible slice `[start, end)` of a list of `total` rows in `height` lines,
/// keeping `selected` centred when possible. The third value is the
/// selected row's position inside the slice.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn preview_status(app: &App) -> String {
    let label = app.preview_label().unwrap_or_default();
    match app.preview_state() {
        PreviewState::Idle => "Preview: idle".to_string(),
        PreviewState::Loading(_) => format!("Loading: {label}"),
        PreviewState::Playing(_) => format!("Playing: {label}"),
        PreviewState::Paused(_) => format!("Paused: {label}"),
    }
}

fn track_marker(track: &Track, state: &PreviewState) -> &'static str {
    if state.track_id() != Some(track.id.as_str()) {
        return "  ";
    }
    match state {
        PreviewState::Playing(_) => "▶ ",
        PreviewState::Paused(_) => "⏸ ",
        PreviewState::Loading(_) => "… ",
        PreviewState::Idle => "  ",
    }
}

/// "Artist - Name · Album (3:25)", skipping unknown parts.
fn track_row(track: &Track) -> String {
    let mut row = track.label();
    if let Some(album) = &track.album {
        row.push_str(&format!(" · {album}"));
    }
    if let Some(ms) = track.duration_ms {
        let secs = ms / 1000;
        row.push_str(&format!(" ({}:{:02})", secs / 60, secs % 60));
    }
    row
}

fn comment_row(
    app: &App,
    line: &ThreadLine<'_>,
    settings: &CommentSettings,
    now_ms: i64,
    width: usize,
) -> String {
    let c = &line.node.comment;
    let indent = " ".repeat(line.depth * settings.indent);
    let author = c.author.as_deref().unwrap_or("anonymous");

    let mut head = format!("{indent}{author}");
    if settings.show_age {
        head.push_str(&format!(" · {}", relative_age(c.created_at, now_ms)));
    }
    let heart = if c.liked { "♥" } else { "♡" };
    head.push_str(&format!(" · {heart} {}", c.likes_count));
    if line.node.id().is_some_and(|id| app.like_pending(id)) {
        head.push('*');
    }
    head.push_str(": ");

    let room = width.saturating_sub(head.chars().count()).max(8);
    format!("{head}{}", snippet(&c.content, room))
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

fn draw_comments(frame: &mut Frame, area: Rect, app: &App, settings: &CommentSettings) {
    let lines = app.comment_lines();
    let title = if app.loading_comments {
        " comments (loading…) ".to_string()
    } else {
        format!(" comments ({}) · {} ", lines.len(), app.sort.label())
    };
    let block = pane_block(title, app.focus == Pane::Comments);

    if lines.is_empty() {
        let text = if app.loading_comments {
            "Loading comments…"
        } else {
            "No comments yet."
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let now_ms = chrono::Utc::now().timestamp_millis();
    let width = area.width.saturating_sub(4) as usize;
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, sel) = visible_window(lines.len(), height, app.selected_comment);

    let items: Vec<ListItem> = lines[start..end]
        .iter()
        .map(|line| ListItem::new(comment_row(app, line, settings, now_ms, width)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if app.focus == Pane::Comments {
        state.select(Some(sel));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_tracks(frame: &mut Frame, area: Rect, app: &App) {
    let title = match &app.search_results_for {
        Some(q) => format!(" results for '{q}' (esc: back) "),
        None => " tracks ".to_string(),
    };
    let block = pane_block(title, app.focus == Pane::Tracks);

    if app.tracks.is_empty() {
        frame.render_widget(Paragraph::new("No tracks attached.").block(block), area);
        return;
    }

    let preview = app.preview_state();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, sel) = visible_window(app.tracks.len(), height, app.selected_track);

    let items: Vec<ListItem> = app.tracks[start..end]
        .iter()
        .map(|t| ListItem::new(format!("{}{}", track_marker(t, &preview), track_row(t))))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if app.focus == Pane::Tracks {
        state.select(Some(sel));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, comments: &CommentSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" guild ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();
        match &app.post.author {
            Some(author) => parts.push(format!(" POST: {} by {author}", app.post.title)),
            None => parts.push(format!(" POST: {}", app.post.title)),
        }
        parts.push(format!("SORT: {}", app.sort.label()));
        if app.search_mode {
            parts.push(format!("SEARCH: {}_", app.search_query));
        }
        parts.push(preview_status(app));
        parts.join(" • ")
    };
    let status_par = Paragraph::new(status)
        .block(Block::bordered().title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[2]);
    draw_comments(frame, panes[0], app, comments);
    draw_tracks(frame, panes[1], app);

    // Toast
    let ttl = Duration::from_millis(ui_settings.notice_ttl_ms);
    if let Some(notice) = app.current_notice(ttl) {
        frame.render_widget(Paragraph::new(format!(" {notice}")).italic(), chunks[3]);
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
