use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::api::Post;
use crate::comments::{Comment, SortPolicy};
use crate::preview::{PreviewInfo, PreviewState, Track};

fn comment(id: &str, parent: Option<&str>, created_at: i64, likes: u64) -> Comment {
    Comment {
        id: Some(id.to_string()),
        parent_id: parent.map(str::to_string),
        created_at,
        likes_count: likes,
        content: format!("comment {id}"),
        ..Comment::default()
    }
}

fn post_with_tracks(ids: &[&str]) -> Post {
    Post {
        id: "p1".to_string(),
        title: "A post".to_string(),
        author: None,
        tracks: ids.iter().map(|id| Track::stub(id)).collect(),
    }
}

fn app_with_comments() -> App {
    let mut app = App::new(post_with_tracks(&["t1", "t2"]), SortPolicy::Newest);
    app.set_comments(vec![
        comment("a", None, 100, 1),
        comment("b", None, 300, 9),
        comment("c", None, 200, 5),
        comment("a1", Some("a"), 150, 0),
    ]);
    app
}

fn line_ids(app: &App) -> Vec<String> {
    app.comment_lines()
        .iter()
        .filter_map(|l| l.node.id().map(str::to_string))
        .collect()
}

fn selected_id(app: &App) -> Option<String> {
    app.selected_comment_node()
        .and_then(|n| n.id().map(str::to_string))
}

#[test]
fn new_app_shows_post_tracks() {
    let app = App::new(post_with_tracks(&["t1", "t2"]), SortPolicy::Newest);
    assert_eq!(app.tracks.len(), 2);
    assert_eq!(app.focus, Pane::Comments);
    assert!(app.comment_lines().is_empty());
    assert_eq!(app.preview_state(), PreviewState::Idle);
}

#[test]
fn set_comments_builds_sorted_threads() {
    let app = app_with_comments();
    assert_eq!(line_ids(&app), vec!["b", "c", "a", "a1"]);
}

#[test]
fn cycle_sort_keeps_selected_comment() {
    let mut app = app_with_comments();
    app.selected_comment = 2;
    assert_eq!(selected_id(&app).as_deref(), Some("a"));

    app.cycle_sort();
    assert_eq!(app.sort, SortPolicy::Oldest);
    assert_eq!(line_ids(&app), vec!["a", "a1", "c", "b"]);
    assert_eq!(selected_id(&app).as_deref(), Some("a"));

    app.cycle_sort();
    assert_eq!(app.sort, SortPolicy::Popular);
    assert_eq!(line_ids(&app), vec!["b", "c", "a", "a1"]);
    assert_eq!(selected_id(&app).as_deref(), Some("a"));
}

#[test]
fn next_and_prev_wrap_in_focused_pane() {
    let mut app = app_with_comments();
    app.prev();
    assert_eq!(app.selected_comment, 3);
    app.next();
    assert_eq!(app.selected_comment, 0);

    app.toggle_focus();
    assert_eq!(app.focus, Pane::Tracks);
    app.next();
    app.next();
    assert_eq!(app.selected_track, 0);
    assert_eq!(app.selected_comment, 0);

    app.select_last();
    assert_eq!(app.selected_track, 1);
    app.select_first();
    assert_eq!(app.selected_track, 0);
}

#[test]
fn navigation_on_empty_pane_is_noop() {
    let mut app = App::new(post_with_tracks(&[]), SortPolicy::Newest);
    app.next();
    app.prev();
    app.toggle_focus();
    app.next();
    assert_eq!(app.selected_comment, 0);
    assert_eq!(app.selected_track, 0);
    assert!(app.selected_track().is_none());
}

#[test]
fn like_toggle_is_applied_locally_and_kept_on_success() {
    let mut app = app_with_comments();
    app.selected_comment = 2;

    let (ticket, id, liked) = app.begin_like_toggle().unwrap();
    assert_eq!(id, "a");
    assert!(liked);
    assert!(app.like_pending("a"));

    let node = app.selected_comment_node().unwrap();
    assert!(node.comment.liked);
    assert_eq!(node.comment.likes_count, 2);

    assert!(!app.settle_like(ticket, true));
    assert!(!app.like_pending("a"));
    let node = app.selected_comment_node().unwrap();
    assert!(node.comment.liked);
    assert_eq!(node.comment.likes_count, 2);
}

#[test]
fn failed_like_rolls_back() {
    let mut app = app_with_comments();
    app.selected_comment = 0;

    let (ticket, id, _) = app.begin_like_toggle().unwrap();
    assert_eq!(id, "b");
    assert_eq!(app.selected_comment_node().unwrap().comment.likes_count, 10);

    assert!(app.settle_like(ticket, false));
    let node = app.selected_comment_node().unwrap();
    assert!(!node.comment.liked);
    assert_eq!(node.comment.likes_count, 9);
}

#[test]
fn like_under_popular_sort_can_reorder_threads() {
    let mut app = app_with_comments();
    app.cycle_sort();
    app.cycle_sort();
    assert_eq!(app.sort, SortPolicy::Popular);

    // Equal likes keep chronological order, so "a" overtakes "c" at 5.
    app.set_comments(vec![
        comment("a", None, 100, 4),
        comment("b", None, 300, 9),
        comment("c", None, 200, 5),
    ]);
    assert_eq!(line_ids(&app), vec!["b", "c", "a"]);

    app.selected_comment = 2;
    let _ = app.begin_like_toggle().unwrap();
    assert_eq!(line_ids(&app), vec!["b", "a", "c"]);
    assert_eq!(selected_id(&app).as_deref(), Some("a"));
}

#[test]
fn superseded_like_failure_is_ignored() {
    let mut app = app_with_comments();
    app.selected_comment = 2;

    let (first, _, _) = app.begin_like_toggle().unwrap();
    let (second, _, liked) = app.begin_like_toggle().unwrap();
    assert!(!liked);

    assert!(!app.settle_like(first, false));
    assert!(app.settle_like(second, false));

    let node = app.selected_comment_node().unwrap();
    assert!(node.comment.liked);
    assert_eq!(node.comment.likes_count, 2);
}

#[test]
fn fresh_snapshot_drops_pending_likes() {
    let mut app = app_with_comments();
    app.selected_comment = 2;
    let _ = app.begin_like_toggle().unwrap();

    app.set_comments(vec![comment("a", None, 100, 1)]);
    assert!(!app.like_pending("a"));
    assert_eq!(app.selected_comment_node().unwrap().comment.likes_count, 1);
}

#[test]
fn older_comment_fetch_arriving_late_is_dropped() {
    let mut app = App::new(post_with_tracks(&[]), SortPolicy::Newest);
    let first = app.begin_comments_load();
    let second = app.begin_comments_load();
    assert!(second > first);

    assert!(app.accept_comments(second, vec![comment("new", None, 200, 0)]));
    assert!(!app.loading_comments);

    // The first reload answers last with an older snapshot.
    assert!(!app.accept_comments(first, vec![comment("old", None, 100, 0)]));
    assert_eq!(line_ids(&app), vec!["new"]);
}

#[test]
fn superseded_comment_fetch_failure_keeps_loading() {
    let mut app = app_with_comments();
    let first = app.begin_comments_load();
    let second = app.begin_comments_load();

    assert!(!app.comments_load_failed(first));
    assert!(app.loading_comments);
    assert_eq!(line_ids(&app), vec!["b", "c", "a", "a1"]);

    assert!(app.comments_load_failed(second));
    assert!(!app.loading_comments);
}

#[test]
fn search_results_replace_tracks_until_cleared() {
    let mut app = app_with_comments();
    app.enter_search_mode();
    for c in " blue ".chars() {
        app.push_search_char(c);
    }
    app.pop_search_char();
    assert_eq!(app.submit_search().as_deref(), Some("blue"));
    assert!(!app.search_mode);

    app.show_search_results("blue".to_string(), vec![Track::stub("s1")]);
    assert_eq!(app.focus, Pane::Tracks);
    assert_eq!(app.search_results_for.as_deref(), Some("blue"));
    assert_eq!(app.selected_track().map(|t| t.id.as_str()), Some("s1"));

    app.clear_search();
    assert!(app.search_results_for.is_none());
    assert_eq!(app.tracks.len(), 2);
}

#[test]
fn blank_search_submits_nothing() {
    let mut app = app_with_comments();
    app.enter_search_mode();
    app.push_search_char(' ');
    assert_eq!(app.submit_search(), None);
}

#[test]
fn notices_expire() {
    let mut app = app_with_comments();
    assert!(app.current_notice(Duration::from_secs(5)).is_none());

    app.push_notice("saved");
    assert_eq!(app.current_notice(Duration::from_secs(5)), Some("saved"));
    assert!(app.current_notice(Duration::ZERO).is_none());
}

#[test]
fn preview_state_reads_shared_handle() {
    let mut app = app_with_comments();
    let handle = Arc::new(Mutex::new(PreviewInfo::default()));
    app.set_preview_handle(handle.clone());

    {
        let mut info = handle.lock().unwrap();
        info.state = PreviewState::Playing("t1".to_string());
        info.label = Some("Track t1".to_string());
    }

    assert_eq!(app.preview_state(), PreviewState::Playing("t1".to_string()));
    assert_eq!(app.preview_label().as_deref(), Some("Track t1"));
}
