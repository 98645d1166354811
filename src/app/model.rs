//! Application model types: `App` and `Pane`.
//!
//! The `App` struct holds the post being viewed, its comment threads, the
//! track listing and the UI selection state.

use std::time::{Duration, Instant};

use crate::api::Post;
use crate::comments::{
    Comment, SortPolicy, ThreadLine, TreeComment, build_tree, sort_threads, thread_lines,
};
use crate::optimistic::{OptimisticStore, OptimisticTicket};
use crate::preview::{PreviewHandle, PreviewState, Track};

/// `(liked, likes_count)` as shown for a comment.
pub type LikeState = (bool, u64);
pub type LikeTicket = OptimisticTicket<String, LikeState>;

/// Which list receives navigation keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Comments,
    Tracks,
}

/// The main application model.
pub struct App {
    pub post: Post,
    comments: Vec<Comment>,
    likes: OptimisticStore<String, LikeState>,
    pub sort: SortPolicy,
    threads: Vec<TreeComment>,
    /// Row in `comment_lines()`.
    pub selected_comment: usize,

    pub tracks: Vec<Track>,
    pub selected_track: usize,
    /// Query whose results are in `tracks`; `None` when showing the post's tracks.
    pub search_results_for: Option<String>,

    pub focus: Pane,
    pub search_mode: bool,
    pub search_query: String,

    pub preview_handle: Option<PreviewHandle>,
    pub loading_comments: bool,
    /// Sequence number of the newest comment fetch.
    comments_seq: u64,
    notice: Option<(String, Instant)>,
}

impl App {
    /// Create a new `App` for `post`, ranking threads by `sort`.
    pub fn new(post: Post, sort: SortPolicy) -> Self {
        let tracks = post.tracks.clone();
        Self {
            post,
            comments: Vec::new(),
            likes: OptimisticStore::new(),
            sort,
            threads: Vec::new(),
            selected_comment: 0,
            tracks,
            selected_track: 0,
            search_results_for: None,
            focus: Pane::Comments,
            search_mode: false,
            search_query: String::new(),
            preview_handle: None,
            loading_comments: false,
            comments_seq: 0,
            notice: None,
        }
    }

    /// Attach the `PreviewHandle` used to observe preview playback.
    pub fn set_preview_handle(&mut self, h: PreviewHandle) {
        self.preview_handle = Some(h);
    }

    /// Current preview state, `Idle` when no player is attached.
    pub fn preview_state(&self) -> PreviewState {
        self.preview_handle
            .as_ref()
            .and_then(|h| h.lock().ok().map(|info| info.state.clone()))
            .unwrap_or_default()
    }

    /// Label of the track the preview player is busy with.
    pub fn preview_label(&self) -> Option<String> {
        self.preview_handle
            .as_ref()
            .and_then(|h| h.lock().ok().and_then(|info| info.label.clone()))
    }

    // Comments

    /// Replace the comment snapshot with fresh server data.
    pub fn set_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
        self.likes.clear();
        self.loading_comments = false;
        self.rebuild_threads();
    }

    /// Mark a comment fetch as started and return its sequence number.
    /// Only the answer carrying the newest number is applied.
    pub fn begin_comments_load(&mut self) -> u64 {
        self.comments_seq += 1;
        self.loading_comments = true;
        self.comments_seq
    }

    /// Apply the result of fetch `seq`. Returns `false` when a newer fetch
    /// has been started since, leaving the model untouched.
    pub fn accept_comments(&mut self, seq: u64, comments: Vec<Comment>) -> bool {
        if seq != self.comments_seq {
            return false;
        }
        self.set_comments(comments);
        true
    }

    /// Record that fetch `seq` failed. Returns `false` for a superseded fetch.
    pub fn comments_load_failed(&mut self, seq: u64) -> bool {
        if seq != self.comments_seq {
            return false;
        }
        self.loading_comments = false;
        true
    }

    pub fn comment_lines(&self) -> Vec<ThreadLine<'_>> {
        thread_lines(&self.threads)
    }

    pub fn selected_comment_node(&self) -> Option<&TreeComment> {
        self.comment_lines()
            .get(self.selected_comment)
            .map(|line| line.node)
    }

    /// Cycle the thread ranking, keeping the selected comment selected.
    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        self.rebuild_threads();
    }

    /// Rebuild the tree from the snapshot plus pending like updates.
    fn rebuild_threads(&mut self) {
        let selected_id = self
            .selected_comment_node()
            .and_then(|n| n.id().map(str::to_string));

        let effective: Vec<Comment> = self
            .comments
            .iter()
            .map(|c| {
                let overlay = c.id.as_ref().and_then(|id| self.likes.get(id));
                match overlay {
                    Some(&(liked, likes_count)) => Comment {
                        liked,
                        likes_count,
                        ..c.clone()
                    },
                    None => c.clone(),
                }
            })
            .collect();

        self.threads = sort_threads(build_tree(&effective), self.sort);

        let lines = thread_lines(&self.threads);
        self.selected_comment = selected_id
            .and_then(|id| lines.iter().position(|l| l.node.id() == Some(id.as_str())))
            .unwrap_or(0)
            .min(lines.len().saturating_sub(1));
    }

    pub fn like_pending(&self, comment_id: &str) -> bool {
        self.likes.is_pending(&comment_id.to_string())
    }

    /// Flip the like on the selected comment locally.
    ///
    /// Returns the ticket to settle once the server answers, with the
    /// comment id and the new liked flag to send.
    pub fn begin_like_toggle(&mut self) -> Option<(LikeTicket, String, bool)> {
        let node = self.selected_comment_node()?;
        let id = node.id()?.to_string();
        let current = (node.comment.liked, node.comment.likes_count);
        let tentative = if current.0 {
            (false, current.1.saturating_sub(1))
        } else {
            (true, current.1 + 1)
        };

        let ticket = self.likes.begin(id.clone(), current, tentative);
        self.rebuild_threads();
        Some((ticket, id, tentative.0))
    }

    /// Apply the server's answer to a like toggle. Returns `true` when the
    /// local change had to be rolled back.
    pub fn settle_like(&mut self, ticket: LikeTicket, ok: bool) -> bool {
        let rolled_back = self.likes.settle(ticket, ok);
        if rolled_back {
            self.rebuild_threads();
        }
        rolled_back
    }

    // Tracks

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected_track)
    }

    /// Show search results in the track pane.
    pub fn show_search_results(&mut self, query: String, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.selected_track = 0;
        self.search_results_for = Some(query);
        self.focus = Pane::Tracks;
    }

    /// Go back to the tracks attached to the post.
    pub fn clear_search(&mut self) {
        self.tracks = self.post.tracks.clone();
        self.selected_track = 0;
        self.search_results_for = None;
        self.search_query.clear();
        self.search_mode = false;
    }

    /// Enter search mode with an empty query.
    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
        self.search_query.clear();
    }

    /// Leave search mode, returning the trimmed query if it is non-empty.
    pub fn submit_search(&mut self) -> Option<String> {
        self.search_mode = false;
        let q = self.search_query.trim();
        if q.is_empty() { None } else { Some(q.to_string()) }
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search_query.push(c);
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
    }

    // Navigation

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Comments => Pane::Tracks,
            Pane::Tracks => Pane::Comments,
        };
    }

    fn focused_len(&self) -> usize {
        match self.focus {
            Pane::Comments => self.comment_lines().len(),
            Pane::Tracks => self.tracks.len(),
        }
    }

    fn focused_cursor(&mut self) -> &mut usize {
        match self.focus {
            Pane::Comments => &mut self.selected_comment,
            Pane::Tracks => &mut self.selected_track,
        }
    }

    /// Move selection down in the focused pane, wrapping to the top.
    pub fn next(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let cur = self.focused_cursor();
        *cur = (*cur + 1) % len;
    }

    /// Move selection up in the focused pane, wrapping to the bottom.
    pub fn prev(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let cur = self.focused_cursor();
        *cur = if *cur == 0 { len - 1 } else { *cur - 1 };
    }

    pub fn select_first(&mut self) {
        *self.focused_cursor() = 0;
    }

    pub fn select_last(&mut self) {
        let len = self.focused_len();
        *self.focused_cursor() = len.saturating_sub(1);
    }

    // Notices

    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.notice = Some((text.into(), Instant::now()));
    }

    /// The latest notice, if it is younger than `ttl`.
    pub fn current_notice(&self, ttl: Duration) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|(_, at)| at.elapsed() < ttl)
            .map(|(text, _)| text.as_str())
    }
}
