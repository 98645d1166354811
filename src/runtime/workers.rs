//! Blocking API calls run on short-lived threads and report back to the UI
//! loop as `UiEvent`s.

use std::sync::mpsc::Sender;
use std::thread;

use tracing::warn;

use crate::api::ApiClient;
use crate::app::LikeTicket;
use crate::comments::Comment;
use crate::error::Result;
use crate::preview::Track;

pub enum UiEvent {
    CommentsLoaded {
        seq: u64,
        result: Result<Vec<Comment>>,
    },
    LikeSettled {
        ticket: LikeTicket,
        result: Result<()>,
    },
    SearchFinished {
        query: String,
        result: Result<Vec<Track>>,
    },
}

pub fn fetch_comments(client: &ApiClient, post_id: &str, seq: u64, tx: &Sender<UiEvent>) {
    let client = client.clone();
    let post_id = post_id.to_string();
    let tx = tx.clone();
    thread::spawn(move || {
        let result = client.fetch_comments(&post_id);
        if let Err(e) = &result {
            warn!("fetching comments of post {post_id} failed: {e}");
        }
        let _ = tx.send(UiEvent::CommentsLoaded { seq, result });
    });
}

pub fn send_like(
    client: &ApiClient,
    ticket: LikeTicket,
    comment_id: String,
    liked: bool,
    tx: &Sender<UiEvent>,
) {
    let client = client.clone();
    let tx = tx.clone();
    thread::spawn(move || {
        let result = client.set_comment_like(&comment_id, liked);
        if let Err(e) = &result {
            warn!("like update for comment {comment_id} failed: {e}");
        }
        let _ = tx.send(UiEvent::LikeSettled { ticket, result });
    });
}

pub fn search_tracks(client: &ApiClient, query: String, tx: &Sender<UiEvent>) {
    let client = client.clone();
    let tx = tx.clone();
    thread::spawn(move || {
        let result = client.search_tracks(&query);
        let _ = tx.send(UiEvent::SearchFinished { query, result });
    });
}
