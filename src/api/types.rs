use serde_json::Value;

use crate::preview::{Track, parse_track, parse_tracks};

/// The post whose comments and tracks are shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    /// Attached tracks; stubs when only ids are known.
    pub tracks: Vec<Track>,
}

/// Decode `GET /api/posts/{id}`. Missing fields fall back to placeholders so
/// that a sparse post still renders.
pub fn parse_post(post_id: &str, body: &Value) -> Post {
    let text = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let title = text("title").unwrap_or_else(|| format!("Post {post_id}"));

    let author = match body.get("author") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(obj @ Value::Object(_)) => ["displayName", "name", "username"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => text("authorName"),
    };

    let mut tracks = body
        .get("spotifyTracks")
        .map(parse_tracks)
        .unwrap_or_default();
    if tracks.is_empty() {
        if let Some(track) = body.get("spotifyTrack").and_then(parse_track) {
            tracks.push(track);
        } else if let Some(id) = text("spotifyTrackId") {
            tracks.push(Track::stub(&id));
        }
    }

    Post {
        id: post_id.to_string(),
        title,
        author,
        tracks,
    }
}
