use std::io::Read;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::comments::{Comment, parse_comments};
use crate::config::ApiSettings;
use crate::error::{GuildError, Result};
use crate::preview::{ClipSource, Track, TrackLookup, parse_track, parse_tracks};

use super::types::{Post, parse_post};

/// Preview clips are ~30 s MP3s; anything far larger is not a preview.
const MAX_CLIP_BYTES: u64 = 8 * 1024 * 1024;

#[derive(Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(settings.connect_timeout_ms))
            .timeout_read(Duration::from_millis(settings.read_timeout_ms))
            .timeout_write(Duration::from_millis(settings.read_timeout_ms))
            .build();

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.trim().is_empty()),
        }
    }

    /// Absolute URL for an API path such as `/api/posts/1`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let req = self.agent.request(method, url);
        match &self.token {
            Some(token) => req.set("Authorization", &format!("Bearer {token}")),
            None => req,
        }
    }

    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {url}");
        let mut req = self.request("GET", &url);
        for (k, v) in query {
            req = req.query(k, v);
        }
        let response = req.call()?;
        response
            .into_json::<Value>()
            .map_err(|e| GuildError::Decode(format!("{url}: {e}")))
    }

    pub fn fetch_post(&self, post_id: &str) -> Result<Post> {
        let body = self.get_json(&format!("/api/posts/{}", encode(post_id)), &[])?;
        Ok(parse_post(post_id, &body))
    }

    pub fn fetch_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let body = self.get_json(&format!("/api/posts/{}/comments", encode(post_id)), &[])?;
        Ok(parse_comments(&body))
    }

    /// Like or unlike a comment.
    pub fn set_comment_like(&self, comment_id: &str, liked: bool) -> Result<()> {
        let url = self.url(&format!("/api/comments/{}/like", encode(comment_id)));
        let method = if liked { "POST" } else { "DELETE" };
        debug!("{method} {url}");
        self.request(method, &url).call()?;
        Ok(())
    }

    pub fn fetch_track(&self, track_id: &str) -> Result<Track> {
        let body = self.get_json(&format!("/api/spotify/track/{}", encode(track_id)), &[])?;
        parse_track(&body)
            .ok_or_else(|| GuildError::Decode(format!("track {track_id}: missing id")))
    }

    pub fn search_tracks(&self, query: &str) -> Result<Vec<Track>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GuildError::InvalidInput("empty search".to_string()));
        }
        let body = self.get_json("/api/spotify/search", &[("q", query), ("type", "track")])?;
        Ok(parse_tracks(&body))
    }
}

impl TrackLookup for ApiClient {
    fn preview_url(&self, track_id: &str) -> Result<Option<String>> {
        Ok(self.fetch_track(track_id)?.preview_url)
    }
}

impl ClipSource for ApiClient {
    fn fetch_clip(&self, url: &str) -> Result<Vec<u8>> {
        debug!("downloading clip {url}");
        // Clips are served by the provider CDN, never with our token.
        let response = self.agent.get(url).call()?;
        let mut buf = Vec::new();
        response
            .into_reader()
            .take(MAX_CLIP_BYTES + 1)
            .read_to_end(&mut buf)?;
        if buf.len() as u64 > MAX_CLIP_BYTES {
            warn!("clip at {url} exceeds {MAX_CLIP_BYTES} bytes");
            return Err(GuildError::Decode("preview clip too large".to_string()));
        }
        Ok(buf)
    }
}

/// Percent-encode a single path segment.
pub fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
