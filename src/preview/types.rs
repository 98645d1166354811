//! Small types shared by the preview subsystem: tracks, states, commands,
//! notices and the collaborator traits the manager is built from.

use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use thiserror::Error;

use crate::error::GuildError;

/// A playable (or at least linkable) Spotify track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    /// Short preview clip; may be missing and resolved later.
    pub preview_url: Option<String>,
    /// Canonical provider page, always present.
    pub external_url: String,
    pub duration_ms: Option<u64>,
}

impl Track {
    /// A track known only by id, as attached to posts.
    pub fn stub(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Track {id}"),
            artists: Vec::new(),
            album: None,
            preview_url: None,
            external_url: external_url_for(id),
            duration_ms: None,
        }
    }

    /// "Artist, Artist - Name", or just the name.
    pub fn label(&self) -> String {
        if self.artists.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.artists.join(", "), self.name)
        }
    }
}

pub fn external_url_for(track_id: &str) -> String {
    format!("https://open.spotify.com/track/{track_id}")
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Decode a track from either the Spotify shape (`preview_url`,
/// `external_urls.spotify`, `artists[].name`) or the app's camelCase shape.
pub fn parse_track(value: &Value) -> Option<Track> {
    let id = non_empty_str(value.get("id"))?;

    let name = non_empty_str(value.get("name"))
        .or_else(|| non_empty_str(value.get("title")))
        .unwrap_or_else(|| format!("Track {id}"));

    let artists = match value.get("artists") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|a| match a {
                Value::String(s) => Some(s.clone()),
                other => non_empty_str(other.get("name")),
            })
            .collect(),
        _ => non_empty_str(value.get("artist")).into_iter().collect(),
    };

    let album = match value.get("album") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(obj @ Value::Object(_)) => non_empty_str(obj.get("name")),
        _ => None,
    };

    let preview_url =
        non_empty_str(value.get("preview_url")).or_else(|| non_empty_str(value.get("previewUrl")));

    let external_url = value
        .get("external_urls")
        .and_then(|e| non_empty_str(e.get("spotify")))
        .or_else(|| non_empty_str(value.get("externalUrl")))
        .unwrap_or_else(|| external_url_for(&id));

    let duration_ms = value
        .get("duration_ms")
        .or_else(|| value.get("durationMs"))
        .and_then(Value::as_u64);

    Some(Track {
        id,
        name,
        artists,
        album,
        preview_url,
        external_url,
        duration_ms,
    })
}

/// Decode a track list: a bare array, `{ "items": [...] }` or the Spotify
/// search shape `{ "tracks": { "items": [...] } }`. Anything else is empty.
pub fn parse_tracks(value: &Value) -> Vec<Track> {
    let items = value
        .as_array()
        .or_else(|| value.get("items").and_then(Value::as_array))
        .or_else(|| {
            value
                .get("tracks")
                .and_then(|t| t.as_array().or_else(|| t.get("items").and_then(Value::as_array)))
        });

    items
        .map(|items| items.iter().filter_map(parse_track).collect())
        .unwrap_or_default()
}

/// Published state of one preview manager.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    /// A clip for this track is being fetched or decoded.
    Loading(String),
    Playing(String),
    Paused(String),
}

impl PreviewState {
    pub fn track_id(&self) -> Option<&str> {
        match self {
            PreviewState::Idle => None,
            PreviewState::Loading(id) | PreviewState::Playing(id) | PreviewState::Paused(id) => {
                Some(id)
            }
        }
    }
}

/// Snapshot shared with the UI thread.
#[derive(Debug, Clone, Default)]
pub struct PreviewInfo {
    pub state: PreviewState,
    /// Label of the track in `state`, if any.
    pub label: Option<String>,
}

pub type PreviewHandle = Arc<Mutex<PreviewInfo>>;

/// Work the caller must run off the manager's thread: download the clip at
/// `url` and report back with `load_finished(ticket, ..)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadJob {
    pub ticket: u64,
    pub track_id: String,
    pub url: String,
}

#[derive(Debug)]
pub enum PreviewCmd {
    /// Play, pause, resume or switch to this track.
    Request(Track),
    /// Stop whatever is playing.
    Stop,
    /// A `LoadJob` finished.
    Loaded {
        ticket: u64,
        result: Result<Vec<u8>, GuildError>,
    },
    /// Tear down and exit the preview thread.
    Quit,
}

/// Why an audio handle could not be opened or kept playing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The output refused to play (no device, device busy). Retrying the
    /// same clip will not help until the output is available.
    #[error("playback blocked: {0}")]
    Blocked(String),
    /// The clip itself could not be decoded or streamed.
    #[error("playback failed: {0}")]
    Decode(String),
}

/// User-facing messages emitted by the preview manager and the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PlaybackFailed { track: String, reason: String },
    PlaybackBlocked { track: String, reason: String },
    /// No preview exists; the provider page was opened instead.
    OpenedExternally { track: String },
    /// No preview exists and the provider page was not opened.
    NoPreview { track: String, url: String },
    LikeFailed { reason: String },
    LoadFailed { what: String, reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PlaybackFailed { track, reason } => {
                write!(f, "Could not play preview of {track}: {reason}")
            }
            Notice::PlaybackBlocked { track, reason } => {
                write!(f, "Playback of {track} blocked ({reason}); check your audio output")
            }
            Notice::OpenedExternally { track } => {
                write!(f, "No preview for {track}; opened it on Spotify instead")
            }
            Notice::NoPreview { track, url } => {
                write!(f, "No preview for {track}; open {url} to listen")
            }
            Notice::LikeFailed { reason } => write!(f, "Like was not saved: {reason}"),
            Notice::LoadFailed { what, reason } => write!(f, "Could not load {what}: {reason}"),
        }
    }
}

/// A playing (or paused) clip. The manager pauses and releases each handle
/// exactly once.
pub trait AudioHandle {
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    /// True once the clip has played to its end.
    fn is_finished(&self) -> bool;
    /// An error the output reported since the last call, if any.
    fn take_error(&mut self) -> Option<PlaybackError>;
    /// Clear the source and detach from the output.
    fn release(self: Box<Self>);
}

/// Turns downloaded clip bytes into a paused `AudioHandle`.
pub trait AudioOutput {
    fn open(&mut self, clip: Vec<u8>) -> Result<Box<dyn AudioHandle>, PlaybackError>;
}

/// Downloads preview clips.
pub trait ClipSource {
    fn fetch_clip(&self, url: &str) -> Result<Vec<u8>, GuildError>;
}

/// Resolves a missing preview URL for a track id.
pub trait TrackLookup {
    fn preview_url(&self, track_id: &str) -> Result<Option<String>, GuildError>;
}

/// Opens a URL outside the application.
pub trait LinkOpener {
    fn open(&self, url: &str) -> Result<(), GuildError>;
}

/// Receives user-facing notices.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

impl Notifier for Sender<Notice> {
    fn notify(&self, notice: Notice) {
        let _ = self.send(notice);
    }
}
