//! The preview state machine.
//!
//! One `PreviewManager` serves one track listing. It owns at most one audio
//! handle, and every transition goes through its methods. Downloads happen
//! elsewhere: `request_playback` hands out a `LoadJob` tagged with a session
//! ticket, and `load_finished` ignores any result whose ticket is no longer
//! the pending one.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::GuildError;

use super::types::{
    AudioHandle, AudioOutput, LinkOpener, LoadJob, Notice, Notifier, PlaybackError, PreviewHandle,
    PreviewInfo, PreviewState, Track, TrackLookup,
};

struct Session {
    track: Track,
    handle: Box<dyn AudioHandle>,
}

struct Pending {
    ticket: u64,
    track: Track,
}

pub struct PreviewManager {
    output: Box<dyn AudioOutput>,
    lookup: Box<dyn TrackLookup>,
    opener: Box<dyn LinkOpener>,
    notifier: Box<dyn Notifier>,
    open_external: bool,

    state: PreviewState,
    session: Option<Session>,
    pending: Option<Pending>,
    next_ticket: u64,
    /// Preview URLs resolved through `lookup`, by track id.
    resolved: HashMap<String, String>,
    info: PreviewHandle,
}

impl PreviewManager {
    pub fn new(
        output: Box<dyn AudioOutput>,
        lookup: Box<dyn TrackLookup>,
        opener: Box<dyn LinkOpener>,
        notifier: Box<dyn Notifier>,
        info: PreviewHandle,
    ) -> Self {
        Self {
            output,
            lookup,
            opener,
            notifier,
            open_external: true,
            state: PreviewState::Idle,
            session: None,
            pending: None,
            next_ticket: 0,
            resolved: HashMap::new(),
            info,
        }
    }

    /// Whether tracks without a preview open their provider page.
    pub fn with_external_fallback(mut self, enabled: bool) -> Self {
        self.open_external = enabled;
        self
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// React to the user picking `track`.
    ///
    /// Same track: pause, resume, or cancel a load in progress. Another
    /// track: drop the current session and start over. A returned `LoadJob`
    /// must be run and reported through `load_finished`.
    pub fn request_playback(&mut self, track: &Track) -> Option<LoadJob> {
        match &self.state {
            PreviewState::Playing(id) if *id == track.id => {
                if let Some(session) = self.session.as_mut() {
                    session.handle.pause();
                }
                self.set_state(PreviewState::Paused(track.id.clone()));
                return None;
            }
            PreviewState::Paused(id) if *id == track.id => {
                let resumed = match self.session.as_mut() {
                    Some(session) => session.handle.play(),
                    None => Err(PlaybackError::Decode("session vanished".to_string())),
                };
                match resumed {
                    Ok(()) => self.set_state(PreviewState::Playing(track.id.clone())),
                    Err(e) => self.fail(track, e),
                }
                return None;
            }
            PreviewState::Loading(id) if *id == track.id => {
                debug!("preview of {} cancelled while loading", track.id);
                self.teardown();
                self.set_state(PreviewState::Idle);
                return None;
            }
            _ => {}
        }

        // The lookup below may block on the network; the released session
        // must not stay published while it does.
        self.teardown();
        self.set_state(PreviewState::Idle);

        let Some(url) = self.resolve_preview_url(track) else {
            self.fall_back_to_external(track);
            return None;
        };

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some(Pending {
            ticket,
            track: track.clone(),
        });
        self.set_state(PreviewState::Loading(track.id.clone()));
        debug!("loading preview of {} (ticket {ticket})", track.id);

        Some(LoadJob {
            ticket,
            track_id: track.id.clone(),
            url,
        })
    }

    /// Completion of a `LoadJob`.
    pub fn load_finished(&mut self, ticket: u64, result: Result<Vec<u8>, GuildError>) {
        let Some(pending) = self.pending.take_if(|p| p.ticket == ticket) else {
            debug!("discarding stale preview load (ticket {ticket})");
            return;
        };
        let track = pending.track;

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("preview download for {} failed: {e}", track.id);
                self.fail(&track, PlaybackError::Decode(e.to_string()));
                return;
            }
        };

        let mut handle = match self.output.open(bytes) {
            Ok(handle) => handle,
            Err(e) => {
                self.fail(&track, e);
                return;
            }
        };

        if let Err(e) = handle.play() {
            handle.pause();
            handle.release();
            self.fail(&track, e);
            return;
        }

        info!("playing preview of {}", track.id);
        let id = track.id.clone();
        self.session = Some(Session { track, handle });
        self.set_state(PreviewState::Playing(id));
    }

    /// Periodic check for output faults and the natural end of a clip.
    pub fn poll(&mut self) {
        let fault = self.session.as_mut().and_then(|s| s.handle.take_error());
        if let Some(err) = fault {
            warn!("audio output reported an error: {err}");
            self.handle_error(err);
            return;
        }
        let finished = matches!(self.state, PreviewState::Playing(_))
            && self.session.as_ref().is_some_and(|s| s.handle.is_finished());
        if finished {
            debug!("preview ended");
            self.teardown();
            self.set_state(PreviewState::Idle);
        }
    }

    /// The audio handle reported an error mid-playback.
    pub fn handle_error(&mut self, err: PlaybackError) {
        let track = self
            .session
            .as_ref()
            .map(|s| s.track.clone())
            .or_else(|| self.pending.as_ref().map(|p| p.track.clone()));
        match track {
            Some(track) => self.fail(&track, err),
            None => debug!("ignoring playback error with no session: {err}"),
        }
    }

    /// Stop and forget any session. Safe to call at any time.
    pub fn stop_playback(&mut self) {
        if self.state == PreviewState::Idle && self.session.is_none() && self.pending.is_none() {
            return;
        }
        self.teardown();
        self.set_state(PreviewState::Idle);
    }

    /// Release everything before the owner goes away.
    pub fn shutdown(&mut self) {
        self.stop_playback();
    }

    fn resolve_preview_url(&mut self, track: &Track) -> Option<String> {
        if let Some(url) = track.preview_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Some(url.to_string());
        }
        if let Some(url) = self.resolved.get(&track.id) {
            return Some(url.clone());
        }
        match self.lookup.preview_url(&track.id) {
            Ok(Some(url)) if !url.trim().is_empty() => {
                self.resolved.insert(track.id.clone(), url.clone());
                Some(url)
            }
            Ok(_) => {
                debug!("track {} has no preview", track.id);
                None
            }
            Err(e) => {
                warn!("preview lookup for {} failed: {e}", track.id);
                None
            }
        }
    }

    fn fall_back_to_external(&mut self, track: &Track) {
        let label = track.label();
        if !self.open_external {
            self.notifier.notify(Notice::NoPreview {
                track: label,
                url: track.external_url.clone(),
            });
            return;
        }
        match self.opener.open(&track.external_url) {
            Ok(()) => {
                info!("opened {} externally", track.external_url);
                self.notifier.notify(Notice::OpenedExternally { track: label });
            }
            Err(e) => {
                warn!("failed to open external URL '{}': {e}", track.external_url);
                self.notifier.notify(Notice::NoPreview {
                    track: label,
                    url: track.external_url.clone(),
                });
            }
        }
    }

    fn fail(&mut self, track: &Track, err: PlaybackError) {
        self.teardown();
        self.set_state(PreviewState::Idle);
        let label = track.label();
        let notice = match err {
            PlaybackError::Blocked(reason) => Notice::PlaybackBlocked {
                track: label,
                reason,
            },
            PlaybackError::Decode(reason) => Notice::PlaybackFailed {
                track: label,
                reason,
            },
        };
        self.notifier.notify(notice);
    }

    fn teardown(&mut self) {
        self.pending = None;
        if let Some(mut session) = self.session.take() {
            session.handle.pause();
            session.handle.release();
        }
    }

    fn set_state(&mut self, state: PreviewState) {
        self.state = state;
        let label = match &self.state {
            PreviewState::Idle => None,
            PreviewState::Loading(_) => self.pending.as_ref().map(|p| p.track.label()),
            PreviewState::Playing(_) | PreviewState::Paused(_) => {
                self.session.as_ref().map(|s| s.track.label())
            }
        };
        if let Ok(mut info) = self.info.lock() {
            *info = PreviewInfo {
                state: self.state.clone(),
                label,
            };
        }
    }
}

impl Drop for PreviewManager {
    fn drop(&mut self) {
        self.teardown();
    }
}
