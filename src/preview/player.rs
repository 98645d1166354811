use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::PreviewSettings;

use super::thread::spawn_preview_thread;
use super::types::{
    ClipSource, LinkOpener, Notifier, PreviewCmd, PreviewHandle, PreviewInfo, Track, TrackLookup,
};

/// Handle to the preview thread owning one `PreviewManager`.
pub struct PreviewPlayer {
    tx: Sender<PreviewCmd>,
    info: PreviewHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl PreviewPlayer {
    pub fn new<C, X, N>(client: C, opener: X, notifier: N, settings: PreviewSettings) -> Self
    where
        C: TrackLookup + ClipSource + Clone + Send + 'static,
        X: LinkOpener + Send + 'static,
        N: Notifier + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PreviewCmd>();
        let info: PreviewHandle = Arc::new(Mutex::new(PreviewInfo::default()));

        let handle = spawn_preview_thread(
            client,
            opener,
            notifier,
            rx,
            tx.clone(),
            info.clone(),
            settings,
        );

        Self {
            tx,
            info,
            join: Mutex::new(Some(handle)),
        }
    }

    pub fn preview_handle(&self) -> PreviewHandle {
        self.info.clone()
    }

    pub fn request(&self, track: Track) {
        let _ = self.tx.send(PreviewCmd::Request(track));
    }

    pub fn stop(&self) {
        let _ = self.tx.send(PreviewCmd::Stop);
    }

    /// Stop playback and wait for the preview thread to exit.
    pub fn quit(&self) {
        let _ = self.tx.send(PreviewCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for PreviewPlayer {
    fn drop(&mut self) {
        self.quit();
    }
}
