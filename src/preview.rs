//! Spotify preview playback.
//!
//! `PreviewManager` is the state machine guaranteeing a single live clip per
//! listing. `PreviewPlayer` runs one manager on its own thread, fed by a
//! command channel, with clip downloads on short-lived worker threads.

mod manager;
mod opener;
mod player;
mod sink;
mod thread;
mod types;

pub use manager::PreviewManager;
pub use opener::BrowserOpener;
pub use player::PreviewPlayer;
pub use types::*;
