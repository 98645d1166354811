use std::path::PathBuf;

use serde::Deserialize;

use crate::comments::SortPolicy;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/guild/config.toml` or `~/.config/guild/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `GUILD__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub comments: CommentSettings,
    pub preview: PreviewSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the Writers Guild server, without the `/api` suffix.
    pub base_url: String,
    /// Optional bearer token sent with API requests (never with clip downloads).
    pub token: Option<String>,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            token: None,
            connect_timeout_ms: 5_000,
            read_timeout_ms: 7_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommentSettings {
    /// Initial ranking of top-level threads: "newest", "oldest" or "popular".
    pub default_sort: SortPolicy,
    /// Spaces per reply level.
    pub indent: usize,
    /// Show "3h ago" labels next to authors.
    pub show_age: bool,
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            default_sort: SortPolicy::Newest,
            indent: 2,
            show_age: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Preview volume, 0.0 to 1.0.
    pub volume: f32,
    /// Open the Spotify page when a track has no preview clip.
    /// When false, only a notice is shown.
    pub open_external_fallback: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            volume: 0.8,
            open_external_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// How long a notice stays in the toast line (milliseconds).
    pub notice_ttl_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ Writers Guild ~ ".to_string(),
            notice_ttl_ms: 4_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/guild/guild.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
