use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use crate::comments::SortPolicy;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_guild_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("GUILD_CONFIG_PATH", "/tmp/guild-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/guild-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("guild")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("guild")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_xdg_state_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_STATE_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/guild/guild.log")
    );

    let _g3 = EnvGuard::set("XDG_STATE_HOME", "/tmp/state");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/state/guild/guild.log")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_sort_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[api]
base_url = "https://guild.example"
token = "secret"
read_timeout_ms = 1500

[comments]
default_sort = "top"
indent = 4
show_age = false

[preview]
volume = 0.5
open_external_fallback = false

[ui]
header_text = "hello"
notice_ttl_ms = 900

[log]
level = "debug"
file = "/tmp/guild.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("GUILD_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("GUILD__PREVIEW__VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.api.base_url, "https://guild.example");
    assert_eq!(s.api.token.as_deref(), Some("secret"));
    assert_eq!(s.api.read_timeout_ms, 1500);
    assert_eq!(s.api.connect_timeout_ms, 5_000);
    assert_eq!(s.comments.default_sort, SortPolicy::Popular);
    assert_eq!(s.comments.indent, 4);
    assert!(!s.comments.show_age);
    assert_eq!(s.preview.volume, 0.5);
    assert!(!s.preview.open_external_fallback);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.notice_ttl_ms, 900);
    assert_eq!(s.log.level, "debug");
    assert_eq!(s.log.file, Some(std::path::PathBuf::from("/tmp/guild.log")));
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[comments]
indent = 2
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("GUILD_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("GUILD__COMMENTS__INDENT", "6");

    let s = Settings::load().unwrap();
    assert_eq!(s.comments.indent, 6);
}

#[test]
fn validate_rejects_out_of_range_volume_and_empty_base_url() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.preview.volume = 1.5;
    assert!(s.validate().unwrap_err().contains("preview.volume"));

    s.preview.volume = 0.3;
    s.api.base_url = "  ".to_string();
    assert!(s.validate().unwrap_err().contains("api.base_url"));
}

#[test]
fn shipped_example_config_parses() {
    let example = include_str!("../../config.example.toml");
    let s: Settings = toml::from_str(example).unwrap();
    assert!(s.validate().is_ok());
    assert_eq!(s.comments.default_sort, SortPolicy::Newest);
}
