use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|p| p.into_inner())
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
fn resolve_config_path_prefers_encore_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("ENCORE_CONFIG_PATH", "/tmp/encore-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/encore-test-config.toml")
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
            .join("encore")
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
            .join("encore")
            .join("config.toml")
    );
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert_eq!(s.catalog.artist, "Twenty One Pilots");
    assert_eq!(s.catalog.base_url, "https://itunes.apple.com");
    assert_eq!(s.catalog.retries, 1);
    assert_eq!(s.playback.default_volume, 0.8);
    assert_eq!(s.audio.progress_interval_ms, 250);
    assert_eq!(s.logging.filter, "info");
    assert!(s.logging.file.is_none());
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file_with_partial_sections() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[catalog]
artist = "Arctic Monkeys"
search_limit = 25
retries = 2

[playback]
default_volume = 0.5
seek_step_seconds = 10

[audio]
progress_interval_ms = 100

[ui]
follow_playback = false
header_text = "hello"

[logging]
filter = "encore=debug"
file = "/tmp/encore-test.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ENCORE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("ENCORE__PLAYBACK__DEFAULT_VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.catalog.artist, "Arctic Monkeys");
    assert_eq!(s.catalog.search_limit, 25);
    assert_eq!(s.catalog.retries, 2);
    // Untouched keys keep their defaults.
    assert_eq!(s.catalog.timeout_ms, 8000);
    assert_eq!(s.playback.default_volume, 0.5);
    assert_eq!(s.playback.unmute_volume, 0.8);
    assert_eq!(s.playback.seek_step_seconds, 10);
    assert_eq!(s.audio.progress_interval_ms, 100);
    assert_eq!(s.audio.fetch_timeout_ms, 20_000);
    assert!(!s.ui.follow_playback);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.logging.filter, "encore=debug");
    assert_eq!(
        s.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/encore-test.log"))
    );
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
[playback]
default_volume = 0.9
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ENCORE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("ENCORE__PLAYBACK__DEFAULT_VOLUME", "0.25");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.default_volume, 0.25);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("absent.toml");
    let _g1 = EnvGuard::set("ENCORE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("ENCORE__PLAYBACK__DEFAULT_VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.catalog.search_limit, 50);
    assert_eq!(s.playback.volume_step, 0.05);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.playback.default_volume = 1.5;
    assert!(s.validate().unwrap_err().contains("default_volume"));

    let mut s = Settings::default();
    s.playback.unmute_volume = -0.1;
    assert!(s.validate().unwrap_err().contains("unmute_volume"));

    let mut s = Settings::default();
    s.audio.progress_interval_ms = 5;
    assert!(s.validate().unwrap_err().contains("progress_interval_ms"));

    let mut s = Settings::default();
    s.catalog.search_limit = 0;
    assert!(s.validate().unwrap_err().contains("search_limit"));

    let mut s = Settings::default();
    s.catalog.retries = 4;
    assert!(s.validate().unwrap_err().contains("retries"));
}
